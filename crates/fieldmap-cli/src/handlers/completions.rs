//! Shell completion scripts

use crate::cli::{Cli, CompletionsArgs};
use crate::error::Result;
use clap::CommandFactory;
use std::io::Write;

/// Write the completion script for the requested shell to `sink`
pub fn handle_completions(args: CompletionsArgs, sink: &mut dyn Write) -> Result<()> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();
    clap_complete::generate(args.shell.to_clap_shell(), &mut command, bin_name, sink);
    sink.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Shell;

    #[test]
    fn test_bash_script_mentions_subcommands() {
        let mut script = Vec::new();
        handle_completions(CompletionsArgs { shell: Shell::Bash }, &mut script).unwrap();
        let script = String::from_utf8(script).unwrap();
        assert!(script.contains("fieldmap"));
        assert!(script.contains("transformations"));
    }
}
