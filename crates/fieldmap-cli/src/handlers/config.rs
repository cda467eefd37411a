//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use std::path::{Path, PathBuf};

/// Handle the config command
pub fn handle_config(
    args: ConfigArgs,
    explicit_path: Option<&Path>,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    match args.action {
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
        ConfigAction::Path => handle_config_path(explicit_path, output),
    }
}

/// Write a default configuration file
fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let path: PathBuf = if args.user {
        Config::user_config_path().ok_or_else(|| Error::config("Unable to determine user config directory"))?
    } else {
        args.path.unwrap_or_else(Config::project_config_path)
    };

    if path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ))?;
        return Ok(());
    }

    Config::default().save(&path)?;
    output.success(&format!("✓ Created config at {}", path.display()))?;
    output.info("Edit it to tune the cache, output and logging defaults.")
}

/// Print the effective configuration
fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let content = match args.format {
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    output.writeln(content.trim_end())
}

/// Report the file in use and the search order
fn handle_config_path(explicit_path: Option<&Path>, output: &mut OutputWriter) -> Result<()> {
    match Config::locate(explicit_path) {
        Some(path) => output.writeln(&format!("Using: {}", path.display()))?,
        None => output.writeln("Using: built-in defaults")?,
    }

    output.section("Search order")?;
    for path in Config::default_config_paths() {
        let marker = if path.exists() { "found" } else { "-" };
        output.writeln(&format!("{:6} {}", marker, path.display()))?;
    }
    Ok(())
}
