//! Fieldmap CLI - Command-line interface for Notion field mapping
//!
//! This is the main entry point for the Fieldmap CLI application, providing
//! commands for checking field compatibility, validating mapping
//! configurations and transforming records with them.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands, OutputFormat};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    // Values in .env act as environment defaults
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    // Configuration is read before logging so the file can shape the logger
    let config = Config::load_with_file(cli.config.as_deref());
    let use_color = cli.use_color() && config.as_ref().map_or(true, |c| c.output.color);
    control::set_override(use_color);

    if let Err(e) = init_logging(&cli, config.as_ref().ok()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = config.and_then(|config| run(cli, config, use_color));

    match result {
        Ok(()) => {
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli, config), fields(command = ?cli.command))]
fn run(cli: Cli, config: Config, use_color: bool) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let format = cli.output.or(config.output.format).unwrap_or(OutputFormat::Human);
    let mut output = OutputWriter::new(format, use_color, cli.quiet, cli.verbosity_level());
    if !config.output.progress {
        output = output.without_progress();
    }

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Check(args) => handlers::handle_check(args, &config, &mut output),
        Commands::Matrix(args) => handlers::handle_matrix(args, &config, &mut output),
        Commands::Transformations(args) => handlers::handle_transformations(args, &config, &mut output),
        Commands::Transform(args) => handlers::handle_transform(args, &config, &mut output),
        Commands::Recommend(args) => handlers::handle_recommend(args, &config, &mut output),
        Commands::Validate(args) => handlers::handle_validate(args, &config, &mut output),
        Commands::Apply(args) => handlers::handle_apply(args, &config, &mut output),
        Commands::Benchmark(args) => handlers::handle_benchmark(args, cli.config.as_deref(), &config, &mut output),
        Commands::Config(args) => handlers::handle_config(args, cli.config.as_deref(), &config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args, &mut std::io::stdout()),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: Option<&Config>) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());

    if let Some(config) = config {
        logging_config.merge_with_settings(&config.logging, cli.verbosity_level());
    }

    // Environment overrides the file
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
