//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use fieldmap_core::{SourceFieldType, TargetFieldType};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fieldmap CLI - Notion to website field mapping
///
/// Check field type compatibility, browse the transformation catalog,
/// validate mapping configurations and run records through them.
#[derive(Parser, Debug)]
#[command(
    name = "fieldmap",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "FIELDMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results [default: human, or the configured format]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether a source field type can feed a target field type
    Check(CheckArgs),

    /// Print the compatibility matrix
    Matrix(MatrixArgs),

    /// List registered transformations
    Transformations(TransformationsArgs),

    /// Run a single value through a transformation
    Transform(TransformArgs),

    /// Rank the source fields of a mapping configuration for a target type
    Recommend(RecommendArgs),

    /// Validate every mapping in a mapping configuration
    Validate(ValidateArgs),

    /// Transform records with a mapping configuration
    Apply(ApplyArgs),

    /// Measure transformations with and without the cache
    Benchmark(BenchmarkArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Notion property type (e.g. richText, multiSelect)
    #[arg(value_name = "SOURCE_TYPE")]
    pub source: SourceFieldType,

    /// Website field type (e.g. html, tags)
    #[arg(value_name = "TARGET_TYPE")]
    pub target: TargetFieldType,

    /// Transformation to validate with the pair
    #[arg(short, long, value_name = "ID")]
    pub transformation: Option<String>,

    /// JSON sample value to run through the accepted mapping
    #[arg(long, value_name = "JSON")]
    pub sample: Option<String>,

    /// Skip the example run of the transformation
    #[arg(long)]
    pub lenient: bool,
}

/// Arguments for the matrix command
#[derive(Parser, Debug)]
pub struct MatrixArgs {
    /// Only show the row for this source type
    #[arg(short, long, value_name = "SOURCE_TYPE")]
    pub source: Option<SourceFieldType>,

    /// Include incompatible (NONE) cells
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the transformations command
#[derive(Parser, Debug)]
pub struct TransformationsArgs {
    /// Filter by source type
    #[arg(short, long, value_name = "SOURCE_TYPE")]
    pub source: Option<SourceFieldType>,

    /// Filter by target type
    #[arg(short, long, value_name = "TARGET_TYPE")]
    pub target: Option<TargetFieldType>,
}

/// Arguments for the transform command
#[derive(Parser, Debug)]
pub struct TransformArgs {
    /// Transformation id (e.g. richText-to-html)
    #[arg(value_name = "ID")]
    pub transformation: String,

    /// Input value as JSON; anything that is not JSON is taken as a string
    #[arg(value_name = "VALUE", required_unless_present = "file")]
    pub value: Option<String>,

    /// Read the input value from a JSON or YAML file
    #[arg(short, long, conflicts_with = "value")]
    pub file: Option<PathBuf>,
}

/// Arguments for the recommend command
#[derive(Parser, Debug)]
pub struct RecommendArgs {
    /// Website field type to fill
    #[arg(value_name = "TARGET_TYPE")]
    pub target: TargetFieldType,

    /// Mapping configuration providing the source fields
    #[arg(value_name = "MAPPING_CONFIG")]
    pub mapping_config: PathBuf,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the mapping configuration (JSON or YAML)
    #[arg(value_name = "MAPPING_CONFIG")]
    pub mapping_config: PathBuf,

    /// Skip the example run of transformations
    #[arg(long)]
    pub lenient: bool,

    /// Write the validation export to this file
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

/// Arguments for the apply command
#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// Path to the mapping configuration (JSON or YAML)
    #[arg(value_name = "MAPPING_CONFIG")]
    pub mapping_config: PathBuf,

    /// Records file: a JSON array of records or a single record
    #[arg(value_name = "RECORDS")]
    pub records: PathBuf,

    /// Output file path (stdout if not specified)
    #[arg(long = "save-to")]
    pub output_file: Option<PathBuf>,

    /// Exit with an error when any field fails to transform
    #[arg(long)]
    pub fail_on_error: bool,
}

/// Arguments for the benchmark command
#[derive(Parser, Debug)]
pub struct BenchmarkArgs {
    /// Transformations to measure (the whole catalog if omitted)
    #[arg(value_name = "ID")]
    pub transformations: Vec<String>,

    /// Passes over the sample set
    #[arg(short = 'n', long, default_value_t = 10)]
    pub iterations: usize,

    /// Distinct generated values per transformation
    #[arg(short, long, default_value_t = 50)]
    pub samples: usize,

    /// Apply the cache recommendations and save them to the config file
    #[arg(long)]
    pub optimize: bool,

    /// Also write the results as CSV
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init(ConfigInitArgs),

    /// Show the effective configuration
    Show(ConfigShowArgs),

    /// Show which configuration file is in use and where files are searched
    Path,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Write to the user configuration directory instead of the project
    #[arg(long, conflicts_with = "path")]
    pub user: bool,

    /// Write to this path
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Serialization format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
