//! CLI parse: clap types for Flexgen. No behavior; definitions only.

use crate::mode::{DataGenerationSubtype, GenerationMode};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Flexgen CLI - generate banking test artifacts from requirements
#[derive(Parser)]
#[command(name = "flexgen")]
#[command(about = "Generate function documents, test cases, test data and PL/SQL from requirements")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (searched for config/config.toml)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Generation service base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory downloaded files are written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit one generation request
    Generate {
        /// Mode: function-doc, test-cases, data-generation, code-gen
        mode: GenerationMode,

        /// Data generation dataset (STDCIF or STDCUSAC)
        #[arg(long, default_value = "STDCIF")]
        subtype: DataGenerationSubtype,

        /// Requirement text
        #[arg(long, conflicts_with = "text_file")]
        text: Option<String>,

        /// Read the requirement text from a file
        #[arg(long)]
        text_file: Option<PathBuf>,

        /// Record count for data generation (clamped to 1..=1000)
        #[arg(long, allow_hyphen_values = true)]
        count: Option<String>,

        /// Copy an inline result to the clipboard
        #[arg(long)]
        copy: bool,

        /// Output format (text or json)
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List generation modes and their endpoints
    Modes {
        /// Output format (text or json)
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Interactive session: pick modes, submit, copy results
    Interactive,
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Validate the effective configuration
    Validate,
}
