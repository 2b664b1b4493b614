//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::{Commands, ConfigCommands};

/// Command name string for log spans (e.g. "generate.code-gen", "config.show").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Generate { mode, .. } => format!("generate.{}", mode.slug()),
        Commands::Modes { .. } => "modes".to_string(),
        Commands::Interactive => "interactive".to_string(),
        Commands::Config { command } => format!("config.{}", config_command_name(command)),
    }
}

pub fn config_command_name(command: &ConfigCommands) -> &'static str {
    match command {
        ConfigCommands::Show => "show",
        ConfigCommands::Validate => "validate",
    }
}
