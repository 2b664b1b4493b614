//! CLI domain: parse, route, help, output, and presentation only.
//! No generation logic; the route table drives a single `Workbench`.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, ConfigCommands, OutputFormat};
pub use presentation::{
    format_config_show, format_config_validation, format_copy_result, format_modes_json,
    format_modes_table, format_outcome_json, format_outcome_text, status_line,
};
pub use route::{logging_config_for, CliOverrides, RunContext};
