//! CLI presentation: text and json formatters per command family.

mod config;
mod generate;
mod modes;

pub use config::{format_config_show, format_config_validation};
pub use generate::{format_copy_result, format_outcome_json, format_outcome_text, status_line};
pub use modes::{format_modes_json, format_modes_table};
