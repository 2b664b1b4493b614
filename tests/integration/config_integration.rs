//! Integration tests for Configuration System

use super::test_utils::EnvGuard;
use flexgen::cli::{CliOverrides, Commands, ConfigCommands, RunContext};
use flexgen::config::ConfigLoader;
use flexgen::lifecycle::StaleResponsePolicy;
use tempfile::TempDir;

#[test]
fn test_environment_overrides_workspace_file() {
    let temp = TempDir::new().unwrap();
    let mut env = EnvGuard::new(&temp.path().join("home"));
    let workspace = temp.path().join("ws");
    std::fs::create_dir_all(workspace.join("config")).unwrap();
    std::fs::write(
        workspace.join("config").join("config.toml"),
        "[server]\nbase_url = \"http://workspace:8080\"\n\n[lifecycle]\nstale_responses = \"discard\"\n",
    )
    .unwrap();

    env.set("FLEXGEN__SERVER__BASE_URL", Some("http://env:7000"));
    let config = ConfigLoader::load(&workspace).unwrap();
    assert_eq!(config.server.base_url, "http://env:7000");
    assert_eq!(config.lifecycle.stale_responses, StaleResponsePolicy::Discard);
}

#[test]
fn test_environment_specific_workspace_file() {
    let temp = TempDir::new().unwrap();
    let mut env = EnvGuard::new(&temp.path().join("home"));
    let workspace = temp.path().join("ws");
    std::fs::create_dir_all(workspace.join("config")).unwrap();
    std::fs::write(
        workspace.join("config").join("staging.toml"),
        "[clipboard]\ncopied_indicator_ms = 750\n",
    )
    .unwrap();

    env.set("FLEXGEN_ENV", Some("staging"));
    let config = ConfigLoader::load(&workspace).unwrap();
    assert_eq!(config.clipboard.copied_indicator_ms, 750);
}

#[test]
fn test_config_validate_command_reports_errors() {
    let temp = TempDir::new().unwrap();
    let cfg = temp.path().join("flexgen.toml");
    std::fs::write(
        &cfg,
        "[server]\nbase_url = \"not a url\"\n\n[logging]\nformat = \"xml\"\n",
    )
    .unwrap();

    let ctx = RunContext::new(temp.path().to_path_buf(), Some(cfg), CliOverrides::default())
        .unwrap();
    let err = ctx
        .execute(&Commands::Config {
            command: ConfigCommands::Validate,
        })
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Configuration has 2 error(s)"), "{}", message);
    assert!(message.contains("Server: Invalid base_url"));
    assert!(message.contains("Logging: Invalid log format"));
}

#[test]
fn test_config_show_reflects_overrides() {
    let temp = TempDir::new().unwrap();
    let cfg = temp.path().join("flexgen.toml");
    std::fs::write(&cfg, "[server]\nrequest_timeout_secs = 30\n").unwrap();

    let ctx = RunContext::new(
        temp.path().to_path_buf(),
        Some(cfg),
        CliOverrides {
            base_url: Some("https://gen.example.com".to_string()),
            output_dir: None,
        },
    )
    .unwrap();
    let shown = ctx
        .execute(&Commands::Config {
            command: ConfigCommands::Show,
        })
        .unwrap();
    assert!(shown.contains("base_url = \"https://gen.example.com\""));
    assert!(shown.contains("request_timeout_secs = 30"));
}

#[test]
fn test_missing_config_file_is_error() {
    let temp = TempDir::new().unwrap();
    let result = RunContext::new(
        temp.path().to_path_buf(),
        Some(temp.path().join("nope.toml")),
        CliOverrides::default(),
    );
    assert!(result.is_err());
}
