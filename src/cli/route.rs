//! CLI route: single route table and run context. Dispatches to the workbench and presentation.

use crate::cli::help::command_name;
use crate::cli::parse::{Cli, Commands, ConfigCommands, OutputFormat};
use crate::cli::presentation::{
    format_config_show, format_config_validation, format_copy_result, format_modes_json,
    format_modes_table, format_outcome_json, format_outcome_text, status_line,
};
use crate::clipboard::{ClipboardLifetime, CopyResult};
use crate::config::{ConfigLoader, FlexgenConfig};
use crate::error::FlexgenError;
use crate::lifecycle::SubmissionState;
use crate::logging::{resolve_log_file_path, LoggingConfig};
use crate::mode::{DataGenerationSubtype, GenerationMode};
use crate::workbench::Workbench;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, info_span};

/// Values from global CLI flags that override the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            base_url: cli.base_url.clone(),
            output_dir: cli.output_dir.clone(),
        }
    }
}

/// Logging settings for a run. Starts from the `[logging]` table of the loaded config
/// (defaults when it cannot be loaded); `--quiet`/`--verbose` apply next and explicit
/// `--log-*` flags last.
pub fn logging_config_for(cli: &Cli) -> LoggingConfig {
    let loaded = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(&cli.workspace),
    };
    let mut logging = loaded.map(|c| c.logging).unwrap_or_default();

    logging.enabled &= !cli.quiet;
    if cli.verbose {
        logging.level = "debug".to_string();
        // A file-only sink would hide verbose output from the terminal
        if logging.output == "file" {
            logging.output = "file+stderr".to_string();
        }
    }
    if let Some(level) = &cli.log_level {
        logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        logging.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        logging.output = output.clone();
    }

    let writes_file = matches!(logging.output.as_str(), "file" | "file+stderr");
    logging.file = if logging.enabled && writes_file {
        Some(resolve_log_file_path(cli.log_file.clone(), logging.file.take()))
    } else {
        cli.log_file.clone().or(logging.file.take())
    };
    logging
}

/// Runtime context for CLI execution: workspace and effective configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: FlexgenConfig,
}

impl RunContext {
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        overrides: CliOverrides,
    ) -> Result<Self, FlexgenError> {
        let mut config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };

        if let Some(base_url) = overrides.base_url {
            config.server.base_url = base_url;
        }
        if let Some(dir) = overrides.output_dir {
            config.output.directory = Some(dir);
        }

        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn config(&self) -> &FlexgenConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, FlexgenError> {
        let name = command_name(command);
        let _span = info_span!("command", name = %name).entered();
        let started = Instant::now();
        let result = self.execute_inner(command);
        info!(
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, FlexgenError> {
        match command {
            Commands::Generate {
                mode,
                subtype,
                text,
                text_file,
                count,
                copy,
                format,
            } => {
                let text = read_requirement(text.as_deref(), text_file.as_deref())?;
                self.handle_generate(
                    *mode,
                    *subtype,
                    &text,
                    count.as_deref(),
                    *copy,
                    *format,
                )
            }
            Commands::Modes { format } => match format {
                OutputFormat::Json => format_modes_json(&self.config.server.base_url),
                OutputFormat::Text => Ok(format_modes_table(&self.config.server.base_url)),
            },
            Commands::Interactive => self.handle_interactive(),
            Commands::Config { command } => match command {
                ConfigCommands::Show => format_config_show(&self.config),
                ConfigCommands::Validate => {
                    let result = self.config.validate();
                    let text = format_config_validation(&result);
                    match result {
                        Ok(()) => Ok(text),
                        Err(_) => Err(FlexgenError::ConfigError(text)),
                    }
                }
            },
        }
    }

    fn build_workbench(&self, lifetime: ClipboardLifetime) -> Result<Workbench, FlexgenError> {
        self.config.validate().map_err(|errors| {
            FlexgenError::ConfigError(
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;
        Ok(Workbench::native(&self.config, lifetime)?)
    }

    fn handle_generate(
        &self,
        mode: GenerationMode,
        subtype: DataGenerationSubtype,
        text: &str,
        count: Option<&str>,
        copy: bool,
        format: OutputFormat,
    ) -> Result<String, FlexgenError> {
        // The process exits right after printing, so a copy must outlive it
        let mut bench = self.build_workbench(ClipboardLifetime::OneShot)?;
        bench.set_mode(mode);
        bench.set_subtype(subtype);
        bench.set_text(text);
        if let Some(raw) = count {
            bench.set_count_raw(raw);
        }
        debug!(mode = %mode, count = %bench.count(), "Submitting from command line");

        let runtime = build_runtime()?;
        runtime.block_on(bench.submit());

        let copied = if copy {
            let result = bench.copy_result(Instant::now());
            if result.is_none() {
                debug!("Nothing to copy for this mode");
            }
            result
        } else {
            None
        };

        let state = bench.state().clone();
        if let SubmissionState::Failed(message) = &state {
            return Err(FlexgenError::SubmissionFailed(message.clone()));
        }

        let target = mode.target(subtype);
        match format {
            OutputFormat::Json => {
                format_outcome_json(target, &state, bench.last_saved(), copied.as_ref())
            }
            OutputFormat::Text => Ok(format_outcome_text(
                &state,
                bench.last_saved(),
                copied.as_ref(),
            )),
        }
    }

    fn handle_interactive(&self) -> Result<String, FlexgenError> {
        use dialoguer::{Confirm, Input, Select};

        let mut bench = self.build_workbench(ClipboardLifetime::Session)?;
        let runtime = build_runtime()?;

        let mut items: Vec<&str> = GenerationMode::ALL.iter().map(|m| m.label()).collect();
        items.push("Quit");
        let mut submissions = 0usize;

        loop {
            let default = GenerationMode::ALL
                .iter()
                .position(|m| *m == bench.mode())
                .unwrap_or(0);
            let selection = Select::new()
                .with_prompt("Generation mode")
                .items(&items)
                .default(default)
                .interact()
                .map_err(input_error)?;

            let Some(mode) = GenerationMode::ALL.get(selection).copied() else {
                break;
            };
            bench.set_mode(mode);

            if mode.requires_text() {
                let text: String = Input::new()
                    .with_prompt("Requirements")
                    .allow_empty(true)
                    .interact_text()
                    .map_err(input_error)?;
                bench.set_text(text);
            } else {
                let codes: Vec<&str> = DataGenerationSubtype::ALL.iter().map(|s| s.code()).collect();
                let current = DataGenerationSubtype::ALL
                    .iter()
                    .position(|s| *s == bench.subtype())
                    .unwrap_or(0);
                let picked = Select::new()
                    .with_prompt("Dataset")
                    .items(&codes)
                    .default(current)
                    .interact()
                    .map_err(input_error)?;
                if let Some(subtype) = DataGenerationSubtype::ALL.get(picked) {
                    bench.set_subtype(*subtype);
                }
                let raw: String = Input::new()
                    .with_prompt("Number of records")
                    .default(bench.count().to_string())
                    .interact_text()
                    .map_err(input_error)?;
                bench.set_count_raw(&raw);
            }

            eprintln!("{}", status_line(&SubmissionState::Submitting));
            runtime.block_on(bench.submit());
            submissions += 1;
            eprintln!("{}", status_line(bench.state()));

            let state = bench.state().clone();
            if bench.inline_result().is_some() {
                println!("{}", format_outcome_text(&state, None, None));
                let wants_copy = Confirm::new()
                    .with_prompt("Copy result to clipboard?")
                    .default(true)
                    .interact()
                    .map_err(input_error)?;
                let copied: Option<CopyResult> = if wants_copy {
                    bench.copy_result(Instant::now())
                } else {
                    None
                };
                if let Some(result) = &copied {
                    eprintln!("{}", format_copy_result(result));
                }
            } else if !matches!(state, SubmissionState::Failed(_)) {
                println!("{}", format_outcome_text(&state, bench.last_saved(), None));
            }
        }

        Ok(format!("Session ended after {} submission(s)", submissions))
    }
}

fn build_runtime() -> Result<tokio::runtime::Runtime, FlexgenError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(FlexgenError::IoError)
}

fn input_error(e: dialoguer::Error) -> FlexgenError {
    FlexgenError::InputError(format!("Failed to get user input: {}", e))
}

/// Requirement text from `--text` or `--text-file`; empty when neither is given.
fn read_requirement(text: Option<&str>, text_file: Option<&Path>) -> Result<String, FlexgenError> {
    match (text, text_file) {
        (Some(text), _) => Ok(text.to_string()),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
            FlexgenError::InputError(format!("Failed to read {}: {}", path.display(), e))
        }),
        (None, None) => Ok(String::new()),
    }
}
