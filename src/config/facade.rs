//! Config loader facade: the only entry point for building a [`FlexgenConfig`].

use super::{merge, sources, FlexgenConfig};
use crate::error::FlexgenError;
use config::File;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load layered configuration for a workspace.
    pub fn load(workspace_root: &Path) -> Result<FlexgenConfig, FlexgenError> {
        let builder = merge::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = sources::environment::add_to_builder(builder);
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Load a single explicit file on top of the defaults.
    pub fn load_from_file(path: &Path) -> Result<FlexgenConfig, FlexgenError> {
        if !path.exists() {
            return Err(FlexgenError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge::builder_with_defaults()?.add_source(File::from(path));
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Path of the global config file, if a home directory is known.
    pub fn global_config_path() -> Option<PathBuf> {
        sources::global_file::global_config_path()
    }

    pub fn default() -> FlexgenConfig {
        FlexgenConfig::default()
    }
}
