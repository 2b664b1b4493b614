//! Environment source: FLEXGEN__SERVER__BASE_URL -> server.base_url

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("FLEXGEN")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
