//! Encoder configuration from `gifanim.toml`

pub mod loader;
pub mod schema;

pub use loader::{find_config, find_config_from, load_config, parse_config, ConfigError, CONFIG_FILE};
pub use schema::*;
