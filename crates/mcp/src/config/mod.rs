//! Configuration for the Cordra MCP adapter.
//!
//! Settings are read once at startup from an optional JSON file and from
//! `CORDRA_*` environment variables (which take precedence), then validated
//! eagerly into an immutable [`CordraConfig`].

mod io;
mod model;
mod validation;

pub use io::{CONFIG_PATH_ENV, default_config_path, load_config, load_config_from_path};
pub use model::{ConfigError, ConfigFile, CordraConfig, LogLevel};
pub use validation::{ValidationError, validate_config};
