//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: TOML structures (Config, ServerConfig, ReconnectConfig, RightsConfig)
//! - [`settings`]: runtime engine settings derived from a server block
//! - [`validation`]: startup checks collecting every problem at once
//! - `defaults`: serde default functions

mod defaults;
mod settings;
mod types;
mod validation;

pub use settings::BotSettings;
pub use types::{Config, ConfigError, ReconnectConfig, RightsConfig, ServerConfig};
pub use validation::{ValidationError, validate};
