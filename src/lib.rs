//! slirc-bot - Straylight IRC bot engine.
//!
//! An async IRC client engine built on `slirc-proto`: connection
//! lifecycle (registration, nickname collisions, keepalive), concurrent
//! handler dispatch, and prefix-triggered commands with access rights.
//!
//! ```ignore
//! use slirc_bot::{Bot, BotSettings, HelloCommand};
//!
//! let mut settings = BotSettings::new("irc.libera.chat", 6697, "slircbot");
//! settings.tls = true;
//! settings.channels = vec!["#slirc".into()];
//!
//! let bot = Bot::new(settings);
//! bot.add_command_handler(HelloCommand)?;
//! bot.run().await?;
//! ```

pub mod bot;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod network;
pub mod telemetry;

pub use bot::Bot;
pub use client::Client;
pub use config::{BotSettings, Config};
pub use error::{EngineError, HandlerConfigError, HandlerError, HandlerResult};
pub use handlers::{
    CommandHandler, CommandMap, EventKind, EventKinds, Handler, HandlerFuture, HelloCommand,
    Invocation, MethodTable, Registry, Rights, TriggerTable,
};
pub use network::ConnectionState;
