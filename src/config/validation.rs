//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use slirc_proto::NickExt;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("at least one [[server]] block is required")]
    NoServers,
    #[error("server {0}: host is required")]
    MissingHost(usize),
    #[error("server {server}: invalid nickname '{nick}'")]
    InvalidNick { server: usize, nick: String },
    #[error("server {0}: port must be greater than 0")]
    InvalidPort(usize),
    #[error("server {server}: trigger must be one non-whitespace character, got '{trigger}'")]
    InvalidTrigger { server: usize, trigger: String },
    #[error("server {server}: '{channel}' is not a channel name")]
    InvalidChannel { server: usize, channel: String },
    #[error("server {0}: keepalive_secs must be greater than 0")]
    ZeroKeepalive(usize),
    #[error("server {0}: max_concurrent_handlers must be greater than 0")]
    ZeroConcurrency(usize),
    #[error("server {0}: reconnect.delay_secs must be greater than 0")]
    ZeroReconnectDelay(usize),
}

fn is_channel_name(name: &str) -> bool {
    name.len() > 1
        && name.starts_with(['#', '&', '+', '!'])
        && !name.contains([' ', ',', '\x07'])
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.servers.is_empty() {
        errors.push(ValidationError::NoServers);
    }

    for (index, server) in config.servers.iter().enumerate() {
        if server.host.trim().is_empty() {
            errors.push(ValidationError::MissingHost(index));
        }
        if !server.nick.is_valid_nick() {
            errors.push(ValidationError::InvalidNick {
                server: index,
                nick: server.nick.clone(),
            });
        }
        if server.port == 0 {
            errors.push(ValidationError::InvalidPort(index));
        }

        let mut trigger = server.trigger.chars();
        let valid_trigger = matches!(
            (trigger.next(), trigger.next()),
            (Some(c), None) if !c.is_whitespace()
        );
        if !valid_trigger {
            errors.push(ValidationError::InvalidTrigger {
                server: index,
                trigger: server.trigger.clone(),
            });
        }

        for channel in &server.channels {
            if !is_channel_name(channel) {
                errors.push(ValidationError::InvalidChannel {
                    server: index,
                    channel: channel.clone(),
                });
            }
        }

        if server.keepalive_secs == 0 {
            errors.push(ValidationError::ZeroKeepalive(index));
        }
        if server.max_concurrent_handlers == 0 {
            errors.push(ValidationError::ZeroConcurrency(index));
        }
        if server.reconnect.enabled && server.reconnect.delay_secs == 0 {
            errors.push(ValidationError::ZeroReconnectDelay(index));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
