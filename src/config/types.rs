//! Core configuration types and loading.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::*;
use super::settings::BotSettings;
use super::validation::{ValidationError, validate};
use crate::handlers::{DenialPolicy, EventKind, Rights};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Bot configuration: one `[[server]]` block per network.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Fallback log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Networks to connect to.
    #[serde(default, rename = "server")]
    pub servers: Vec<ServerConfig>,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

/// One network the bot connects to.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Label used in logs. Defaults to the host.
    #[serde(default)]
    pub name: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub tls: bool,
    pub nick: String,
    /// Ident sent in `USER`. Defaults to the nickname.
    pub username: Option<String>,
    #[serde(default = "default_realname")]
    pub realname: String,
    /// Joined in this order after registration.
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default = "default_trigger")]
    pub trigger: String,
    #[serde(default = "default_quit_message")]
    pub quit_message: String,
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_registration_timeout_secs")]
    pub registration_timeout_secs: u64,
    #[serde(default = "default_max_concurrent_handlers")]
    pub max_concurrent_handlers: usize,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub rights: RightsConfig,
}

impl ServerConfig {
    /// Name for logs: the configured label, or the host.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.host
        } else {
            &self.name
        }
    }

    /// Engine settings for this network.
    pub fn settings(&self) -> BotSettings {
        let mut settings = BotSettings::new(&self.host, self.port, &self.nick);
        settings.tls = self.tls;
        settings.username = self.username.clone().unwrap_or_else(|| self.nick.clone());
        settings.realname = self.realname.clone();
        settings.channels = self.channels.clone();
        if let Some(trigger) = self.trigger.chars().next() {
            settings.trigger = trigger;
        }
        settings.quit_message = self.quit_message.clone();
        settings.keepalive = Duration::from_secs(self.keepalive_secs);
        settings.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        settings.registration_timeout = Duration::from_secs(self.registration_timeout_secs);
        settings.max_concurrent_handlers = self.max_concurrent_handlers;
        settings
    }

    /// Rights table built from `[server.rights]`.
    pub fn rights(&self) -> Rights {
        let policy = DenialPolicy::notify(self.rights.notify.iter().copied().collect());
        let mut rights = Rights::new().with_policy(policy);
        for (command, users) in &self.rights.commands {
            for (user, kinds) in users {
                rights = rights.allow(command, user, kinds.iter().copied().collect());
            }
        }
        rights
    }
}

/// Reconnection with exponential back-off.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_reconnect_delay_secs")]
    pub delay_secs: u64,
    #[serde(default = "default_reconnect_max_delay_secs")]
    pub max_delay_secs: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_secs: default_reconnect_delay_secs(),
            max_delay_secs: default_reconnect_max_delay_secs(),
        }
    }
}

impl ReconnectConfig {
    /// Delay before reconnect attempt `attempt` (0-based): doubles each
    /// time, capped at `max_delay_secs`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt.min(32)).unwrap_or(u64::MAX);
        let secs = self
            .delay_secs
            .saturating_mul(factor)
            .min(self.max_delay_secs.max(self.delay_secs));
        Duration::from_secs(secs)
    }
}

/// Per-command allow-lists.
///
/// ```toml
/// [server.rights]
/// notify = ["public", "private"]
/// [server.rights.commands.hello]
/// alice = ["public", "private"]
/// "*" = ["public"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RightsConfig {
    /// Event kinds for which a denied user gets a NOTICE.
    #[serde(default = "default_notify")]
    pub notify: Vec<EventKind>,
    /// command -> user (or `*`) -> permitted kinds.
    #[serde(default)]
    pub commands: HashMap<String, HashMap<String, Vec<EventKind>>>,
}

impl Default for RightsConfig {
    fn default() -> Self {
        Self {
            notify: default_notify(),
            commands: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::EventKinds;
    use std::io::Write;

    const FULL: &str = r##"
log_level = "debug"

[[server]]
name = "libera"
host = "irc.libera.chat"
port = 6697
tls = true
nick = "slircbot"
username = "slirc"
realname = "slirc bot"
channels = ["#slirc", "#bots"]
trigger = "?"
keepalive_secs = 90

[server.reconnect]
enabled = false
delay_secs = 5
max_delay_secs = 60

[server.rights]
notify = ["private"]
[server.rights.commands.hello]
alice = ["public", "private"]
"*" = ["public"]
"##;

    #[test]
    fn test_full_config_parses() {
        let config = Config::parse(FULL).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.servers.len(), 1);

        let server = &config.servers[0];
        assert_eq!(server.label(), "libera");
        assert!(!server.reconnect.enabled);

        let settings = server.settings();
        assert_eq!(settings.host, "irc.libera.chat");
        assert_eq!(settings.port, 6697);
        assert!(settings.tls);
        assert_eq!(settings.username, "slirc");
        assert_eq!(settings.channels, vec!["#slirc", "#bots"]);
        assert_eq!(settings.trigger, '?');
        assert_eq!(settings.keepalive, Duration::from_secs(90));
        assert_eq!(settings.quit_message, "I'll be back!");
    }

    #[test]
    fn test_defaults_apply() {
        let config = Config::parse(
            r#"
[[server]]
host = "irc.example.net"
nick = "bot"
"#,
        )
        .unwrap();
        assert_eq!(config.log_level, "info");

        let server = &config.servers[0];
        assert_eq!(server.label(), "irc.example.net");
        assert!(server.reconnect.enabled);

        let settings = server.settings();
        assert_eq!(settings.port, 6667);
        assert_eq!(settings.username, "bot");
        assert_eq!(settings.trigger, '!');
        assert_eq!(settings.keepalive, Duration::from_secs(180));
        assert_eq!(settings.connect_timeout, Duration::from_secs(30));
        assert_eq!(settings.registration_timeout, Duration::from_secs(60));
        assert_eq!(settings.max_concurrent_handlers, 64);
    }

    #[test]
    fn test_rights_from_config() {
        let config = Config::parse(FULL).unwrap();
        let rights = config.servers[0].rights();

        assert!(rights.permits("hello", "Alice", EventKind::Private));
        assert!(rights.permits("hello", "bob", EventKind::Public));
        assert!(!rights.permits("hello", "bob", EventKind::Private));
        assert!(rights.permits("other", "bob", EventKind::Notice));
        assert_eq!(rights.policy().notify, EventKinds::PRIVATE);
    }

    #[test]
    fn test_unknown_event_kind_is_parse_error() {
        let result = Config::parse(
            r#"
[[server]]
host = "irc.example.net"
nick = "bot"
[server.rights.commands.hello]
"*" = ["everywhere"]
"#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_no_servers_is_invalid() {
        let result = Config::parse("log_level = \"info\"\n");
        let Err(ConfigError::Invalid(errors)) = result else {
            panic!("expected validation failure");
        };
        assert!(matches!(errors[0], ValidationError::NoServers));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.servers[0].nick, "slircbot");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_reconnect_backoff_doubles_and_caps() {
        let reconnect = ReconnectConfig {
            enabled: true,
            delay_secs: 10,
            max_delay_secs: 300,
        };
        assert_eq!(reconnect.delay(0), Duration::from_secs(10));
        assert_eq!(reconnect.delay(1), Duration::from_secs(20));
        assert_eq!(reconnect.delay(4), Duration::from_secs(160));
        assert_eq!(reconnect.delay(5), Duration::from_secs(300));
        assert_eq!(reconnect.delay(80), Duration::from_secs(300));
    }
}
