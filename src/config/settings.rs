//! Runtime settings for one connection.

use std::time::Duration;

use slirc_proto::nick::DEFAULT_NICK_MAX_LEN;

/// Everything the engine needs to run one connection.
///
/// Usually produced by [`ServerConfig::settings`](super::ServerConfig::settings);
/// [`BotSettings::new`] fills in the same defaults for programmatic use.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    /// Base nickname; collisions rotate from it.
    pub nick: String,
    pub username: String,
    pub realname: String,
    /// Joined in order once registered.
    pub channels: Vec<String>,
    /// Prefix character for command triggers.
    pub trigger: char,
    pub quit_message: String,
    /// Idle interval before a self-ping.
    pub keepalive: Duration,
    pub connect_timeout: Duration,
    pub registration_timeout: Duration,
    pub max_concurrent_handlers: usize,
    pub nick_max_len: usize,
}

impl BotSettings {
    pub fn new(host: impl Into<String>, port: u16, nick: impl Into<String>) -> Self {
        let nick = nick.into();
        Self {
            host: host.into(),
            port,
            tls: false,
            username: nick.clone(),
            nick,
            realname: super::defaults::default_realname(),
            channels: Vec::new(),
            trigger: '!',
            quit_message: super::defaults::default_quit_message(),
            keepalive: Duration::from_secs(super::defaults::default_keepalive_secs()),
            connect_timeout: Duration::from_secs(super::defaults::default_connect_timeout_secs()),
            registration_timeout: Duration::from_secs(
                super::defaults::default_registration_timeout_secs(),
            ),
            max_concurrent_handlers: super::defaults::default_max_concurrent_handlers(),
            nick_max_len: DEFAULT_NICK_MAX_LEN,
        }
    }

    /// `host:port`, for logs and errors.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
