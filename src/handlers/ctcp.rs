//! CTCP handler: answers VERSION, SOURCE, TIME and PING requests.

use std::sync::Arc;

use slirc_proto::command::{CTCP_PING, CTCP_SOURCE, CTCP_TIME, CTCP_VERSION};
use slirc_proto::{CtcpKind, Message};

use super::core::{CommandMap, Handler, HandlerFuture, MethodTable};
use crate::client::Client;
use crate::error::HandlerError;

/// Replies to common CTCP queries by NOTICE to the requester.
pub struct CtcpHandler {
    version: String,
    source_url: String,
}

impl CtcpHandler {
    pub fn new(version: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            source_url: source_url.into(),
        }
    }

    fn version(this: Arc<Self>, client: Client, msg: Arc<Message>) -> HandlerFuture {
        Box::pin(async move {
            let nick = msg.sender_nick().ok_or(HandlerError::NoSender)?;
            client.ctcp_reply(nick, CtcpKind::Version, Some(&this.version))?;
            Ok(())
        })
    }

    fn source(this: Arc<Self>, client: Client, msg: Arc<Message>) -> HandlerFuture {
        Box::pin(async move {
            let nick = msg.sender_nick().ok_or(HandlerError::NoSender)?;
            client.ctcp_reply(nick, CtcpKind::Source, Some(&this.source_url))?;
            client.ctcp_reply(nick, CtcpKind::Source, None)?;
            Ok(())
        })
    }

    fn time(_this: Arc<Self>, client: Client, msg: Arc<Message>) -> HandlerFuture {
        Box::pin(async move {
            let nick = msg.sender_nick().ok_or(HandlerError::NoSender)?;
            let now = chrono::Local::now()
                .format("%a %b %d %I:%M:%S%p %Y %Z")
                .to_string();
            client.ctcp_reply(nick, CtcpKind::Time, Some(now.trim()))?;
            Ok(())
        })
    }

    fn ping(_this: Arc<Self>, client: Client, msg: Arc<Message>) -> HandlerFuture {
        Box::pin(async move {
            let nick = msg.sender_nick().ok_or(HandlerError::NoSender)?;
            let echo = msg.args.join(" ");
            let echo = (!echo.is_empty()).then_some(echo.as_str());
            client.ctcp_reply(nick, CtcpKind::Ping, echo)?;
            Ok(())
        })
    }
}

impl Default for CtcpHandler {
    fn default() -> Self {
        Self::new(
            format!(
                "{}:{}:{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS
            ),
            env!("CARGO_PKG_REPOSITORY"),
        )
    }
}

impl Handler for CtcpHandler {
    fn name(&self) -> &str {
        "ctcp"
    }

    fn commands(&self) -> CommandMap {
        CommandMap::new()
            .on(CTCP_VERSION, "version")
            .on(CTCP_SOURCE, "source")
            .on(CTCP_TIME, "time")
            .on(CTCP_PING, "ping")
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::new()
            .method("version", Self::version)
            .method("source", Self::source)
            .method("time", Self::time)
            .method("ping", Self::ping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::{client, drain};
    use crate::handlers::Registry;

    async fn replies(line: &str) -> Vec<String> {
        let (client, mut out) = client();
        let registry = Registry::new(4);
        registry
            .add_handler(CtcpHandler::new("slirc-bot:1.0:linux", "https://example.net/src"))
            .unwrap();
        registry.dispatch(&client, Arc::new(line.parse().unwrap()));
        registry.wait_idle().await;
        drain(&mut out)
    }

    #[tokio::test]
    async fn test_version() {
        assert_eq!(
            replies(":alice!a@h PRIVMSG bot :\x01VERSION\x01").await,
            vec!["NOTICE alice :\x01VERSION slirc-bot:1.0:linux\x01"]
        );
    }

    #[tokio::test]
    async fn test_source_sends_terminator() {
        assert_eq!(
            replies(":alice!a@h PRIVMSG bot :\x01SOURCE\x01").await,
            vec![
                "NOTICE alice :\x01SOURCE https://example.net/src\x01",
                "NOTICE alice :\x01SOURCE\x01",
            ]
        );
    }

    #[tokio::test]
    async fn test_ping_echoes_arguments() {
        assert_eq!(
            replies(":alice!a@h PRIVMSG bot :\x01PING 1700000000 42\x01").await,
            vec!["NOTICE alice :\x01PING 1700000000 42\x01"]
        );
    }

    #[tokio::test]
    async fn test_time_replies() {
        let lines = replies(":alice!a@h PRIVMSG bot :\x01TIME\x01").await;
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("NOTICE alice :\x01TIME "));
    }

    #[test]
    fn test_default_version_string() {
        let handler = CtcpHandler::default();
        assert!(handler.version.starts_with("slirc-bot:"));
        assert!(handler.version.ends_with(std::env::consts::OS));
    }
}
