//! Client - the handle given to every handler callback.
//!
//! A `Client` is a cheap clone over shared connection state: the outbound
//! line queue, the current nickname, the observable connection state and
//! the shutdown token. Every send only enqueues; the transport's writer
//! puts the line on the wire.

use std::sync::Arc;

use parking_lot::RwLock;
use slirc_proto::{CtcpKind, LineSender, TransportError, encode};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::BotSettings;
use crate::network::ConnectionState;

/// Outbound handle and shared state of one connection.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    settings: Arc<BotSettings>,
    sender: LineSender,
    nick: RwLock<String>,
    state: watch::Sender<ConnectionState>,
    shutdown: CancellationToken,
}

impl Client {
    pub(crate) fn new(settings: Arc<BotSettings>, sender: LineSender) -> Self {
        let nick = RwLock::new(settings.nick.clone());
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(Inner {
                settings,
                sender,
                nick,
                state,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Sending
    // ------------------------------------------------------------------------

    /// Enqueue a raw line. It is cut to the first line and to 510 bytes.
    pub fn send_raw(&self, line: impl AsRef<str>) -> Result<(), TransportError> {
        let line = line.as_ref();
        debug!("-> {}", line);
        self.inner.sender.send(line)
    }

    /// Build and enqueue `<command> <args...>`.
    pub fn cmd(&self, command: &str, args: &[&str]) -> Result<(), TransportError> {
        self.send_raw(encode::line(None, command, args))
    }

    pub fn privmsg(&self, target: &str, text: &str) -> Result<(), TransportError> {
        self.send_raw(encode::privmsg(target, text))
    }

    pub fn notice(&self, target: &str, text: &str) -> Result<(), TransportError> {
        self.send_raw(encode::notice(target, text))
    }

    /// Reply to a CTCP request; replies travel by NOTICE.
    pub fn ctcp_reply(
        &self,
        target: &str,
        kind: CtcpKind,
        params: Option<&str>,
    ) -> Result<(), TransportError> {
        self.send_raw(encode::ctcp_reply(target, kind, params))
    }

    /// `/me` towards `target`.
    pub fn action(&self, target: &str, text: &str) -> Result<(), TransportError> {
        self.send_raw(encode::action(target, text))
    }

    pub fn join(&self, channel: &str) -> Result<(), TransportError> {
        self.send_raw(encode::join(channel))
    }

    pub fn part(&self, channel: &str, reason: Option<&str>) -> Result<(), TransportError> {
        self.send_raw(encode::part(channel, reason))
    }

    /// Request a nickname change. The current nickname follows once the
    /// server confirms it.
    pub fn set_nick(&self, nick: &str) -> Result<(), TransportError> {
        self.send_raw(encode::nick(nick))
    }

    /// Send the configured quit message and stop the connection.
    ///
    /// The line is queued before shutdown starts, so the writer flushes it
    /// before closing the socket.
    pub fn quit(&self) -> Result<(), TransportError> {
        let message = self.inner.settings.quit_message.clone();
        self.quit_with(&message)
    }

    /// Like [`Client::quit`] with a custom message.
    pub fn quit_with(&self, message: &str) -> Result<(), TransportError> {
        let result = self.send_raw(encode::quit(Some(message)));
        self.inner.shutdown.cancel();
        result
    }

    // ------------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------------

    /// Current nickname: the configured one until the server confirms
    /// another.
    pub fn nick(&self) -> String {
        self.inner.nick.read().clone()
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Subscribe to connection state changes.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    pub fn settings(&self) -> &BotSettings {
        &self.inner.settings
    }

    /// True once [`Client::quit`] was called.
    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    pub(crate) fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown.clone()
    }

    pub(crate) fn set_current_nick(&self, nick: &str) {
        *self.inner.nick.write() = nick.to_owned();
    }

    pub(crate) fn set_state(&self, state: ConnectionState) {
        self.inner.state.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("addr", &self.inner.settings.addr())
            .field("nick", &*self.inner.nick.read())
            .field("state", &self.state())
            .finish()
    }
}
