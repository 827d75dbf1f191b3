//! Unified error handling for slirc-bot.
//!
//! Three families live here: errors returned by handler callbacks (logged
//! per invocation, never propagated), errors raised while registering a
//! handler (fail fast, before any dispatch), and the terminal result of a
//! connection run.

use slirc_proto::{ProtocolError, TransportError};
use thiserror::Error;

// ============================================================================
// Handler Errors (callback execution)
// ============================================================================

/// Errors that can occur inside a handler callback.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough parameters for {0}")]
    MissingArgument(&'static str),

    #[error("message has no sender nickname")]
    NoSender,

    #[error("no target to reply to")]
    NoReplyTarget,

    #[error("send error: {0}")]
    Send(#[from] TransportError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingArgument(_) => "missing_argument",
            Self::NoSender => "no_sender",
            Self::NoReplyTarget => "no_reply_target",
            Self::Send(_) => "send_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type for handler callbacks.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Handler Configuration Errors (registration time)
// ============================================================================

/// A handler's tables are inconsistent. Raised by registration, never by
/// dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerConfigError {
    #[error("handler {handler}: command {command} routes to unknown method {method}")]
    UnknownMethod {
        handler: String,
        command: String,
        method: String,
    },

    #[error("handler {handler}: {command:?} is not a routable command")]
    InvalidCommand { handler: String, command: String },

    #[error("handler {handler}: command map is empty")]
    EmptyCommandMap { handler: String },

    #[error("handler {handler}: trigger {trigger} has no action {action}")]
    UnknownAction {
        handler: String,
        trigger: String,
        action: String,
    },

    #[error("handler {handler}: trigger {trigger:?} is not a single word")]
    InvalidTrigger { handler: String, trigger: String },
}

// ============================================================================
// Engine Errors (connection lifecycle)
// ============================================================================

/// Why a connection run ended.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("connecting to {addr} timed out after {secs}s")]
    ConnectTimeout { addr: String, secs: u64 },

    #[error("registration did not complete within {secs}s")]
    RegistrationTimeout { secs: u64 },

    #[error("no traffic from the server for {idle_secs}s")]
    PingTimeout { idle_secs: u64 },
}

impl EngineError {
    /// Get a static error code string for log labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Protocol(_) => "protocol",
            Self::ConnectTimeout { .. } => "connect_timeout",
            Self::RegistrationTimeout { .. } => "registration_timeout",
            Self::PingTimeout { .. } => "ping_timeout",
        }
    }
}
