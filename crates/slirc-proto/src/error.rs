//! Error types for the IRC protocol library.
//!
//! This module defines error types for protocol-level errors and
//! message parsing failures.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse an IRC message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The invalid message string.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },

    /// Every nickname derivable from the base was rejected by the server.
    #[error("no free nickname left for base {base:?} after {attempts} attempts")]
    NicknamesExhausted {
        /// The configured base nickname.
        base: String,
        /// Number of alternative nicknames tried.
        attempts: u32,
    },
}

impl ProtocolError {
    /// Wrap a parse failure together with the line that caused it.
    pub fn invalid_message(string: impl Into<String>, cause: MessageParseError) -> Self {
        Self::InvalidMessage {
            string: string.into(),
            cause,
        }
    }
}

/// Errors encountered when parsing IRC messages.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty.
    #[error("empty message")]
    EmptyMessage,

    /// A prefix was present but no command followed it.
    #[error("missing command")]
    MissingCommand,

    /// PRIVMSG or NOTICE without a destination.
    #[error("{command} without a destination")]
    MissingDestination {
        /// The command lacking a destination.
        command: String,
    },
}
