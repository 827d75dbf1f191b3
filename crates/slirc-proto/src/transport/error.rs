//! Transport error types.

use thiserror::Error;

use crate::error::ProtocolError;

/// Errors that end a transport, or prevent it from starting.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The TCP connection could not be established.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// `host:port` that was dialed.
        addr: String,
        /// The underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// The host name is not usable as a TLS server name.
    #[error("invalid TLS server name: {0}")]
    InvalidServerName(String),

    /// The TLS handshake failed.
    #[error("TLS handshake failed: {0}")]
    Tls(#[source] std::io::Error),

    /// An I/O error occurred on an established connection.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A protocol error occurred.
    #[error("transport protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The peer closed the connection.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// The outbound queue is gone; the transport has stopped.
    #[error("outbound queue closed")]
    QueueClosed,
}
