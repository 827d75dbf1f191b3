//! Network module.
//!
//! Contains the connection controller: connect, register, keepalive and
//! teardown for one IRC session.

pub(crate) mod connection;

pub use connection::ConnectionState;
