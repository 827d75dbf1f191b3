//! # slirc-proto
//!
//! Client-side IRC protocol building blocks.
//!
//! ## Features
//!
//! - Tolerant parsing of raw IRC lines into [`Message`] values, including
//!   CTCP payload unwrapping
//! - Source (`nick!user@host`) decomposition that never fails
//! - An outbound line builder following the trailing-argument rules
//! - Nickname rotation for nickname-in-use collisions
//! - mIRC text formatting helpers
//! - Optional Tokio integration: a CRLF line codec and a TCP/TLS transport
//!   with independent read and write flows
//!
//! ## Quick Start
//!
//! ### Parsing IRC lines
//!
//! ```rust
//! use slirc_proto::Message;
//!
//! let msg: Message = ":nick!user@host PRIVMSG #chan :hello".parse().unwrap();
//! assert_eq!(msg.source.name.as_deref(), Some("nick"));
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.dst.as_deref(), Some("#chan"));
//! assert_eq!(msg.args, vec!["hello"]);
//! ```
//!
//! ### Building outbound lines
//!
//! ```rust
//! use slirc_proto::encode;
//!
//! assert_eq!(encode::privmsg("#rust", "hi there"), "PRIVMSG #rust :hi there");
//! assert_eq!(encode::line(None, "JOIN", &["#rust"]), "JOIN #rust");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod colors;
pub mod command;
pub mod ctcp;
pub mod encode;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod nick;
pub mod response;
pub mod source;
#[cfg(feature = "tokio")]
pub mod transport;

pub use self::colors::{Color, FormattedStringExt, Style};
pub use self::ctcp::{Ctcp, CtcpKind};
pub use self::error::{MessageParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::Message;
pub use self::nick::{NickExt, NickRotation};
pub use self::response::Response;
pub use self::source::Source;
#[cfg(feature = "tokio")]
pub use self::transport::{IncomingLines, LineSender, OutgoingLines, Transport, TransportError};
