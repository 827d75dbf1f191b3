//! CTCP (Client-to-Client Protocol) payloads.
//!
//! CTCP requests and replies travel inside PRIVMSG and NOTICE bodies wrapped
//! in `\x01` delimiters. A body only counts as CTCP when it both starts and
//! ends with the delimiter and carries a non-blank sub-command.
//!
//! # Reference
//! - CTCP specification: <https://modern.ircdocs.horse/ctcp.html>
//!
//! # Example
//!
//! ```
//! use slirc_proto::ctcp::{Ctcp, CtcpKind};
//!
//! let ctcp = Ctcp::parse("\x01PING 1234 5678\x01").unwrap();
//! assert_eq!(ctcp.kind, CtcpKind::Ping);
//! assert_eq!(ctcp.args().collect::<Vec<_>>(), ["1234", "5678"]);
//! assert_eq!(ctcp.command_name(), "CTCP_PING");
//!
//! assert_eq!(Ctcp::new(CtcpKind::Version, Some("bot:1.0")).to_string(), "\x01VERSION bot:1.0\x01");
//! ```

use std::fmt;

use crate::command::CTCP_PREFIX;

/// The CTCP delimiter character (`\x01`).
pub const CTCP_DELIM: char = '\x01';

/// Known CTCP sub-commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CtcpKind {
    /// ACTION - describes an action performed by the user (`/me`).
    Action,
    /// VERSION - requests client version information.
    Version,
    /// PING - measures round-trip latency.
    Ping,
    /// TIME - requests local time from the client.
    Time,
    /// USERINFO - requests user-defined information.
    Userinfo,
    /// CLIENTINFO - requests list of supported CTCP commands.
    Clientinfo,
    /// SOURCE - requests source code location.
    Source,
    /// FINGER - requests user information (legacy).
    Finger,
    /// DCC - Direct Client-to-Client connection setup.
    Dcc,
    /// Any other sub-command, stored upper-cased.
    Unknown(String),
}

impl CtcpKind {
    /// Parse a sub-command name, case-insensitively.
    pub fn parse(name: &str) -> Self {
        let upper = name.to_ascii_uppercase();
        match upper.as_str() {
            "ACTION" => Self::Action,
            "VERSION" => Self::Version,
            "PING" => Self::Ping,
            "TIME" => Self::Time,
            "USERINFO" => Self::Userinfo,
            "CLIENTINFO" => Self::Clientinfo,
            "SOURCE" => Self::Source,
            "FINGER" => Self::Finger,
            "DCC" => Self::Dcc,
            _ => Self::Unknown(upper),
        }
    }

    /// The canonical upper-case name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Action => "ACTION",
            Self::Version => "VERSION",
            Self::Ping => "PING",
            Self::Time => "TIME",
            Self::Userinfo => "USERINFO",
            Self::Clientinfo => "CLIENTINFO",
            Self::Source => "SOURCE",
            Self::Finger => "FINGER",
            Self::Dcc => "DCC",
            Self::Unknown(s) => s,
        }
    }
}

impl fmt::Display for CtcpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CTCP payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// The sub-command.
    pub kind: CtcpKind,
    /// Text following the sub-command, if any.
    pub params: Option<&'a str>,
}

impl<'a> Ctcp<'a> {
    /// Build a payload from its parts.
    pub fn new(kind: CtcpKind, params: Option<&'a str>) -> Self {
        Self { kind, params }
    }

    /// Unwrap a PRIVMSG/NOTICE body.
    ///
    /// Returns `None` unless the body starts and ends with `\x01` and the
    /// text between them is not blank.
    pub fn parse(text: &'a str) -> Option<Self> {
        let inner = text.strip_prefix(CTCP_DELIM)?.strip_suffix(CTCP_DELIM)?;
        let inner = inner.trim_start();
        if inner.trim_end().is_empty() {
            return None;
        }

        let (command, params) = match inner.split_once(char::is_whitespace) {
            Some((command, rest)) => {
                let rest = rest.trim();
                (command, (!rest.is_empty()).then_some(rest))
            }
            None => (inner, None),
        };

        Some(Self {
            kind: CtcpKind::parse(command),
            params,
        })
    }

    /// True when the body is wrapped in CTCP delimiters.
    #[inline]
    pub fn is_ctcp(text: &str) -> bool {
        Ctcp::parse(text).is_some()
    }

    /// Whitespace-separated parameter tokens.
    pub fn args(&self) -> impl Iterator<Item = &'a str> {
        self.params.unwrap_or_default().split_whitespace()
    }

    /// The synthesized command name, e.g. `CTCP_VERSION`.
    pub fn command_name(&self) -> String {
        format!("{CTCP_PREFIX}{}", self.kind)
    }
}

impl fmt::Display for Ctcp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CTCP_DELIM}{}", self.kind)?;
        if let Some(params) = self.params {
            write!(f, " {params}")?;
        }
        write!(f, "{CTCP_DELIM}")
    }
}
