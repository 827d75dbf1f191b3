//! Message source (prefix) decomposition.
//!
//! The source identifies the origin of a message: either a server host name
//! or a user's `nick!user@host` mask. Some networks also send a legacy mode
//! segment, as in `nick!mode=user@host`.
//!
//! Parsing is lenient and never fails. Absent segments are `None`.

use std::fmt;

/// Origin of an IRC message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Source {
    /// The prefix text as received, without the leading `:`.
    pub raw: String,
    /// Nickname, or server host for server-originated messages.
    pub name: Option<String>,
    /// Legacy user mode segment (`nick!mode=user@host`).
    pub mode: Option<String>,
    /// User (ident) name.
    pub user: Option<String>,
    /// Host name.
    pub host: Option<String>,
}

fn segment(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}

impl Source {
    /// Decompose a prefix string. A leading `:` is ignored.
    ///
    /// ```
    /// use slirc_proto::Source;
    ///
    /// let source = Source::parse("nick!~user@host.example");
    /// assert_eq!(source.name.as_deref(), Some("nick"));
    /// assert_eq!(source.user.as_deref(), Some("~user"));
    /// assert_eq!(source.host.as_deref(), Some("host.example"));
    /// assert_eq!(source.mode, None);
    /// ```
    pub fn parse(prefix: &str) -> Self {
        let raw = prefix.strip_prefix(':').unwrap_or(prefix);

        let (rest, host) = match raw.split_once('@') {
            Some((rest, host)) => (rest, segment(host)),
            None => (raw, None),
        };

        let (name, mode, user) = match rest.split_once('!') {
            Some((name, ident)) => match ident.split_once('=') {
                Some((mode, user)) => (segment(name), segment(mode), segment(user)),
                None => (segment(name), None, segment(ident)),
            },
            None => (segment(rest), None, None),
        };

        Self {
            raw: raw.to_owned(),
            name,
            mode,
            user,
            host,
        }
    }

    /// True when no prefix was present.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// True for a bare host name containing a dot, the shape servers use.
    pub fn is_server(&self) -> bool {
        self.user.is_none()
            && self.host.is_none()
            && self.name.as_deref().is_some_and(|n| n.contains('.'))
    }

    /// The nickname, when the source is a user.
    pub fn nick(&self) -> Option<&str> {
        if self.is_server() {
            None
        } else {
            self.name.as_deref()
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        Source::parse(s)
    }
}
