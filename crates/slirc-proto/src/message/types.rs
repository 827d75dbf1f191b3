use crate::command;
use crate::response::Response;
use crate::source::Source;

/// A parsed inbound IRC line.
///
/// `command` is always upper-case: an IRC verb, a three-digit numeric, or a
/// synthesized `CTCP_<SUBCOMMAND>` for CTCP payloads in PRIVMSG/NOTICE.
/// For PRIVMSG and NOTICE the destination is split out into `dst` and is
/// not repeated in `args`.
///
/// # Example
///
/// ```
/// use slirc_proto::Message;
///
/// let msg: Message = ":a!b@c PRIVMSG bot :\x01VERSION\x01".parse().unwrap();
/// assert_eq!(msg.command, "CTCP_VERSION");
/// assert!(msg.args.is_empty());
/// assert_eq!(msg.dst.as_deref(), Some("bot"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// The line as received, without its terminator.
    pub raw: String,
    /// Origin of the message. Empty when the line had no prefix.
    pub source: Source,
    /// Upper-cased command.
    pub command: String,
    /// Positional arguments; a trailing argument may contain spaces.
    pub args: Vec<String>,
    /// Destination of a PRIVMSG or NOTICE.
    pub dst: Option<String>,
    /// Set when the command token is neither alphabetic nor a three-digit
    /// numeric.
    pub erroneous: bool,
}

impl Message {
    /// The argument at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// The last argument, which carries the body of PRIVMSG and NOTICE.
    pub fn text(&self) -> Option<&str> {
        self.args.last().map(String::as_str)
    }

    /// Nickname of the sender, when the message comes from a user.
    pub fn sender_nick(&self) -> Option<&str> {
        self.source.nick()
    }

    /// True for synthesized `CTCP_*` commands.
    pub fn is_ctcp(&self) -> bool {
        command::is_ctcp(&self.command)
    }

    /// True for three-digit numeric replies.
    pub fn is_numeric(&self) -> bool {
        command::is_numeric(&self.command)
    }

    /// The catalogued numeric reply, if this is one.
    pub fn response(&self) -> Option<Response> {
        self.command.parse().ok()
    }

    /// True when the command is part of the recognized vocabulary.
    pub fn is_known(&self) -> bool {
        !self.erroneous && command::is_known(&self.command)
    }
}
