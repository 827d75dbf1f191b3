//! IRC command names and the recognized command vocabulary.
//!
//! Parsed messages carry their command as an upper-cased string: an IRC
//! verb, a three-digit numeric, or a synthesized `CTCP_<SUBCOMMAND>` name
//! for CTCP payloads. This module names the commands a client engine deals
//! with and answers whether a command belongs to the known vocabulary.

use crate::ctcp::CtcpKind;
use crate::response::Response;

/// Private message to a user or channel.
pub const PRIVMSG: &str = "PRIVMSG";
/// Notice to a user or channel.
pub const NOTICE: &str = "NOTICE";
/// Join a channel.
pub const JOIN: &str = "JOIN";
/// Leave a channel.
pub const PART: &str = "PART";
/// Disconnect from the server.
pub const QUIT: &str = "QUIT";
/// Set or change a nickname.
pub const NICK: &str = "NICK";
/// Registration: user name and real name.
pub const USER: &str = "USER";
/// Connection password.
pub const PASS: &str = "PASS";
/// Keepalive probe.
pub const PING: &str = "PING";
/// Keepalive answer.
pub const PONG: &str = "PONG";
/// User or channel mode change.
pub const MODE: &str = "MODE";
/// Channel topic.
pub const TOPIC: &str = "TOPIC";
/// Removal from a channel.
pub const KICK: &str = "KICK";
/// Channel invitation.
pub const INVITE: &str = "INVITE";
/// Fatal server error, sent before the server closes the link.
pub const ERROR: &str = "ERROR";

/// Prefix of synthesized CTCP commands.
pub const CTCP_PREFIX: &str = "CTCP_";
/// CTCP VERSION request.
pub const CTCP_VERSION: &str = "CTCP_VERSION";
/// CTCP SOURCE request.
pub const CTCP_SOURCE: &str = "CTCP_SOURCE";
/// CTCP TIME request.
pub const CTCP_TIME: &str = "CTCP_TIME";
/// CTCP PING request.
pub const CTCP_PING: &str = "CTCP_PING";
/// CTCP ACTION (`/me`).
pub const CTCP_ACTION: &str = "CTCP_ACTION";

/// Pseudo-command under which handlers receive commands outside the
/// known vocabulary.
pub const UNKNOWN_CODE: &str = "UNKNOWN_CODE";

const VERBS: &[&str] = &[
    PRIVMSG, NOTICE, JOIN, PART, QUIT, NICK, USER, PASS, PING, PONG, MODE, TOPIC, KICK, INVITE,
    ERROR,
];

/// True for a three-digit numeric reply such as `001`.
pub fn is_numeric(command: &str) -> bool {
    command.len() == 3 && command.bytes().all(|b| b.is_ascii_digit())
}

/// True for a synthesized `CTCP_*` command.
pub fn is_ctcp(command: &str) -> bool {
    command
        .strip_prefix(CTCP_PREFIX)
        .is_some_and(|sub| !sub.is_empty())
}

/// True when the command belongs to the recognized vocabulary: a core
/// verb, a catalogued numeric, or a known CTCP subcommand.
///
/// ```
/// use slirc_proto::command;
///
/// assert!(command::is_known("PRIVMSG"));
/// assert!(command::is_known("433"));
/// assert!(command::is_known("CTCP_VERSION"));
/// assert!(!command::is_known("WALLOPS"));
/// assert!(!command::is_known("CTCP_BOGUS"));
/// ```
pub fn is_known(command: &str) -> bool {
    if VERBS.contains(&command) {
        return true;
    }
    if is_numeric(command) {
        return command.parse::<Response>().is_ok();
    }
    match command.strip_prefix(CTCP_PREFIX) {
        Some(sub) => !matches!(CtcpKind::parse(sub), CtcpKind::Unknown(_)),
        None => false,
    }
}

/// True when `command` can appear in a handler's command map: an
/// upper-case verb, a numeric, a `CTCP_*` name, or [`UNKNOWN_CODE`].
pub fn is_routable(command: &str) -> bool {
    if command == UNKNOWN_CODE || is_numeric(command) {
        return true;
    }
    let verb = command.strip_prefix(CTCP_PREFIX).unwrap_or(command);
    !verb.is_empty() && verb.bytes().all(|b| b.is_ascii_uppercase())
}
