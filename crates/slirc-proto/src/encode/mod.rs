//! Outbound line construction.
//!
//! Lines are built as `[:prefix ]COMMAND arg1 arg2 ...` without a line
//! terminator; the transport appends CRLF. The last argument is written in
//! trailing form (`:` prefixed) when it is empty, contains a space, or
//! itself starts with `:`. Message bodies (PRIVMSG, NOTICE, QUIT, the USER
//! real name) always use the trailing form.
//!
//! # Example
//!
//! ```
//! use slirc_proto::encode;
//!
//! assert_eq!(encode::line(None, "NICK", &["bot"]), "NICK bot");
//! assert_eq!(encode::line(Some("srv"), "PONG", &["srv", "a b"]), ":srv PONG srv :a b");
//! assert_eq!(encode::notice("nick", "\x01VERSION x\x01"), "NOTICE nick :\x01VERSION x\x01");
//! ```

use std::fmt::Write;

use crate::command::{JOIN, NICK, NOTICE, PART, PING, PONG, PRIVMSG, QUIT, USER};
use crate::ctcp::{Ctcp, CtcpKind};

/// Maximum line length on the wire, terminator included.
pub const MAX_LINE_LEN: usize = 512;

/// Maximum payload length before the CRLF terminator.
pub const MAX_PAYLOAD_LEN: usize = MAX_LINE_LEN - 2;

fn needs_trailing(arg: &str) -> bool {
    arg.is_empty() || arg.contains(' ') || arg.starts_with(':')
}

fn start(prefix: Option<&str>, command: &str) -> String {
    let mut out = String::with_capacity(64);
    if let Some(prefix) = prefix {
        let _ = write!(out, ":{prefix} ");
    }
    out.push_str(command);
    out
}

/// Build a line, putting the last argument in trailing form when needed.
pub fn line(prefix: Option<&str>, command: &str, args: &[&str]) -> String {
    let mut out = start(prefix, command);
    if let Some((last, middle)) = args.split_last() {
        for arg in middle {
            out.push(' ');
            out.push_str(arg);
        }
        out.push(' ');
        if needs_trailing(last) {
            out.push(':');
        }
        out.push_str(last);
    }
    out
}

/// Build a line whose final argument is always in trailing form.
pub fn line_with_trailing(prefix: Option<&str>, command: &str, params: &[&str], trailing: &str) -> String {
    let mut out = start(prefix, command);
    for param in params {
        out.push(' ');
        out.push_str(param);
    }
    out.push_str(" :");
    out.push_str(trailing);
    out
}

/// `PRIVMSG <target> :<text>`
pub fn privmsg(target: &str, text: &str) -> String {
    line_with_trailing(None, PRIVMSG, &[target], text)
}

/// `NOTICE <target> :<text>`
pub fn notice(target: &str, text: &str) -> String {
    line_with_trailing(None, NOTICE, &[target], text)
}

/// A CTCP request sent by PRIVMSG.
pub fn ctcp(target: &str, kind: CtcpKind, params: Option<&str>) -> String {
    privmsg(target, &Ctcp::new(kind, params).to_string())
}

/// A CTCP reply sent by NOTICE.
pub fn ctcp_reply(target: &str, kind: CtcpKind, params: Option<&str>) -> String {
    notice(target, &Ctcp::new(kind, params).to_string())
}

/// A CTCP ACTION (`/me`).
pub fn action(target: &str, text: &str) -> String {
    ctcp(target, CtcpKind::Action, Some(text))
}

/// `JOIN <channel>`
pub fn join(channel: &str) -> String {
    line(None, JOIN, &[channel])
}

/// `PART <channel> [:<reason>]`
pub fn part(channel: &str, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => line_with_trailing(None, PART, &[channel], reason),
        None => line(None, PART, &[channel]),
    }
}

/// `NICK <nick>`
pub fn nick(nick: &str) -> String {
    line(None, NICK, &[nick])
}

/// `USER <username> 0 * :<realname>`
pub fn user(username: &str, realname: &str) -> String {
    line_with_trailing(None, USER, &[username, "0", "*"], realname)
}

/// `PING <token>`
pub fn ping(token: &str) -> String {
    line(None, PING, &[token])
}

/// `PONG` echoing the arguments of a PING.
pub fn pong(args: &[&str]) -> String {
    line(None, PONG, args)
}

/// `QUIT [:<reason>]`
pub fn quit(reason: Option<&str>) -> String {
    match reason {
        Some(reason) => line_with_trailing(None, QUIT, &[], reason),
        None => QUIT.to_owned(),
    }
}

/// Reduce an outbound line to what may go on the wire: its first line only,
/// cut to at most [`MAX_PAYLOAD_LEN`] bytes on a character boundary.
///
/// ```
/// use slirc_proto::encode::{sanitize, MAX_PAYLOAD_LEN};
///
/// assert_eq!(sanitize("PRIVMSG #a :one\r\nQUIT"), "PRIVMSG #a :one");
/// assert_eq!(sanitize(&"x".repeat(600)).len(), MAX_PAYLOAD_LEN);
/// ```
pub fn sanitize(line: &str) -> &str {
    let first = line.split(['\r', '\n']).next().unwrap_or_default();
    if first.len() <= MAX_PAYLOAD_LEN {
        return first;
    }
    let mut end = MAX_PAYLOAD_LEN;
    while !first.is_char_boundary(end) {
        end -= 1;
    }
    &first[..end]
}
