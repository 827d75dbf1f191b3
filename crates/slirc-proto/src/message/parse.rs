use std::str::FromStr;

use crate::command::{self, NOTICE, PRIVMSG};
use crate::ctcp::Ctcp;
use crate::error::{MessageParseError, ProtocolError};
use crate::source::Source;

use super::Message;

/// Alphabetic verbs and three-digit numerics are well formed.
fn is_well_formed_command(token: &str) -> bool {
    command::is_numeric(token) || (!token.is_empty() && token.bytes().all(|b| b.is_ascii_alphabetic()))
}

/// Split the part after the prefix into arguments. Everything after the
/// first `" :"` is a single trailing argument.
fn split_arguments(rest: &str) -> Vec<String> {
    match rest.find(" :") {
        Some(pos) => {
            let mut args: Vec<String> = rest[..pos].split_whitespace().map(String::from).collect();
            args.push(rest[pos + 2..].to_owned());
            args
        }
        None => rest.split_whitespace().map(String::from).collect(),
    }
}

impl Message {
    /// Parse one raw line. Trailing CR/LF is ignored.
    ///
    /// Fails on an empty line, on a prefix with no command, and on a
    /// PRIVMSG or NOTICE without a destination. Unknown commands are not an
    /// error; a malformed command token sets [`Message::erroneous`].
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let raw = line.trim_end_matches(['\r', '\n']);
        if raw.trim().is_empty() {
            return Err(ProtocolError::invalid_message(raw, MessageParseError::EmptyMessage));
        }

        let (prefix, rest) = match raw.strip_prefix(':') {
            Some(stripped) => stripped.split_once(' ').unwrap_or((stripped, "")),
            None => ("", raw),
        };

        let mut args = split_arguments(rest);
        if args.is_empty() {
            return Err(ProtocolError::invalid_message(raw, MessageParseError::MissingCommand));
        }

        let token = args.remove(0);
        let erroneous = !is_well_formed_command(&token);
        let mut command = token.to_ascii_uppercase();

        let mut dst = None;
        if command == PRIVMSG || command == NOTICE {
            if args.is_empty() {
                return Err(ProtocolError::invalid_message(
                    raw,
                    MessageParseError::MissingDestination { command },
                ));
            }
            dst = Some(args.remove(0));

            let unwrapped = args.last().and_then(|body| {
                Ctcp::parse(body).map(|ctcp| {
                    let ctcp_args = ctcp.args().map(String::from).collect::<Vec<_>>();
                    (ctcp.command_name(), ctcp_args)
                })
            });
            if let Some((ctcp_command, ctcp_args)) = unwrapped {
                command = ctcp_command;
                args = ctcp_args;
            }
        }

        Ok(Message {
            raw: raw.to_owned(),
            source: Source::parse(prefix),
            command,
            args,
            dst,
            erroneous,
        })
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::parse(s)
    }
}
