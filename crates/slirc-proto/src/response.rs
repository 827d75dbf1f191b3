//! IRC numeric replies understood by the client.
//!
//! Only the core registration, keepalive, join and messaging numerics are
//! catalogued. Anything else is still parsed as a numeric command, it just
//! has no [`Response`] variant.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - Modern IRC documentation: <https://modern.ircdocs.horse/>

#![allow(non_camel_case_types)]

use std::fmt;
use std::str::FromStr;

macro_rules! responses {
    ($( $(#[$doc:meta])* $name:ident = $code:literal, )+) => {
        /// IRC server numeric reply.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u16)]
        #[non_exhaustive]
        pub enum Response {
            $( $(#[$doc])* $name = $code, )+
        }

        impl Response {
            /// Look up a numeric by its code.
            pub fn from_code(code: u16) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$name), )+
                    _ => None,
                }
            }

            /// Symbolic name, e.g. `RPL_WELCOME`.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name), )+
                }
            }
        }
    };
}

responses! {
    /// 001 - Welcome to the network; registration is complete
    RPL_WELCOME = 1,
    /// 002 - Your host is
    RPL_YOURHOST = 2,
    /// 003 - Server creation date
    RPL_CREATED = 3,
    /// 004 - Server info
    RPL_MYINFO = 4,
    /// 005 - Server supported features
    RPL_ISUPPORT = 5,
    /// 221 - User mode string
    RPL_UMODEIS = 221,
    /// 251 - Luser client count
    RPL_LUSERCLIENT = 251,
    /// 252 - Luser operator count
    RPL_LUSEROP = 252,
    /// 253 - Luser unknown connections
    RPL_LUSERUNKNOWN = 253,
    /// 254 - Luser channel count
    RPL_LUSERCHANNELS = 254,
    /// 255 - Luser local info
    RPL_LUSERME = 255,
    /// 265 - Local user counts
    RPL_LOCALUSERS = 265,
    /// 266 - Global user counts
    RPL_GLOBALUSERS = 266,
    /// 324 - Channel mode
    RPL_CHANNELMODEIS = 324,
    /// 331 - No topic set
    RPL_NOTOPIC = 331,
    /// 332 - Channel topic
    RPL_TOPIC = 332,
    /// 333 - Topic setter and time
    RPL_TOPICWHOTIME = 333,
    /// 353 - Names reply
    RPL_NAMREPLY = 353,
    /// 366 - End of names
    RPL_ENDOFNAMES = 366,
    /// 372 - MOTD line
    RPL_MOTD = 372,
    /// 375 - MOTD start
    RPL_MOTDSTART = 375,
    /// 376 - End of MOTD
    RPL_ENDOFMOTD = 376,
    /// 396 - Displayed host changed
    RPL_HOSTHIDDEN = 396,
    /// 401 - No such nick
    ERR_NOSUCHNICK = 401,
    /// 403 - No such channel
    ERR_NOSUCHCHANNEL = 403,
    /// 404 - Cannot send to channel
    ERR_CANNOTSENDTOCHAN = 404,
    /// 405 - Joined too many channels
    ERR_TOOMANYCHANNELS = 405,
    /// 421 - Unknown command
    ERR_UNKNOWNCOMMAND = 421,
    /// 422 - MOTD missing
    ERR_NOMOTD = 422,
    /// 431 - No nickname given
    ERR_NONICKNAMEGIVEN = 431,
    /// 432 - Erroneous nickname
    ERR_ERRONEUSNICKNAME = 432,
    /// 433 - Nickname is already in use
    ERR_NICKNAMEINUSE = 433,
    /// 436 - Nickname collision
    ERR_NICKCOLLISION = 436,
    /// 442 - Not on channel
    ERR_NOTONCHANNEL = 442,
    /// 451 - Not registered
    ERR_NOTREGISTERED = 451,
    /// 461 - Not enough parameters
    ERR_NEEDMOREPARAMS = 461,
    /// 462 - Already registered
    ERR_ALREADYREGISTRED = 462,
    /// 464 - Password mismatch
    ERR_PASSWDMISMATCH = 464,
    /// 465 - Banned from server
    ERR_YOUREBANNEDCREEP = 465,
    /// 471 - Channel is full
    ERR_CHANNELISFULL = 471,
    /// 473 - Invite only channel
    ERR_INVITEONLYCHAN = 473,
    /// 474 - Banned from channel
    ERR_BANNEDFROMCHAN = 474,
    /// 475 - Bad channel key
    ERR_BADCHANNELKEY = 475,
    /// 477 - Registered nick needed
    ERR_NEEDREGGEDNICK = 477,
    /// 482 - Channel operator privileges needed
    ERR_CHANOPRIVSNEEDED = 482,
}

/// Error returned when a string is not a catalogued numeric.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownResponse(pub String);

impl fmt::Display for UnknownResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown numeric reply: {}", self.0)
    }
}

impl std::error::Error for UnknownResponse {}

impl Response {
    /// Numeric value of the reply.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Error replies are in the 400-599 range.
    pub fn is_error(self) -> bool {
        (400..600).contains(&self.code())
    }
}

impl FromStr for Response {
    type Err = UnknownResponse;

    /// Parses the three-digit wire form, e.g. `"001"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(UnknownResponse(s.to_owned()));
        }
        s.parse::<u16>()
            .ok()
            .and_then(Self::from_code)
            .ok_or_else(|| UnknownResponse(s.to_owned()))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}
