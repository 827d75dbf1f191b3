//! Registration and nickname tracking.
//!
//! Sends `NICK`/`USER`, rotates the nickname on ERR_NICKNAMEINUSE while
//! registering, and completes on RPL_WELCOME by adopting the confirmed
//! nickname and joining the configured channels in order.

use slirc_proto::command::NICK;
use slirc_proto::{Message, NickExt, NickRotation, Response, TransportError, encode};
use tracing::{info, warn};

use crate::client::Client;
use crate::error::EngineError;

/// What a message meant for registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Progress {
    Pending,
    Registered,
}

pub(super) struct Handshake {
    rotation: NickRotation,
    attempted: String,
}

impl Handshake {
    pub(super) fn new(client: &Client) -> Self {
        let settings = client.settings();
        Self {
            rotation: NickRotation::with_max_len(&settings.nick, settings.nick_max_len),
            attempted: settings.nick.clone(),
        }
    }

    /// Send `NICK` and `USER`.
    pub(super) fn start(&self, client: &Client) -> Result<(), TransportError> {
        let settings = client.settings();
        client.send_raw(encode::nick(&self.attempted))?;
        client.send_raw(encode::user(&settings.username, &settings.realname))
    }

    /// Handle one message received while registering.
    pub(super) fn on_message(
        &mut self,
        client: &Client,
        msg: &Message,
    ) -> Result<Progress, EngineError> {
        match msg.response() {
            Some(Response::ERR_NICKNAMEINUSE) => {
                let next = self.rotation.next_nick()?;
                info!(taken = %self.attempted, next = %next, "nickname in use");
                client.send_raw(encode::nick(&next))?;
                self.attempted = next;
                Ok(Progress::Pending)
            }
            Some(Response::RPL_WELCOME) => {
                let confirmed = msg.arg(0).unwrap_or(&self.attempted);
                client.set_current_nick(confirmed);
                info!(nick = %confirmed, "registered");
                for channel in &client.settings().channels {
                    client.join(channel)?;
                }
                Ok(Progress::Registered)
            }
            _ => Ok(Progress::Pending),
        }
    }
}

/// Follow a `NICK` change made by the bot itself.
pub(super) fn track_own_nick(client: &Client, msg: &Message) {
    if msg.command != NICK {
        return;
    }
    let Some(sender) = msg.sender_nick() else {
        return;
    };
    if !sender.eq_nick(&client.nick()) {
        return;
    }
    match msg.arg(0) {
        Some(new_nick) => {
            info!(old = %sender, new = %new_nick, "nickname changed");
            client.set_current_nick(new_nick);
        }
        None => warn!("NICK without a new nickname: {}", msg.raw),
    }
}
