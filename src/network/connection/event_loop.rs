//! The connection's select loop.
//!
//! One loop owns everything that must stop together: the inbound queue,
//! the registration deadline and the keepalive timer. Both timers live on
//! this function's stack, so leaving the loop cancels them.

use std::sync::Arc;

use slirc_proto::command::ERROR;
use slirc_proto::{IncomingLines, Message, encode};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::error_handling::LoopExit;
use super::handshake::{Handshake, Progress, track_own_nick};
use super::keepalive::{Keepalive, KeepaliveEvent};
use super::{ConnectionState, transition};
use crate::client::Client;
use crate::error::EngineError;
use crate::handlers::Registry;

pub(super) async fn run(client: &Client, registry: &Registry, mut incoming: IncomingLines) -> LoopExit {
    let settings = client.settings();
    let shutdown = client.shutdown_token();
    let mut handshake = Handshake::new(client);
    let mut keepalive = Keepalive::new(settings.keepalive);
    let registration = sleep(settings.registration_timeout);
    tokio::pin!(registration);

    if let Err(e) = handshake.start(client) {
        return LoopExit::Failed(e.into());
    }
    transition(client, ConnectionState::Registering);

    loop {
        let registered = client.state() == ConnectionState::Connected;
        tokio::select! {
            biased;

            () = shutdown.cancelled() => return LoopExit::Quit,

            line = incoming.recv() => {
                let Some(line) = line else {
                    return LoopExit::TransportEnded;
                };
                keepalive.reset();
                match process_line(client, registry, &mut handshake, &line) {
                    Ok(Some(Progress::Registered)) => {
                        transition(client, ConnectionState::Connected);
                        keepalive.reset();
                    }
                    Ok(_) => {}
                    Err(e) => return LoopExit::Failed(e),
                }
            }

            () = &mut registration, if !registered => {
                return LoopExit::Failed(EngineError::RegistrationTimeout {
                    secs: settings.registration_timeout.as_secs(),
                });
            }

            event = keepalive.tick(), if registered => match event {
                KeepaliveEvent::SendPing => {
                    let nick = client.nick();
                    debug!(%nick, "idle, sending self-ping");
                    if let Err(e) = client.send_raw(encode::ping(&nick)) {
                        return LoopExit::Failed(e.into());
                    }
                }
                KeepaliveEvent::Dead => {
                    return LoopExit::Failed(EngineError::PingTimeout {
                        idle_secs: keepalive.interval().as_secs() * 2,
                    });
                }
            },
        }
    }
}

/// Parse one line, apply built-in state tracking, and dispatch it.
///
/// Unparsable lines are logged and dropped. Returns the registration
/// progress when the line was seen during registration.
fn process_line(
    client: &Client,
    registry: &Registry,
    handshake: &mut Handshake,
    line: &str,
) -> Result<Option<Progress>, EngineError> {
    debug!("<- {}", line);
    let msg = match Message::parse(line) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(error = %e, "dropping unparsable line");
            return Ok(None);
        }
    };

    let progress = if client.state() == ConnectionState::Registering {
        Some(handshake.on_message(client, &msg)?)
    } else {
        None
    };
    track_own_nick(client, &msg);
    if msg.command == ERROR {
        warn!(reason = msg.text().unwrap_or_default(), "server sent ERROR");
    }

    registry.dispatch(client, Arc::new(msg));
    Ok(progress)
}
