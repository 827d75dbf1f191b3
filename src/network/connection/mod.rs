//! Connection - drives one IRC session from connect to disconnect.
//!
//! ```text
//! Disconnected → Connecting → Registering → Connected → Disconnected
//! ```
//!
//! Each run has the following architecture:
//!
//! ```text
//!    ┌──────────────────────────────────────────────────────┐
//!    │                    Transport task                    │
//!    │   receive flow ──▶ IncomingLines   OutgoingLines ──▶ send flow
//!    └──────────────────────────┬──────────────────▲────────┘
//!                               │                  │
//!                               ▼                  │
//!    event loop (select!: lines, registration      │
//!      deadline, keepalive, shutdown)              │
//!                               │                  │
//!                               ▼                  │
//!                  Registry ──▶ worker pool ──▶ Client (LineSender)
//! ```
//!
//! Teardown cancels the transport, waits a bounded grace period for it to
//! flush, and aborts it if it does not finish.

mod error_handling;
mod event_loop;
mod handshake;
mod keepalive;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use slirc_proto::{OutgoingLines, Transport};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{Instrument, info, warn};

use self::error_handling::{LoopExit, TransportOutcome, conclude};
use crate::client::Client;
use crate::error::EngineError;
use crate::handlers::Registry;
use crate::telemetry::spans;

/// How long teardown waits for the transport to flush and close.
const TRANSPORT_GRACE: Duration = Duration::from_secs(5);

/// Lifecycle state of a connection, observable through
/// [`Client::watch_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Registering,
    Connected,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Registering => "registering",
            Self::Connected => "connected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn transition(client: &Client, state: ConnectionState) {
    info!(from = %client.state(), to = %state, "connection state changed");
    client.set_state(state);
}

/// One connection run.
pub(crate) struct Connection {
    client: Client,
    registry: Arc<Registry>,
}

impl Connection {
    pub(crate) fn new(client: Client, registry: Arc<Registry>) -> Self {
        Self { client, registry }
    }

    /// Connect, register and serve until quit or failure.
    ///
    /// `Ok(())` means the bot quit on request; every other ending is an
    /// [`EngineError`].
    pub(crate) async fn run(self, outgoing: OutgoingLines) -> Result<(), EngineError> {
        let span = {
            let settings = self.client.settings();
            spans::connection(&settings.addr(), &settings.nick)
        };
        self.run_inner(outgoing).instrument(span).await
    }

    async fn run_inner(self, outgoing: OutgoingLines) -> Result<(), EngineError> {
        let client = &self.client;
        let settings = client.settings();
        let shutdown = client.shutdown_token();

        transition(client, ConnectionState::Connecting);
        info!(addr = %settings.addr(), tls = settings.tls, "connecting");

        let connect = timeout(
            settings.connect_timeout,
            Transport::connect(&settings.host, settings.port, settings.tls),
        );
        let transport = tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                transition(client, ConnectionState::Disconnected);
                return Ok(());
            }
            result = connect => match result {
                Ok(Ok(transport)) => transport,
                Ok(Err(e)) => {
                    transition(client, ConnectionState::Disconnected);
                    return Err(e.into());
                }
                Err(_) => {
                    transition(client, ConnectionState::Disconnected);
                    return Err(EngineError::ConnectTimeout {
                        addr: settings.addr(),
                        secs: settings.connect_timeout.as_secs(),
                    });
                }
            },
        };

        // A child token lets an engine failure stop the transport without
        // marking the client as quitting.
        let transport_shutdown = shutdown.child_token();
        let (incoming, task) = transport.spawn(outgoing, transport_shutdown.clone());

        let exit = event_loop::run(client, &self.registry, incoming).await;
        if let LoopExit::Failed(ref e) = exit {
            warn!(error = %e, code = e.error_code(), "connection failed");
        }

        transport_shutdown.cancel();
        let outcome = join_transport(task).await;
        transition(client, ConnectionState::Disconnected);

        conclude(exit, outcome, client.is_shutdown())
    }
}

async fn join_transport(
    mut task: JoinHandle<Result<(), slirc_proto::TransportError>>,
) -> TransportOutcome {
    match timeout(TRANSPORT_GRACE, &mut task).await {
        Ok(result) => Some(result),
        Err(_) => {
            warn!("transport did not close in time, aborting");
            task.abort();
            None
        }
    }
}
