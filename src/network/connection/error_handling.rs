//! Classification of how a connection ended.

use slirc_proto::TransportError;
use tokio::task::JoinError;
use tracing::{debug, error};

use crate::error::EngineError;

/// Why the event loop stopped.
#[derive(Debug)]
pub(super) enum LoopExit {
    /// `Client::quit` was called.
    Quit,
    /// The inbound queue closed: the transport stopped on its own.
    TransportEnded,
    /// The loop gave up on the connection.
    Failed(EngineError),
}

/// Outcome of awaiting the transport task. `None` when it had to be
/// aborted after the grace period.
pub(super) type TransportOutcome = Option<Result<Result<(), TransportError>, JoinError>>;

/// Combine the loop exit with the transport outcome into the run result.
pub(super) fn conclude(
    exit: LoopExit,
    transport: TransportOutcome,
    quitting: bool,
) -> Result<(), EngineError> {
    match exit {
        LoopExit::Failed(e) => Err(e),
        LoopExit::Quit => {
            if let Some(Ok(Err(e))) = transport {
                debug!(error = %e, "transport error during quit");
            }
            Ok(())
        }
        LoopExit::TransportEnded if quitting => Ok(()),
        LoopExit::TransportEnded => Err(transport_error(transport).into()),
    }
}

fn transport_error(transport: TransportOutcome) -> TransportError {
    match transport {
        Some(Ok(Err(e))) => e,
        Some(Ok(Ok(()))) | None => TransportError::ConnectionClosed,
        Some(Err(join)) => {
            error!(error = %join, "transport task failed");
            TransportError::ConnectionClosed
        }
    }
}
