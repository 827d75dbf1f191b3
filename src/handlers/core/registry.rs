//! Handler registry and dispatch.
//!
//! The `Registry` owns the handlers registered against one connection and
//! the worker pool their callbacks run on. Dispatch works on a snapshot of
//! the handler list taken under a read lock, so handlers may be added or
//! removed while messages are being routed.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use slirc_proto::Message;
use slirc_proto::command::UNKNOWN_CODE;
use tracing::debug;

use super::pool::WorkerPool;
use super::traits::{Bound, Handler, Route};
use crate::client::Client;
use crate::error::HandlerConfigError;
use crate::handlers::command::{CommandHandler, Commands};

/// Identifies a registered handler for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Registry of handlers for one connection.
pub struct Registry {
    handlers: RwLock<Vec<(HandlerId, Arc<dyn Route>)>>,
    next_id: AtomicU64,
    pool: WorkerPool,
}

impl Registry {
    /// Create an empty registry running at most `max_concurrent` callbacks
    /// at once.
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            pool: WorkerPool::new(max_concurrent),
        }
    }

    /// Register a handler.
    ///
    /// Its command map is resolved against its method table here; any
    /// inconsistency is returned before the handler can see a message.
    pub fn add_handler<H: Handler>(&self, handler: H) -> Result<HandlerId, HandlerConfigError> {
        let bound = Bound::bind(handler)?;
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!(handler = %bound.name(), %id, "handler registered");
        self.handlers.write().push((id, Arc::new(bound)));
        Ok(id)
    }

    /// Register a command handler behind the trigger layer.
    pub fn add_command_handler<H: CommandHandler>(
        &self,
        handler: H,
    ) -> Result<HandlerId, HandlerConfigError> {
        self.add_handler(Commands::new(handler)?)
    }

    /// Unregister a handler. Invocations already running are not affected.
    pub fn remove_handler(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Names of the registered handlers, in registration order.
    pub fn handler_names(&self) -> Vec<String> {
        self.handlers
            .read()
            .iter()
            .map(|(_, route)| route.name().to_owned())
            .collect()
    }

    /// Route one message to every handler that wants it.
    ///
    /// Messages outside the known vocabulary additionally go to handlers
    /// routed on `UNKNOWN_CODE`. Each callback is spawned on the worker
    /// pool; this never waits for one. Returns the number of callbacks
    /// started.
    pub fn dispatch(&self, client: &Client, msg: Arc<Message>) -> usize {
        let snapshot: Vec<Arc<dyn Route>> = self
            .handlers
            .read()
            .iter()
            .map(|(_, route)| Arc::clone(route))
            .collect();

        let command = msg.command.as_str();
        let unknown = !msg.is_known() && command != UNKNOWN_CODE;
        let commands = std::iter::once(command).chain(unknown.then_some(UNKNOWN_CODE));

        let mut started = 0;
        for command in commands {
            for route in &snapshot {
                if let Some(future) = route.invoke(command, client, &msg) {
                    self.pool.spawn(route.name(), command, future);
                    started += 1;
                }
            }
        }

        if started == 0 && unknown {
            debug!(command = %msg.command, "unhandled message: {}", msg.raw);
        }
        started
    }

    /// Callbacks spawned and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.pool.in_flight()
    }

    /// Abort every running callback. Used for hard shutdown.
    pub fn abort_in_flight(&self) {
        self.pool.abort_all();
    }

    /// Wait until every callback spawned so far has finished.
    pub async fn wait_idle(&self) {
        self.pool.wait_idle().await;
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("handlers", &self.handler_names())
            .finish()
    }
}
