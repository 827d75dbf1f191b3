//! Handler capability traits and routing tables.
//!
//! A handler declares two tables:
//!
//! - a [`MethodTable`], built once per handler type, naming each callback
//!   it offers as a typed `fn` pointer;
//! - a [`CommandMap`], built per instance, routing IRC commands to those
//!   method names.
//!
//! The registry resolves every command map entry against the method table
//! when the handler is added, so a route naming a missing method fails
//! registration instead of surfacing at dispatch time.
//!
//! ## Example
//!
//! ```ignore
//! struct Greeter;
//!
//! impl Handler for Greeter {
//!     fn name(&self) -> &str {
//!         "greeter"
//!     }
//!
//!     fn commands(&self) -> CommandMap {
//!         CommandMap::new().on("JOIN", "on_join")
//!     }
//!
//!     fn methods() -> MethodTable<Self> {
//!         MethodTable::new().method("on_join", Self::on_join)
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use slirc_proto::{Message, command};

use crate::client::Client;
use crate::error::{HandlerConfigError, HandlerResult};

/// Future returned by every callback.
pub type HandlerFuture = BoxFuture<'static, HandlerResult>;

/// A handler callback: receives its handler, the client and the message.
pub type Method<H> = fn(Arc<H>, Client, Arc<Message>) -> HandlerFuture;

/// Named callbacks offered by a handler type.
pub struct MethodTable<H> {
    methods: HashMap<&'static str, Method<H>>,
}

impl<H> MethodTable<H> {
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// Add a callback under `name`. A later entry with the same name wins.
    pub fn method(mut self, name: &'static str, method: Method<H>) -> Self {
        self.methods.insert(name, method);
        self
    }

    pub fn get(&self, name: &str) -> Option<Method<H>> {
        self.methods.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<H> Default for MethodTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes from IRC commands to method names.
#[derive(Debug, Clone, Default)]
pub struct CommandMap {
    routes: Vec<(String, String)>,
}

impl CommandMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `command` (upper-cased) to `method`. Re-routing a command
    /// replaces its method.
    pub fn on(mut self, command: &str, method: &str) -> Self {
        let command = command.to_ascii_uppercase();
        self.routes.retain(|(existing, _)| *existing != command);
        self.routes.push((command, method.to_owned()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.routes.iter().map(|(c, m)| (c.as_str(), m.as_str()))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// The handler capability.
///
/// Callbacks run on the worker pool, one task per invocation, so a handler
/// must be shareable across tasks.
pub trait Handler: Send + Sync + Sized + 'static {
    /// Name used in logs and configuration errors.
    fn name(&self) -> &str;

    /// Commands this instance wants, and the method each goes to.
    fn commands(&self) -> CommandMap;

    /// Callbacks this handler type offers.
    fn methods() -> MethodTable<Self>;
}

// ============================================================================
// Type-erased routing
// ============================================================================

/// Object-safe view of a bound handler, stored by the registry.
pub(crate) trait Route: Send + Sync {
    fn name(&self) -> &str;

    fn handles(&self, command: &str) -> bool;

    /// Start the callback routed for `command`, if any.
    fn invoke(&self, command: &str, client: &Client, msg: &Arc<Message>) -> Option<HandlerFuture>;
}

/// A handler whose command map has been resolved against its method table.
pub(crate) struct Bound<H: Handler> {
    handler: Arc<H>,
    name: String,
    routes: HashMap<String, Method<H>>,
}

impl<H: Handler> Bound<H> {
    pub(crate) fn bind(handler: H) -> Result<Self, HandlerConfigError> {
        let name = handler.name().to_owned();
        let commands = handler.commands();
        if commands.is_empty() {
            return Err(HandlerConfigError::EmptyCommandMap { handler: name });
        }

        let methods = H::methods();
        let mut routes = HashMap::with_capacity(commands.len());
        for (command, method) in commands.iter() {
            if !command::is_routable(command) {
                return Err(HandlerConfigError::InvalidCommand {
                    handler: name,
                    command: command.to_owned(),
                });
            }
            let Some(callback) = methods.get(method) else {
                return Err(HandlerConfigError::UnknownMethod {
                    handler: name,
                    command: command.to_owned(),
                    method: method.to_owned(),
                });
            };
            routes.insert(command.to_owned(), callback);
        }

        Ok(Self {
            handler: Arc::new(handler),
            name,
            routes,
        })
    }
}

impl<H: Handler> Route for Bound<H> {
    fn name(&self) -> &str {
        &self.name
    }

    fn handles(&self, command: &str) -> bool {
        self.routes.contains_key(command)
    }

    fn invoke(&self, command: &str, client: &Client, msg: &Arc<Message>) -> Option<HandlerFuture> {
        let method = self.routes.get(command)?;
        Some(method(Arc::clone(&self.handler), client.clone(), Arc::clone(msg)))
    }
}
