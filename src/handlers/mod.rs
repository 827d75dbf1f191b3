//! IRC message handlers.
//!
//! This module contains the dispatch core (handler trait, registry and
//! worker pool), the prefix-triggered command layer with its rights
//! overlay, and the handlers every connection starts with.

pub mod command;
pub mod core;
mod ctcp;
mod hello;
mod ping;
pub mod rights;
mod unknown;

pub use self::command::{
    Action, ActionTable, CommandHandler, Commands, EventKind, EventKinds, Interceptor,
    Invocation, TriggerTable, Verdict,
};
pub use self::core::{
    CommandMap, Handler, HandlerFuture, HandlerId, Method, MethodTable, Registry,
};
pub use self::ctcp::CtcpHandler;
pub use self::hello::HelloCommand;
pub use self::ping::PingHandler;
pub use self::rights::{ANY_USER, DenialPolicy, Rights};
pub use self::unknown::UnknownCodeHandler;
