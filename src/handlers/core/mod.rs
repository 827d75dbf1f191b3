//! Core handler infrastructure.
//!
//! This module contains the fundamental types of the dispatch system: the
//! [`Handler`] capability with its routing tables, the [`Registry`] that
//! routes parsed messages, and the worker pool callbacks run on.
//!
//! ### Dispatch model
//!
//! - One read loop hands every parsed message to [`Registry::dispatch`]
//! - Each matching callback becomes its own pooled task
//! - A semaphore inside each task bounds how many run at once
//! - Ordering between handlers for the same message is unspecified

mod pool;
pub mod registry;
pub mod traits;

pub use registry::{HandlerId, Registry};
pub use traits::{CommandMap, Handler, HandlerFuture, Method, MethodTable};
