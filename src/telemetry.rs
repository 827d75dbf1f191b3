//! Telemetry utilities for handler timing and span construction.

use std::time::Instant;

/// Guard for timing a handler invocation.
///
/// Logs the elapsed time at `trace` when dropped, so the measurement covers
/// early returns and errors alike.
pub struct HandlerTimer {
    handler: String,
    command: String,
    start: Instant,
}

impl HandlerTimer {
    /// Start timing an invocation.
    pub fn new(handler: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for HandlerTimer {
    fn drop(&mut self) {
        let micros = self.start.elapsed().as_micros();
        tracing::trace!(
            handler = %self.handler,
            command = %self.command,
            micros,
            "handler finished"
        );
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, debug_span, info_span};

    /// Span for one connection run.
    pub fn connection(server: &str, nick: &str) -> Span {
        info_span!("connection", server = %server, nick = %nick)
    }

    /// Span for one handler invocation.
    pub fn handler(name: &str, command: &str) -> Span {
        debug_span!("handler", name = %name, command = %command)
    }
}
