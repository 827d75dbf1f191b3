//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use crate::handlers::EventKind;

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

pub fn default_log_level() -> String {
    "info".to_string()
}

// =============================================================================
// Identity Defaults
// =============================================================================

pub fn default_port() -> u16 {
    6667
}

pub fn default_realname() -> String {
    "slirc bot".to_string()
}

pub fn default_trigger() -> String {
    "!".to_string()
}

pub fn default_quit_message() -> String {
    "I'll be back!".to_string()
}

// =============================================================================
// Timing Defaults
// =============================================================================

pub fn default_keepalive_secs() -> u64 {
    180
}

pub fn default_connect_timeout_secs() -> u64 {
    30
}

pub fn default_registration_timeout_secs() -> u64 {
    60
}

pub fn default_max_concurrent_handlers() -> usize {
    64
}

// =============================================================================
// Reconnect Defaults
// =============================================================================

pub fn default_reconnect_delay_secs() -> u64 {
    10
}

pub fn default_reconnect_max_delay_secs() -> u64 {
    300
}

// =============================================================================
// Rights Defaults
// =============================================================================

pub fn default_notify() -> Vec<EventKind> {
    vec![EventKind::Public, EventKind::Private, EventKind::Notice]
}
