//! Per-command access rights.
//!
//! A [`Rights`] table keeps, for each restricted command, an allow-list
//! from user name (or `*`) to the event kinds that user may invoke it
//! from. Commands without a rule are open to everyone, and a named entry
//! takes precedence over `*`.
//!
//! `Rights` is an [`Interceptor`]: attach it to a command handler with
//! [`Commands::with_interceptor`](super::command::Commands::with_interceptor).

use std::collections::HashMap;

use async_trait::async_trait;
use slirc_proto::{FormattedStringExt, NickExt};
use tracing::{info, warn};

use super::command::{EventKind, EventKinds, Interceptor, Invocation, Verdict};
use crate::client::Client;

/// Wildcard user entry.
pub const ANY_USER: &str = "*";

/// What happens after a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenialPolicy {
    /// Event kinds for which the denied user gets a NOTICE.
    pub notify: EventKinds,
}

impl DenialPolicy {
    pub fn notify(kinds: EventKinds) -> Self {
        Self { notify: kinds }
    }

    /// Deny without telling anyone.
    pub fn silent() -> Self {
        Self {
            notify: EventKinds::empty(),
        }
    }
}

impl Default for DenialPolicy {
    fn default() -> Self {
        Self {
            notify: EventKinds::all(),
        }
    }
}

/// Allow-lists for restricted commands.
#[derive(Debug, Clone, Default)]
pub struct Rights {
    rules: HashMap<String, HashMap<String, EventKinds>>,
    policy: DenialPolicy,
}

impl Rights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: DenialPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Let `user` (or [`ANY_USER`]) run `command` from `kinds`. Adding a
    /// rule makes `command` restricted.
    pub fn allow(mut self, command: &str, user: &str, kinds: EventKinds) -> Self {
        self.rules
            .entry(command.to_lowercase())
            .or_default()
            .insert(user.to_irc_lowercase(), kinds);
        self
    }

    pub fn policy(&self) -> &DenialPolicy {
        &self.policy
    }

    pub fn is_restricted(&self, command: &str) -> bool {
        self.rules.contains_key(&command.to_lowercase())
    }

    /// Whether `user` may run `command` from `kind`.
    pub fn permits(&self, command: &str, user: &str, kind: EventKind) -> bool {
        let Some(users) = self.rules.get(&command.to_lowercase()) else {
            return true;
        };
        users
            .get(&user.to_irc_lowercase())
            .or_else(|| users.get(ANY_USER))
            .is_some_and(|kinds| kinds.has(kind))
    }
}

#[async_trait]
impl Interceptor for Rights {
    async fn intercept(&self, client: &Client, invocation: &Invocation) -> Verdict {
        let user = invocation.sender().unwrap_or_default();
        if self.permits(&invocation.trigger, user, invocation.kind) {
            return Verdict::Proceed;
        }

        info!(
            user,
            command = %invocation.trigger,
            kind = %invocation.kind,
            "command denied"
        );
        if !user.is_empty() && self.policy.notify.has(invocation.kind) {
            let text = format!(
                "You are not allowed to use the {} command",
                invocation.trigger.bold()
            );
            if let Err(e) = client.notice(user, &text) {
                warn!(error = %e, "failed to send denial notice");
            }
        }
        Verdict::Skip
    }
}
