//! Prefix-triggered commands.
//!
//! A [`CommandHandler`] reacts to words such as `!hello` at the start of a
//! PRIVMSG or NOTICE body. Each trigger lists the event kinds it accepts:
//!
//! - `public`: a PRIVMSG to anything but the bot, i.e. a channel
//! - `private`: a PRIVMSG addressed to the bot's own nickname
//! - `notice`: any NOTICE
//!
//! [`Commands`] adapts a command handler to the plain [`Handler`] routing
//! on PRIVMSG and NOTICE. Interceptors, such as the rights table, run after
//! the trigger matched and before its action.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bitflags::bitflags;
use serde::Deserialize;
use slirc_proto::command::{NOTICE, PRIVMSG};
use slirc_proto::{Message, NickExt};

use super::core::{CommandMap, Handler, HandlerFuture, MethodTable};
use crate::client::Client;
use crate::error::HandlerConfigError;

// ============================================================================
// Event kinds
// ============================================================================

/// How a triggering message reached the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Public,
    Private,
    Notice,
}

impl EventKind {
    /// Classify a message for a bot currently named `own_nick`. Only
    /// PRIVMSG and NOTICE have a kind.
    pub fn classify(msg: &Message, own_nick: &str) -> Option<Self> {
        match msg.command.as_str() {
            NOTICE => Some(Self::Notice),
            PRIVMSG => match msg.dst.as_deref() {
                Some(dst) if dst.eq_nick(own_nick) => Some(Self::Private),
                _ => Some(Self::Public),
            },
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Notice => "notice",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// A set of [`EventKind`]s.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventKinds: u8 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const NOTICE = 1 << 2;
    }
}

impl EventKinds {
    pub fn has(self, kind: EventKind) -> bool {
        self.contains(kind.into())
    }
}

impl From<EventKind> for EventKinds {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Public => Self::PUBLIC,
            EventKind::Private => Self::PRIVATE,
            EventKind::Notice => Self::NOTICE,
        }
    }
}

impl FromIterator<EventKind> for EventKinds {
    fn from_iter<I: IntoIterator<Item = EventKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, kind| set | kind.into())
    }
}

// ============================================================================
// Invocation
// ============================================================================

/// A matched trigger, handed to the action.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub message: Arc<Message>,
    pub kind: EventKind,
    /// Lower-cased trigger word, without the prefix character.
    pub trigger: String,
    /// Words following the trigger.
    pub args: Vec<String>,
}

impl Invocation {
    /// Parse `msg` as a trigger invocation.
    pub fn parse(msg: Arc<Message>, prefix: char, own_nick: &str) -> Option<Self> {
        let kind = EventKind::classify(&msg, own_nick)?;
        let body = msg.text()?.strip_prefix(prefix)?;
        if body.starts_with(char::is_whitespace) {
            return None;
        }
        let mut words = body.split_whitespace();
        let trigger = words.next()?.to_lowercase();
        let args = words.map(str::to_owned).collect();
        Some(Self {
            message: msg,
            kind,
            trigger,
            args,
        })
    }

    /// Nickname of the invoking user.
    pub fn sender(&self) -> Option<&str> {
        self.message.sender_nick()
    }

    /// Where a reply belongs: the channel for public triggers, the user
    /// otherwise.
    pub fn reply_target(&self) -> Option<&str> {
        match self.kind {
            EventKind::Public => self.message.dst.as_deref(),
            EventKind::Private | EventKind::Notice => self.sender(),
        }
    }
}

// ============================================================================
// Tables and traits
// ============================================================================

/// An action: receives its handler, the client and the invocation.
pub type Action<H> = fn(Arc<H>, Client, Invocation) -> HandlerFuture;

/// Named actions offered by a command handler type.
pub struct ActionTable<H> {
    actions: HashMap<&'static str, Action<H>>,
}

impl<H> ActionTable<H> {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    pub fn action(mut self, name: &'static str, action: Action<H>) -> Self {
        self.actions.insert(name, action);
        self
    }

    pub fn get(&self, name: &str) -> Option<Action<H>> {
        self.actions.get(name).copied()
    }
}

impl<H> Default for ActionTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
struct TriggerEntry {
    action: String,
    kinds: EventKinds,
}

/// Trigger words, the action each runs, and the event kinds it accepts.
#[derive(Debug, Clone, Default)]
pub struct TriggerTable {
    entries: HashMap<String, TriggerEntry>,
}

impl TriggerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger `word` runs the action of the same name.
    pub fn on(self, word: &str, kinds: EventKinds) -> Self {
        self.route(word, word, kinds)
    }

    /// Trigger `word` runs `action`.
    pub fn route(mut self, word: &str, action: &str, kinds: EventKinds) -> Self {
        self.entries.insert(
            word.to_lowercase(),
            TriggerEntry {
                action: action.to_owned(),
                kinds,
            },
        );
        self
    }

    pub fn kinds(&self, word: &str) -> Option<EventKinds> {
        self.entries.get(word).map(|entry| entry.kinds)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A handler reacting to prefix-triggered words.
pub trait CommandHandler: Send + Sync + Sized + 'static {
    fn name(&self) -> &str;

    fn triggers(&self) -> TriggerTable;

    fn actions() -> ActionTable<Self>;
}

/// Outcome of an [`Interceptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Proceed,
    Skip,
}

/// Runs between a matched trigger and its action.
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn intercept(&self, client: &Client, invocation: &Invocation) -> Verdict;
}

// ============================================================================
// Adapter
// ============================================================================

/// A [`CommandHandler`] bound to its actions, registrable as a [`Handler`].
pub struct Commands<H: CommandHandler> {
    handler: Arc<H>,
    name: String,
    prefix: Option<char>,
    triggers: HashMap<String, (Action<H>, EventKinds)>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl<H: CommandHandler> Commands<H> {
    /// Resolve `handler`'s trigger table against its action table.
    pub fn new(handler: H) -> Result<Self, HandlerConfigError> {
        let name = handler.name().to_owned();
        let table = handler.triggers();
        if table.is_empty() {
            return Err(HandlerConfigError::EmptyCommandMap { handler: name });
        }

        let actions = H::actions();
        let mut triggers = HashMap::with_capacity(table.len());
        for (word, entry) in table.entries {
            if word.is_empty() || word.contains(char::is_whitespace) {
                return Err(HandlerConfigError::InvalidTrigger {
                    handler: name,
                    trigger: word,
                });
            }
            let Some(action) = actions.get(&entry.action) else {
                return Err(HandlerConfigError::UnknownAction {
                    handler: name,
                    trigger: word,
                    action: entry.action,
                });
            };
            triggers.insert(word, (action, entry.kinds));
        }

        Ok(Self {
            handler: Arc::new(handler),
            name,
            prefix: None,
            triggers,
            interceptors: Vec::new(),
        })
    }

    /// Use `prefix` instead of the connection's trigger character.
    pub fn with_prefix(mut self, prefix: char) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Run `interceptor` before every action, after those already added.
    pub fn with_interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    fn on_message(this: Arc<Self>, client: Client, msg: Arc<Message>) -> HandlerFuture {
        Box::pin(async move {
            let prefix = this.prefix.unwrap_or(client.settings().trigger);
            let Some(invocation) = Invocation::parse(msg, prefix, &client.nick()) else {
                return Ok(());
            };
            let Some(&(action, kinds)) = this.triggers.get(&invocation.trigger) else {
                return Ok(());
            };
            if !kinds.has(invocation.kind) {
                return Ok(());
            }
            for interceptor in &this.interceptors {
                if interceptor.intercept(&client, &invocation).await == Verdict::Skip {
                    return Ok(());
                }
            }
            action(Arc::clone(&this.handler), client, invocation).await
        })
    }
}

impl<H: CommandHandler> Handler for Commands<H> {
    fn name(&self) -> &str {
        &self.name
    }

    fn commands(&self) -> CommandMap {
        CommandMap::new()
            .on(PRIVMSG, "on_message")
            .on(NOTICE, "on_message")
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::new().method("on_message", Self::on_message)
    }
}
