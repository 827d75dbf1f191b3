//! `!hello`: the bot greets whoever asks.

use std::sync::Arc;

use super::command::{ActionTable, CommandHandler, EventKinds, Invocation, TriggerTable};
use super::core::HandlerFuture;
use crate::client::Client;
use crate::error::HandlerError;

/// Answers `!hello` with `Hello <nick>!`, in the channel or privately.
#[derive(Debug, Default)]
pub struct HelloCommand;

impl HelloCommand {
    fn hello(_this: Arc<Self>, client: Client, invocation: Invocation) -> HandlerFuture {
        Box::pin(async move {
            let nick = invocation.sender().ok_or(HandlerError::NoSender)?;
            let target = invocation
                .reply_target()
                .ok_or(HandlerError::NoReplyTarget)?;
            client.privmsg(target, &format!("Hello {nick}!"))?;
            Ok(())
        })
    }
}

impl CommandHandler for HelloCommand {
    fn name(&self) -> &str {
        "hello"
    }

    fn triggers(&self) -> TriggerTable {
        TriggerTable::new().on("hello", EventKinds::PUBLIC | EventKinds::PRIVATE)
    }

    fn actions() -> ActionTable<Self> {
        ActionTable::new().action("hello", Self::hello)
    }
}
