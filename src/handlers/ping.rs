//! Answers server PINGs.

use std::sync::Arc;

use slirc_proto::command::PING;
use slirc_proto::{Message, encode};

use super::core::{CommandMap, Handler, HandlerFuture, MethodTable};
use crate::client::Client;

/// Replies to `PING` with a `PONG` carrying the same arguments.
#[derive(Debug, Default)]
pub struct PingHandler;

impl PingHandler {
    fn pong(_this: Arc<Self>, client: Client, msg: Arc<Message>) -> HandlerFuture {
        Box::pin(async move {
            let args: Vec<&str> = msg.args.iter().map(String::as_str).collect();
            client.send_raw(encode::pong(&args))?;
            Ok(())
        })
    }
}

impl Handler for PingHandler {
    fn name(&self) -> &str {
        "ping"
    }

    fn commands(&self) -> CommandMap {
        CommandMap::new().on(PING, "pong")
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::new().method("pong", Self::pong)
    }
}
