//! Logs messages nothing else understands.

use std::sync::Arc;

use slirc_proto::Message;
use slirc_proto::command::UNKNOWN_CODE;
use tracing::info;

use super::core::{CommandMap, Handler, HandlerFuture, MethodTable};
use crate::client::Client;

#[derive(Debug, Default)]
pub struct UnknownCodeHandler;

impl UnknownCodeHandler {
    fn unknown_code(_this: Arc<Self>, _client: Client, msg: Arc<Message>) -> HandlerFuture {
        Box::pin(async move {
            info!(command = %msg.command, erroneous = msg.erroneous, "received an unknown command");
            Ok(())
        })
    }
}

impl Handler for UnknownCodeHandler {
    fn name(&self) -> &str {
        "unknown_code"
    }

    fn commands(&self) -> CommandMap {
        CommandMap::new().on(UNKNOWN_CODE, "unknown_code")
    }

    fn methods() -> MethodTable<Self> {
        MethodTable::new().method("unknown_code", Self::unknown_code)
    }
}
