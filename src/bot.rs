//! Bot - one connection's engine, ready to run.
//!
//! A `Bot` owns a fresh [`Registry`] and the [`Client`] its handlers will
//! receive. Handlers may be added before [`Bot::run`] and, through the
//! registry handle, while it runs.

use std::sync::Arc;

use slirc_proto::{OutgoingLines, transport};
use tracing::error;

use crate::client::Client;
use crate::config::BotSettings;
use crate::error::{EngineError, HandlerConfigError};
use crate::handlers::{
    CommandHandler, Commands, CtcpHandler, Handler, HandlerId, PingHandler, Registry, Rights,
    UnknownCodeHandler,
};
use crate::network::connection::Connection;

pub struct Bot {
    client: Client,
    registry: Arc<Registry>,
    outgoing: OutgoingLines,
}

impl Bot {
    /// A bot with the default handlers: CTCP replies, PING answers and
    /// logging of unknown commands.
    pub fn new(settings: BotSettings) -> Self {
        let bot = Self::without_defaults(settings);
        bot.register_default(CtcpHandler::default());
        bot.register_default(PingHandler);
        bot.register_default(UnknownCodeHandler);
        bot
    }

    /// A bot with an empty registry.
    pub fn without_defaults(settings: BotSettings) -> Self {
        let registry = Arc::new(Registry::new(settings.max_concurrent_handlers));
        let (sender, outgoing) = transport::outbound();
        let client = Client::new(Arc::new(settings), sender);
        Self {
            client,
            registry,
            outgoing,
        }
    }

    fn register_default<H: Handler>(&self, handler: H) {
        if let Err(e) = self.registry.add_handler(handler) {
            error!(error = %e, "failed to register default handler");
        }
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    pub fn add_handler<H: Handler>(&self, handler: H) -> Result<HandlerId, HandlerConfigError> {
        self.registry.add_handler(handler)
    }

    pub fn add_command_handler<H: CommandHandler>(
        &self,
        handler: H,
    ) -> Result<HandlerId, HandlerConfigError> {
        self.registry.add_command_handler(handler)
    }

    /// Add a command handler whose actions are gated by `rights`.
    pub fn add_command_handler_with_rights<H: CommandHandler>(
        &self,
        handler: H,
        rights: Rights,
    ) -> Result<HandlerId, HandlerConfigError> {
        self.registry
            .add_handler(Commands::new(handler)?.with_interceptor(rights))
    }

    /// Run the connection until [`Client::quit`] or a failure.
    pub async fn run(self) -> Result<(), EngineError> {
        Connection::new(self.client, self.registry)
            .run(self.outgoing)
            .await
    }
}
