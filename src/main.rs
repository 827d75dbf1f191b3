//! slircbot - runs one supervised bot per configured network.

use slirc_bot::config::ServerConfig;
use slirc_bot::{Bot, Config, ConnectionState, HelloCommand};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let loaded = Config::load(&config_path);

    // RUST_LOG wins, then the config file, then "info".
    let fallback = loaded
        .as_ref()
        .map(|config| config.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&fallback)),
        )
        .with_target(true)
        .init();

    let config = loaded.map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        servers = config.servers.len(),
        version = env!("CARGO_PKG_VERSION"),
        "Starting slircbot"
    );

    let quit = CancellationToken::new();
    let abort = CancellationToken::new();
    let mut bots = JoinSet::new();
    for server in config.servers {
        bots.spawn(supervise(server, quit.clone(), abort.clone()));
    }

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!(error = %e, "Failed to listen for Ctrl-C");
                    break;
                }
                if quit.is_cancelled() {
                    warn!("Second interrupt, aborting in-flight handlers");
                    abort.cancel();
                } else {
                    info!("Interrupted, quitting (press Ctrl-C again to force)");
                    quit.cancel();
                }
            }
            joined = bots.join_next() => match joined {
                Some(Ok(())) => {}
                Some(Err(e)) => error!(error = %e, "Supervisor task failed"),
                None => break,
            },
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Run one network's bot, recreating it after failures while reconnecting
/// is enabled.
async fn supervise(server: ServerConfig, quit: CancellationToken, abort: CancellationToken) {
    let label = server.label().to_owned();
    let rights = server.rights();
    let mut attempt: u32 = 0;

    loop {
        let bot = Bot::new(server.settings());
        if let Err(e) = bot.add_command_handler_with_rights(HelloCommand, rights.clone()) {
            error!(server = %label, error = %e, "Invalid handler configuration");
            return;
        }
        let client = bot.client();
        let registry = bot.registry();
        let mut state = client.watch_state();

        let run = bot.run();
        tokio::pin!(run);
        let result = loop {
            tokio::select! {
                result = &mut run => break result,
                () = quit.cancelled(), if !client.is_shutdown() => {
                    if let Err(e) = client.quit() {
                        warn!(server = %label, error = %e, "Failed to queue QUIT");
                    }
                }
                () = abort.cancelled() => {
                    registry.abort_in_flight();
                    return;
                }
                Ok(()) = state.changed() => {
                    if *state.borrow() == ConnectionState::Connected {
                        attempt = 0;
                    }
                }
            }
        };

        match result {
            Ok(()) => {
                info!(server = %label, "Bot stopped");
                tokio::select! {
                    () = registry.wait_idle() => {}
                    () = abort.cancelled() => registry.abort_in_flight(),
                }
                return;
            }
            Err(e) => warn!(server = %label, error = %e, code = e.error_code(), "Bot disconnected"),
        }

        if quit.is_cancelled() || !server.reconnect.enabled {
            return;
        }
        let delay = server.reconnect.delay(attempt);
        attempt = attempt.saturating_add(1);
        info!(server = %label, delay_secs = delay.as_secs(), attempt, "Reconnecting");
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = quit.cancelled() => return,
        }
    }
}
