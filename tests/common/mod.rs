//! Integration test common infrastructure.
//!
//! Provides a scripted loopback IRC server the bot under test connects to,
//! plus helpers for waiting on bot state.

pub mod server;

use std::time::Duration;

use slirc_bot::{Client, ConnectionState};
use tokio::time::timeout;

#[allow(unused_imports)]
pub use server::{MockServer, Peer, WAIT};

/// Wait until the bot reaches `state`.
#[allow(dead_code)]
pub async fn wait_for_state(client: &Client, state: ConnectionState) -> anyhow::Result<()> {
    let mut rx = client.watch_state();
    timeout(WAIT, rx.wait_for(|current| *current == state)).await??;
    Ok(())
}

/// Poll `check` until it holds or the wait runs out.
#[allow(dead_code)]
pub async fn eventually<F>(mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
