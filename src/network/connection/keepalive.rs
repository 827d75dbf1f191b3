//! Self-ping timer.
//!
//! Once registered, an idle interval with no inbound traffic makes the bot
//! send `PING <nick>`. If the ping is still unanswered, and nothing else
//! arrived, after another full interval the peer is considered dead.

use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Instant, Sleep, sleep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum KeepaliveEvent {
    /// Idle for one interval; send a self-ping.
    SendPing,
    /// Idle for a further interval with a ping outstanding.
    Dead,
}

pub(super) struct Keepalive {
    interval: Duration,
    sleep: Pin<Box<Sleep>>,
    outstanding: bool,
}

impl Keepalive {
    pub(super) fn new(interval: Duration) -> Self {
        Self {
            interval,
            sleep: Box::pin(sleep(interval)),
            outstanding: false,
        }
    }

    pub(super) fn interval(&self) -> Duration {
        self.interval
    }

    /// Inbound traffic: reschedule and forget any outstanding ping.
    pub(super) fn reset(&mut self) {
        self.outstanding = false;
        self.sleep.as_mut().reset(Instant::now() + self.interval);
    }

    /// Wait for the next deadline. After `SendPing` the timer is re-armed
    /// for one more interval.
    pub(super) async fn tick(&mut self) -> KeepaliveEvent {
        self.sleep.as_mut().await;
        if self.outstanding {
            return KeepaliveEvent::Dead;
        }
        self.outstanding = true;
        self.sleep.as_mut().reset(Instant::now() + self.interval);
        KeepaliveEvent::SendPing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ping_then_dead() {
        let mut keepalive = Keepalive::new(Duration::from_secs(180));
        let start = Instant::now();

        assert_eq!(keepalive.tick().await, KeepaliveEvent::SendPing);
        assert_eq!(start.elapsed(), Duration::from_secs(180));

        assert_eq!(keepalive.tick().await, KeepaliveEvent::Dead);
        assert_eq!(start.elapsed(), Duration::from_secs(360));
    }

    #[tokio::test(start_paused = true)]
    async fn test_traffic_clears_outstanding_ping() {
        let mut keepalive = Keepalive::new(Duration::from_secs(10));
        assert_eq!(keepalive.tick().await, KeepaliveEvent::SendPing);

        tokio::time::advance(Duration::from_secs(5)).await;
        keepalive.reset();

        let start = Instant::now();
        assert_eq!(keepalive.tick().await, KeepaliveEvent::SendPing);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }
}
