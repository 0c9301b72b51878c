//! Heartbeat scheduler

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::Outbound;
use crate::protocol::GatewayMessage;

/// A running heartbeat task
///
/// The first heartbeat goes out one interval after start. Stopping (or
/// dropping) the handle cancels the task before its next tick.
#[derive(Debug)]
pub struct Heartbeat {
    interval: Duration,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Heartbeat {
    /// Spawn the heartbeat task
    ///
    /// `interval` must be non-zero.
    pub fn start(interval: Duration, outbound: Outbound) -> Self {
        let token = CancellationToken::new();
        let task = tokio::spawn(beat(interval, outbound, token.clone()));
        tracing::debug!(interval_ms = interval.as_millis() as u64, "Heartbeat started");
        Self {
            interval,
            token,
            task,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn beat(interval: Duration, outbound: Outbound, token: CancellationToken) {
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let frame = GatewayMessage::heartbeat(chrono::Utc::now().timestamp());
        if let Err(e) = outbound.send_message(&frame).await {
            tracing::warn!(error = %e, "Failed to send heartbeat");
            break;
        }
        tracing::trace!("Heartbeat sent");
    }

    tracing::debug!("Heartbeat stopped");
}
