use crate::session::{SessionId, SessionStore};
use crate::venue::Venue;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Tag of one issued poll. Only the latest generation may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Monotonic generation counter guarding the book against stale responses.
#[derive(Debug, Default)]
pub struct PollGate {
    latest: u64,
}

impl PollGate {
    pub fn issue(&mut self) -> Generation {
        self.latest += 1;
        Generation(self.latest)
    }

    /// Invalidates every generation issued so far without issuing a new one.
    pub fn supersede(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.latest
    }
}

/// Spawns the book poller of one session.
///
/// Polls on every tick and right after an asset change. Each fetch runs as its own
/// task, so a slow response never delays the next poll; whichever response arrives,
/// the session applies it only if no later poll has been issued since.
/// The task ends once the session is gone.
pub fn spawn(
    store: SessionStore,
    venue: Arc<dyn Venue>,
    id: SessionId,
    every: Duration,
    depth: usize,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let Some(wake) = store.with(&id, |s| s.wake()) else {
            return;
        };

        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = wake.notified() => interval.reset(),
            }

            let Some((generation, asset)) = store.with_mut(&id, |s| s.begin_poll()) else {
                break;
            };

            let store = store.clone();
            let venue = Arc::clone(&venue);
            let id = id.clone();

            tokio::spawn(async move {
                let result = venue.fetch_orderbook(&asset).await;
                store.with_mut(&id, |s| s.apply_poll(generation, &asset, result, depth));
            });
        }

        tracing::debug!("[session {id}] book poller stopped");
    })
}
