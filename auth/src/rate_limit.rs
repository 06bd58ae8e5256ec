use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// How long request timestamps are retained by [`RateLimiter::cleanup`].
pub const RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// In-memory sliding-window rate limiter keyed by arbitrary strings.
///
/// Each key keeps the instants of its accepted requests. A request is allowed
/// when fewer than `max_requests` of them fall inside the trailing window.
#[derive(Debug, Default)]
pub struct RateLimiter {
    requests: RwLock<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a request under `key` is allowed and record it if so.
    ///
    /// Timestamps at or before `now - window` are evicted on every call,
    /// whether or not the request is allowed.
    ///
    /// # Arguments
    /// * `key` - Bucket identifier (e.g. `login:alice@example.com`)
    /// * `max_requests` - Requests permitted inside one window
    /// * `window` - Length of the sliding window
    pub async fn is_allowed(&self, key: &str, max_requests: usize, window: Duration) -> bool {
        let now = Instant::now();
        let mut requests = self.requests.write().await;
        let timestamps = requests.entry(key.to_string()).or_default();

        if let Some(window_start) = now.checked_sub(window) {
            timestamps.retain(|t| *t > window_start);
        }

        if timestamps.len() < max_requests {
            timestamps.push(now);
            true
        } else {
            tracing::debug!(key, max_requests, "rate limit exceeded");
            false
        }
    }

    /// Time until the oldest recorded request under `key` leaves the window.
    ///
    /// Returns zero for unknown keys or when the window has already passed.
    pub async fn remaining_cooldown(&self, key: &str, window: Duration) -> Duration {
        let requests = self.requests.read().await;

        let Some(oldest) = requests.get(key).and_then(|t| t.iter().min()) else {
            return Duration::ZERO;
        };

        (*oldest + window).saturating_duration_since(Instant::now())
    }

    /// Drop timestamps older than [`RETENTION`] and forget keys left empty.
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let mut requests = self.requests.write().await;
        let before = requests.len();

        if let Some(cutoff) = now.checked_sub(RETENTION) {
            for timestamps in requests.values_mut() {
                timestamps.retain(|t| *t > cutoff);
            }
        }
        requests.retain(|_, timestamps| !timestamps.is_empty());

        tracing::debug!(
            removed = before - requests.len(),
            remaining = requests.len(),
            "rate limiter cleanup"
        );
    }

    /// Run [`RateLimiter::cleanup`] every `every` until the returned task is shut down.
    ///
    /// The first pass happens one full period after spawning.
    pub fn spawn_cleanup(self: &Arc<Self>, every: Duration) -> CleanupTask {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let limiter = Arc::clone(self);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        tracing::debug!("rate limiter cleanup stopped");
                        break;
                    }
                    _ = ticker.tick() => limiter.cleanup().await,
                }
            }
        });

        CleanupTask {
            shutdown: shutdown_tx,
            handle,
        }
    }

    /// Number of keys currently tracked.
    pub async fn tracked_keys(&self) -> usize {
        self.requests.read().await.len()
    }
}

/// Handle to the periodic cleanup started by [`RateLimiter::spawn_cleanup`].
#[derive(Debug)]
pub struct CleanupTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl CleanupTask {
    /// Stop the cleanup loop and wait for it to finish.
    pub async fn shutdown(self) {
        // The loop may already be gone if the runtime is shutting down.
        let _ = self.shutdown.send(());
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "rate limiter cleanup task failed");
        }
    }
}
