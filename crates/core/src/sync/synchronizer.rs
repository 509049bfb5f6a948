use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::history::HistoryPoint;
use crate::models::portfolio::PortfolioSnapshot;
use crate::sync::channel::ChannelFactory;
use crate::sync::merge::merge;

/// Fixed delay between a channel failure and the next connection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// One-shot source for the portfolio value time series.
///
/// Implemented by `api::ApiHistoryProvider` in production; tests substitute
/// a mock.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn history(&self, portfolio_id: i64) -> Result<Vec<HistoryPoint>, CoreError>;
}

/// Lifecycle of the push channel behind a synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Channel created, nothing processed yet (also re-entered on each
    /// reconnect attempt).
    Connecting,
    /// At least one message processed on the current connection.
    Streaming,
    /// Transport error seen; a reconnect is scheduled.
    ErroredReconnecting,
    /// Explicit teardown — terminal, no further attempts.
    Closed,
}

/// Tuning knobs for a synchronizer instance. Production uses the defaults;
/// tests shrink the delay so reconnect paths run in milliseconds.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub reconnect_delay: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            reconnect_delay: RECONNECT_DELAY,
        }
    }
}

/// Everything consumers can observe, behind one lock.
#[derive(Debug)]
struct SyncShared {
    snapshot: Option<PortfolioSnapshot>,
    history: Vec<HistoryPoint>,
    channel_state: ChannelState,
    loading: bool,
    error: Option<String>,
}

/// Maintains a local view of one portfolio fed by the server-push channel.
///
/// Bound to exactly one portfolio id for its whole life; rebinding means
/// tearing this instance down and creating a fresh one (the facade does
/// that). The channel task reconnects after `reconnect_delay` on every
/// transport failure, indefinitely, until teardown.
///
/// Teardown is a one-way flag checked before every asynchronous
/// continuation — channel open, message apply, post-delay reconnect,
/// refresh apply — so nothing mutates state after the owning consumer is
/// gone. Dropping the synchronizer tears it down.
pub struct PortfolioSynchronizer {
    portfolio_id: i64,
    shared: Arc<RwLock<SyncShared>>,
    torn_down: Arc<AtomicBool>,
    history_provider: Arc<dyn HistoryProvider>,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for PortfolioSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioSynchronizer")
            .field("portfolio_id", &self.portfolio_id)
            .field("channel_state", &self.channel_state())
            .field("torn_down", &self.torn_down.load(Ordering::Acquire))
            .finish()
    }
}

impl PortfolioSynchronizer {
    /// Start synchronizing `portfolio_id`. Spawns the channel task
    /// immediately; state begins as `Connecting` with `loading = true`.
    pub fn spawn(
        factory: Arc<dyn ChannelFactory>,
        history_provider: Arc<dyn HistoryProvider>,
        portfolio_id: i64,
        options: SyncOptions,
    ) -> Self {
        let shared = Arc::new(RwLock::new(SyncShared {
            snapshot: None,
            history: Vec::new(),
            channel_state: ChannelState::Connecting,
            loading: true,
            error: None,
        }));
        let torn_down = Arc::new(AtomicBool::new(false));

        let handle = tokio::spawn(run_channel_loop(
            factory,
            Arc::clone(&shared),
            Arc::clone(&torn_down),
            portfolio_id,
            options.reconnect_delay,
        ));

        Self {
            portfolio_id,
            shared,
            torn_down,
            history_provider,
            handle: Some(handle),
        }
    }

    #[must_use]
    pub fn portfolio_id(&self) -> i64 {
        self.portfolio_id
    }

    // ── Read-only views ─────────────────────────────────────────────

    /// The merged snapshot as of the latest processed message. Remains
    /// readable while the channel is down or reconnecting.
    #[must_use]
    pub fn snapshot(&self) -> Option<PortfolioSnapshot> {
        self.read().snapshot.clone()
    }

    /// The most recently fetched history sequence.
    #[must_use]
    pub fn history(&self) -> Vec<HistoryPoint> {
        self.read().history.clone()
    }

    #[must_use]
    pub fn channel_state(&self) -> ChannelState {
        self.read().channel_state
    }

    /// True until the first message of the current binding is processed.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.read().loading
    }

    /// Last surfaced failure, if any. Not cleared by later successes —
    /// consumers decide when to dismiss it.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.read().error.clone()
    }

    // ── Operations ──────────────────────────────────────────────────

    /// Pull the history sequence once and replace it wholesale.
    ///
    /// Independent of the push channel; no retry. A failure is captured
    /// into the error status and the previous sequence stays untouched.
    pub async fn refresh(&self) {
        let result = self.history_provider.history(self.portfolio_id).await;
        if self.torn_down.load(Ordering::Acquire) {
            return;
        }
        let mut shared = self.write();
        match result {
            Ok(points) => {
                debug!(
                    portfolio_id = self.portfolio_id,
                    points = points.len(),
                    "history refreshed"
                );
                shared.history = points;
            }
            Err(e) => {
                warn!(portfolio_id = self.portfolio_id, error = %e, "history refresh failed");
                shared.error = Some(e.to_string());
            }
        }
    }

    /// Stop synchronizing: no further reconnect attempts and no further
    /// state updates from in-flight work. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.write().channel_state = ChannelState::Closed;
        debug!(portfolio_id = self.portfolio_id, "synchronizer torn down");
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SyncShared> {
        self.shared.read().expect("sync state lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SyncShared> {
        self.shared.write().expect("sync state lock poisoned")
    }
}

impl Drop for PortfolioSynchronizer {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ── Channel task ────────────────────────────────────────────────────

async fn run_channel_loop(
    factory: Arc<dyn ChannelFactory>,
    shared: Arc<RwLock<SyncShared>>,
    torn_down: Arc<AtomicBool>,
    portfolio_id: i64,
    reconnect_delay: Duration,
) {
    loop {
        if torn_down.load(Ordering::Acquire) {
            return;
        }
        set_state(&shared, ChannelState::Connecting);

        match factory.open(portfolio_id).await {
            Ok(mut channel) => {
                debug!(portfolio_id, "push channel open");
                loop {
                    match channel.recv().await {
                        Ok(Some(payload)) => {
                            if torn_down.load(Ordering::Acquire) {
                                return;
                            }
                            apply_message(&shared, &payload);
                        }
                        Ok(None) => {
                            info!(portfolio_id, "push channel closed by server");
                            break;
                        }
                        Err(e) => {
                            warn!(portfolio_id, error = %e, "push channel transport error");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(portfolio_id, error = %e, "failed to open push channel");
            }
        }

        if torn_down.load(Ordering::Acquire) {
            return;
        }
        set_state(&shared, ChannelState::ErroredReconnecting);
        info!(portfolio_id, delay_secs = reconnect_delay.as_secs_f64(), "reconnecting");
        tokio::time::sleep(reconnect_delay).await;
    }
}

fn set_state(shared: &RwLock<SyncShared>, state: ChannelState) {
    shared.write().expect("sync state lock poisoned").channel_state = state;
}

/// Process one inbound payload: parse, merge, publish. A malformed message
/// surfaces an error and leaves the held snapshot untouched.
fn apply_message(shared: &RwLock<SyncShared>, payload: &str) {
    match serde_json::from_str::<PortfolioSnapshot>(payload) {
        Ok(incoming) => {
            let mut s = shared.write().expect("sync state lock poisoned");
            let merged = merge(s.snapshot.as_ref(), incoming);
            s.snapshot = Some(merged);
            s.loading = false;
            s.channel_state = ChannelState::Streaming;
        }
        Err(e) => {
            warn!(error = %e, "malformed portfolio message");
            let mut s = shared.write().expect("sync state lock poisoned");
            s.error = Some(CoreError::MalformedMessage(e.to_string()).to_string());
            s.loading = false;
        }
    }
}
