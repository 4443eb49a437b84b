// ── Sync engine ──
//
// Owns the consumer-facing state record, runs the periodic refresh
// loop, and serializes command dispatch with post-command
// reconciliation. All mutation goes through a single watch channel so
// observers always see a consistent whole-record snapshot.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use hearth_api::ServiceAction;

use crate::entity::Entity;
use crate::repository::EntityRepository;

/// How long to wait after a successful command before re-reading hub
/// truth. The hub needs a moment to reflect the actuator's new state;
/// until the follow-up refresh lands, the displayed state may lag the
/// physical device.
const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Default cadence of the background refresh loop.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

// ── Observable state ─────────────────────────────────────────────────

/// The state record observable by consumers.
///
/// Invariants: `is_connected` is true iff the most recent completed
/// refresh succeeded; a set `error` means the most recent refresh or
/// command failed; `entities` always holds the last successfully
/// fetched set — a failed refresh never clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncState {
    pub is_loading: bool,
    pub entities: Vec<Entity>,
    pub error: Option<String>,
    pub is_connected: bool,
}

// ── Configuration ────────────────────────────────────────────────────

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Interval of the periodic refresh loop. Zero disables the loop
    /// entirely (one-shot consumers).
    pub poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

// ── Engine ───────────────────────────────────────────────────────────

/// The entity synchronization engine.
///
/// Cheaply cloneable via `Arc`; one instance owns one periodic refresh
/// task plus any number of caller-invoked refresh / command operations,
/// all publishing into the same watch channel. Overlapping refreshes
/// are not mutually excluded — both are idempotent reads of the same
/// hub, and the last publish wins.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    repository: EntityRepository,
    config: EngineConfig,
    state: watch::Sender<SyncState>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SyncEngine {
    /// Create an engine in the idle state. Does not fetch or spawn
    /// anything — call [`start()`](Self::start).
    pub fn new(repository: EntityRepository, config: EngineConfig) -> Self {
        let (state, _) = watch::channel(SyncState::default());
        Self {
            inner: Arc::new(EngineInner {
                repository,
                config,
                state,
                cancel: CancellationToken::new(),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Perform the initial load and spawn the periodic refresh loop.
    pub async fn start(&self) {
        self.refresh(true).await;

        let interval = self.inner.config.poll_interval;
        if !interval.is_zero() {
            let engine = self.clone();
            let cancel = self.inner.cancel.clone();
            let handle = tokio::spawn(poll_task(engine, interval, cancel));
            self.inner.tasks.lock().await.push(handle);
        }
    }

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    /// The current state snapshot.
    pub fn state(&self) -> SyncState {
        self.inner.state.borrow().clone()
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Fetch all entities and publish the outcome.
    ///
    /// `show_loading` raises the loading flag before the fetch — used
    /// for user-initiated refreshes so the UI can show a spinner;
    /// background ticks pass `false`.
    ///
    /// On success the entity list is fully replaced (no merge). On
    /// failure the previous entities stay visible, the connectivity
    /// flag drops, and the error message is published verbatim.
    pub async fn refresh(&self, show_loading: bool) {
        if show_loading {
            self.publish(|s| {
                s.is_loading = true;
                s.error = None;
            });
        }

        match self.inner.repository.fetch_entities().await {
            Ok(entities) => {
                debug!(count = entities.len(), "refresh complete");
                self.publish(|s| {
                    s.is_loading = false;
                    s.entities = entities;
                    s.is_connected = true;
                    s.error = None;
                });
            }
            Err(e) => {
                warn!(error = %e, "refresh failed");
                self.publish(|s| {
                    s.is_loading = false;
                    s.is_connected = false;
                    s.error = Some(e.to_string());
                });
            }
        }
    }

    /// Toggle an entity, then reconcile against server truth.
    pub async fn toggle_entity(&self, entity_id: &str) {
        self.dispatch(entity_id, ServiceAction::Toggle).await;
    }

    /// Turn an entity on, then reconcile against server truth.
    pub async fn turn_on(&self, entity_id: &str) {
        self.dispatch(entity_id, ServiceAction::TurnOn).await;
    }

    /// Turn an entity off, then reconcile against server truth.
    pub async fn turn_off(&self, entity_id: &str) {
        self.dispatch(entity_id, ServiceAction::TurnOff).await;
    }

    /// Send a command and reconcile.
    ///
    /// No optimistic local flip: after the hub accepts the command we
    /// wait out the settle delay, then re-fetch truth with a background
    /// refresh. A failed command publishes a command-specific error but
    /// leaves entities and the connectivity flag untouched — a failed
    /// write does not imply the hub is unreachable for reads.
    async fn dispatch(&self, entity_id: &str, action: ServiceAction) {
        match self.inner.repository.send_action(entity_id, action).await {
            Ok(()) => {
                debug!(entity_id, %action, "command accepted, reconciling");
                tokio::time::sleep(SETTLE_DELAY).await;
                self.refresh(false).await;
            }
            Err(e) => {
                warn!(entity_id, %action, error = %e, "command failed");
                self.publish(|s| {
                    s.error = Some(format!("{action} failed for {entity_id}: {e}"));
                });
            }
        }
    }

    /// Cancel the periodic loop and join all background tasks.
    ///
    /// After this returns no further tick fires and no state is
    /// published; a refresh already in flight completes silently with
    /// its result discarded.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut tasks = self.inner.tasks.lock().await;
        for handle in tasks.drain(..) {
            let _ = handle.await;
        }
        debug!("sync engine shut down");
    }

    /// Atomically apply a mutation to the state record and notify
    /// subscribers. Equal snapshots are conflated — observers only wake
    /// on real changes. Publishes are dropped once the engine is shut
    /// down so a disposed instance is never mutated.
    fn publish(&self, mutate: impl FnOnce(&mut SyncState)) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        self.inner.state.send_if_modified(|state| {
            let before = state.clone();
            mutate(state);
            *state != before
        });
    }
}

// ── Background loop ──────────────────────────────────────────────────

/// Fixed-cadence refresh loop. Runs for the lifetime of the engine,
/// through arbitrary sequences of hub outages; the only recovery
/// mechanism is the next tick.
async fn poll_task(engine: SyncEngine, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                debug!("poll tick");
                engine.refresh(false).await;
            }
        }
    }
}
