//! Session-scoped sync engine: owns the scheduler state, the capability
//! record and the current identity, and runs push and pull cycles.

use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;

use super::capability_prober::{probe_capabilities, CapabilityRecord};
use super::mutation_tracker::{MutationSink, TrackedLocalStore};
use super::pull_protocol::pull_snapshot;
use super::push_protocol::{push_snapshot, LocalSnapshot};
use super::sync_config::SyncConfig;
use super::sync_model::{
    ClaimReport, GuestDataPolicy, PullOutcome, SyncEvent, SyncResponse, SyncStatus,
    UserTransitionReport, NO_USER_MESSAGE, SYNC_DISABLED_MESSAGE,
};
use super::sync_scheduler::{DebounceTimer, FireDecision, SyncKind, SyncScheduler};
use super::user_lifecycle::{claim_guest_data, discard_guest_data, is_workspace_empty};
use crate::errors::{Error, Result};
use crate::store::{LocalStoreTrait, OwnerFilter, RemoteStoreTrait};
use crate::trades::TradeStats;

const EVENT_CHANNEL_CAPACITY: usize = 64;

struct EngineState {
    scheduler: SyncScheduler,
    timer: DebounceTimer,
    user_id: Option<String>,
    capabilities: CapabilityRecord,
    guest_policy: GuestDataPolicy,
    last_push_at: Option<chrono::DateTime<Utc>>,
    last_pull_at: Option<chrono::DateTime<Utc>>,
    last_error: Option<String>,
    trade_stats: Option<TradeStats>,
    /// Pending deferred capability check of the current session.
    capability_check: Option<AbortHandle>,
}

struct EngineInner {
    /// Untracked store; the engine's own writes never schedule a push.
    local: Arc<dyn LocalStoreTrait>,
    remote: Option<Arc<dyn RemoteStoreTrait>>,
    config: SyncConfig,
    state: Mutex<EngineState>,
    events: broadcast::Sender<SyncEvent>,
}

impl EngineInner {
    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the guard flag when the cycle ends, however it ends.
struct CycleGuard {
    inner: Arc<EngineInner>,
    kind: SyncKind,
    succeeded: bool,
}

impl CycleGuard {
    fn acquire(inner: &Arc<EngineInner>, kind: SyncKind) -> Option<Self> {
        if !inner.lock_state().scheduler.try_begin(kind) {
            return None;
        }
        Some(Self {
            inner: Arc::clone(inner),
            kind,
            succeeded: false,
        })
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.inner
            .lock_state()
            .scheduler
            .finish(self.kind, self.succeeded);
    }
}

/// Cheap to clone; all clones share one engine.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

impl SyncEngine {
    /// `remote` is `None` for a local-only session.
    pub fn new(
        local: Arc<dyn LocalStoreTrait>,
        remote: Option<Arc<dyn RemoteStoreTrait>>,
        config: SyncConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let state = EngineState {
            scheduler: SyncScheduler::new(config.debounce),
            timer: DebounceTimer::new(),
            user_id: None,
            capabilities: CapabilityRecord::default(),
            guest_policy: GuestDataPolicy::default(),
            last_push_at: None,
            last_pull_at: None,
            last_error: None,
            trade_stats: None,
            capability_check: None,
        };
        Self {
            inner: Arc::new(EngineInner {
                local,
                remote,
                config,
                state: Mutex::new(state),
                events,
            }),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.config.enabled && self.inner.remote.is_some()
    }

    fn active_remote(&self) -> Option<Arc<dyn RemoteStoreTrait>> {
        if !self.inner.config.enabled {
            return None;
        }
        self.inner.remote.clone()
    }

    /// The local store UI writes should go through.
    pub fn tracked_store(&self) -> TrackedLocalStore {
        TrackedLocalStore::new(Arc::clone(&self.inner.local), Arc::new(self.clone()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.events.subscribe()
    }

    fn emit(&self, event: SyncEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    pub fn set_guest_policy(&self, policy: GuestDataPolicy) {
        self.inner.lock_state().guest_policy = policy;
    }

    pub fn current_user(&self) -> Option<String> {
        self.inner.lock_state().user_id.clone()
    }

    pub fn capabilities(&self) -> CapabilityRecord {
        self.inner.lock_state().capabilities
    }

    pub fn is_syncing(&self) -> bool {
        self.inner.lock_state().scheduler.is_syncing()
    }

    pub fn status(&self) -> SyncStatus {
        let state = self.inner.lock_state();
        SyncStatus {
            is_syncing: state.scheduler.is_syncing(),
            phase: state.scheduler.phase(),
            enabled: self.is_enabled(),
            user_id: state.user_id.clone(),
            capabilities: state.capabilities,
            capability_tier: state.capabilities.tier(),
            pending_changes: state.scheduler.has_pending_changes(),
            last_push_at: state.last_push_at,
            last_pull_at: state.last_pull_at,
            last_error: state.last_error.clone(),
            trade_stats: state.trade_stats,
        }
    }

    /// Schedules the deferred capability probe. Does nothing without a user.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if !self.is_enabled() || self.current_user().is_none() {
            log::debug!("[Sync] Not starting: sync disabled or no user");
            return None;
        }
        let engine = self.clone();
        let delay = self.inner.config.probe_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            engine.refresh_capabilities().await;
        });
        if let Some(previous) = self
            .inner
            .lock_state()
            .capability_check
            .replace(handle.abort_handle())
        {
            previous.abort();
        }
        Some(handle)
    }

    /// Probes the remote and caches the result for the session.
    pub async fn refresh_capabilities(&self) -> CapabilityRecord {
        let previous = self.capabilities();
        let Some(remote) = self.active_remote() else {
            return previous;
        };
        if self.current_user().is_none() {
            log::debug!("[Capabilities] Skipping probe: no user");
            return previous;
        }
        let record = probe_capabilities(remote.as_ref(), previous).await;
        self.inner.lock_state().capabilities = record;
        self.emit(SyncEvent::CapabilitiesResolved {
            capabilities: record,
        });
        record
    }

    /// Identity transition. Signing in clears guest data (or claims it,
    /// depending on the guest policy), schedules the deferred capability
    /// probe and offers an import when the user's local workspace is empty.
    /// It never pulls on its own.
    pub async fn on_user_changed(&self, user_id: Option<String>) -> UserTransitionReport {
        let mut report = UserTransitionReport {
            user_id: user_id.clone(),
            ..Default::default()
        };
        let policy = {
            let mut state = self.inner.lock_state();
            if state.user_id == user_id {
                return report;
            }
            state.timer.cancel();
            state.scheduler.cancel();
            if let Some(pending) = state.capability_check.take() {
                pending.abort();
            }
            state.user_id = user_id.clone();
            state.capabilities = CapabilityRecord::default();
            state.last_error = None;
            state.trade_stats = None;
            state.guest_policy
        };

        let Some(user_id) = user_id else {
            log::info!("[Lifecycle] Signed out; continuing with guest data");
            return report;
        };
        log::info!("[Lifecycle] User signed in; guest policy {:?}", policy);

        let local = self.inner.local.as_ref();
        if policy == GuestDataPolicy::Claim {
            let claim = claim_guest_data(local, &user_id).await;
            if claim.total_claimed() > 0 {
                self.schedule_push();
            }
            report.claim = Some(claim);
        }
        match discard_guest_data(local).await {
            Ok(()) => report.guest_data_cleared = true,
            Err(err) => log::error!("[Lifecycle] Failed to clear guest data: {}", err),
        }

        if !self.is_enabled() {
            return report;
        }
        self.start();

        match is_workspace_empty(local, &user_id).await {
            Ok(true) => {
                log::info!("[Lifecycle] Local workspace is empty; offering import");
                report.import_available = true;
                self.emit(SyncEvent::ImportAvailable { user_id });
            }
            Ok(false) => {}
            Err(err) => log::warn!("[Lifecycle] Could not inspect local workspace: {}", err),
        }
        report
    }

    /// Reassigns ownerless records to the current user and schedules a push.
    pub async fn claim_guest_data(&self) -> Result<ClaimReport> {
        let user_id = self
            .current_user()
            .ok_or_else(|| Error::invalid_input(NO_USER_MESSAGE))?;
        let report = claim_guest_data(self.inner.local.as_ref(), &user_id).await;
        if report.total_claimed() > 0 {
            self.schedule_push();
        }
        Ok(report)
    }

    /// Runs the pull the user agreed to after an import offer.
    pub async fn confirm_import(&self) -> SyncResponse {
        log::info!("[Lifecycle] Import confirmed");
        self.sync_now().await
    }

    fn preflight(&self) -> std::result::Result<(Arc<dyn RemoteStoreTrait>, String), SyncResponse> {
        let Some(remote) = self.active_remote() else {
            return Err(SyncResponse::failed(SYNC_DISABLED_MESSAGE));
        };
        let Some(user_id) = self.current_user() else {
            return Err(SyncResponse::failed(NO_USER_MESSAGE));
        };
        Ok((remote, user_id))
    }

    fn finish_cycle(&self, kind: SyncKind, response: &SyncResponse) {
        {
            let mut state = self.inner.lock_state();
            if response.success {
                state.last_error = None;
                match kind {
                    SyncKind::Push => state.last_push_at = Some(Utc::now()),
                    SyncKind::Pull => state.last_pull_at = Some(Utc::now()),
                }
            } else {
                state.last_error = response.error.clone();
            }
        }
        self.emit(SyncEvent::SyncFinished {
            kind,
            result: response.clone(),
        });
    }

    /// Manual sync: pull the user's remote data. Never fails outward; busy
    /// and error cases come back as an unsuccessful response.
    pub async fn sync_now(&self) -> SyncResponse {
        let (remote, user_id) = match self.preflight() {
            Ok(ready) => ready,
            Err(response) => return response,
        };
        let Some(mut guard) = CycleGuard::acquire(&self.inner, SyncKind::Pull) else {
            log::debug!("[Sync] Pull requested while a cycle is running");
            return SyncResponse::busy();
        };
        self.emit(SyncEvent::SyncStarted {
            kind: SyncKind::Pull,
        });
        let capabilities = self.capabilities();
        let local = self.inner.local.as_ref();

        let response = match pull_snapshot(
            local,
            remote.as_ref(),
            &user_id,
            &capabilities,
            self.inner.config.pnl_epsilon,
        )
        .await
        {
            Ok(outcome) => {
                guard.succeeded = true;
                if let Ok(trades) = local
                    .get_trades(OwnerFilter::User(user_id.clone()))
                    .await
                    .into_result()
                {
                    self.inner.lock_state().trade_stats = Some(TradeStats::from_trades(&trades));
                }
                if matches!(outcome, PullOutcome::Rehydrated(_)) {
                    self.emit(SyncEvent::DataReloaded {
                        user_id: user_id.clone(),
                    });
                }
                SyncResponse::ok(outcome.message())
            }
            Err(err) => {
                log::error!("[Pull] Sync failed: {}", err);
                SyncResponse::failed(format!("Sync failed: {}", err))
            }
        };
        drop(guard);
        self.finish_cycle(SyncKind::Pull, &response);
        response
    }

    /// Replaces the user's remote data with the local snapshot now.
    pub async fn push_now(&self) -> SyncResponse {
        let (remote, user_id) = match self.preflight() {
            Ok(ready) => ready,
            Err(response) => return response,
        };
        let Some(mut guard) = CycleGuard::acquire(&self.inner, SyncKind::Push) else {
            log::debug!("[Sync] Push requested while a cycle is running");
            return SyncResponse::busy();
        };
        self.emit(SyncEvent::SyncStarted {
            kind: SyncKind::Push,
        });
        let capabilities = self.capabilities();

        let response = match LocalSnapshot::read(self.inner.local.as_ref(), &user_id).await {
            Err(err) => {
                log::error!("[Push] Could not read local data; remote untouched: {}", err);
                SyncResponse::failed(format!("Failed to read local data: {}", err))
            }
            Ok(snapshot) => {
                let report = push_snapshot(remote.as_ref(), &user_id, &capabilities, &snapshot).await;
                if report.is_success() {
                    guard.succeeded = true;
                    self.inner.lock_state().trade_stats = Some(snapshot.trade_stats());
                    SyncResponse::ok(report.summary())
                } else {
                    SyncResponse::failed(report.summary())
                }
            }
        };
        drop(guard);
        self.finish_cycle(SyncKind::Push, &response);
        response
    }

    /// Records a local mutation: (re)arms the debounce timer.
    ///
    /// Guest writes and writes without a remote are not scheduled.
    pub fn schedule_push(&self) {
        if !self.is_enabled() {
            return;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            log::warn!("[Sync] Mutation recorded outside the async runtime; push not scheduled");
            return;
        }
        let mut state = self.inner.lock_state();
        if state.user_id.is_none() {
            return;
        }
        let fire = state.scheduler.arm(Instant::now());
        let engine = self.clone();
        // The push runs in its own task so re-arming cannot abort it.
        state.timer.arm(fire.deadline, move || {
            tokio::spawn(async move {
                engine.on_debounce_elapsed(fire.generation).await;
            });
        });
    }

    async fn on_debounce_elapsed(&self, generation: u64) {
        let decision = self.inner.lock_state().scheduler.fire(generation);
        match decision {
            FireDecision::Run => {
                let response = self.push_now().await;
                if !response.success {
                    log::warn!(
                        "[Sync] Scheduled push did not complete: {}",
                        response.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
            FireDecision::Busy => {
                log::debug!("[Sync] Scheduled push dropped: a sync cycle is running");
            }
            FireDecision::Superseded => {}
        }
    }
}

impl MutationSink for SyncEngine {
    fn record_mutation(&self) {
        self.schedule_push();
    }
}
