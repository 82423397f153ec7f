//! Push scheduling: debounce state machine and cancellable timer.
//!
//! `Idle -> Scheduled -> Syncing -> Idle`. A mutation while scheduled resets
//! the window. A timer that elapses while a cycle is running is dropped, not
//! queued; the next mutation schedules again.

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

/// Externally visible phase of the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    Scheduled,
    Syncing,
}

/// Kind of cycle holding the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncKind {
    Push,
    Pull,
}

/// What to do when a debounce timer elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireDecision {
    /// Start a push now.
    Run,
    /// A later mutation re-armed the window; this firing is stale.
    Superseded,
    /// A cycle is running; the firing is dropped.
    Busy,
}

/// Handle returned when the debounce window is (re)armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledFire {
    pub generation: u64,
    pub deadline: Instant,
}

/// Debounce and mutual-exclusion state owned by one engine instance.
#[derive(Debug)]
pub struct SyncScheduler {
    debounce: Duration,
    deadline: Option<Instant>,
    generation: u64,
    active: Option<SyncKind>,
    /// Local changes not yet covered by a successful push.
    dirty: bool,
}

impl SyncScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            deadline: None,
            generation: 0,
            active: None,
            dirty: false,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        if self.active.is_some() {
            SyncPhase::Syncing
        } else if self.deadline.is_some() {
            SyncPhase::Scheduled
        } else {
            SyncPhase::Idle
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<SyncKind> {
        self.active
    }

    pub fn has_pending_changes(&self) -> bool {
        self.dirty
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Records a local mutation and restarts the debounce window.
    ///
    /// Arming is allowed while syncing; the firing decision happens later.
    pub fn arm(&mut self, now: Instant) -> ScheduledFire {
        self.dirty = true;
        self.generation = self.generation.wrapping_add(1);
        let deadline = now + self.debounce;
        self.deadline = Some(deadline);
        ScheduledFire {
            generation: self.generation,
            deadline,
        }
    }

    /// Forgets any scheduled push.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.deadline = None;
    }

    /// Decides the fate of the timer armed as `generation`.
    pub fn fire(&mut self, generation: u64) -> FireDecision {
        if generation != self.generation || self.deadline.is_none() {
            return FireDecision::Superseded;
        }
        self.deadline = None;
        if self.active.is_some() {
            return FireDecision::Busy;
        }
        FireDecision::Run
    }

    /// Check-then-set of the guard. Returns `false` when a cycle is running.
    pub fn try_begin(&mut self, kind: SyncKind) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(kind);
        if kind == SyncKind::Push {
            // The snapshot read by this push covers every mutation so far.
            self.dirty = false;
        }
        true
    }

    /// Releases the guard. A failed push leaves the changes pending.
    pub fn finish(&mut self, kind: SyncKind, succeeded: bool) {
        if self.active == Some(kind) {
            self.active = None;
        }
        if kind == SyncKind::Push && !succeeded {
            self.dirty = true;
        }
    }
}

/// Cancellable one-shot timer on the tokio clock.
///
/// Re-arming aborts the previous timer. The callback runs synchronously right
/// after the deadline, so it should only hand work off (e.g. spawn a task).
#[derive(Debug, Default)]
pub struct DebounceTimer {
    handle: Option<JoinHandle<()>>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm<F>(&mut self, deadline: Instant, on_fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            on_fire();
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const WINDOW: Duration = Duration::from_millis(1_000);

    #[test]
    fn rearming_supersedes_the_previous_generation() {
        let mut scheduler = SyncScheduler::new(WINDOW);
        let now = Instant::now();
        let first = scheduler.arm(now);
        let second = scheduler.arm(now + Duration::from_millis(100));

        assert_eq!(scheduler.phase(), SyncPhase::Scheduled);
        assert_eq!(second.deadline, now + Duration::from_millis(1_100));
        assert_eq!(scheduler.fire(first.generation), FireDecision::Superseded);
        assert_eq!(scheduler.fire(second.generation), FireDecision::Run);
        assert_eq!(scheduler.phase(), SyncPhase::Idle);
    }

    #[test]
    fn firing_while_syncing_is_dropped() {
        let mut scheduler = SyncScheduler::new(WINDOW);
        assert!(scheduler.try_begin(SyncKind::Pull));
        let fire = scheduler.arm(Instant::now());
        assert_eq!(scheduler.phase(), SyncPhase::Syncing);

        assert_eq!(scheduler.fire(fire.generation), FireDecision::Busy);
        scheduler.finish(SyncKind::Pull, true);
        assert_eq!(scheduler.phase(), SyncPhase::Idle);
        assert_eq!(scheduler.fire(fire.generation), FireDecision::Superseded);
    }

    #[test]
    fn guard_is_mutually_exclusive() {
        let mut scheduler = SyncScheduler::new(WINDOW);
        assert!(scheduler.try_begin(SyncKind::Push));
        assert!(!scheduler.try_begin(SyncKind::Pull));
        assert!(!scheduler.try_begin(SyncKind::Push));
        scheduler.finish(SyncKind::Push, true);
        assert!(scheduler.try_begin(SyncKind::Pull));
    }

    #[test]
    fn failed_push_keeps_changes_pending() {
        let mut scheduler = SyncScheduler::new(WINDOW);
        scheduler.arm(Instant::now());
        assert!(scheduler.has_pending_changes());

        assert!(scheduler.try_begin(SyncKind::Push));
        assert!(!scheduler.has_pending_changes());
        scheduler.finish(SyncKind::Push, false);
        assert!(scheduler.has_pending_changes());

        assert!(scheduler.try_begin(SyncKind::Push));
        scheduler.finish(SyncKind::Push, true);
        assert!(!scheduler.has_pending_changes());
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut scheduler = SyncScheduler::new(WINDOW);
        let fire = scheduler.arm(Instant::now());
        scheduler.cancel();
        assert_eq!(scheduler.phase(), SyncPhase::Idle);
        assert_eq!(scheduler.fire(fire.generation), FireDecision::Superseded);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_once_after_the_last_arm() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DebounceTimer::new();

        for _ in 0..5 {
            let counter = Arc::clone(&fired);
            timer.arm(Instant::now() + WINDOW, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(timer.is_armed());

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = DebounceTimer::new();
        let counter = Arc::clone(&fired);
        timer.arm(Instant::now() + WINDOW, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        timer.cancel();

        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
