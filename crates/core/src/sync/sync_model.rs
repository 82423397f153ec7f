//! Results, reports, status and events of the sync engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::capability_prober::{CapabilityRecord, CapabilityTier};
use super::sync_scheduler::{SyncKind, SyncPhase};
use crate::trades::TradeStats;

pub const SYNC_BUSY_MESSAGE: &str = "A sync is already in progress";
pub const SYNC_DISABLED_MESSAGE: &str = "Sync is disabled";
pub const NO_USER_MESSAGE: &str = "No signed-in user";

/// Result returned to the UI by every top-level sync call.
///
/// `{success, message}` on success, `{success: false, error}` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }

    pub fn busy() -> Self {
        Self::failed(SYNC_BUSY_MESSAGE)
    }

    pub fn is_busy(&self) -> bool {
        !self.success && self.error.as_deref() == Some(SYNC_BUSY_MESSAGE)
    }
}

/// One stage of the push pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushStep {
    RemoteWipe,
    Accounts,
    Trades,
    CopyGroups,
    PillColors,
    DailyJournals,
    Profile,
}

impl PushStep {
    /// Steps that cannot run when `self` failed.
    pub fn dependents(&self) -> &'static [PushStep] {
        match self {
            PushStep::RemoteWipe => &[
                PushStep::Accounts,
                PushStep::Trades,
                PushStep::CopyGroups,
                PushStep::PillColors,
                PushStep::DailyJournals,
                PushStep::Profile,
            ],
            PushStep::Accounts => &[PushStep::Trades, PushStep::CopyGroups],
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushStepReport {
    pub step: PushStep,
    pub status: StepStatus,
    /// Rows written by this step.
    pub rows: usize,
    /// Rows intentionally left out (unresolved references).
    pub dropped: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PushStepReport {
    pub fn completed(step: PushStep, rows: usize, dropped: usize) -> Self {
        Self {
            step,
            status: StepStatus::Completed,
            rows,
            dropped,
            error: None,
        }
    }

    pub fn failed(step: PushStep, error: impl Into<String>) -> Self {
        Self {
            step,
            status: StepStatus::Failed,
            rows: 0,
            dropped: 0,
            error: Some(error.into()),
        }
    }

    pub fn skipped(step: PushStep, reason: impl Into<String>) -> Self {
        Self {
            step,
            status: StepStatus::Skipped,
            rows: 0,
            dropped: 0,
            error: Some(reason.into()),
        }
    }
}

/// Outcome of one push cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushReport {
    pub steps: Vec<PushStepReport>,
}

impl PushReport {
    pub fn step(&self, step: PushStep) -> Option<&PushStepReport> {
        self.steps.iter().find(|report| report.step == step)
    }

    pub fn rows(&self, step: PushStep) -> usize {
        self.step(step).map(|report| report.rows).unwrap_or(0)
    }

    pub fn failed_steps(&self) -> Vec<PushStep> {
        self.steps
            .iter()
            .filter(|report| report.status == StepStatus::Failed)
            .map(|report| report.step)
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.failed_steps().is_empty()
    }

    pub fn summary(&self) -> String {
        if self.is_success() {
            return format!(
                "Pushed {} accounts and {} trades",
                self.rows(PushStep::Accounts),
                self.rows(PushStep::Trades)
            );
        }
        let failures: Vec<String> = self
            .steps
            .iter()
            .filter(|report| report.status == StepStatus::Failed)
            .map(|report| {
                format!(
                    "{:?}: {}",
                    report.step,
                    report.error.as_deref().unwrap_or("unknown error")
                )
            })
            .collect();
        format!("Push failed ({})", failures.join("; "))
    }
}

/// Counts of what a rehydrating pull recreated locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullReport {
    pub accounts: usize,
    pub trades: usize,
    pub dropped_trades: usize,
    pub pill_colors: usize,
    pub copy_groups: usize,
    pub copy_members: usize,
    pub journals: usize,
    pub profile_restored: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum PullOutcome {
    /// The remote holds nothing for this user.
    Empty,
    /// Local and remote agree on counts and PnL; nothing touched.
    UpToDate,
    Rehydrated(PullReport),
}

impl PullOutcome {
    pub fn message(&self) -> String {
        match self {
            PullOutcome::Empty => "No remote data to import".to_string(),
            PullOutcome::UpToDate => "Already up to date".to_string(),
            PullOutcome::Rehydrated(report) => format!(
                "Imported {} accounts and {} trades",
                report.accounts, report.trades
            ),
        }
    }
}

/// Per-table result of claiming ownerless records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimLegReport {
    pub table: String,
    pub claimed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimReport {
    pub legs: Vec<ClaimLegReport>,
}

impl ClaimReport {
    pub fn total_claimed(&self) -> usize {
        self.legs.iter().map(|leg| leg.claimed).sum()
    }

    pub fn is_success(&self) -> bool {
        self.legs.iter().all(|leg| leg.error.is_none())
    }
}

/// What happens to ownerless records when a user signs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestDataPolicy {
    /// Guest data is disposable and wiped.
    #[default]
    Discard,
    /// Guest data is reassigned to the new user.
    Claim,
}

/// Result of an identity change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTransitionReport {
    pub user_id: Option<String>,
    pub guest_data_cleared: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim: Option<ClaimReport>,
    pub import_available: bool,
}

/// Snapshot of engine state for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_syncing: bool,
    pub phase: SyncPhase,
    pub enabled: bool,
    pub user_id: Option<String>,
    pub capabilities: CapabilityRecord,
    pub capability_tier: CapabilityTier,
    pub pending_changes: bool,
    pub last_push_at: Option<DateTime<Utc>>,
    pub last_pull_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub trade_stats: Option<TradeStats>,
}

/// Notifications broadcast to UI subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum SyncEvent {
    /// A newly signed-in user has an empty local workspace.
    #[serde(rename_all = "camelCase")]
    ImportAvailable { user_id: String },
    SyncStarted { kind: SyncKind },
    SyncFinished { kind: SyncKind, result: SyncResponse },
    /// Local collections were rebuilt and must be reloaded.
    #[serde(rename_all = "camelCase")]
    DataReloaded { user_id: String },
    CapabilitiesResolved { capabilities: CapabilityRecord },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn busy_response_shape() {
        let busy = SyncResponse::busy();
        assert!(busy.is_busy());
        assert_eq!(
            serde_json::to_value(&busy).unwrap(),
            json!({ "success": false, "error": "A sync is already in progress" })
        );
        assert!(!SyncResponse::ok("done").is_busy());
    }

    #[test]
    fn push_report_lists_failures() {
        let report = PushReport {
            steps: vec![
                PushStepReport::completed(PushStep::RemoteWipe, 0, 0),
                PushStepReport::failed(PushStep::Accounts, "timeout"),
                PushStepReport::skipped(PushStep::Trades, "accounts failed"),
                PushStepReport::completed(PushStep::PillColors, 4, 0),
            ],
        };
        assert!(!report.is_success());
        assert_eq!(report.failed_steps(), vec![PushStep::Accounts]);
        assert_eq!(report.rows(PushStep::PillColors), 4);
        assert_eq!(report.summary(), "Push failed (Accounts: timeout)");
    }

    #[test]
    fn account_failure_blocks_only_dependent_steps() {
        let blocked = PushStep::Accounts.dependents();
        assert!(blocked.contains(&PushStep::Trades));
        assert!(blocked.contains(&PushStep::CopyGroups));
        assert!(!blocked.contains(&PushStep::PillColors));
        assert!(!blocked.contains(&PushStep::DailyJournals));
    }

    #[test]
    fn events_are_tagged_for_the_ui() {
        let event = SyncEvent::ImportAvailable {
            user_id: "u-1".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "type": "importAvailable", "userId": "u-1" })
        );
    }
}
