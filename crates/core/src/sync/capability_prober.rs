//! Runtime detection of optional remote columns and tables.
//!
//! The remote schema can lag the application. Three narrow probes classify the
//! deployment once per session; every payload the engine sends is shaped by
//! the resulting [`CapabilityRecord`].

use serde::{Deserialize, Serialize};

use crate::errors::{Error, RemoteErrorKind};
use crate::store::{RemoteQuery, RemoteStoreTrait, RemoteTable};

/// Advanced trade column whose presence implies the full advanced trade schema.
pub const ADVANCED_TRADE_PROBE_COLUMN: &str = "mistakes";
/// Advanced account column whose presence implies the full advanced account schema.
pub const ADVANCED_ACCOUNT_PROBE_COLUMN: &str = "last_reset_at";
/// Key column of the optional copy-group table.
pub const COPY_GROUP_PROBE_COLUMN: &str = "id";

/// Which optional remote features exist. Process-lifetime, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityRecord {
    pub advanced_trades: bool,
    pub advanced_accounts: bool,
    pub copy_groups: bool,
}

/// Coarse label for a [`CapabilityRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityTier {
    Basic,
    Extended,
    Full,
}

impl CapabilityRecord {
    pub fn full() -> Self {
        Self {
            advanced_trades: true,
            advanced_accounts: true,
            copy_groups: true,
        }
    }

    pub fn tier(&self) -> CapabilityTier {
        let present = [self.advanced_trades, self.advanced_accounts, self.copy_groups]
            .iter()
            .filter(|flag| **flag)
            .count();
        match present {
            0 => CapabilityTier::Basic,
            3 => CapabilityTier::Full,
            _ => CapabilityTier::Extended,
        }
    }
}

/// Outcome of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeOutcome {
    Present,
    Absent,
    /// The remote could not be asked; keep whatever we believed before.
    Unknown,
}

impl ProbeOutcome {
    fn resolve(self, previous: bool) -> bool {
        match self {
            ProbeOutcome::Present => true,
            ProbeOutcome::Absent => false,
            ProbeOutcome::Unknown => previous,
        }
    }
}

fn classify(result: Result<Vec<serde_json::Value>, Error>, label: &str) -> ProbeOutcome {
    match result {
        Ok(_) => ProbeOutcome::Present,
        Err(err) => match err.remote_kind() {
            Some(RemoteErrorKind::Unavailable) | Some(RemoteErrorKind::Unauthorized) => {
                log::warn!(
                    "[Capabilities] Probe '{}' could not query the remote: {}",
                    label,
                    err
                );
                ProbeOutcome::Unknown
            }
            _ => {
                log::debug!("[Capabilities] Probe '{}' reports absent: {}", label, err);
                ProbeOutcome::Absent
            }
        },
    }
}

async fn probe(
    remote: &dyn RemoteStoreTrait,
    table: RemoteTable,
    column: &str,
) -> Result<Vec<serde_json::Value>, Error> {
    remote
        .select(table, RemoteQuery::default().columns(column).limit(1))
        .await
}

/// Runs the three independent probes and folds them over `previous`.
///
/// Probes never retry. A probe that fails for network reasons leaves its flag
/// at the previous value instead of aborting the others.
pub async fn probe_capabilities(
    remote: &dyn RemoteStoreTrait,
    previous: CapabilityRecord,
) -> CapabilityRecord {
    let (trades, accounts, copy_groups) = tokio::join!(
        probe(remote, RemoteTable::Trades, ADVANCED_TRADE_PROBE_COLUMN),
        probe(remote, RemoteTable::Accounts, ADVANCED_ACCOUNT_PROBE_COLUMN),
        probe(remote, RemoteTable::CopyGroups, COPY_GROUP_PROBE_COLUMN),
    );

    let record = CapabilityRecord {
        advanced_trades: classify(trades, "advanced_trades").resolve(previous.advanced_trades),
        advanced_accounts: classify(accounts, "advanced_accounts")
            .resolve(previous.advanced_accounts),
        copy_groups: classify(copy_groups, "copy_groups").resolve(previous.copy_groups),
    };
    log::info!(
        "[Capabilities] Remote tier {:?} (advanced_trades={}, advanced_accounts={}, copy_groups={})",
        record.tier(),
        record.advanced_trades,
        record.advanced_accounts,
        record.copy_groups
    );
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_classification() {
        assert_eq!(CapabilityRecord::default().tier(), CapabilityTier::Basic);
        assert_eq!(CapabilityRecord::full().tier(), CapabilityTier::Full);
        let partial = CapabilityRecord {
            copy_groups: true,
            ..Default::default()
        };
        assert_eq!(partial.tier(), CapabilityTier::Extended);
    }

    #[test]
    fn unknown_outcome_keeps_previous_value() {
        assert!(ProbeOutcome::Unknown.resolve(true));
        assert!(!ProbeOutcome::Unknown.resolve(false));
        assert!(!ProbeOutcome::Absent.resolve(true));
        assert!(ProbeOutcome::Present.resolve(false));
    }
}
