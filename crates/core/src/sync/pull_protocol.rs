//! Pull (import/reconcile) protocol: fetch the user's remote snapshot and,
//! unless it already matches local data, wipe and rebuild the local store.

use rust_decimal::Decimal;
use serde_json::Value;

use super::capability_prober::CapabilityRecord;
use super::id_remapper::{row_id, RemoteToLocal};
use super::remote_rows::{
    decode_row, RemoteAccountRow, RemoteCopyGroupRow, RemoteCopyMemberRow, RemoteJournalRow,
    RemotePillColorRow, RemoteProfileRow, RemoteTradeRow, TRADE_SELECT_WITH_ACCOUNT,
};
use super::sync_model::{PullOutcome, PullReport};
use crate::errors::{RemoteErrorKind, Result};
use crate::store::{LocalStoreTrait, OwnerFilter, RemoteQuery, RemoteStoreTrait, RemoteTable};
use crate::trades::TradeStats;

/// One user's rows as stored remotely. Parent rows keep their remote id.
#[derive(Debug, Clone, Default)]
pub struct RemoteSnapshot {
    pub accounts: Vec<(String, RemoteAccountRow)>,
    pub trades: Vec<RemoteTradeRow>,
    pub pill_colors: Vec<RemotePillColorRow>,
    pub copy_groups: Vec<(String, RemoteCopyGroupRow)>,
    pub copy_members: Vec<RemoteCopyMemberRow>,
    pub journals: Vec<RemoteJournalRow>,
    pub profile: Option<RemoteProfileRow>,
}

/// Tables that may be missing on older remote schemas read as empty.
async fn select_optional(
    remote: &dyn RemoteStoreTrait,
    table: RemoteTable,
    query: RemoteQuery,
) -> Result<Vec<Value>> {
    match remote.select(table, query).await {
        Err(err) if err.remote_kind() == Some(RemoteErrorKind::MissingSchema) => {
            log::debug!("[Pull] {} is not available remotely: {}", table, err);
            Ok(Vec::new())
        }
        other => other,
    }
}

fn decode_all<T: serde::de::DeserializeOwned>(rows: Vec<Value>, table: RemoteTable) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| decode_row(row, table.as_str()))
        .collect()
}

fn decode_keyed<T: serde::de::DeserializeOwned>(
    rows: Vec<Value>,
    table: RemoteTable,
) -> Vec<(String, T)> {
    rows.into_iter()
        .filter_map(|row| {
            let Some(id) = row_id(&row, "id") else {
                log::warn!("[Pull] Skipping {} row without an id", table);
                return None;
            };
            decode_row(row, table.as_str()).map(|decoded| (id, decoded))
        })
        .collect()
}

impl RemoteSnapshot {
    pub async fn fetch(
        remote: &dyn RemoteStoreTrait,
        user_id: &str,
        capabilities: &CapabilityRecord,
    ) -> Result<Self> {
        let accounts = remote
            .select(RemoteTable::Accounts, RemoteQuery::for_user(user_id))
            .await?;
        let trades = remote
            .select(
                RemoteTable::Trades,
                RemoteQuery::for_user(user_id).columns(TRADE_SELECT_WITH_ACCOUNT),
            )
            .await?;
        let pill_colors = remote
            .select(RemoteTable::PillColors, RemoteQuery::for_user(user_id))
            .await?;

        let (copy_groups, copy_members) = if capabilities.copy_groups {
            (
                select_optional(remote, RemoteTable::CopyGroups, RemoteQuery::for_user(user_id))
                    .await?,
                select_optional(
                    remote,
                    RemoteTable::CopyGroupMembers,
                    RemoteQuery::for_user(user_id),
                )
                .await?,
            )
        } else {
            (Vec::new(), Vec::new())
        };

        let journals =
            select_optional(remote, RemoteTable::DailyJournals, RemoteQuery::for_user(user_id))
                .await?;
        let profile = select_optional(
            remote,
            RemoteTable::Profiles,
            RemoteQuery::for_user(user_id).limit(1),
        )
        .await?;

        Ok(Self {
            accounts: decode_keyed(accounts, RemoteTable::Accounts),
            trades: decode_all(trades, RemoteTable::Trades),
            pill_colors: decode_all(pill_colors, RemoteTable::PillColors),
            copy_groups: decode_keyed(copy_groups, RemoteTable::CopyGroups),
            copy_members: decode_all(copy_members, RemoteTable::CopyGroupMembers),
            journals: decode_all(journals, RemoteTable::DailyJournals),
            profile: decode_all(profile, RemoteTable::Profiles).into_iter().next(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
            && self.trades.is_empty()
            && self.pill_colors.is_empty()
            && self.copy_groups.is_empty()
            && self.copy_members.is_empty()
            && self.journals.is_empty()
            && self.profile.is_none()
    }

    /// Whether the snapshot holds anything the staleness check compares.
    pub fn has_trade_data(&self) -> bool {
        !self.accounts.is_empty() || !self.trades.is_empty()
    }

    pub fn trade_stats(&self) -> TradeStats {
        TradeStats::from_pnls(self.trades.iter().map(|trade| trade.pnl))
    }
}

/// Count-and-sum equivalence check. Two trades whose PnL deltas cancel out
/// read as equal; that approximation is accepted.
async fn is_up_to_date(
    local: &dyn LocalStoreTrait,
    user_id: &str,
    snapshot: &RemoteSnapshot,
    pnl_epsilon: Decimal,
) -> Result<bool> {
    let owner = OwnerFilter::User(user_id.to_string());
    let accounts = local.get_accounts(owner.clone()).await.into_result()?;
    let trades = local.get_trades(owner).await.into_result()?;
    let local_stats = TradeStats::from_trades(&trades);
    let remote_stats = snapshot.trade_stats();
    log::debug!(
        "[Pull] Local {} accounts / {} trades / pnl {}; remote {} accounts / {} trades / pnl {}",
        accounts.len(),
        local_stats.count,
        local_stats.pnl_sum,
        snapshot.accounts.len(),
        remote_stats.count,
        remote_stats.pnl_sum
    );
    Ok(accounts.len() == snapshot.accounts.len()
        && local_stats.matches(&remote_stats, pnl_epsilon))
}

/// Wipes the user's local rows and recreates them parents first.
///
/// A failure after the wipe leaves the store partially rebuilt; the next
/// pull starts over from the wipe.
async fn rehydrate(
    local: &dyn LocalStoreTrait,
    user_id: &str,
    snapshot: RemoteSnapshot,
) -> Result<PullReport> {
    local.delete_all_for_user(user_id).await.into_result()?;
    let mut report = PullReport::default();

    let mut accounts = RemoteToLocal::new();
    for (remote_id, row) in snapshot.accounts {
        let created = local
            .add_account(row.into_new_account())
            .await
            .into_result()?;
        accounts.insert(remote_id, created.id);
        report.accounts += 1;
    }

    for row in snapshot.trades {
        let account_id = match row.account_id.as_ref() {
            None => None,
            Some(remote_ref) => match accounts.resolve(remote_ref) {
                Some(local_id) => Some(local_id),
                None => {
                    log::warn!(
                        "[Pull] Dropping {} trade: account {} ({}) was not imported",
                        row.symbol,
                        remote_ref,
                        row.accounts
                            .as_ref()
                            .map(|account| account.name.as_str())
                            .unwrap_or("unknown")
                    );
                    report.dropped_trades += 1;
                    continue;
                }
            },
        };
        local
            .add_trade(row.into_new_trade(account_id))
            .await
            .into_result()?;
        report.trades += 1;
    }

    for row in snapshot.pill_colors {
        local
            .add_pill_color(row.into_new_pill_color())
            .await
            .into_result()?;
        report.pill_colors += 1;
    }

    let mut groups = RemoteToLocal::new();
    for (remote_id, row) in snapshot.copy_groups {
        let Some(leader) = accounts.resolve_ref(row.leader_account_id.as_ref()) else {
            log::warn!("[Pull] Skipping copy group '{}': leader not imported", row.name);
            continue;
        };
        let created = local
            .add_copy_group(row.into_new_copy_group(leader))
            .await
            .into_result()?;
        groups.insert(remote_id, created.id);
        report.copy_groups += 1;
    }

    for row in snapshot.copy_members {
        let group = groups.resolve(&row.group_id);
        let follower = accounts.resolve_ref(row.follower_account_id.as_ref());
        let (Some(group), Some(follower)) = (group, follower) else {
            log::debug!("[Pull] Skipping copy member of group {}", row.group_id);
            continue;
        };
        local
            .add_copy_member(row.into_new_copy_member(group, follower))
            .await
            .into_result()?;
        report.copy_members += 1;
    }

    for row in snapshot.journals {
        local
            .add_journal(row.into_new_journal())
            .await
            .into_result()?;
        report.journals += 1;
    }

    if let Some(profile) = snapshot.profile {
        local.save_profile(profile.into_profile()).await.into_result()?;
        report.profile_restored = true;
    }

    Ok(report)
}

/// Runs the pull for one user against the untracked local store.
pub async fn pull_snapshot(
    local: &dyn LocalStoreTrait,
    remote: &dyn RemoteStoreTrait,
    user_id: &str,
    capabilities: &CapabilityRecord,
    pnl_epsilon: Decimal,
) -> Result<PullOutcome> {
    let snapshot = RemoteSnapshot::fetch(remote, user_id, capabilities).await?;
    if snapshot.is_empty() {
        log::info!("[Pull] Remote has no data for this user");
        return Ok(PullOutcome::Empty);
    }
    if snapshot.has_trade_data() && is_up_to_date(local, user_id, &snapshot, pnl_epsilon).await? {
        log::info!("[Pull] Local data already matches the remote");
        return Ok(PullOutcome::UpToDate);
    }

    let report = rehydrate(local, user_id, snapshot).await?;
    log::info!(
        "[Pull] Rebuilt local data: {} accounts, {} trades ({} dropped), {} journals",
        report.accounts,
        report.trades,
        report.dropped_trades,
        report.journals
    );
    Ok(PullOutcome::Rehydrated(report))
}
