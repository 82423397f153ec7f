//! Push (replace) protocol: wipe this user's remote rows, then reinsert the
//! local snapshot in dependency order, remapping references as it goes.

use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

use super::capability_prober::CapabilityRecord;
use super::id_remapper::{remap_from_insert_response, LocalToRemote, SubmittedRow};
use super::remote_rows;
use super::sync_config::PUSH_BATCH_SIZE;
use super::sync_model::{PushReport, PushStep, PushStepReport};
use crate::accounts::Account;
use crate::copy_groups::{CopyGroup, CopyMember};
use crate::errors::{RemoteErrorKind, Result};
use crate::journals::DailyJournal;
use crate::preferences::{PillColor, UserProfile, PILL_COLOR_CONFLICT_KEY};
use crate::store::{LocalStoreTrait, OwnerFilter, RemoteQuery, RemoteStoreTrait, RemoteTable};
use crate::trades::{Trade, TradeStats};

/// Remote delete order; children before parents.
pub const REMOTE_WIPE_ORDER: [RemoteTable; 6] = [
    RemoteTable::Trades,
    RemoteTable::Accounts,
    RemoteTable::CopyGroupMembers,
    RemoteTable::CopyGroups,
    RemoteTable::PillColors,
    RemoteTable::DailyJournals,
];

const PROFILE_CONFLICT_KEY: [&str; 1] = ["user_id"];

/// Every owned local record of one user, read before anything remote changes.
#[derive(Debug, Clone, Default)]
pub struct LocalSnapshot {
    pub accounts: Vec<Account>,
    pub trades: Vec<Trade>,
    pub pill_colors: Vec<PillColor>,
    pub copy_groups: Vec<CopyGroup>,
    pub copy_members: Vec<CopyMember>,
    pub journals: Vec<DailyJournal>,
    pub profile: Option<UserProfile>,
}

impl LocalSnapshot {
    pub async fn read(local: &dyn LocalStoreTrait, user_id: &str) -> Result<Self> {
        let owner = OwnerFilter::User(user_id.to_string());
        Ok(Self {
            accounts: local.get_accounts(owner.clone()).await.into_result()?,
            trades: local.get_trades(owner.clone()).await.into_result()?,
            pill_colors: local.get_pill_colors(owner.clone()).await.into_result()?,
            copy_groups: local.get_copy_groups(owner.clone()).await.into_result()?,
            copy_members: local.get_copy_members(owner.clone()).await.into_result()?,
            journals: local.get_journals(owner).await.into_result()?,
            profile: local.get_profile(user_id).await.into_result()?,
        })
    }

    pub fn trade_stats(&self) -> TradeStats {
        TradeStats::from_trades(&self.trades)
    }
}

/// Step bookkeeping: failures block their dependents, nothing else.
#[derive(Default)]
struct StepTracker {
    report: PushReport,
    blocked: HashSet<PushStep>,
}

impl StepTracker {
    fn should_run(&mut self, step: PushStep) -> bool {
        if self.blocked.contains(&step) {
            self.report.steps.push(PushStepReport::skipped(
                step,
                "blocked by an earlier failed step",
            ));
            return false;
        }
        true
    }

    fn skip(&mut self, step: PushStep, reason: &str) {
        log::debug!("[Push] Skipping {:?}: {}", step, reason);
        self.report.steps.push(PushStepReport::skipped(step, reason));
    }

    fn record(&mut self, step: PushStep, result: Result<(usize, usize)>) {
        match result {
            Ok((rows, dropped)) => {
                log::debug!("[Push] {:?} wrote {} rows ({} dropped)", step, rows, dropped);
                self.report
                    .steps
                    .push(PushStepReport::completed(step, rows, dropped));
            }
            Err(err) => {
                log::error!("[Push] {:?} failed: {}", step, err);
                self.blocked.extend(step.dependents().iter().copied());
                self.report
                    .steps
                    .push(PushStepReport::failed(step, err.to_string()));
            }
        }
    }
}

async fn insert_batched(
    remote: &dyn RemoteStoreTrait,
    table: RemoteTable,
    rows: Vec<Value>,
) -> Result<Vec<Value>> {
    let mut returned = Vec::with_capacity(rows.len());
    for chunk in rows.chunks(PUSH_BATCH_SIZE) {
        returned.extend(remote.insert(table, chunk.to_vec()).await?);
    }
    Ok(returned)
}

async fn upsert_batched(
    remote: &dyn RemoteStoreTrait,
    table: RemoteTable,
    rows: Vec<Value>,
    on_conflict: &[&str],
) -> Result<usize> {
    let mut written = 0;
    for chunk in rows.chunks(PUSH_BATCH_SIZE) {
        remote.upsert(table, chunk.to_vec(), on_conflict).await?;
        written += chunk.len();
    }
    Ok(written)
}

/// User-scoped delete of every synced table. Re-running it is a no-op.
async fn wipe_remote(
    remote: &dyn RemoteStoreTrait,
    user_id: &str,
    capabilities: &CapabilityRecord,
) -> Result<()> {
    for table in REMOTE_WIPE_ORDER {
        let optional = matches!(table, RemoteTable::CopyGroupMembers | RemoteTable::CopyGroups);
        if optional && !capabilities.copy_groups {
            continue;
        }
        remote.delete(table, RemoteQuery::for_user(user_id)).await?;
    }
    Ok(())
}

async fn push_accounts(
    remote: &dyn RemoteStoreTrait,
    user_id: &str,
    capabilities: &CapabilityRecord,
    accounts: &[Account],
) -> Result<(LocalToRemote, usize)> {
    if accounts.is_empty() {
        return Ok((LocalToRemote::new(), 0));
    }
    let mut submitted = Vec::with_capacity(accounts.len());
    let mut rows = Vec::with_capacity(accounts.len());
    for account in accounts {
        let remote_id = Uuid::new_v4().to_string();
        rows.push(remote_rows::account_row(
            account,
            user_id,
            &remote_id,
            capabilities,
        )?);
        submitted.push(SubmittedRow::new(account.id, remote_id));
    }
    let returned = insert_batched(remote, RemoteTable::Accounts, rows).await?;
    let map = remap_from_insert_response(&submitted, &returned, "id");
    Ok((map, returned.len()))
}

async fn push_trades(
    remote: &dyn RemoteStoreTrait,
    user_id: &str,
    capabilities: &CapabilityRecord,
    trades: &[Trade],
    accounts: &LocalToRemote,
) -> Result<usize> {
    if trades.is_empty() {
        return Ok(0);
    }
    let mut detached = 0;
    let mut rows = Vec::with_capacity(trades.len());
    for trade in trades {
        let account_ref = accounts.resolve_ref(trade.account_id.as_ref());
        if trade.account_id.is_some() && account_ref.is_none() {
            detached += 1;
        }
        rows.push(remote_rows::trade_row(
            trade,
            user_id,
            account_ref,
            capabilities,
        )?);
    }
    if detached > 0 {
        log::warn!(
            "[Push] {} trades reference accounts missing from this push; sent without account",
            detached
        );
    }
    insert_batched(remote, RemoteTable::Trades, rows).await?;
    Ok(trades.len())
}

/// Groups need a resolved leader; members need both their group and follower.
async fn push_copy_groups(
    remote: &dyn RemoteStoreTrait,
    user_id: &str,
    groups: &[CopyGroup],
    members: &[CopyMember],
    accounts: &LocalToRemote,
) -> Result<(usize, usize)> {
    let mut dropped = 0;
    let mut submitted = Vec::new();
    let mut group_rows = Vec::new();
    for group in groups {
        let Some(leader_ref) = accounts.resolve_ref(group.leader_account_id.as_ref()) else {
            log::warn!(
                "[Push] Skipping copy group '{}': leader account is not in this push",
                group.name
            );
            dropped += 1;
            continue;
        };
        let remote_id = Uuid::new_v4().to_string();
        group_rows.push(remote_rows::copy_group_row(
            group, user_id, &remote_id, leader_ref,
        )?);
        submitted.push(SubmittedRow::new(group.id, remote_id));
    }
    if group_rows.is_empty() {
        return Ok((0, dropped + members.len()));
    }

    let returned = insert_batched(remote, RemoteTable::CopyGroups, group_rows).await?;
    let group_map = remap_from_insert_response(&submitted, &returned, "id");

    let mut member_rows = Vec::new();
    for member in members {
        let group_ref = group_map.resolve(&member.group_id);
        let follower_ref = accounts.resolve_ref(member.follower_account_id.as_ref());
        match (group_ref, follower_ref) {
            (Some(group_ref), Some(follower_ref)) => member_rows.push(
                remote_rows::copy_member_row(member, user_id, group_ref, follower_ref)?,
            ),
            _ => dropped += 1,
        }
    }
    let member_count = member_rows.len();
    if !member_rows.is_empty() {
        insert_batched(remote, RemoteTable::CopyGroupMembers, member_rows).await?;
    }
    Ok((group_map.len() + member_count, dropped))
}

async fn push_pill_colors(
    remote: &dyn RemoteStoreTrait,
    user_id: &str,
    pills: &[PillColor],
) -> Result<usize> {
    let rows = pills
        .iter()
        .map(|pill| remote_rows::pill_color_row(pill, user_id))
        .collect::<Result<Vec<_>>>()?;
    upsert_batched(remote, RemoteTable::PillColors, rows, &PILL_COLOR_CONFLICT_KEY).await
}

async fn push_journals(
    remote: &dyn RemoteStoreTrait,
    user_id: &str,
    journals: &[DailyJournal],
) -> Result<usize> {
    if journals.is_empty() {
        return Ok(0);
    }
    let rows = journals
        .iter()
        .map(|journal| remote_rows::journal_row(journal, user_id))
        .collect::<Result<Vec<_>>>()?;
    Ok(insert_batched(remote, RemoteTable::DailyJournals, rows)
        .await?
        .len())
}

/// Runs the full pipeline for one user.
///
/// Never returns early: every step lands in the report as completed, failed
/// or skipped. Remote ids are fresh on every push.
pub async fn push_snapshot(
    remote: &dyn RemoteStoreTrait,
    user_id: &str,
    capabilities: &CapabilityRecord,
    snapshot: &LocalSnapshot,
) -> PushReport {
    let mut tracker = StepTracker::default();

    if tracker.should_run(PushStep::RemoteWipe) {
        let result = wipe_remote(remote, user_id, capabilities).await;
        tracker.record(PushStep::RemoteWipe, result.map(|_| (0, 0)));
    }

    let mut account_map = LocalToRemote::new();
    if tracker.should_run(PushStep::Accounts) {
        let result = push_accounts(remote, user_id, capabilities, &snapshot.accounts)
            .await
            .map(|(map, stored)| {
                account_map = map;
                (stored, snapshot.accounts.len().saturating_sub(stored))
            });
        tracker.record(PushStep::Accounts, result);
    }

    if tracker.should_run(PushStep::Trades) {
        let result = push_trades(
            remote,
            user_id,
            capabilities,
            &snapshot.trades,
            &account_map,
        )
        .await
        .map(|rows| (rows, 0));
        tracker.record(PushStep::Trades, result);
    }

    if tracker.should_run(PushStep::CopyGroups) {
        if capabilities.copy_groups {
            let result = push_copy_groups(
                remote,
                user_id,
                &snapshot.copy_groups,
                &snapshot.copy_members,
                &account_map,
            )
            .await;
            tracker.record(PushStep::CopyGroups, result);
        } else {
            tracker.skip(PushStep::CopyGroups, "copy groups are not available on the remote");
        }
    }

    if tracker.should_run(PushStep::PillColors) {
        let result = push_pill_colors(remote, user_id, &snapshot.pill_colors)
            .await
            .map(|rows| (rows, 0));
        tracker.record(PushStep::PillColors, result);
    }

    if tracker.should_run(PushStep::DailyJournals) {
        let result = push_journals(remote, user_id, &snapshot.journals)
            .await
            .map(|rows| (rows, 0));
        tracker.record(PushStep::DailyJournals, result);
    }

    if tracker.should_run(PushStep::Profile) {
        match &snapshot.profile {
            None => tracker.skip(PushStep::Profile, "no local profile"),
            Some(profile) => {
                let result = match remote_rows::profile_row(profile) {
                    Ok(row) => {
                        remote
                            .upsert(RemoteTable::Profiles, vec![row], &PROFILE_CONFLICT_KEY)
                            .await
                    }
                    Err(err) => Err(err),
                };
                match result {
                    Err(err) if err.remote_kind() == Some(RemoteErrorKind::MissingSchema) => {
                        tracker.skip(PushStep::Profile, "profiles table is not available")
                    }
                    other => tracker.record(PushStep::Profile, other.map(|_| (1, 0))),
                }
            }
        }
    }

    let report = tracker.report;
    log::info!("[Push] {}", report.summary());
    report
}
