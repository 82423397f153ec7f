//! Guest (ownerless) records versus a signed-in user's records.

use super::sync_model::{ClaimLegReport, ClaimReport};
use crate::errors::Result;
use crate::store::{LocalStoreTrait, OwnerFilter};

/// Deletes every ownerless record. No confirmation: guest data is disposable.
pub async fn discard_guest_data(local: &dyn LocalStoreTrait) -> Result<()> {
    local.delete_all_guest_data().await.into_result()?;
    log::info!("[Lifecycle] Cleared guest data");
    Ok(())
}

/// True when the user has neither accounts nor trades locally.
pub async fn is_workspace_empty(local: &dyn LocalStoreTrait, user_id: &str) -> Result<bool> {
    let owner = OwnerFilter::User(user_id.to_string());
    let accounts = local.get_accounts(owner.clone()).await.into_result()?;
    if !accounts.is_empty() {
        return Ok(false);
    }
    let trades = local.get_trades(owner).await.into_result()?;
    Ok(trades.is_empty())
}

async fn claim_leg<T, F, Fut>(
    table: &str,
    rows: Result<Vec<T>>,
    user_id: &str,
    mut reassign: F,
) -> ClaimLegReport
where
    F: FnMut(T, String) -> Fut,
    Fut: std::future::Future<Output = Result<()>>,
{
    let mut leg = ClaimLegReport {
        table: table.to_string(),
        claimed: 0,
        error: None,
    };
    let rows = match rows {
        Ok(rows) => rows,
        Err(err) => {
            log::error!("[Lifecycle] Could not read guest {}: {}", table, err);
            leg.error = Some(err.to_string());
            return leg;
        }
    };
    for row in rows {
        match reassign(row, user_id.to_string()).await {
            Ok(()) => leg.claimed += 1,
            Err(err) => {
                log::error!("[Lifecycle] Claiming {} stopped: {}", table, err);
                leg.error = Some(err.to_string());
                break;
            }
        }
    }
    leg
}

/// Reassigns every ownerless record to `user_id`.
///
/// Each table is its own leg; a failing leg is reported and the remaining
/// legs still run.
pub async fn claim_guest_data(local: &dyn LocalStoreTrait, user_id: &str) -> ClaimReport {
    let mut report = ClaimReport::default();

    report.legs.push(
        claim_leg(
            "accounts",
            local.get_accounts(OwnerFilter::Guest).await.into_result(),
            user_id,
            |mut account, owner| {
                account.user_id = Some(owner);
                async move { local.update_account(account).await.into_result().map(|_| ()) }
            },
        )
        .await,
    );
    report.legs.push(
        claim_leg(
            "trades",
            local.get_trades(OwnerFilter::Guest).await.into_result(),
            user_id,
            |mut trade, owner| {
                trade.user_id = Some(owner);
                async move { local.update_trade(trade).await.into_result().map(|_| ()) }
            },
        )
        .await,
    );
    report.legs.push(
        claim_leg(
            "copy_groups",
            local.get_copy_groups(OwnerFilter::Guest).await.into_result(),
            user_id,
            |mut group, owner| {
                group.user_id = Some(owner);
                async move { local.update_copy_group(group).await.into_result().map(|_| ()) }
            },
        )
        .await,
    );
    report.legs.push(
        claim_leg(
            "copy_members",
            local.get_copy_members(OwnerFilter::Guest).await.into_result(),
            user_id,
            |mut member, owner| {
                member.user_id = Some(owner);
                async move { local.update_copy_member(member).await.into_result().map(|_| ()) }
            },
        )
        .await,
    );
    report.legs.push(
        claim_leg(
            "pill_colors",
            local.get_pill_colors(OwnerFilter::Guest).await.into_result(),
            user_id,
            |mut pill, owner| {
                pill.user_id = Some(owner);
                async move { local.update_pill_color(pill).await.into_result().map(|_| ()) }
            },
        )
        .await,
    );
    report.legs.push(
        claim_leg(
            "daily_journals",
            local.get_journals(OwnerFilter::Guest).await.into_result(),
            user_id,
            |mut journal, owner| {
                journal.user_id = Some(owner);
                async move { local.update_journal(journal).await.into_result().map(|_| ()) }
            },
        )
        .await,
    );

    log::info!(
        "[Lifecycle] Claimed {} guest records for the signed-in user",
        report.total_claimed()
    );
    report
}
