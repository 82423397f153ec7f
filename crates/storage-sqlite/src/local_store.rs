//! [`LocalStoreTrait`] over the SQLite repositories.

use async_trait::async_trait;
use diesel::SqliteConnection;
use std::path::Path;
use std::sync::Arc;

use crate::accounts::{delete_owned_accounts, AccountRepository};
use crate::copy_groups::{delete_owned_copy_groups, CopyGroupRepository};
use crate::db::{self, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::journals::{delete_owned_journals, JournalRepository};
use crate::preferences::{delete_owned_pill_colors, PreferencesRepository};
use crate::trades::{delete_owned_trades, TradeRepository};
use tradejournal_core::accounts::{Account, NewAccount};
use tradejournal_core::copy_groups::{CopyGroup, CopyMember, NewCopyGroup, NewCopyMember};
use tradejournal_core::journals::{DailyJournal, NewDailyJournal};
use tradejournal_core::preferences::{NewPillColor, PillColor, UserProfile};
use tradejournal_core::store::{CommandResponse, LocalStoreTrait, OwnerFilter};
use tradejournal_core::trades::{NewTrade, Trade};
use tradejournal_core::Result;

pub struct SqliteLocalStore {
    accounts: AccountRepository,
    trades: TradeRepository,
    preferences: PreferencesRepository,
    copy_groups: CopyGroupRepository,
    journals: JournalRepository,
    writer: WriteHandle,
}

impl SqliteLocalStore {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self {
            accounts: AccountRepository::new(Arc::clone(&pool), writer.clone()),
            trades: TradeRepository::new(Arc::clone(&pool), writer.clone()),
            preferences: PreferencesRepository::new(Arc::clone(&pool), writer.clone()),
            copy_groups: CopyGroupRepository::new(Arc::clone(&pool), writer.clone()),
            journals: JournalRepository::new(pool, writer.clone()),
            writer,
        }
    }

    /// Opens the database under `data_dir`, migrating it first.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let (pool, writer) = db::init(data_dir)?;
        Ok(Self::new(pool, writer))
    }

    async fn delete_owned(&self, owner: OwnerFilter) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let mut removed = 0;
                removed += delete_owned_copy_groups(conn, &owner)?;
                removed += delete_owned_journals(conn, &owner)?;
                removed += delete_owned_pill_colors(conn, &owner)?;
                removed += delete_owned_trades(conn, &owner)?;
                removed += delete_owned_accounts(conn, &owner)?;
                log::debug!("[Storage] Removed {} row(s) for {:?}", removed, owner);
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl LocalStoreTrait for SqliteLocalStore {
    async fn get_accounts(&self, owner: OwnerFilter) -> CommandResponse<Vec<Account>> {
        CommandResponse::from_result(self.accounts.load_accounts(&owner))
    }

    async fn add_account(&self, account: NewAccount) -> CommandResponse<Account> {
        CommandResponse::from_result(self.accounts.create(account).await)
    }

    async fn update_account(&self, account: Account) -> CommandResponse<Account> {
        CommandResponse::from_result(self.accounts.update(account).await)
    }

    async fn delete_account(&self, id: i64) -> CommandResponse<()> {
        CommandResponse::from_result(self.accounts.delete(id).await)
    }

    async fn get_trades(&self, owner: OwnerFilter) -> CommandResponse<Vec<Trade>> {
        CommandResponse::from_result(self.trades.load_trades(&owner))
    }

    async fn add_trade(&self, trade: NewTrade) -> CommandResponse<Trade> {
        CommandResponse::from_result(self.trades.create(trade).await)
    }

    async fn update_trade(&self, trade: Trade) -> CommandResponse<Trade> {
        CommandResponse::from_result(self.trades.update(trade).await)
    }

    async fn delete_trade(&self, id: i64) -> CommandResponse<()> {
        CommandResponse::from_result(self.trades.delete(id).await)
    }

    async fn get_pill_colors(&self, owner: OwnerFilter) -> CommandResponse<Vec<PillColor>> {
        CommandResponse::from_result(self.preferences.load_pill_colors(&owner))
    }

    async fn add_pill_color(&self, pill: NewPillColor) -> CommandResponse<PillColor> {
        CommandResponse::from_result(self.preferences.create_pill_color(pill).await)
    }

    async fn update_pill_color(&self, pill: PillColor) -> CommandResponse<PillColor> {
        CommandResponse::from_result(self.preferences.update_pill_color(pill).await)
    }

    async fn delete_pill_color(&self, id: i64) -> CommandResponse<()> {
        CommandResponse::from_result(self.preferences.delete_pill_color(id).await)
    }

    async fn get_copy_groups(&self, owner: OwnerFilter) -> CommandResponse<Vec<CopyGroup>> {
        CommandResponse::from_result(self.copy_groups.load_groups(&owner))
    }

    async fn add_copy_group(&self, group: NewCopyGroup) -> CommandResponse<CopyGroup> {
        CommandResponse::from_result(self.copy_groups.create_group(group).await)
    }

    async fn update_copy_group(&self, group: CopyGroup) -> CommandResponse<CopyGroup> {
        CommandResponse::from_result(self.copy_groups.update_group(group).await)
    }

    async fn delete_copy_group(&self, id: i64) -> CommandResponse<()> {
        CommandResponse::from_result(self.copy_groups.delete_group(id).await)
    }

    async fn get_copy_members(&self, owner: OwnerFilter) -> CommandResponse<Vec<CopyMember>> {
        CommandResponse::from_result(self.copy_groups.load_members(&owner))
    }

    async fn add_copy_member(&self, member: NewCopyMember) -> CommandResponse<CopyMember> {
        CommandResponse::from_result(self.copy_groups.create_member(member).await)
    }

    async fn update_copy_member(&self, member: CopyMember) -> CommandResponse<CopyMember> {
        CommandResponse::from_result(self.copy_groups.update_member(member).await)
    }

    async fn delete_copy_member(&self, id: i64) -> CommandResponse<()> {
        CommandResponse::from_result(self.copy_groups.delete_member(id).await)
    }

    async fn get_journals(&self, owner: OwnerFilter) -> CommandResponse<Vec<DailyJournal>> {
        CommandResponse::from_result(self.journals.load_journals(&owner))
    }

    async fn add_journal(&self, journal: NewDailyJournal) -> CommandResponse<DailyJournal> {
        CommandResponse::from_result(self.journals.create(journal).await)
    }

    async fn update_journal(&self, journal: DailyJournal) -> CommandResponse<DailyJournal> {
        CommandResponse::from_result(self.journals.update(journal).await)
    }

    async fn delete_journal(&self, id: i64) -> CommandResponse<()> {
        CommandResponse::from_result(self.journals.delete(id).await)
    }

    async fn get_profile(&self, user_id: &str) -> CommandResponse<Option<UserProfile>> {
        CommandResponse::from_result(self.preferences.load_profile(user_id))
    }

    async fn save_profile(&self, profile: UserProfile) -> CommandResponse<UserProfile> {
        CommandResponse::from_result(self.preferences.save_profile(profile).await)
    }

    async fn delete_all_for_user(&self, user_id: &str) -> CommandResponse<()> {
        if user_id.is_empty() {
            return CommandResponse::err(StorageError::invalid_data("user id is empty").to_string());
        }
        CommandResponse::from_result(self.delete_owned(OwnerFilter::User(user_id.to_string())).await)
    }

    async fn delete_all_guest_data(&self) -> CommandResponse<()> {
        CommandResponse::from_result(self.delete_owned(OwnerFilter::Guest).await)
    }
}
