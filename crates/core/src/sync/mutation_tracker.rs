//! Local-store decorator that reports successful writes to the sync engine.

use async_trait::async_trait;
use std::sync::Arc;

use crate::accounts::{Account, NewAccount};
use crate::copy_groups::{CopyGroup, CopyMember, NewCopyGroup, NewCopyMember};
use crate::journals::{DailyJournal, NewDailyJournal};
use crate::preferences::{NewPillColor, PillColor, UserProfile};
use crate::store::{CommandResponse, LocalStoreTrait, OwnerFilter};
use crate::trades::{NewTrade, Trade};

/// Receiver of "something changed locally" notifications.
pub trait MutationSink: Send + Sync {
    fn record_mutation(&self);
}

/// Sink that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMutationSink;

impl MutationSink for NoOpMutationSink {
    fn record_mutation(&self) {}
}

/// Wraps a local store; every successful write calls the sink.
///
/// Failed writes change nothing and are not reported. Reads pass through.
pub struct TrackedLocalStore {
    inner: Arc<dyn LocalStoreTrait>,
    sink: Arc<dyn MutationSink>,
}

impl TrackedLocalStore {
    pub fn new(inner: Arc<dyn LocalStoreTrait>, sink: Arc<dyn MutationSink>) -> Self {
        Self { inner, sink }
    }

    /// The undecorated store.
    pub fn inner(&self) -> Arc<dyn LocalStoreTrait> {
        Arc::clone(&self.inner)
    }

    fn track<T>(&self, response: CommandResponse<T>) -> CommandResponse<T> {
        if response.is_success() {
            self.sink.record_mutation();
        }
        response
    }
}

#[async_trait]
impl LocalStoreTrait for TrackedLocalStore {
    async fn get_accounts(&self, owner: OwnerFilter) -> CommandResponse<Vec<Account>> {
        self.inner.get_accounts(owner).await
    }

    async fn add_account(&self, account: NewAccount) -> CommandResponse<Account> {
        self.track(self.inner.add_account(account).await)
    }

    async fn update_account(&self, account: Account) -> CommandResponse<Account> {
        self.track(self.inner.update_account(account).await)
    }

    async fn delete_account(&self, id: i64) -> CommandResponse<()> {
        self.track(self.inner.delete_account(id).await)
    }

    async fn get_trades(&self, owner: OwnerFilter) -> CommandResponse<Vec<Trade>> {
        self.inner.get_trades(owner).await
    }

    async fn add_trade(&self, trade: NewTrade) -> CommandResponse<Trade> {
        self.track(self.inner.add_trade(trade).await)
    }

    async fn update_trade(&self, trade: Trade) -> CommandResponse<Trade> {
        self.track(self.inner.update_trade(trade).await)
    }

    async fn delete_trade(&self, id: i64) -> CommandResponse<()> {
        self.track(self.inner.delete_trade(id).await)
    }

    async fn get_pill_colors(&self, owner: OwnerFilter) -> CommandResponse<Vec<PillColor>> {
        self.inner.get_pill_colors(owner).await
    }

    async fn add_pill_color(&self, pill: NewPillColor) -> CommandResponse<PillColor> {
        self.track(self.inner.add_pill_color(pill).await)
    }

    async fn update_pill_color(&self, pill: PillColor) -> CommandResponse<PillColor> {
        self.track(self.inner.update_pill_color(pill).await)
    }

    async fn delete_pill_color(&self, id: i64) -> CommandResponse<()> {
        self.track(self.inner.delete_pill_color(id).await)
    }

    async fn get_copy_groups(&self, owner: OwnerFilter) -> CommandResponse<Vec<CopyGroup>> {
        self.inner.get_copy_groups(owner).await
    }

    async fn add_copy_group(&self, group: NewCopyGroup) -> CommandResponse<CopyGroup> {
        self.track(self.inner.add_copy_group(group).await)
    }

    async fn update_copy_group(&self, group: CopyGroup) -> CommandResponse<CopyGroup> {
        self.track(self.inner.update_copy_group(group).await)
    }

    async fn delete_copy_group(&self, id: i64) -> CommandResponse<()> {
        self.track(self.inner.delete_copy_group(id).await)
    }

    async fn get_copy_members(&self, owner: OwnerFilter) -> CommandResponse<Vec<CopyMember>> {
        self.inner.get_copy_members(owner).await
    }

    async fn add_copy_member(&self, member: NewCopyMember) -> CommandResponse<CopyMember> {
        self.track(self.inner.add_copy_member(member).await)
    }

    async fn update_copy_member(&self, member: CopyMember) -> CommandResponse<CopyMember> {
        self.track(self.inner.update_copy_member(member).await)
    }

    async fn delete_copy_member(&self, id: i64) -> CommandResponse<()> {
        self.track(self.inner.delete_copy_member(id).await)
    }

    async fn get_journals(&self, owner: OwnerFilter) -> CommandResponse<Vec<DailyJournal>> {
        self.inner.get_journals(owner).await
    }

    async fn add_journal(&self, journal: NewDailyJournal) -> CommandResponse<DailyJournal> {
        self.track(self.inner.add_journal(journal).await)
    }

    async fn update_journal(&self, journal: DailyJournal) -> CommandResponse<DailyJournal> {
        self.track(self.inner.update_journal(journal).await)
    }

    async fn delete_journal(&self, id: i64) -> CommandResponse<()> {
        self.track(self.inner.delete_journal(id).await)
    }

    async fn get_profile(&self, user_id: &str) -> CommandResponse<Option<UserProfile>> {
        self.inner.get_profile(user_id).await
    }

    async fn save_profile(&self, profile: UserProfile) -> CommandResponse<UserProfile> {
        self.track(self.inner.save_profile(profile).await)
    }

    async fn delete_all_for_user(&self, user_id: &str) -> CommandResponse<()> {
        self.track(self.inner.delete_all_for_user(user_id).await)
    }

    async fn delete_all_guest_data(&self) -> CommandResponse<()> {
        self.track(self.inner.delete_all_guest_data().await)
    }
}
