use async_trait::async_trait;

use super::{CommandResponse, OwnerFilter};
use crate::accounts::{Account, NewAccount};
use crate::copy_groups::{CopyGroup, CopyMember, NewCopyGroup, NewCopyMember};
use crate::journals::{DailyJournal, NewDailyJournal};
use crate::preferences::{NewPillColor, PillColor, UserProfile};
use crate::trades::{NewTrade, Trade};

/// Request/response command surface of the embedded local store.
///
/// Every command answers with a [`CommandResponse`]; implementations never
/// panic or return transport errors past this boundary.
#[async_trait]
pub trait LocalStoreTrait: Send + Sync {
    async fn get_accounts(&self, owner: OwnerFilter) -> CommandResponse<Vec<Account>>;
    async fn add_account(&self, account: NewAccount) -> CommandResponse<Account>;
    async fn update_account(&self, account: Account) -> CommandResponse<Account>;
    async fn delete_account(&self, id: i64) -> CommandResponse<()>;

    async fn get_trades(&self, owner: OwnerFilter) -> CommandResponse<Vec<Trade>>;
    async fn add_trade(&self, trade: NewTrade) -> CommandResponse<Trade>;
    async fn update_trade(&self, trade: Trade) -> CommandResponse<Trade>;
    async fn delete_trade(&self, id: i64) -> CommandResponse<()>;

    async fn get_pill_colors(&self, owner: OwnerFilter) -> CommandResponse<Vec<PillColor>>;
    async fn add_pill_color(&self, pill: NewPillColor) -> CommandResponse<PillColor>;
    async fn update_pill_color(&self, pill: PillColor) -> CommandResponse<PillColor>;
    async fn delete_pill_color(&self, id: i64) -> CommandResponse<()>;

    async fn get_copy_groups(&self, owner: OwnerFilter) -> CommandResponse<Vec<CopyGroup>>;
    async fn add_copy_group(&self, group: NewCopyGroup) -> CommandResponse<CopyGroup>;
    async fn update_copy_group(&self, group: CopyGroup) -> CommandResponse<CopyGroup>;
    async fn delete_copy_group(&self, id: i64) -> CommandResponse<()>;

    async fn get_copy_members(&self, owner: OwnerFilter) -> CommandResponse<Vec<CopyMember>>;
    async fn add_copy_member(&self, member: NewCopyMember) -> CommandResponse<CopyMember>;
    async fn update_copy_member(&self, member: CopyMember) -> CommandResponse<CopyMember>;
    async fn delete_copy_member(&self, id: i64) -> CommandResponse<()>;

    async fn get_journals(&self, owner: OwnerFilter) -> CommandResponse<Vec<DailyJournal>>;
    async fn add_journal(&self, journal: NewDailyJournal) -> CommandResponse<DailyJournal>;
    async fn update_journal(&self, journal: DailyJournal) -> CommandResponse<DailyJournal>;
    async fn delete_journal(&self, id: i64) -> CommandResponse<()>;

    async fn get_profile(&self, user_id: &str) -> CommandResponse<Option<UserProfile>>;
    async fn save_profile(&self, profile: UserProfile) -> CommandResponse<UserProfile>;

    /// Deletes every row owned by `user_id` across all owned tables.
    async fn delete_all_for_user(&self, user_id: &str) -> CommandResponse<()>;
    /// Deletes every ownerless row across all owned tables.
    async fn delete_all_guest_data(&self) -> CommandResponse<()>;
}
