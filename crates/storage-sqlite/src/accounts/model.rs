//! Database models for accounts.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::StorageError;
use crate::utils::{decimal_from_db, optional_decimal_from_db};
use tradejournal_core::accounts::{Account, AccountType, NewAccount};

#[derive(
    Queryable,
    Identifiable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountDB {
    pub id: i64,
    pub user_id: Option<String>,
    pub name: String,
    pub account_type: String,
    pub initial_capital: String,
    pub currency: String,
    pub daily_loss_limit: Option<String>,
    pub max_drawdown: Option<String>,
    pub profit_target: Option<String>,
    pub last_reset_at: Option<NaiveDateTime>,
    pub reset_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::accounts)]
pub struct NewAccountDB {
    pub user_id: Option<String>,
    pub name: String,
    pub account_type: String,
    pub initial_capital: String,
    pub currency: String,
    pub daily_loss_limit: Option<String>,
    pub max_drawdown: Option<String>,
    pub profit_target: Option<String>,
    pub last_reset_at: Option<NaiveDateTime>,
    pub reset_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<NewAccount> for NewAccountDB {
    fn from(account: NewAccount) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            user_id: account.user_id,
            name: account.name,
            account_type: account.account_type.as_str().to_string(),
            initial_capital: account.initial_capital.to_string(),
            currency: account.currency,
            daily_loss_limit: account.daily_loss_limit.map(|v| v.to_string()),
            max_drawdown: account.max_drawdown.map(|v| v.to_string()),
            profit_target: account.profit_target.map(|v| v.to_string()),
            last_reset_at: account.last_reset_at,
            reset_count: account.reset_count,
            created_at: account.created_at.unwrap_or(now),
            updated_at: now,
        }
    }
}

impl From<Account> for AccountDB {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            user_id: account.user_id,
            name: account.name,
            account_type: account.account_type.as_str().to_string(),
            initial_capital: account.initial_capital.to_string(),
            currency: account.currency,
            daily_loss_limit: account.daily_loss_limit.map(|v| v.to_string()),
            max_drawdown: account.max_drawdown.map(|v| v.to_string()),
            profit_target: account.profit_target.map(|v| v.to_string()),
            last_reset_at: account.last_reset_at,
            reset_count: account.reset_count,
            created_at: account.created_at,
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl TryFrom<AccountDB> for Account {
    type Error = StorageError;

    fn try_from(db: AccountDB) -> Result<Self, Self::Error> {
        let account_type = AccountType::parse(&db.account_type).unwrap_or_else(|| {
            log::warn!(
                "[Storage] Account {} has unknown type '{}'; reading as live",
                db.id,
                db.account_type
            );
            AccountType::Live
        });
        Ok(Account {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            account_type,
            initial_capital: decimal_from_db(&db.initial_capital, "initial_capital")?,
            currency: db.currency,
            daily_loss_limit: optional_decimal_from_db(
                db.daily_loss_limit.as_deref(),
                "daily_loss_limit",
            )?,
            max_drawdown: optional_decimal_from_db(db.max_drawdown.as_deref(), "max_drawdown")?,
            profit_target: optional_decimal_from_db(db.profit_target.as_deref(), "profit_target")?,
            last_reset_at: db.last_reset_at,
            reset_count: db.reset_count,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}
