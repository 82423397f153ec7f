//! Account domain models.

use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Remote columns that only exist on deployments with the advanced account schema.
pub const ADVANCED_ACCOUNT_COLUMNS: [&str; 5] = [
    "daily_loss_limit",
    "max_drawdown",
    "profit_target",
    "last_reset_at",
    "reset_count",
];

/// Kind of trading account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Live,
    Evaluation,
    Funded,
    Demo,
    Backtesting,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Live => "live",
            AccountType::Evaluation => "evaluation",
            AccountType::Funded => "funded",
            AccountType::Demo => "demo",
            AccountType::Backtesting => "backtesting",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "live" => Some(AccountType::Live),
            "evaluation" => Some(AccountType::Evaluation),
            "funded" => Some(AccountType::Funded),
            "demo" => Some(AccountType::Demo),
            "backtesting" => Some(AccountType::Backtesting),
            _ => None,
        }
    }
}

/// A trading account as stored locally.
///
/// `id` is the small sequential local identifier. Remote identifiers are never
/// stored here; each push derives them again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    /// `None` means the account belongs to the guest workspace.
    pub user_id: Option<String>,
    pub name: String,
    pub account_type: AccountType,
    pub initial_capital: Decimal,
    pub currency: String,
    pub daily_loss_limit: Option<Decimal>,
    pub max_drawdown: Option<Decimal>,
    pub profit_target: Option<Decimal>,
    /// Set when a prop-firm evaluation is reset.
    pub last_reset_at: Option<NaiveDateTime>,
    pub reset_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub user_id: Option<String>,
    pub name: String,
    pub account_type: AccountType,
    pub initial_capital: Decimal,
    pub currency: String,
    #[serde(default)]
    pub daily_loss_limit: Option<Decimal>,
    #[serde(default)]
    pub max_drawdown: Option<Decimal>,
    #[serde(default)]
    pub profit_target: Option<Decimal>,
    #[serde(default)]
    pub last_reset_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub reset_count: i32,
    /// Preserved when rehydrating from the remote; stores stamp `now` otherwise.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl NewAccount {
    pub fn new(
        user_id: Option<String>,
        name: impl Into<String>,
        account_type: AccountType,
        initial_capital: Decimal,
    ) -> Self {
        Self {
            user_id,
            name: name.into(),
            account_type,
            initial_capital,
            currency: "USD".to_string(),
            daily_loss_limit: None,
            max_drawdown: None,
            profit_target: None,
            last_reset_at: None,
            reset_count: 0,
            created_at: None,
        }
    }

    /// Materializes the account with a store-assigned identifier.
    pub fn into_account(self, id: i64) -> Account {
        let now = Utc::now().naive_utc();
        Account {
            id,
            user_id: self.user_id,
            name: self.name,
            account_type: self.account_type,
            initial_capital: self.initial_capital,
            currency: self.currency,
            daily_loss_limit: self.daily_loss_limit,
            max_drawdown: self.max_drawdown,
            profit_target: self.profit_target,
            last_reset_at: self.last_reset_at,
            reset_count: self.reset_count,
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        }
    }
}
