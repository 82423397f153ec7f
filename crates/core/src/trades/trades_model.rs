//! Trade domain models.

use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Remote columns that only exist on deployments with the advanced trade schema.
///
/// Pushing to an older remote silently drops these.
pub const ADVANCED_TRADE_COLUMNS: [&str; 7] = [
    "setup",
    "mistakes",
    "tags",
    "rating",
    "stop_loss",
    "take_profit",
    "screenshot_url",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    #[default]
    Long,
    Short,
}

impl TradeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::Long => "long",
            TradeDirection::Short => "short",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "long" | "buy" => Some(TradeDirection::Long),
            "short" | "sell" => Some(TradeDirection::Short),
            _ => None,
        }
    }
}

/// A journaled trade as stored locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: i64,
    pub user_id: Option<String>,
    /// Local account id. May point at an account that no longer exists.
    pub account_id: Option<i64>,
    pub symbol: String,
    pub direction: TradeDirection,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub fees: Decimal,
    pub pnl: Decimal,
    pub entry_at: NaiveDateTime,
    pub exit_at: Option<NaiveDateTime>,
    pub notes: Option<String>,

    // Advanced fields, only replicated when the remote supports them.
    pub setup: Option<String>,
    pub mistakes: Vec<String>,
    pub tags: Vec<String>,
    pub rating: Option<i32>,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub screenshot_url: Option<String>,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrade {
    pub user_id: Option<String>,
    pub account_id: Option<i64>,
    pub symbol: String,
    pub direction: TradeDirection,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    #[serde(default)]
    pub exit_price: Option<Decimal>,
    #[serde(default)]
    pub fees: Decimal,
    #[serde(default)]
    pub pnl: Decimal,
    pub entry_at: NaiveDateTime,
    #[serde(default)]
    pub exit_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub setup: Option<String>,
    #[serde(default)]
    pub mistakes: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    #[serde(default)]
    pub take_profit: Option<Decimal>,
    #[serde(default)]
    pub screenshot_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl NewTrade {
    pub fn new(
        user_id: Option<String>,
        account_id: Option<i64>,
        symbol: impl Into<String>,
        direction: TradeDirection,
        pnl: Decimal,
    ) -> Self {
        Self {
            user_id,
            account_id,
            symbol: symbol.into(),
            direction,
            quantity: Decimal::ONE,
            entry_price: Decimal::ZERO,
            exit_price: None,
            fees: Decimal::ZERO,
            pnl,
            entry_at: Utc::now().naive_utc(),
            exit_at: None,
            notes: None,
            setup: None,
            mistakes: Vec::new(),
            tags: Vec::new(),
            rating: None,
            stop_loss: None,
            take_profit: None,
            screenshot_url: None,
            created_at: None,
        }
    }

    /// Materializes the trade with a store-assigned identifier.
    pub fn into_trade(self, id: i64) -> Trade {
        let now = Utc::now().naive_utc();
        Trade {
            id,
            user_id: self.user_id,
            account_id: self.account_id,
            symbol: self.symbol,
            direction: self.direction,
            quantity: self.quantity,
            entry_price: self.entry_price,
            exit_price: self.exit_price,
            fees: self.fees,
            pnl: self.pnl,
            entry_at: self.entry_at,
            exit_at: self.exit_at,
            notes: self.notes,
            setup: self.setup,
            mistakes: self.mistakes,
            tags: self.tags,
            rating: self.rating,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            screenshot_url: self.screenshot_url,
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        }
    }
}
