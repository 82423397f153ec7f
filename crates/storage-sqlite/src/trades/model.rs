//! Database models for trades.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::errors::StorageError;
use crate::utils::{decimal_from_db, list_from_db, list_to_db, optional_decimal_from_db};
use tradejournal_core::trades::{NewTrade, Trade, TradeDirection};

#[derive(Queryable, Identifiable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::trades)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TradeDB {
    pub id: i64,
    pub user_id: Option<String>,
    pub account_id: Option<i64>,
    pub symbol: String,
    pub direction: String,
    pub quantity: String,
    pub entry_price: String,
    pub exit_price: Option<String>,
    pub fees: String,
    pub pnl: String,
    pub entry_at: NaiveDateTime,
    pub exit_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub setup: Option<String>,
    pub mistakes: String,
    pub tags: String,
    pub rating: Option<i32>,
    pub stop_loss: Option<String>,
    pub take_profit: Option<String>,
    pub screenshot_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::trades)]
pub struct NewTradeDB {
    pub user_id: Option<String>,
    pub account_id: Option<i64>,
    pub symbol: String,
    pub direction: String,
    pub quantity: String,
    pub entry_price: String,
    pub exit_price: Option<String>,
    pub fees: String,
    pub pnl: String,
    pub entry_at: NaiveDateTime,
    pub exit_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub setup: Option<String>,
    pub mistakes: String,
    pub tags: String,
    pub rating: Option<i32>,
    pub stop_loss: Option<String>,
    pub take_profit: Option<String>,
    pub screenshot_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<NewTrade> for NewTradeDB {
    fn from(trade: NewTrade) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            user_id: trade.user_id,
            account_id: trade.account_id,
            symbol: trade.symbol,
            direction: trade.direction.as_str().to_string(),
            quantity: trade.quantity.to_string(),
            entry_price: trade.entry_price.to_string(),
            exit_price: trade.exit_price.map(|v| v.to_string()),
            fees: trade.fees.to_string(),
            pnl: trade.pnl.to_string(),
            entry_at: trade.entry_at,
            exit_at: trade.exit_at,
            notes: trade.notes,
            setup: trade.setup,
            mistakes: list_to_db(&trade.mistakes),
            tags: list_to_db(&trade.tags),
            rating: trade.rating,
            stop_loss: trade.stop_loss.map(|v| v.to_string()),
            take_profit: trade.take_profit.map(|v| v.to_string()),
            screenshot_url: trade.screenshot_url,
            created_at: trade.created_at.unwrap_or(now),
            updated_at: now,
        }
    }
}

impl From<Trade> for TradeDB {
    fn from(trade: Trade) -> Self {
        Self {
            id: trade.id,
            user_id: trade.user_id,
            account_id: trade.account_id,
            symbol: trade.symbol,
            direction: trade.direction.as_str().to_string(),
            quantity: trade.quantity.to_string(),
            entry_price: trade.entry_price.to_string(),
            exit_price: trade.exit_price.map(|v| v.to_string()),
            fees: trade.fees.to_string(),
            pnl: trade.pnl.to_string(),
            entry_at: trade.entry_at,
            exit_at: trade.exit_at,
            notes: trade.notes,
            setup: trade.setup,
            mistakes: list_to_db(&trade.mistakes),
            tags: list_to_db(&trade.tags),
            rating: trade.rating,
            stop_loss: trade.stop_loss.map(|v| v.to_string()),
            take_profit: trade.take_profit.map(|v| v.to_string()),
            screenshot_url: trade.screenshot_url,
            created_at: trade.created_at,
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl TryFrom<TradeDB> for Trade {
    type Error = StorageError;

    fn try_from(db: TradeDB) -> Result<Self, Self::Error> {
        let direction = TradeDirection::parse(&db.direction).ok_or_else(|| {
            StorageError::invalid_data(format!(
                "trade {} has unknown direction '{}'",
                db.id, db.direction
            ))
        })?;
        Ok(Trade {
            id: db.id,
            user_id: db.user_id,
            account_id: db.account_id,
            symbol: db.symbol,
            direction,
            quantity: decimal_from_db(&db.quantity, "quantity")?,
            entry_price: decimal_from_db(&db.entry_price, "entry_price")?,
            exit_price: optional_decimal_from_db(db.exit_price.as_deref(), "exit_price")?,
            fees: decimal_from_db(&db.fees, "fees")?,
            pnl: decimal_from_db(&db.pnl, "pnl")?,
            entry_at: db.entry_at,
            exit_at: db.exit_at,
            notes: db.notes,
            setup: db.setup,
            mistakes: list_from_db(&db.mistakes, "mistakes"),
            tags: list_from_db(&db.tags, "tags"),
            rating: db.rating,
            stop_loss: optional_decimal_from_db(db.stop_loss.as_deref(), "stop_loss")?,
            take_profit: optional_decimal_from_db(db.take_profit.as_deref(), "take_profit")?,
            screenshot_url: db.screenshot_url,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}
