//! JSON row shapes exchanged with the remote relational service.
//!
//! Outgoing rows never carry local ids: the owner is stamped, references are
//! rewritten to remote ids, and optional columns the remote lacks are pruned.
//! Incoming rows tolerate missing optional columns.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::capability_prober::CapabilityRecord;
use crate::accounts::{Account, AccountType, NewAccount, ADVANCED_ACCOUNT_COLUMNS};
use crate::copy_groups::{CopyGroup, CopyMember, NewCopyGroup, NewCopyMember};
use crate::errors::{Error, Result};
use crate::journals::{DailyJournal, NewDailyJournal};
use crate::preferences::{NewPillColor, PillColor, UserProfile};
use crate::trades::{NewTrade, Trade, TradeDirection, ADVANCED_TRADE_COLUMNS};

/// Select expression for trades with the owning account's display fields.
pub const TRADE_SELECT_WITH_ACCOUNT: &str = "*,accounts(name,account_type)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteAccountRow {
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub account_type: String,
    pub initial_capital: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub daily_loss_limit: Option<Decimal>,
    #[serde(default)]
    pub max_drawdown: Option<Decimal>,
    #[serde(default)]
    pub profit_target: Option<Decimal>,
    #[serde(default)]
    pub last_reset_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reset_count: Option<i32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Accepts string or numeric identifiers; anything else reads as absent.
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(id)) if !id.is_empty() => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}

fn required_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_id(deserializer)?.ok_or_else(|| serde::de::Error::custom("missing identifier"))
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Account display fields embedded in a trade select.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedAccount {
    pub name: String,
    #[serde(default)]
    pub account_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTradeRow {
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient_id")]
    pub account_id: Option<String>,
    pub symbol: String,
    pub direction: String,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    #[serde(default)]
    pub exit_price: Option<Decimal>,
    #[serde(default)]
    pub fees: Decimal,
    #[serde(default)]
    pub pnl: Decimal,
    pub entry_at: DateTime<Utc>,
    #[serde(default)]
    pub exit_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub setup: Option<String>,
    #[serde(default)]
    pub mistakes: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    #[serde(default)]
    pub take_profit: Option<Decimal>,
    #[serde(default)]
    pub screenshot_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub accounts: Option<EmbeddedAccount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePillColorRow {
    pub user_id: String,
    pub category: String,
    pub value: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCopyGroupRow {
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_id")]
    pub leader_account_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCopyMemberRow {
    pub user_id: String,
    #[serde(deserialize_with = "required_id")]
    pub group_id: String,
    #[serde(default, deserialize_with = "lenient_id")]
    pub follower_account_id: Option<String>,
    #[serde(default = "default_multiplier")]
    pub multiplier: Decimal,
}

fn default_multiplier() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteJournalRow {
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteProfileRow {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub layout: Value,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn to_object<T: Serialize>(row: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(row)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::sync(format!(
            "Remote row serialized to a non-object value: {}",
            other
        ))),
    }
}

fn prune(map: &mut Map<String, Value>, columns: &[&str]) {
    for column in columns {
        map.remove(*column);
    }
}

/// Outgoing account row keyed by a client-generated remote id.
pub fn account_row(
    account: &Account,
    user_id: &str,
    remote_id: &str,
    capabilities: &CapabilityRecord,
) -> Result<Value> {
    let row = RemoteAccountRow {
        id: Some(remote_id.to_string()),
        user_id: user_id.to_string(),
        name: account.name.clone(),
        account_type: account.account_type.as_str().to_string(),
        initial_capital: account.initial_capital,
        currency: account.currency.clone(),
        daily_loss_limit: account.daily_loss_limit,
        max_drawdown: account.max_drawdown,
        profit_target: account.profit_target,
        last_reset_at: account.last_reset_at.map(|at| at.and_utc()),
        reset_count: Some(account.reset_count),
        created_at: Some(account.created_at.and_utc()),
        updated_at: Some(account.updated_at.and_utc()),
    };
    let mut map = to_object(&row)?;
    if !capabilities.advanced_accounts {
        prune(&mut map, &ADVANCED_ACCOUNT_COLUMNS);
    }
    Ok(Value::Object(map))
}

/// Outgoing trade row. `account_ref` is the already-remapped remote account id.
pub fn trade_row(
    trade: &Trade,
    user_id: &str,
    account_ref: Option<String>,
    capabilities: &CapabilityRecord,
) -> Result<Value> {
    let row = RemoteTradeRow {
        user_id: user_id.to_string(),
        account_id: account_ref,
        symbol: trade.symbol.clone(),
        direction: trade.direction.as_str().to_string(),
        quantity: trade.quantity,
        entry_price: trade.entry_price,
        exit_price: trade.exit_price,
        fees: trade.fees,
        pnl: trade.pnl,
        entry_at: trade.entry_at.and_utc(),
        exit_at: trade.exit_at.map(|at| at.and_utc()),
        notes: trade.notes.clone(),
        setup: trade.setup.clone(),
        mistakes: Some(trade.mistakes.clone()),
        tags: Some(trade.tags.clone()),
        rating: trade.rating,
        stop_loss: trade.stop_loss,
        take_profit: trade.take_profit,
        screenshot_url: trade.screenshot_url.clone(),
        created_at: Some(trade.created_at.and_utc()),
        updated_at: Some(trade.updated_at.and_utc()),
        accounts: None,
    };
    let mut map = to_object(&row)?;
    // Explicit null, not absence: an unresolved parent must clear the reference.
    map.entry("account_id").or_insert(Value::Null);
    if !capabilities.advanced_trades {
        prune(&mut map, &ADVANCED_TRADE_COLUMNS);
    }
    Ok(Value::Object(map))
}

pub fn pill_color_row(pill: &PillColor, user_id: &str) -> Result<Value> {
    serde_json::to_value(RemotePillColorRow {
        user_id: user_id.to_string(),
        category: pill.category.clone(),
        value: pill.value.clone(),
        color: pill.color.clone(),
    })
    .map_err(Error::from)
}

pub fn copy_group_row(
    group: &CopyGroup,
    user_id: &str,
    remote_id: &str,
    leader_ref: String,
) -> Result<Value> {
    serde_json::to_value(RemoteCopyGroupRow {
        id: Some(remote_id.to_string()),
        user_id: user_id.to_string(),
        name: group.name.clone(),
        leader_account_id: Some(leader_ref),
        created_at: Some(group.created_at.and_utc()),
    })
    .map_err(Error::from)
}

pub fn copy_member_row(
    member: &CopyMember,
    user_id: &str,
    group_ref: String,
    follower_ref: String,
) -> Result<Value> {
    serde_json::to_value(RemoteCopyMemberRow {
        user_id: user_id.to_string(),
        group_id: group_ref,
        follower_account_id: Some(follower_ref),
        multiplier: member.multiplier,
    })
    .map_err(Error::from)
}

pub fn journal_row(journal: &DailyJournal, user_id: &str) -> Result<Value> {
    serde_json::to_value(RemoteJournalRow {
        user_id: user_id.to_string(),
        date: journal.date,
        content: journal.content.clone(),
        mood: journal.mood.clone(),
        created_at: Some(journal.created_at.and_utc()),
        updated_at: Some(journal.updated_at.and_utc()),
    })
    .map_err(Error::from)
}

pub fn profile_row(profile: &UserProfile) -> Result<Value> {
    serde_json::to_value(RemoteProfileRow {
        user_id: profile.user_id.clone(),
        display_name: profile.display_name.clone(),
        avatar_url: profile.avatar_url.clone(),
        bio: profile.bio.clone(),
        layout: profile.layout.clone(),
        updated_at: Some(profile.updated_at.and_utc()),
    })
    .map_err(Error::from)
}

impl RemoteAccountRow {
    pub fn into_new_account(self) -> NewAccount {
        let account_type = AccountType::parse(&self.account_type).unwrap_or_else(|| {
            log::warn!(
                "[Pull] Unknown account type '{}' for account '{}', using live",
                self.account_type,
                self.name
            );
            AccountType::default()
        });
        NewAccount {
            user_id: Some(self.user_id),
            name: self.name,
            account_type,
            initial_capital: self.initial_capital,
            currency: self.currency,
            daily_loss_limit: self.daily_loss_limit,
            max_drawdown: self.max_drawdown,
            profit_target: self.profit_target,
            last_reset_at: self.last_reset_at.map(|at| at.naive_utc()),
            reset_count: self.reset_count.unwrap_or(0),
            created_at: self.created_at.map(|at| at.naive_utc()),
        }
    }
}

impl RemoteTradeRow {
    /// `account_id` is the already-remapped local account id.
    pub fn into_new_trade(self, account_id: Option<i64>) -> NewTrade {
        let direction = TradeDirection::parse(&self.direction).unwrap_or_default();
        NewTrade {
            user_id: Some(self.user_id),
            account_id,
            symbol: self.symbol,
            direction,
            quantity: self.quantity,
            entry_price: self.entry_price,
            exit_price: self.exit_price,
            fees: self.fees,
            pnl: self.pnl,
            entry_at: self.entry_at.naive_utc(),
            exit_at: self.exit_at.map(|at| at.naive_utc()),
            notes: self.notes,
            setup: self.setup,
            mistakes: self.mistakes.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            rating: self.rating,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            screenshot_url: self.screenshot_url,
            created_at: self.created_at.map(|at| at.naive_utc()),
        }
    }
}

impl RemotePillColorRow {
    pub fn into_new_pill_color(self) -> NewPillColor {
        NewPillColor {
            user_id: Some(self.user_id),
            category: self.category,
            value: self.value,
            color: self.color,
        }
    }
}

impl RemoteCopyGroupRow {
    pub fn into_new_copy_group(self, leader_account_id: i64) -> NewCopyGroup {
        NewCopyGroup {
            user_id: Some(self.user_id),
            name: self.name,
            leader_account_id: Some(leader_account_id),
            created_at: self.created_at.map(|at| at.naive_utc()),
        }
    }
}

impl RemoteCopyMemberRow {
    pub fn into_new_copy_member(self, group_id: i64, follower_account_id: i64) -> NewCopyMember {
        NewCopyMember {
            user_id: Some(self.user_id),
            group_id,
            follower_account_id: Some(follower_account_id),
            multiplier: self.multiplier,
        }
    }
}

impl RemoteJournalRow {
    pub fn into_new_journal(self) -> NewDailyJournal {
        NewDailyJournal {
            user_id: Some(self.user_id),
            date: self.date,
            content: self.content,
            mood: self.mood,
            created_at: self.created_at.map(|at| at.naive_utc()),
        }
    }
}

impl RemoteProfileRow {
    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            user_id: self.user_id,
            display_name: self.display_name,
            avatar_url: self.avatar_url,
            bio: self.bio,
            layout: self.layout,
            updated_at: self
                .updated_at
                .map(|at| at.naive_utc())
                .unwrap_or_else(|| Utc::now().naive_utc()),
        }
    }
}

/// Decodes one remote row, logging and skipping rows that do not fit.
pub fn decode_row<T: serde::de::DeserializeOwned>(row: Value, table: &str) -> Option<T> {
    match serde_json::from_value(row) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            log::warn!("[Pull] Skipping malformed {} row: {}", table, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::NewAccount;
    use crate::trades::NewTrade;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn account_row_prunes_advanced_columns_when_unsupported() {
        let mut account =
            NewAccount::new(None, "Topstep 50k", AccountType::Evaluation, dec!(50000)).into_account(3);
        account.daily_loss_limit = Some(dec!(1000));

        let basic = account_row(&account, "u-1", "r-1", &CapabilityRecord::default()).unwrap();
        assert_eq!(basic["id"], json!("r-1"));
        assert_eq!(basic["user_id"], json!("u-1"));
        assert_eq!(basic["account_type"], json!("evaluation"));
        for column in ADVANCED_ACCOUNT_COLUMNS {
            assert!(basic.get(column).is_none(), "{} should be pruned", column);
        }

        let full = account_row(&account, "u-1", "r-1", &CapabilityRecord::full()).unwrap();
        assert_eq!(full["daily_loss_limit"], json!(1000.0));
        assert_eq!(full["reset_count"], json!(0));
    }

    #[test]
    fn trade_row_keeps_null_account_reference() {
        let mut trade =
            NewTrade::new(None, Some(9), "NQ", TradeDirection::Short, dec!(-120)).into_trade(1);
        trade.mistakes = vec!["fomo".to_string()];

        let row = trade_row(&trade, "u-1", None, &CapabilityRecord::default()).unwrap();
        assert_eq!(row["account_id"], Value::Null);
        assert_eq!(row["direction"], json!("short"));
        assert!(row.get("mistakes").is_none());
        assert!(row.get("accounts").is_none());

        let row = trade_row(&trade, "u-1", Some("r-acc".to_string()), &CapabilityRecord::full())
            .unwrap();
        assert_eq!(row["account_id"], json!("r-acc"));
        assert_eq!(row["mistakes"], json!(["fomo"]));
    }

    #[test]
    fn remote_trade_without_advanced_columns_decodes() {
        let row = json!({
            "id": "t-1",
            "user_id": "u-1",
            "account_id": "a-1",
            "symbol": "ES",
            "direction": "long",
            "quantity": 2,
            "entry_price": 5000.25,
            "pnl": 150.5,
            "entry_at": "2024-03-01T14:30:00+00:00",
            "accounts": { "name": "Main", "account_type": "live" }
        });
        let decoded: RemoteTradeRow = decode_row(row, "trades").expect("decodes");
        assert_eq!(decoded.accounts.as_ref().map(|a| a.name.as_str()), Some("Main"));

        let trade = decoded.into_new_trade(Some(4));
        assert_eq!(trade.account_id, Some(4));
        assert_eq!(trade.pnl, dec!(150.5));
        assert!(trade.mistakes.is_empty());
        assert_eq!(trade.user_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn numeric_identifiers_are_read_as_strings() {
        let row: RemoteCopyMemberRow = decode_row(
            json!({ "user_id": "u-1", "group_id": 17, "follower_account_id": null }),
            "copy_group_members",
        )
        .unwrap();
        assert_eq!(row.group_id, "17");
        assert_eq!(row.follower_account_id, None);
        assert_eq!(row.multiplier, Decimal::ONE);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let decoded: Option<RemoteAccountRow> = decode_row(json!({ "name": 5 }), "accounts");
        assert!(decoded.is_none());
    }

    #[test]
    fn unknown_account_type_falls_back_to_live() {
        let row: RemoteAccountRow = decode_row(
            json!({
                "id": "a-1",
                "user_id": "u-1",
                "name": "Paper",
                "account_type": "paper",
                "initial_capital": 1000
            }),
            "accounts",
        )
        .unwrap();
        let account = row.into_new_account();
        assert_eq!(account.account_type, AccountType::Live);
        assert_eq!(account.currency, "USD");
    }
}
