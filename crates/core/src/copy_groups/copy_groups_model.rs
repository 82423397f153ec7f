use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyGroup {
    pub id: i64,
    pub user_id: Option<String>,
    pub name: String,
    pub leader_account_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCopyGroup {
    pub user_id: Option<String>,
    pub name: String,
    pub leader_account_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl NewCopyGroup {
    pub fn into_copy_group(self, id: i64) -> CopyGroup {
        CopyGroup {
            id,
            user_id: self.user_id,
            name: self.name,
            leader_account_id: self.leader_account_id,
            created_at: self.created_at.unwrap_or_else(|| Utc::now().naive_utc()),
        }
    }
}

/// Follower leg of a copy group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyMember {
    pub id: i64,
    pub user_id: Option<String>,
    pub group_id: i64,
    pub follower_account_id: Option<i64>,
    /// Size multiplier applied to the leader's position.
    pub multiplier: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCopyMember {
    pub user_id: Option<String>,
    pub group_id: i64,
    pub follower_account_id: Option<i64>,
    pub multiplier: Decimal,
}

impl NewCopyMember {
    pub fn into_copy_member(self, id: i64) -> CopyMember {
        CopyMember {
            id,
            user_id: self.user_id,
            group_id: self.group_id,
            follower_account_id: self.follower_account_id,
            multiplier: self.multiplier,
        }
    }
}
