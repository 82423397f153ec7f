use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::errors::StorageError;
use crate::utils::decimal_from_db;
use tradejournal_core::copy_groups::{CopyGroup, CopyMember, NewCopyGroup, NewCopyMember};

#[derive(Queryable, Identifiable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::copy_groups)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CopyGroupDB {
    pub id: i64,
    pub user_id: Option<String>,
    pub name: String,
    pub leader_account_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::copy_groups)]
pub struct NewCopyGroupDB {
    pub user_id: Option<String>,
    pub name: String,
    pub leader_account_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

impl From<NewCopyGroup> for NewCopyGroupDB {
    fn from(group: NewCopyGroup) -> Self {
        Self {
            user_id: group.user_id,
            name: group.name,
            leader_account_id: group.leader_account_id,
            created_at: group.created_at.unwrap_or_else(|| Utc::now().naive_utc()),
        }
    }
}

impl From<CopyGroup> for CopyGroupDB {
    fn from(group: CopyGroup) -> Self {
        Self {
            id: group.id,
            user_id: group.user_id,
            name: group.name,
            leader_account_id: group.leader_account_id,
            created_at: group.created_at,
        }
    }
}

impl From<CopyGroupDB> for CopyGroup {
    fn from(db: CopyGroupDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            leader_account_id: db.leader_account_id,
            created_at: db.created_at,
        }
    }
}

#[derive(Queryable, Identifiable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::copy_group_members)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CopyMemberDB {
    pub id: i64,
    pub user_id: Option<String>,
    pub group_id: i64,
    pub follower_account_id: Option<i64>,
    pub multiplier: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::copy_group_members)]
pub struct NewCopyMemberDB {
    pub user_id: Option<String>,
    pub group_id: i64,
    pub follower_account_id: Option<i64>,
    pub multiplier: String,
}

impl From<NewCopyMember> for NewCopyMemberDB {
    fn from(member: NewCopyMember) -> Self {
        Self {
            user_id: member.user_id,
            group_id: member.group_id,
            follower_account_id: member.follower_account_id,
            multiplier: member.multiplier.to_string(),
        }
    }
}

impl From<CopyMember> for CopyMemberDB {
    fn from(member: CopyMember) -> Self {
        Self {
            id: member.id,
            user_id: member.user_id,
            group_id: member.group_id,
            follower_account_id: member.follower_account_id,
            multiplier: member.multiplier.to_string(),
        }
    }
}

impl TryFrom<CopyMemberDB> for CopyMember {
    type Error = StorageError;

    fn try_from(db: CopyMemberDB) -> Result<Self, Self::Error> {
        Ok(Self {
            id: db.id,
            user_id: db.user_id,
            group_id: db.group_id,
            follower_account_id: db.follower_account_id,
            multiplier: decimal_from_db(&db.multiplier, "multiplier")?,
        })
    }
}
