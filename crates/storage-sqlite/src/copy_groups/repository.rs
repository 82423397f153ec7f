use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::{CopyGroupDB, CopyMemberDB, NewCopyGroupDB, NewCopyMemberDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{copy_group_members, copy_groups};
use tradejournal_core::copy_groups::{CopyGroup, CopyMember, NewCopyGroup, NewCopyMember};
use tradejournal_core::store::OwnerFilter;
use tradejournal_core::Result;

pub struct CopyGroupRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CopyGroupRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        CopyGroupRepository { pool, writer }
    }

    pub fn load_groups(&self, owner: &OwnerFilter) -> Result<Vec<CopyGroup>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = copy_groups::table.into_boxed();
        query = match owner {
            OwnerFilter::Guest => query.filter(copy_groups::user_id.is_null()),
            OwnerFilter::User(user) => query.filter(copy_groups::user_id.eq(user.clone())),
            OwnerFilter::All => query,
        };
        let rows = query
            .order(copy_groups::id.asc())
            .load::<CopyGroupDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(CopyGroup::from).collect())
    }

    pub fn load_members(&self, owner: &OwnerFilter) -> Result<Vec<CopyMember>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = copy_group_members::table.into_boxed();
        query = match owner {
            OwnerFilter::Guest => query.filter(copy_group_members::user_id.is_null()),
            OwnerFilter::User(user) => {
                query.filter(copy_group_members::user_id.eq(user.clone()))
            }
            OwnerFilter::All => query,
        };
        let rows = query
            .order(copy_group_members::id.asc())
            .load::<CopyMemberDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|row| CopyMember::try_from(row).map_err(Into::into))
            .collect()
    }

    pub async fn create_group(&self, group: NewCopyGroup) -> Result<CopyGroup> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CopyGroup> {
                let group_db: NewCopyGroupDB = group.into();
                let result_db = diesel::insert_into(copy_groups::table)
                    .values(&group_db)
                    .returning(CopyGroupDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(CopyGroup::from(result_db))
            })
            .await
    }

    pub async fn update_group(&self, group: CopyGroup) -> Result<CopyGroup> {
        let group_db = CopyGroupDB::from(group);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CopyGroup> {
                let result_db = diesel::update(copy_groups::table.find(group_db.id))
                    .set(&group_db)
                    .returning(CopyGroupDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(CopyGroup::from(result_db))
            })
            .await
    }

    /// Deletes the group; its members go with it.
    pub async fn delete_group(&self, group_id: i64) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::delete(
                    copy_group_members::table.filter(copy_group_members::group_id.eq(group_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                let affected = diesel::delete(copy_groups::table.find(group_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(StorageError::from(diesel::result::Error::NotFound).into());
                }
                Ok(())
            })
            .await
    }

    pub async fn create_member(&self, member: NewCopyMember) -> Result<CopyMember> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CopyMember> {
                let member_db: NewCopyMemberDB = member.into();
                let result_db = diesel::insert_into(copy_group_members::table)
                    .values(&member_db)
                    .returning(CopyMemberDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(CopyMember::try_from(result_db)?)
            })
            .await
    }

    pub async fn update_member(&self, member: CopyMember) -> Result<CopyMember> {
        let member_db = CopyMemberDB::from(member);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CopyMember> {
                let result_db = diesel::update(copy_group_members::table.find(member_db.id))
                    .set(&member_db)
                    .returning(CopyMemberDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(CopyMember::try_from(result_db)?)
            })
            .await
    }

    pub async fn delete_member(&self, member_id: i64) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = diesel::delete(copy_group_members::table.find(member_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(StorageError::from(diesel::result::Error::NotFound).into());
                }
                Ok(())
            })
            .await
    }
}

/// Deletes the members and groups `owner` selects, members first.
pub(crate) fn delete_owned_copy_groups(
    conn: &mut SqliteConnection,
    owner: &OwnerFilter,
) -> std::result::Result<usize, StorageError> {
    let members = match owner {
        OwnerFilter::Guest => diesel::delete(
            copy_group_members::table.filter(copy_group_members::user_id.is_null()),
        )
        .execute(conn),
        OwnerFilter::User(user) => diesel::delete(
            copy_group_members::table.filter(copy_group_members::user_id.eq(user.clone())),
        )
        .execute(conn),
        OwnerFilter::All => diesel::delete(copy_group_members::table).execute(conn),
    }?;
    let groups = match owner {
        OwnerFilter::Guest => {
            diesel::delete(copy_groups::table.filter(copy_groups::user_id.is_null()))
                .execute(conn)
        }
        OwnerFilter::User(user) => {
            diesel::delete(copy_groups::table.filter(copy_groups::user_id.eq(user.clone())))
                .execute(conn)
        }
        OwnerFilter::All => diesel::delete(copy_groups::table).execute(conn),
    }?;
    Ok(members + groups)
}
