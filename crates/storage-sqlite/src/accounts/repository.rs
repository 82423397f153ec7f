use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::{AccountDB, NewAccountDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::accounts;
use tradejournal_core::accounts::{Account, NewAccount};
use tradejournal_core::store::OwnerFilter;
use tradejournal_core::Result;

pub struct AccountRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AccountRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        AccountRepository { pool, writer }
    }

    pub fn load_accounts(&self, owner: &OwnerFilter) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = accounts::table.into_boxed();
        query = match owner {
            OwnerFilter::Guest => query.filter(accounts::user_id.is_null()),
            OwnerFilter::User(user) => query.filter(accounts::user_id.eq(user.clone())),
            OwnerFilter::All => query,
        };
        let rows = query
            .order(accounts::id.asc())
            .load::<AccountDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|row| Account::try_from(row).map_err(Into::into))
            .collect()
    }

    pub async fn create(&self, new_account: NewAccount) -> Result<Account> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Account> {
                let new_account_db: NewAccountDB = new_account.into();
                let result_db = diesel::insert_into(accounts::table)
                    .values(&new_account_db)
                    .returning(AccountDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Account::try_from(result_db)?)
            })
            .await
    }

    pub async fn update(&self, account: Account) -> Result<Account> {
        let account_db = AccountDB::from(account);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Account> {
                let result_db = diesel::update(accounts::table.find(account_db.id))
                    .set(&account_db)
                    .returning(AccountDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Account::try_from(result_db)?)
            })
            .await
    }

    pub async fn delete(&self, account_id: i64) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = diesel::delete(accounts::table.find(account_id))
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

/// Deletes the accounts `owner` selects. Runs inside the caller's transaction.
pub(crate) fn delete_owned_accounts(
    conn: &mut SqliteConnection,
    owner: &OwnerFilter,
) -> std::result::Result<usize, StorageError> {
    let affected = match owner {
        OwnerFilter::Guest => {
            diesel::delete(accounts::table.filter(accounts::user_id.is_null())).execute(conn)
        }
        OwnerFilter::User(user) => {
            diesel::delete(accounts::table.filter(accounts::user_id.eq(user.clone())))
                .execute(conn)
        }
        OwnerFilter::All => diesel::delete(accounts::table).execute(conn),
    }?;
    Ok(affected)
}
