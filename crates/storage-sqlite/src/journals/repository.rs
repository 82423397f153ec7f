use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::{DailyJournalDB, NewDailyJournalDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::daily_journals;
use tradejournal_core::journals::{DailyJournal, NewDailyJournal};
use tradejournal_core::store::OwnerFilter;
use tradejournal_core::Result;

pub struct JournalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl JournalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        JournalRepository { pool, writer }
    }

    pub fn load_journals(&self, owner: &OwnerFilter) -> Result<Vec<DailyJournal>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = daily_journals::table.into_boxed();
        query = match owner {
            OwnerFilter::Guest => query.filter(daily_journals::user_id.is_null()),
            OwnerFilter::User(user) => query.filter(daily_journals::user_id.eq(user.clone())),
            OwnerFilter::All => query,
        };
        let rows = query
            .order(daily_journals::date.asc())
            .load::<DailyJournalDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(DailyJournal::from).collect())
    }

    pub async fn create(&self, journal: NewDailyJournal) -> Result<DailyJournal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<DailyJournal> {
                let journal_db: NewDailyJournalDB = journal.into();
                let result_db = diesel::insert_into(daily_journals::table)
                    .values(&journal_db)
                    .returning(DailyJournalDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(DailyJournal::from(result_db))
            })
            .await
    }

    pub async fn update(&self, journal: DailyJournal) -> Result<DailyJournal> {
        let journal_db = DailyJournalDB::from(journal);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<DailyJournal> {
                let result_db = diesel::update(daily_journals::table.find(journal_db.id))
                    .set(&journal_db)
                    .returning(DailyJournalDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(DailyJournal::from(result_db))
            })
            .await
    }

    pub async fn delete(&self, journal_id: i64) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = diesel::delete(daily_journals::table.find(journal_id))
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

pub(crate) fn delete_owned_journals(
    conn: &mut SqliteConnection,
    owner: &OwnerFilter,
) -> std::result::Result<usize, StorageError> {
    let affected = match owner {
        OwnerFilter::Guest => {
            diesel::delete(daily_journals::table.filter(daily_journals::user_id.is_null()))
                .execute(conn)
        }
        OwnerFilter::User(user) => diesel::delete(
            daily_journals::table.filter(daily_journals::user_id.eq(user.clone())),
        )
        .execute(conn),
        OwnerFilter::All => diesel::delete(daily_journals::table).execute(conn),
    }?;
    Ok(affected)
}
