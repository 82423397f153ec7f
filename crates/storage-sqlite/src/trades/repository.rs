use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::{NewTradeDB, TradeDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::trades;
use tradejournal_core::store::OwnerFilter;
use tradejournal_core::trades::{NewTrade, Trade};
use tradejournal_core::Result;

pub struct TradeRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TradeRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        TradeRepository { pool, writer }
    }

    pub fn load_trades(&self, owner: &OwnerFilter) -> Result<Vec<Trade>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = trades::table.into_boxed();
        query = match owner {
            OwnerFilter::Guest => query.filter(trades::user_id.is_null()),
            OwnerFilter::User(user) => query.filter(trades::user_id.eq(user.clone())),
            OwnerFilter::All => query,
        };
        let rows = query
            .order((trades::entry_at.asc(), trades::id.asc()))
            .load::<TradeDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|row| Trade::try_from(row).map_err(Into::into))
            .collect()
    }

    pub async fn create(&self, new_trade: NewTrade) -> Result<Trade> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Trade> {
                let new_trade_db: NewTradeDB = new_trade.into();
                let result_db = diesel::insert_into(trades::table)
                    .values(&new_trade_db)
                    .returning(TradeDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Trade::try_from(result_db)?)
            })
            .await
    }

    pub async fn update(&self, trade: Trade) -> Result<Trade> {
        let trade_db = TradeDB::from(trade);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Trade> {
                let result_db = diesel::update(trades::table.find(trade_db.id))
                    .set(&trade_db)
                    .returning(TradeDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Trade::try_from(result_db)?)
            })
            .await
    }

    pub async fn delete(&self, trade_id: i64) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = diesel::delete(trades::table.find(trade_id))
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

pub(crate) fn delete_owned_trades(
    conn: &mut SqliteConnection,
    owner: &OwnerFilter,
) -> std::result::Result<usize, StorageError> {
    let affected = match owner {
        OwnerFilter::Guest => {
            diesel::delete(trades::table.filter(trades::user_id.is_null())).execute(conn)
        }
        OwnerFilter::User(user) => {
            diesel::delete(trades::table.filter(trades::user_id.eq(user.clone()))).execute(conn)
        }
        OwnerFilter::All => diesel::delete(trades::table).execute(conn),
    }?;
    Ok(affected)
}
