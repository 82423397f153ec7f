use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use super::model::{NewPillColorDB, PillColorDB, UserProfileDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{pill_colors, user_profiles};
use tradejournal_core::preferences::{NewPillColor, PillColor, UserProfile};
use tradejournal_core::store::OwnerFilter;
use tradejournal_core::Result;

pub struct PreferencesRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PreferencesRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PreferencesRepository { pool, writer }
    }

    pub fn load_pill_colors(&self, owner: &OwnerFilter) -> Result<Vec<PillColor>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = pill_colors::table.into_boxed();
        query = match owner {
            OwnerFilter::Guest => query.filter(pill_colors::user_id.is_null()),
            OwnerFilter::User(user) => query.filter(pill_colors::user_id.eq(user.clone())),
            OwnerFilter::All => query,
        };
        let rows = query
            .order(pill_colors::id.asc())
            .load::<PillColorDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(PillColor::from).collect())
    }

    pub async fn create_pill_color(&self, pill: NewPillColor) -> Result<PillColor> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PillColor> {
                let pill_db: NewPillColorDB = pill.into();
                let result_db = diesel::insert_into(pill_colors::table)
                    .values(&pill_db)
                    .returning(PillColorDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(PillColor::from(result_db))
            })
            .await
    }

    pub async fn update_pill_color(&self, pill: PillColor) -> Result<PillColor> {
        let pill_db = PillColorDB::from(pill);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PillColor> {
                let result_db = diesel::update(pill_colors::table.find(pill_db.id))
                    .set(&pill_db)
                    .returning(PillColorDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(PillColor::from(result_db))
            })
            .await
    }

    pub async fn delete_pill_color(&self, pill_id: i64) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = diesel::delete(pill_colors::table.find(pill_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(StorageError::from(diesel::result::Error::NotFound).into());
                }
                Ok(())
            })
            .await
    }

    pub fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let mut conn = get_connection(&self.pool)?;
        let profile = user_profiles::table
            .find(user_id)
            .first::<UserProfileDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(profile.map(UserProfile::from))
    }

    /// Insert or replace the profile keyed by `user_id`.
    pub async fn save_profile(&self, profile: UserProfile) -> Result<UserProfile> {
        let profile_db = UserProfileDB::from(profile);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<UserProfile> {
                let result_db = diesel::insert_into(user_profiles::table)
                    .values(&profile_db)
                    .on_conflict(user_profiles::user_id)
                    .do_update()
                    .set(&profile_db)
                    .returning(UserProfileDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(UserProfile::from(result_db))
            })
            .await
    }
}

pub(crate) fn delete_owned_pill_colors(
    conn: &mut SqliteConnection,
    owner: &OwnerFilter,
) -> std::result::Result<usize, StorageError> {
    let affected = match owner {
        OwnerFilter::Guest => {
            diesel::delete(pill_colors::table.filter(pill_colors::user_id.is_null()))
                .execute(conn)
        }
        OwnerFilter::User(user) => {
            diesel::delete(pill_colors::table.filter(pill_colors::user_id.eq(user.clone())))
                .execute(conn)
        }
        OwnerFilter::All => diesel::delete(pill_colors::table).execute(conn),
    }?;
    Ok(affected)
}
