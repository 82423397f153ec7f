use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;

use tradejournal_core::journals::{DailyJournal, NewDailyJournal};

#[derive(Queryable, Identifiable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::daily_journals)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DailyJournalDB {
    pub id: i64,
    pub user_id: Option<String>,
    pub date: NaiveDate,
    pub content: String,
    pub mood: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::daily_journals)]
pub struct NewDailyJournalDB {
    pub user_id: Option<String>,
    pub date: NaiveDate,
    pub content: String,
    pub mood: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<NewDailyJournal> for NewDailyJournalDB {
    fn from(journal: NewDailyJournal) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            user_id: journal.user_id,
            date: journal.date,
            content: journal.content,
            mood: journal.mood,
            created_at: journal.created_at.unwrap_or(now),
            updated_at: now,
        }
    }
}

impl From<DailyJournal> for DailyJournalDB {
    fn from(journal: DailyJournal) -> Self {
        Self {
            id: journal.id,
            user_id: journal.user_id,
            date: journal.date,
            content: journal.content,
            mood: journal.mood,
            created_at: journal.created_at,
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl From<DailyJournalDB> for DailyJournal {
    fn from(db: DailyJournalDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            date: db.date,
            content: db.content,
            mood: db.mood,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
