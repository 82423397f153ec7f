use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One journal entry per (user, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyJournal {
    pub id: i64,
    pub user_id: Option<String>,
    pub date: NaiveDate,
    pub content: String,
    pub mood: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDailyJournal {
    pub user_id: Option<String>,
    pub date: NaiveDate,
    pub content: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl NewDailyJournal {
    pub fn into_journal(self, id: i64) -> DailyJournal {
        let now = Utc::now().naive_utc();
        DailyJournal {
            id,
            user_id: self.user_id,
            date: self.date,
            content: self.content,
            mood: self.mood,
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        }
    }
}
