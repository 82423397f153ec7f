//! Database models for pill colors and the user profile.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use tradejournal_core::preferences::{NewPillColor, PillColor, UserProfile};

#[derive(Queryable, Identifiable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::pill_colors)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct PillColorDB {
    pub id: i64,
    pub user_id: Option<String>,
    pub category: String,
    pub value: String,
    pub color: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::pill_colors)]
pub struct NewPillColorDB {
    pub user_id: Option<String>,
    pub category: String,
    pub value: String,
    pub color: String,
}

impl From<NewPillColor> for NewPillColorDB {
    fn from(pill: NewPillColor) -> Self {
        Self {
            user_id: pill.user_id,
            category: pill.category,
            value: pill.value,
            color: pill.color,
        }
    }
}

impl From<PillColor> for PillColorDB {
    fn from(pill: PillColor) -> Self {
        Self {
            id: pill.id,
            user_id: pill.user_id,
            category: pill.category,
            value: pill.value,
            color: pill.color,
        }
    }
}

impl From<PillColorDB> for PillColor {
    fn from(db: PillColorDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            category: db.category,
            value: db.value,
            color: db.color,
        }
    }
}

#[derive(Queryable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::user_profiles)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct UserProfileDB {
    pub user_id: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    /// JSON document.
    pub layout: String,
    pub updated_at: NaiveDateTime,
}

impl From<UserProfile> for UserProfileDB {
    fn from(profile: UserProfile) -> Self {
        Self {
            user_id: profile.user_id,
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
            bio: profile.bio,
            layout: profile.layout.to_string(),
            updated_at: profile.updated_at,
        }
    }
}

impl From<UserProfileDB> for UserProfile {
    fn from(db: UserProfileDB) -> Self {
        let layout = serde_json::from_str(&db.layout).unwrap_or_else(|e| {
            log::warn!("[Storage] Ignoring malformed profile layout: {}", e);
            serde_json::Value::Null
        });
        Self {
            user_id: db.user_id,
            display_name: db.display_name,
            avatar_url: db.avatar_url,
            bio: db.bio,
            layout,
            updated_at: db.updated_at,
        }
    }
}
