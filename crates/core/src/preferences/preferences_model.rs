//! Preference domain models.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conflict key for pill colors on the remote: unique per (user, category, value).
pub const PILL_COLOR_CONFLICT_KEY: [&str; 3] = ["user_id", "category", "value"];

/// Color assigned to a tag-like value ("pill") within a category such as
/// `setup` or `mistake`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PillColor {
    pub id: i64,
    pub user_id: Option<String>,
    pub category: String,
    pub value: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPillColor {
    pub user_id: Option<String>,
    pub category: String,
    pub value: String,
    pub color: String,
}

impl NewPillColor {
    pub fn into_pill_color(self, id: i64) -> PillColor {
        PillColor {
            id,
            user_id: self.user_id,
            category: self.category,
            value: self.value,
            color: self.color,
        }
    }
}

/// Public profile and layout preferences of a signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    /// Opaque dashboard layout document owned by the UI.
    #[serde(default)]
    pub layout: serde_json::Value,
    pub updated_at: NaiveDateTime,
}

impl UserProfile {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
            avatar_url: None,
            bio: None,
            layout: serde_json::Value::Null,
            updated_at: Utc::now().naive_utc(),
        }
    }
}
