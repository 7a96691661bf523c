use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub mood: Mood,
    pub tags: Vec<String>,
    pub entry_date: NaiveDate,
    pub pinned: bool,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Closed mood label set. Stored as the Postgres `mood` enum and serialized
/// lowercase on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "mood", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Anxious,
    Grateful,
    Excited,
    Calm,
    Frustrated,
    Neutral,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Anxious,
        Mood::Grateful,
        Mood::Excited,
        Mood::Calm,
        Mood::Frustrated,
        Mood::Neutral,
    ];

    pub fn as_label(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Anxious => "anxious",
            Mood::Grateful => "grateful",
            Mood::Excited => "excited",
            Mood::Calm => "calm",
            Mood::Frustrated => "frustrated",
            Mood::Neutral => "neutral",
        }
    }

    /// Parse a stored label. Returns `None` for anything outside the closed
    /// set, so upstream data defects can be skipped rather than crash.
    pub fn from_label(label: &str) -> Option<Mood> {
        Mood::ALL.iter().copied().find(|m| m.as_label() == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_round_trip() {
        for mood in Mood::ALL {
            assert_eq!(Mood::from_label(mood.as_label()), Some(mood));
        }
    }

    #[test]
    fn unknown_label_is_none() {
        assert_eq!(Mood::from_label("ecstatic"), None);
        assert_eq!(Mood::from_label(""), None);
        assert_eq!(Mood::from_label("HAPPY"), None);
    }
}
