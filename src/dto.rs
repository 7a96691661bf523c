//! Request/response DTOs for the API surface.
//!
//! Conventions:
//! - `*Request` → deserialized from client JSON body or query params
//! - `*Response` → serialized to client JSON
//! - Body validation is expressed via `validator` derive macros and checked
//!   by handlers before touching the database

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::entry::{Entry, Mood};

// ============================================================================
// Common
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: Uuid,
}

// ============================================================================
// Auth
// ============================================================================

/// POST /api/auth/register
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 254, message = "Email too long"))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,

    /// IANA timezone identifier (e.g. "Europe/Lisbon"). Default: "UTC"
    pub timezone: Option<String>,
}

/// POST /api/auth/login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// POST /api/auth/refresh
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// PUT /api/auth/profile — at least one field must be present
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_profile_update"))]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: Option<String>,
}

fn validate_profile_update(req: &UpdateProfileRequest) -> Result<(), ValidationError> {
    if req.name.is_none() && req.password.is_none() {
        return Err(ValidationError::new(
            "at_least_one_of_name_or_password_required",
        ));
    }
    Ok(())
}

/// Response for register, login and refresh
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

// ============================================================================
// Entries
// ============================================================================

/// POST /api/entries
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntryRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    pub content: String,

    pub mood: Mood,

    #[validate(custom = "validate_tags")]
    #[serde(default)]
    pub tags: Vec<String>,

    /// Calendar date of the entry; defaults to today (UTC) when absent.
    pub entry_date: Option<NaiveDate>,
}

/// PUT /api/entries/:id — partial update
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEntryRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    pub content: Option<String>,

    pub mood: Option<Mood>,

    #[validate(custom = "validate_tags")]
    pub tags: Option<Vec<String>>,

    pub entry_date: Option<NaiveDate>,
}

fn validate_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    if tags.len() > 10 {
        return Err(ValidationError::new("too_many_tags"));
    }
    if tags.iter().any(|t| t.is_empty() || t.len() > 20) {
        return Err(ValidationError::new("tag_must_be_1_to_20_characters"));
    }
    Ok(())
}

/// GET /api/entries query parameters
#[derive(Debug, Default, Deserialize)]
pub struct EntryListQuery {
    pub search: Option<String>,
    pub mood: Option<Mood>,
    pub tag: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub sort: SortOrder,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl EntryListQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }
}

#[derive(Debug, Serialize)]
pub struct EntryListResponse {
    pub entries: Vec<Entry>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_entries: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(current_page: u32, limit: u32, total_entries: i64) -> Self {
        let total_pages = ((total_entries as f64) / (limit as f64)).ceil() as u32;
        Self {
            current_page,
            total_pages,
            total_entries,
            has_next: current_page < total_pages,
            has_prev: current_page > 1 && total_entries > 0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub id: Uuid,
    pub pinned: bool,
    pub favorite: bool,
}

// ============================================================================
// Analytics
// ============================================================================

/// GET /api/analytics/summary
#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub total_entries: i64,
    pub favorite_entries: i64,
    pub pinned_entries: i64,
    pub this_week_entries: i64,
}

/// GET /api/analytics/calendar?month=YYYY-MM
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalendarDayResponse {
    pub count: u32,
    pub moods: Vec<Mood>,
    pub dominant: Option<Mood>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_rejects_bad_email_and_short_password() {
        let req = RegisterRequest {
            name: "Ada".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            timezone: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_entry_rejects_oversized_fields() {
        let req = CreateEntryRequest {
            title: "t".repeat(101),
            content: "c".into(),
            mood: Mood::Calm,
            tags: vec![],
            entry_date: None,
        };
        assert!(req.validate().is_err());

        let req = CreateEntryRequest {
            title: "a day".into(),
            content: "c".repeat(5001),
            mood: Mood::Calm,
            tags: vec![],
            entry_date: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_entry_tag_limits() {
        let req = CreateEntryRequest {
            title: "a day".into(),
            content: "went fine".into(),
            mood: Mood::Happy,
            tags: (0..11).map(|i| format!("tag{i}")).collect(),
            entry_date: None,
        };
        assert!(req.validate().is_err());

        let req = CreateEntryRequest {
            title: "a day".into(),
            content: "went fine".into(),
            mood: Mood::Happy,
            tags: vec!["x".repeat(21)],
            entry_date: None,
        };
        assert!(req.validate().is_err());

        let req = CreateEntryRequest {
            title: "a day".into(),
            content: "went fine".into(),
            mood: Mood::Happy,
            tags: vec!["work".into(), "travel".into()],
            entry_date: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn profile_update_requires_a_field() {
        let req = UpdateProfileRequest {
            name: None,
            password: None,
        };
        assert!(req.validate().is_err());

        let req = UpdateProfileRequest {
            name: Some("New Name".into()),
            password: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn list_query_defaults_and_clamps() {
        let q = EntryListQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 10);
        assert_eq!(q.sort, SortOrder::Newest);

        let q = EntryListQuery {
            page: Some(0),
            limit: Some(1000),
            ..Default::default()
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 100);
    }

    #[test]
    fn pagination_meta_math() {
        let meta = PaginationMeta::new(2, 10, 35);
        assert_eq!(meta.total_pages, 4);
        assert!(meta.has_next);
        assert!(meta.has_prev);

        let meta = PaginationMeta::new(1, 10, 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }
}
