//! Streak, weekly-mood, calendar and summary endpoints.
//!
//! All reference dates ("today", window bounds) are evaluated in UTC. The
//! user's stored timezone is presentation metadata for clients and does not
//! shift the aggregation windows.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::dto::{AnalyticsSummary, CalendarDayResponse, CalendarQuery};
use crate::error::{AppError, AppResult};
use crate::services::analytics::{
    compute_calendar, compute_streak, compute_weekly_mood, dominant_mood, month_bounds,
    snapshot_from_rows, MoodSample, StreakResult, WeeklyMoodPoint,
};
use crate::AppState;

pub async fn get_summary(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<AnalyticsSummary>> {
    let today = Utc::now().date_naive();
    let week_start = today - chrono::Duration::days(6);

    let total_entries =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM entries WHERE user_id = $1")
            .bind(auth_user.id)
            .fetch_one(&state.db)
            .await?;

    let favorite_entries = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM entries WHERE user_id = $1 AND favorite = true",
    )
    .bind(auth_user.id)
    .fetch_one(&state.db)
    .await?;

    let pinned_entries = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM entries WHERE user_id = $1 AND pinned = true",
    )
    .bind(auth_user.id)
    .fetch_one(&state.db)
    .await?;

    let this_week_entries = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM entries WHERE user_id = $1 AND entry_date >= $2",
    )
    .bind(auth_user.id)
    .bind(week_start)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(AnalyticsSummary {
        total_entries,
        favorite_entries,
        pinned_entries,
        this_week_entries,
    }))
}

pub async fn get_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<StreakResult>> {
    let dates = sqlx::query_scalar::<_, NaiveDate>(
        "SELECT DISTINCT entry_date FROM entries WHERE user_id = $1",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    let today = Utc::now().date_naive();
    Ok(Json(compute_streak(dates, today)))
}

pub async fn get_mood_weekly(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<WeeklyMoodPoint>>> {
    let today = Utc::now().date_naive();
    let window_start = today - chrono::Duration::days(6);

    let samples = fetch_samples(&state, auth_user.id, window_start, today).await?;
    Ok(Json(compute_weekly_mood(&samples, today)))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<BTreeMap<String, CalendarDayResponse>>> {
    let month_param = query
        .month
        .as_deref()
        .ok_or_else(|| AppError::Validation("month parameter is required (YYYY-MM)".into()))?;
    let (year, month) = parse_month_param(month_param)?;

    // month_bounds cannot fail after parse_month_param validated the input.
    let (start, end) = month_bounds(year, month)
        .ok_or_else(|| AppError::Validation("Invalid month".into()))?;

    let samples = fetch_samples(&state, auth_user.id, start, end).await?;
    let calendar = compute_calendar(&samples, year, month);

    let response = calendar
        .into_iter()
        .map(|(date, day)| {
            let dominant = dominant_mood(&day.moods);
            (
                date,
                CalendarDayResponse {
                    count: day.count,
                    moods: day.moods,
                    dominant,
                },
            )
        })
        .collect();

    Ok(Json(response))
}

/// Fetch one user's `(entry_date, mood)` rows for an inclusive date range,
/// as the analytics snapshot. The mood comes back as text so a defective
/// label can be skipped instead of failing row decoding.
async fn fetch_samples(
    state: &AppState,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<MoodSample>> {
    let rows = sqlx::query_as::<_, (NaiveDate, String)>(
        r#"
        SELECT entry_date, mood::text FROM entries
        WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
        ORDER BY entry_date ASC, created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    Ok(snapshot_from_rows(rows))
}

/// Parse a `YYYY-MM` month parameter, rejecting malformed or out-of-range
/// values before any aggregation runs.
fn parse_month_param(raw: &str) -> AppResult<(i32, u32)> {
    let invalid = || AppError::Validation("month must be formatted as YYYY-MM".into());

    let (year_str, month_str) = raw.split_once('-').ok_or_else(invalid)?;
    if year_str.len() != 4 || month_str.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = year_str.parse().map_err(|_| invalid())?;
    let month: u32 = month_str.parse().map_err(|_| invalid())?;

    if month_bounds(year, month).is_none() {
        return Err(invalid());
    }
    Ok((year, month))
}
