use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{
    CreateEntryRequest, DeleteResponse, EntryListQuery, EntryListResponse, PaginationMeta,
    SortOrder, ToggleResponse, UpdateEntryRequest,
};
use crate::error::{AppError, AppResult};
use crate::models::entry::Entry;
use crate::AppState;

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateEntryRequest>,
) -> AppResult<Json<Entry>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let entry_date = body.entry_date.unwrap_or_else(|| Utc::now().date_naive());

    let entry = sqlx::query_as::<_, Entry>(
        r#"
        INSERT INTO entries (id, user_id, title, content, mood, tags, entry_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.title)
    .bind(&body.content)
    .bind(body.mood)
    .bind(&body.tags)
    .bind(entry_date)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(entry))
}

/// Append the owner guard and the optional list filters to a query that
/// starts with `SELECT ... FROM entries`. Shared by the page fetch and the
/// total count so both always see the same filter set.
fn apply_filters(qb: &mut QueryBuilder<'_, Postgres>, user_id: Uuid, query: &EntryListQuery) {
    qb.push(" WHERE user_id = ").push_bind(user_id);

    if let Some(mood) = query.mood {
        qb.push(" AND mood = ").push_bind(mood);
    }
    if let Some(tag) = &query.tag {
        qb.push(" AND ").push_bind(tag.clone()).push(" = ANY(tags)");
    }
    if let Some(search) = &query.search {
        if !search.is_empty() {
            let pattern = format!("%{}%", search);
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR content ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR EXISTS (SELECT 1 FROM unnest(tags) AS t WHERE t ILIKE ")
                .push_bind(pattern)
                .push("))");
        }
    }
    if let Some(from) = query.from {
        qb.push(" AND entry_date >= ").push_bind(from);
    }
    if let Some(to) = query.to {
        qb.push(" AND entry_date <= ").push_bind(to);
    }
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<EntryListQuery>,
) -> AppResult<Json<EntryListResponse>> {
    let page = query.page();
    let limit = query.limit();
    let offset = (page - 1) as i64 * limit as i64;

    let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM entries");
    apply_filters(&mut count_qb, auth_user.id, &query);
    let total: i64 = count_qb
        .build_query_scalar()
        .fetch_one(&state.db)
        .await?;

    let mut qb = QueryBuilder::new("SELECT * FROM entries");
    apply_filters(&mut qb, auth_user.id, &query);
    qb.push(match query.sort {
        SortOrder::Newest => " ORDER BY entry_date DESC, created_at DESC",
        SortOrder::Oldest => " ORDER BY entry_date ASC, created_at ASC",
    });
    qb.push(" LIMIT ")
        .push_bind(limit as i64)
        .push(" OFFSET ")
        .push_bind(offset);

    let entries = qb
        .build_query_as::<Entry>()
        .fetch_all(&state.db)
        .await?;

    Ok(Json(EntryListResponse {
        entries,
        pagination: PaginationMeta::new(page, limit, total),
    }))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<Entry>> {
    let entry =
        sqlx::query_as::<_, Entry>("SELECT * FROM entries WHERE id = $1 AND user_id = $2")
            .bind(entry_id)
            .bind(auth_user.id)
            .fetch_optional(&state.db)
            .await?
            .ok_or(AppError::NotFound("Entry not found".into()))?;

    Ok(Json(entry))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
    Json(body): Json<UpdateEntryRequest>,
) -> AppResult<Json<Entry>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let entry = sqlx::query_as::<_, Entry>(
        r#"
        UPDATE entries SET
            title = COALESCE($3, title),
            content = COALESCE($4, content),
            mood = COALESCE($5, mood),
            tags = COALESCE($6, tags),
            entry_date = COALESCE($7, entry_date),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(entry_id)
    .bind(auth_user.id)
    .bind(&body.title)
    .bind(&body.content)
    .bind(body.mood)
    .bind(&body.tags)
    .bind(body.entry_date)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Entry not found".into()))?;

    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    let result = sqlx::query("DELETE FROM entries WHERE id = $1 AND user_id = $2")
        .bind(entry_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Entry not found".into()));
    }

    Ok(Json(DeleteResponse {
        deleted: true,
        id: entry_id,
    }))
}

pub async fn toggle_pin(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<ToggleResponse>> {
    let entry = sqlx::query_as::<_, Entry>(
        r#"
        UPDATE entries SET pinned = NOT pinned, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(entry_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Entry not found".into()))?;

    Ok(Json(ToggleResponse {
        id: entry.id,
        pinned: entry.pinned,
        favorite: entry.favorite,
    }))
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<ToggleResponse>> {
    let entry = sqlx::query_as::<_, Entry>(
        r#"
        UPDATE entries SET favorite = NOT favorite, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(entry_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Entry not found".into()))?;

    Ok(Json(ToggleResponse {
        id: entry.id,
        pinned: entry.pinned,
        favorite: entry.favorite,
    }))
}
