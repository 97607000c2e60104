use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::IntoParams;

use crate::app::AppState;
use crate::authz::{self, Capability};
use crate::errors::{AppError, AppResult};
use crate::jwt::MaybeAuthUser;
use crate::models::professor::{DbProfessor, Professor, ProfessorCreateRequest};
use crate::models::review::Review;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DirectoryQuery {
    /// Case-insensitive substring match on name or department.
    pub query: Option<String>,
}

#[utoipa::path(
    get,
    path = "/professors/",
    tag = "Professors",
    params(DirectoryQuery),
    responses((status = 200, description = "List professors", body = [Professor]))
)]
pub async fn list_professors(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Query(params): Query<DirectoryQuery>,
) -> AppResult<Json<Vec<Professor>>> {
    authz::require(auth.0.as_ref(), Capability::Student)?;

    let base = "SELECT id, name, department, email, office, rating, creator_id FROM professors";
    let professors = match params.query.as_deref().filter(|q| !q.is_empty()) {
        Some(query) => {
            let pattern = format!("%{}%", query);
            sqlx::query_as::<_, DbProfessor>(&format!(
                "{base} WHERE name LIKE ? OR department LIKE ? ORDER BY id"
            ))
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, DbProfessor>(&format!("{base} ORDER BY id"))
                .fetch_all(&state.pool)
                .await?
        }
    };

    let reviews = sqlx::query_as::<_, Review>(
        "SELECT id, professor_id, author, rating, comment, created_at, creator_id FROM reviews ORDER BY professor_id, id",
    )
    .fetch_all(&state.pool)
    .await?;

    let mut by_professor: HashMap<i64, Vec<Review>> = HashMap::new();
    for review in reviews {
        by_professor.entry(review.professor_id).or_default().push(review);
    }

    let professors = professors
        .into_iter()
        .map(|professor| {
            let reviews = by_professor.remove(&professor.id).unwrap_or_default();
            professor.with_reviews(reviews)
        })
        .collect();

    Ok(Json(professors))
}

#[utoipa::path(
    get,
    path = "/professors/{id}/",
    tag = "Professors",
    params(("id" = i64, Path, description = "Professor id")),
    responses(
        (status = 200, description = "Professor detail", body = Professor),
        (status = 404, description = "Professor not found")
    )
)]
pub async fn get_professor(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Professor>> {
    authz::require(auth.0.as_ref(), Capability::Student)?;

    let professor = fetch_professor(&state.pool, id).await?;
    let reviews = fetch_reviews(&state.pool, id).await?;

    Ok(Json(professor.with_reviews(reviews)))
}

#[utoipa::path(
    post,
    path = "/professors/create/",
    tag = "Professors",
    request_body = ProfessorCreateRequest,
    responses(
        (status = 201, description = "Professor created", body = Professor),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Caller is not staff")
    )
)]
pub async fn create_professor(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Json(payload): Json<ProfessorCreateRequest>,
) -> AppResult<(StatusCode, Json<Professor>)> {
    let principal = authz::require(auth.0.as_ref(), Capability::Staff)?;

    let new = payload.validate()?;

    let result = sqlx::query(
        "INSERT INTO professors (name, department, email, office, rating, creator_id) VALUES (?, ?, ?, ?, 0.0, ?)",
    )
    .bind(&new.name)
    .bind(&new.department)
    .bind(&new.email)
    .bind(&new.office)
    .bind(principal.id)
    .execute(&state.pool)
    .await?;

    let professor = fetch_professor(&state.pool, result.last_insert_rowid()).await?;

    Ok((StatusCode::CREATED, Json(professor.with_reviews(Vec::new()))))
}

#[utoipa::path(
    delete,
    path = "/professors/{id}/delete/",
    tag = "Professors",
    params(("id" = i64, Path, description = "Professor id")),
    responses(
        (status = 204, description = "Professor deleted"),
        (status = 404, description = "Professor not found"),
        (status = 403, description = "Caller is not staff")
    )
)]
pub async fn delete_professor(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    authz::require(auth.0.as_ref(), Capability::Staff)?;

    let mut tx = state.pool.begin().await?;

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM professors WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(AppError::not_found("professor not found"));
    }

    // Cascade explicitly; the schema-level cascade depends on the
    // foreign_keys pragma being on for the connection.
    sqlx::query("DELETE FROM reviews WHERE professor_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM professors WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn fetch_professor(pool: &SqlitePool, id: i64) -> AppResult<DbProfessor> {
    sqlx::query_as::<_, DbProfessor>(
        "SELECT id, name, department, email, office, rating, creator_id FROM professors WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("professor not found"))
}

pub(crate) async fn fetch_reviews(pool: &SqlitePool, professor_id: i64) -> AppResult<Vec<Review>> {
    let reviews = sqlx::query_as::<_, Review>(
        "SELECT id, professor_id, author, rating, comment, created_at, creator_id FROM reviews WHERE professor_id = ? ORDER BY id",
    )
    .bind(professor_id)
    .fetch_all(pool)
    .await?;

    Ok(reviews)
}
