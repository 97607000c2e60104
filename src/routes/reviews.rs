use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::SqliteConnection;

use crate::app::AppState;
use crate::authz::{self, Capability};
use crate::errors::{AppError, AppResult};
use crate::jwt::MaybeAuthUser;
use crate::models::review::{Review, ReviewPayload};
use crate::utils::{rating_from_mean, utc_now};

/// Create-or-update keyed by (professor, caller). The review write and the
/// rating recomputation share one transaction so readers never observe one
/// without the other; the UNIQUE(professor_id, creator_id) constraint backs
/// the at-most-one-review invariant at the storage layer.
#[utoipa::path(
    post,
    path = "/professors/{id}/review/",
    tag = "Reviews",
    params(("id" = i64, Path, description = "Professor id")),
    request_body = ReviewPayload,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 200, description = "Existing review updated", body = Review),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Professor not found")
    )
)]
pub async fn upsert_review(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<ReviewPayload>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let principal = authz::require(auth.0.as_ref(), Capability::Student)?;
    let creator_id = principal.id;

    let mut tx = state.pool.begin().await?;

    ensure_professor(&mut tx, id).await?;

    let existing = sqlx::query_as::<_, Review>(
        "SELECT id, professor_id, author, rating, comment, created_at, creator_id FROM reviews WHERE professor_id = ? AND creator_id = ?",
    )
    .bind(id)
    .bind(creator_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (status, review_id) = match existing {
        Some(review) => {
            payload.validate_update()?;

            // Overlay: supplied fields replace, absent fields survive.
            let author = payload.author.unwrap_or(review.author);
            let rating = payload.rating.unwrap_or(review.rating);
            let comment = payload.comment.unwrap_or(review.comment);

            sqlx::query("UPDATE reviews SET author = ?, rating = ?, comment = ? WHERE id = ?")
                .bind(&author)
                .bind(rating)
                .bind(&comment)
                .bind(review.id)
                .execute(&mut *tx)
                .await?;

            (StatusCode::OK, review.id)
        }
        None => {
            // The professor id comes from the path, never from the body.
            let new = payload.validate_new()?;

            let result = sqlx::query(
                "INSERT INTO reviews (professor_id, author, rating, comment, created_at, creator_id) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(&new.author)
            .bind(new.rating)
            .bind(&new.comment)
            .bind(utc_now())
            .bind(creator_id)
            .execute(&mut *tx)
            .await?;

            (StatusCode::CREATED, result.last_insert_rowid())
        }
    };

    refresh_rating(&mut tx, id).await?;

    let review = sqlx::query_as::<_, Review>(
        "SELECT id, professor_id, author, rating, comment, created_at, creator_id FROM reviews WHERE id = ?",
    )
    .bind(review_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((status, Json(review)))
}

#[utoipa::path(
    delete,
    path = "/professors/{id}/reviews/{review_id}/",
    tag = "Reviews",
    params(
        ("id" = i64, Path, description = "Professor id"),
        ("review_id" = i64, Path, description = "Review id")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 404, description = "Professor or review not found"),
        (status = 403, description = "Caller is neither the creator nor staff")
    )
)]
pub async fn delete_review(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Path((id, review_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    let principal = authz::require(auth.0.as_ref(), Capability::Student)?;

    let mut tx = state.pool.begin().await?;

    // Existence is confirmed (professor, then review) before the ownership
    // check, so a 403 never masks a 404.
    ensure_professor(&mut tx, id).await?;

    let review = sqlx::query_as::<_, Review>(
        "SELECT id, professor_id, author, rating, comment, created_at, creator_id FROM reviews WHERE id = ? AND professor_id = ?",
    )
    .bind(review_id)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::not_found("review not found"))?;

    if review.creator_id != principal.id && !principal.is_staff() {
        return Err(AppError::permission_denied(
            "only the review's creator or staff may delete it",
        ));
    }

    sqlx::query("DELETE FROM reviews WHERE id = ?")
        .bind(review.id)
        .execute(&mut *tx)
        .await?;

    refresh_rating(&mut tx, id).await?;

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_professor(
    conn: &mut SqliteConnection,
    professor_id: i64,
) -> AppResult<()> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM professors WHERE id = ?")
        .bind(professor_id)
        .fetch_optional(&mut *conn)
        .await?;

    exists
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("professor not found"))
}

/// The aggregator: mean of the professor's remaining review ratings, one
/// decimal place, 0.0 once the last review is gone. Must run inside the same
/// transaction as the review mutation.
async fn refresh_rating(conn: &mut SqliteConnection, professor_id: i64) -> AppResult<()> {
    let mean: Option<f64> =
        sqlx::query_scalar("SELECT AVG(rating) FROM reviews WHERE professor_id = ?")
            .bind(professor_id)
            .fetch_one(&mut *conn)
            .await?;

    sqlx::query("UPDATE professors SET rating = ? WHERE id = ?")
        .bind(rating_from_mean(mean))
        .bind(professor_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
