use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

mod common;

use common::{create_professor, request, token};

async fn submit_review(
    app: &axum::Router,
    prof: i64,
    user: i64,
    rating: i64,
) -> Result<i64> {
    let student = token(user, Some("STUDENT"));
    let (status, body) = request(
        app,
        "POST",
        &format!("/professors/{prof}/review/"),
        Some(&student),
        Some(json!({"author": format!("user{user}"), "rating": rating, "comment": "c"})),
    )
    .await?;
    anyhow::ensure!(
        status == StatusCode::CREATED || status == StatusCode::OK,
        "review submit failed: {body}"
    );
    Ok(body["id"].as_i64().unwrap())
}

async fn professor_rating(app: &axum::Router, prof: i64) -> Result<f64> {
    let student = token(500, Some("STUDENT"));
    let (_, body) = request(app, "GET", &format!("/professors/{prof}/"), Some(&student), None).await?;
    Ok(body["rating"].as_f64().unwrap())
}

#[tokio::test]
async fn rating_is_rounded_mean_of_reviews() -> Result<()> {
    let (_dir, _pool, app) = common::setup().await?;
    let prof = create_professor(&app, "Alice Smith", "CS").await?;

    submit_review(&app, prof, 1, 3).await?;
    assert_eq!(professor_rating(&app, prof).await?, 3.0);

    submit_review(&app, prof, 2, 4).await?;
    assert_eq!(professor_rating(&app, prof).await?, 3.5);

    // mean(3, 4, 4) = 3.666... -> 3.7
    submit_review(&app, prof, 3, 4).await?;
    assert_eq!(professor_rating(&app, prof).await?, 3.7);

    Ok(())
}

#[tokio::test]
async fn rating_returns_to_zero_when_last_review_is_removed() -> Result<()> {
    let (_dir, _pool, app) = common::setup().await?;
    let prof = create_professor(&app, "Alice Smith", "CS").await?;

    let first = submit_review(&app, prof, 1, 4).await?;
    let second = submit_review(&app, prof, 2, 5).await?;
    assert_eq!(professor_rating(&app, prof).await?, 4.5);

    let staff = token(1000, Some("STAFF"));
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/professors/{prof}/reviews/{first}/"),
        Some(&staff),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(professor_rating(&app, prof).await?, 5.0);

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/professors/{prof}/reviews/{second}/"),
        Some(&staff),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(professor_rating(&app, prof).await?, 0.0);

    Ok(())
}

#[tokio::test]
async fn concrete_scenario_from_the_directory() -> Result<()> {
    let (_dir, pool, app) = common::setup().await?;
    let prof = create_professor(&app, "Alice Smith", "CS").await?;

    submit_review(&app, prof, 1, 4).await?;
    assert_eq!(professor_rating(&app, prof).await?, 4.0);

    // Same user resubmits with a different rating.
    let student = token(1, Some("STUDENT"));
    let (status, _) = request(
        &app,
        "POST",
        &format!("/professors/{prof}/review/"),
        Some(&student),
        Some(json!({"author": "user1", "rating": 5, "comment": "c"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM reviews WHERE professor_id = ?")
        .bind(prof)
        .fetch_one(&pool)
        .await?;
    assert_eq!(count, 1);
    assert_eq!(professor_rating(&app, prof).await?, 5.0);

    Ok(())
}
