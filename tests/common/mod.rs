#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{json, Value};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::{tempdir, TempDir};
use tower::util::ServiceExt;

use professors_service::create_app;

pub const TEST_SECRET: &[u8] = b"test-secret";

/// Fresh app over a tempdir-backed SQLite database with the real migrations
/// applied. The TempDir must stay alive for the duration of the test.
pub async fn setup() -> Result<(TempDir, SqlitePool, Router)> {
    let dir = tempdir().context("failed to create tempdir")?;
    let db_path = dir.path().join("test.db");
    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    let migrator = sqlx::migrate::Migrator::new(
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations"),
    )
    .await?;
    migrator.run(&pool).await?;

    std::env::set_var("JWT_SECRET", "test-secret");
    let app = create_app(pool.clone()).await?;

    Ok((dir, pool, app))
}

/// Token as the external auth service would mint it: HS256 over the shared
/// secret with a `user_id` claim and an hour of validity.
pub fn token(user_id: i64, role: Option<&str>) -> String {
    let mut claims = json!({
        "user_id": user_id,
        "exp": chrono::Utc::now().timestamp() + 3600,
    });
    if let Some(role) = role {
        claims["role"] = json!(role);
    }
    sign(&claims)
}

pub fn sign(claims: &Value) -> String {
    jsonwebtoken::encode(&Header::default(), claims, &EncodingKey::from_secret(TEST_SECRET))
        .expect("failed to sign test token")
}

pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header("authorization", format!("Bearer {bearer}"));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, value))
}

/// Create a professor through the API as a staff principal, returning its id.
pub async fn create_professor(app: &Router, name: &str, department: &str) -> Result<i64> {
    let staff = token(1000, Some("STAFF"));
    let (status, body) = request(
        app,
        "POST",
        "/professors/create/",
        Some(&staff),
        Some(json!({
            "name": name,
            "department": department,
            "email": "prof@university.edu",
            "office": "B 1.01",
        })),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "professor create failed: {body}");

    Ok(body["id"].as_i64().context("professor id missing")?)
}
