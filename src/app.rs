use std::sync::Arc;

use axum::http::Method;
use axum::routing::{delete, get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::jwt::JwtConfig;
use crate::routes::{health, professors, reviews};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt: JwtConfig) -> Self {
        Self {
            pool,
            jwt: Arc::new(jwt),
        }
    }
}

pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let jwt_config = JwtConfig::from_env()?;
    let state = AppState::new(pool, jwt_config);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    // Trailing slashes are part of the wire contract; routes are spelled
    // out verbatim rather than nested.
    let router = Router::new()
        .route("/health", get(health::health))
        .route("/professors/", get(professors::list_professors))
        .route("/professors/create/", post(professors::create_professor))
        .route("/professors/:id/", get(professors::get_professor))
        .route("/professors/:id/delete/", delete(professors::delete_professor))
        .route("/professors/:id/review/", post(reviews::upsert_review))
        .route(
            "/professors/:id/reviews/:review_id/",
            delete(reviews::delete_review),
        )
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
