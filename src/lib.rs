pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod scheduler;
pub mod service;
pub mod validator;

use axum::http::Method;
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::error::AppError;
use crate::repository::CardRepository;
use crate::service::CardService;

#[derive(Clone)]
pub struct AppState {
    pub cards: CardService,
    pub environment: Arc<str>,
}

impl AppState {
    pub fn new(pool: SqlitePool, environment: &str) -> Self {
        Self {
            cards: CardService::new(CardRepository::new(pool)),
            environment: Arc::from(environment),
        }
    }
}

async fn not_found() -> AppError {
    AppError::NotFound
}

async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method)
}

/// Build the full Axum application router.
///
/// Caller is responsible for running database migrations on `pool` beforehand.
pub fn build_app(pool: SqlitePool, environment: &str) -> Router {
    let state = AppState::new(pool, environment);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::cards::router())
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
