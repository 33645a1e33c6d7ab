use std::sync::Arc;

use axum::http::{header, Method};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};

use crate::domain::paste::repository::SqlitePasteStore;
use crate::domain::paste::service::PasteService;
use crate::handlers;
use crate::shared::clock::Clock;
use crate::shared::config::Config;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PasteService>,
    pub clock: Clock,
}

impl AppState {
    pub fn new(conn: DatabaseConnection, config: &Config) -> Self {
        let store = Arc::new(SqlitePasteStore::new(conn));
        Self {
            service: Arc::new(PasteService::new(store)),
            clock: Clock::from_config(config),
        }
    }
}

/// Configure all application routes
pub fn configure_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // API ROUTES
        // ========================================
        .route("/api/paste", post(handlers::paste::create))
        .route("/api/paste/:id", get(handlers::paste::consume))
        // ========================================
        // HTML PAGES
        // ========================================
        .route("/", get(handlers::pages::new_paste_form))
        .route("/paste", post(handlers::pages::submit_form))
        .route("/p/:id", get(handlers::pages::view_paste))
        .layer(middleware::from_fn(handlers::request_logger))
        .layer(cors)
        .with_state(state)
}
