pub mod error;
pub mod health;
pub mod messages;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use mt799_db::Database;

pub use error::ApiError;

/// 1 MiB default cap on an uploaded message file.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 16 * 1024;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub max_upload_bytes: usize,
}

impl AppStateInner {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// All routes of the service, without transport layers (CORS, tracing).
pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route(
            "/api/SwiftMessage",
            post(messages::upload_message).get(messages::list_messages),
        )
        .route("/api/SwiftMessage/{id}", get(messages::get_message))
        .route("/health", get(health::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
