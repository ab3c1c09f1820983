//! HTTP query service.
//!
//! Three read-only JSON endpoints over the analytics store:
//! - `GET /applications`
//! - `GET /application?app_key=<key>`
//! - `GET /events?app_key=<key>&time=<minutes>`

mod error;
mod routes;

use axum::Router;
use axum::http::Method;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::storage::AnalyticsDatabase;

pub use error::{ApiError, ApiResult, ErrorResponse};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: AnalyticsDatabase,
}

impl AppState {
    pub const fn new(db: AnalyticsDatabase) -> Self {
        Self { db }
    }
}

/// Build the router with CORS open to any origin.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::HEAD]);

    Router::new()
        .route("/applications", get(routes::list_applications))
        .route("/application", get(routes::get_application))
        .route("/events", get(routes::list_events))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
