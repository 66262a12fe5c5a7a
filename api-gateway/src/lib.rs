//! HTTP API for appointments.
//!
//! Endpoints:
//! - POST /appointments - Create an appointment
//! - GET /appointments/all - List appointments
//! - GET /appointments/get?id={id} - Get appointment details
//! - PUT /appointments/update - Update an appointment
//! - DELETE /appointments/delete?id={id} - Delete an appointment
//! - GET /swagger/* - Static API description
//! - GET /health - Liveness check

use std::path::Path;
use std::sync::Arc;

use axum::http::{header, HeaderName, Method};
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use shared::AppointmentStore;

pub mod handlers;

/// Log directive used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`].
pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AppointmentStore>,
}

impl AppState {
    pub fn new(store: impl AppointmentStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Build the API router using the provided application state.
///
/// Files under `docs_dir` are served beneath `/swagger`.
pub fn create_router(state: AppState, docs_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/appointments", post(handlers::create_appointment))
        .route("/appointments/all", get(handlers::list_appointments))
        .route("/appointments/get", get(handlers::get_appointment))
        .route("/appointments/update", put(handlers::update_appointment))
        .route("/appointments/delete", delete(handlers::delete_appointment))
        .nest_service("/swagger", ServeDir::new(docs_dir.as_ref()))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin, the five API methods, no credentials.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::ACCEPT,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-requested-with"),
        ])
}
