//! # Noor Gateway Crate
//!
//! HTTP surface of the preference store. Handlers read and write
//! [`noor_database::UserPreference`] records and always answer with their
//! snapshot form.
//!
//! ## Usage
//!
//! ```no_run
//! use noor_gateway::{create_router, GatewayState};
//!
//! # async fn run(pool: sqlx::SqlitePool) {
//! let app = create_router(GatewayState::new(pool));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod middleware;
pub mod rest;
pub mod state;

pub use error::{GatewayError, GatewayResult};
pub use state::GatewayState;

use axum::{middleware as axum_middleware, routing::get, Json, Router};
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        rest::health::health_check,
        rest::preferences::get_preferences,
        rest::preferences::update_preferences,
        rest::preferences::reset_preferences,
    ),
    components(
        schemas(
            rest::health::HealthResponse,
            rest::preferences::PreferencesResponse,
            rest::preferences::UpdatePreferencesRequest,
            rest::preferences::ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Preferences", description = "Per-user application preferences"),
    )
)]
pub struct ApiDoc;

async fn openapi_document() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    let arc_state = Arc::new(state);

    Router::new()
        .route("/health", get(rest::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_document))
        .nest("/api", rest::create_rest_routes())
        .with_state(arc_state)
        .layer(middleware::create_cors_middleware())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
