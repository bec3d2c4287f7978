//! Liveness endpoint

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use noor_database::entities::preference::{current_timestamp, format_timestamp};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` when the preference store answers, `degraded` otherwise
    pub status: String,
    pub database: String,
    pub timestamp: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and preference store are reachable", body = HealthResponse),
        (status = 503, description = "Preference store is unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(state): State<Arc<GatewayState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let (status, database, code) = match state.database.test_connection().await {
        Ok(()) => ("ok", "reachable", StatusCode::OK),
        Err(error) => {
            warn!(error = %format!("{error:#}"), "health check could not reach the database");
            ("degraded", "unreachable", StatusCode::SERVICE_UNAVAILABLE)
        }
    };

    let response = HealthResponse {
        status: status.to_string(),
        database: database.to_string(),
        timestamp: format_timestamp(&current_timestamp()),
    };

    (code, Json(response))
}
