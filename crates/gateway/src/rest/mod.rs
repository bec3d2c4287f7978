//! REST API endpoints for the gateway

pub mod health;
pub mod preferences;

use axum::Router;
use crate::state::GatewayState;
use std::sync::Arc;

/// Create all REST API routes, mounted under `/api`
pub fn create_rest_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        // Preference routes
        .merge(preferences::create_preference_routes())
}

pub use health::*;
pub use preferences::*;
