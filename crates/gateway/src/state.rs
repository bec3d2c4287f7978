//! Shared application state for the gateway

use std::sync::Arc;

use noor_config::DatabaseConfig;
use noor_database::{DatabaseConnection, PreferenceRepository};
use sqlx::SqlitePool;

use crate::error::GatewayResult;

/// Shared application state containing all services
#[derive(Clone)]
pub struct GatewayState {
    /// Database connection pool
    pub pool: SqlitePool,
    /// Connection handle used for liveness checks
    pub database: DatabaseConnection,
    /// Preference record store
    pub preference_repository: Arc<PreferenceRepository>,
}

impl GatewayState {
    pub fn new(pool: SqlitePool) -> Self {
        let preference_repository = Arc::new(PreferenceRepository::new(pool.clone()));

        Self {
            database: DatabaseConnection::from_pool(pool.clone()),
            pool,
            preference_repository,
        }
    }

    /// Create gateway state from database configuration
    pub async fn from_config(config: &DatabaseConfig) -> GatewayResult<Self> {
        let pool = noor_database::initialize_database(config).await?;
        Ok(Self::new(pool))
    }

    pub fn preferences(&self) -> &PreferenceRepository {
        &self.preference_repository
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_in_memory_config() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        };

        let state = GatewayState::from_config(&config).await.unwrap();
        assert!(state.preferences().find_by_user_id(1).await.unwrap().is_none());
        state.database.test_connection().await.unwrap();
    }
}
