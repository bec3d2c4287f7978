//! Noor Database Crate
//!
//! This crate provides the preference record store for the Noor backend:
//! connection management, migrations, the `UserPreference` entity and the
//! repositories that persist it.

use noor_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::{prepare_database, DatabaseConnection};
pub use migrations::run_migrations;

pub use repos::{PreferenceRepository, UserRepository};

pub use entities::{
    preference::{PreferenceSnapshot, PreferenceUpdate, UserPreference},
    user::{CreateUserRequest, User},
};

pub use types::{
    errors::{DatabaseError, PreferenceError, UserError},
    DatabaseResult, PreferenceResult, UserResult,
};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}
