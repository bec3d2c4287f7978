//! Error types for the database layer

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// User-specific database errors
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Preference-specific database errors
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Preferences for user {0} not found")]
    PreferencesNotFound(i64),

    #[error("Preferences for user {0} already exist")]
    AlreadyExists(i64),

    #[error("Invalid preferences: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<serde_json::Error> for PreferenceError {
    fn from(error: serde_json::Error) -> Self {
        PreferenceError::Serialization(error.to_string())
    }
}
