//! User repository for database operations.

use crate::entities::{CreateUserRequest, User};
use crate::entities::preference::{current_timestamp, format_timestamp};
use crate::types::{UserError, UserResult};
use sqlx::{Row, SqlitePool};

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let row = sqlx::query("SELECT id, username, email, created_at FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            created_at: row.get("created_at"),
        }))
    }

    /// Create new user
    pub async fn create(&self, request: &CreateUserRequest) -> UserResult<User> {
        let now = format_timestamp(&current_timestamp());

        let result = sqlx::query("INSERT INTO users (username, email, created_at) VALUES (?, ?, ?)")
            .bind(&request.username)
            .bind(&request.email)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db_error) if db_error.is_unique_violation() => UserError::UserAlreadyExists,
                _ => UserError::DatabaseError(e.to_string()),
            })?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: request.username.clone(),
            email: request.email.clone(),
            created_at: now,
        })
    }

    /// Delete user, cascading to the rows it owns
    pub async fn delete(&self, id: i64) -> UserResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }

        Ok(())
    }
}
