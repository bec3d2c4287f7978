//! Preference repository for database operations.

use crate::entities::preference::{format_timestamp, parse_timestamp};
use crate::entities::{PreferenceUpdate, UserPreference};
use crate::types::{PreferenceError, PreferenceResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

const SELECT_COLUMNS: &str = "SELECT id, user_id, theme, language_preference, sound_enabled, volume_level,
        prayer_notifications, daily_goal, quran_audio_favorites, hadith_favorites, azkar_favorites,
        last_reciter, last_server, created_at, updated_at
     FROM user_preferences";

/// Repository for user preference database operations
#[derive(Clone)]
pub struct PreferenceRepository {
    pool: SqlitePool,
}

impl PreferenceRepository {
    /// Create a new preference repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find preferences by user ID
    pub async fn find_by_user_id(&self, user_id: i64) -> PreferenceResult<Option<UserPreference>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE user_id = ?"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PreferenceError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_row).transpose()
    }

    /// Insert a new record. Fails if the user already has one.
    pub async fn create(&self, preference: &UserPreference) -> PreferenceResult<UserPreference> {
        let mut created = preference.clone();
        if created.created_at.is_none() || created.updated_at.is_none() {
            created.touch();
        }

        let result = sqlx::query(
            "INSERT INTO user_preferences (
                user_id, theme, language_preference, sound_enabled, volume_level,
                prayer_notifications, daily_goal, quran_audio_favorites, hadith_favorites,
                azkar_favorites, last_reciter, last_server, created_at, updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(created.user_id)
        .bind(&created.theme)
        .bind(&created.language_preference)
        .bind(created.sound_enabled)
        .bind(created.volume_level)
        .bind(encode_json(&created.prayer_notifications)?)
        .bind(created.daily_goal)
        .bind(encode_json(&created.quran_audio_favorites)?)
        .bind(encode_json(&created.hadith_favorites)?)
        .bind(encode_json(&created.azkar_favorites)?)
        .bind(&created.last_reciter)
        .bind(&created.last_server)
        .bind(created.created_at.as_ref().map(format_timestamp))
        .bind(created.updated_at.as_ref().map(format_timestamp))
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, created.user_id))?;

        created.id = Some(result.last_insert_rowid());
        info!(user_id = created.user_id, id = result.last_insert_rowid(), "created user preferences");
        Ok(created)
    }

    /// Insert a record holding only defaults
    pub async fn create_default(&self, user_id: i64) -> PreferenceResult<UserPreference> {
        self.create(&UserPreference::new(user_id)).await
    }

    /// Get or create preferences (creates with defaults if not found)
    pub async fn get_or_create(&self, user_id: i64) -> PreferenceResult<UserPreference> {
        if let Some(preference) = self.find_by_user_id(user_id).await? {
            return Ok(preference);
        }

        match self.create_default(user_id).await {
            // Lost a race against a concurrent first access
            Err(PreferenceError::AlreadyExists(_)) => self
                .find_by_user_id(user_id)
                .await?
                .ok_or(PreferenceError::PreferencesNotFound(user_id)),
            other => other,
        }
    }

    /// Persist every column of `preference`, refreshing `updated_at` first
    pub async fn save(&self, preference: &mut UserPreference) -> PreferenceResult<()> {
        preference.touch();

        let result = sqlx::query(
            "UPDATE user_preferences SET
                theme = ?, language_preference = ?, sound_enabled = ?, volume_level = ?,
                prayer_notifications = ?, daily_goal = ?, quran_audio_favorites = ?,
                hadith_favorites = ?, azkar_favorites = ?, last_reciter = ?, last_server = ?,
                updated_at = ?
             WHERE user_id = ?",
        )
        .bind(&preference.theme)
        .bind(&preference.language_preference)
        .bind(preference.sound_enabled)
        .bind(preference.volume_level)
        .bind(encode_json(&preference.prayer_notifications)?)
        .bind(preference.daily_goal)
        .bind(encode_json(&preference.quran_audio_favorites)?)
        .bind(encode_json(&preference.hadith_favorites)?)
        .bind(encode_json(&preference.azkar_favorites)?)
        .bind(&preference.last_reciter)
        .bind(&preference.last_server)
        .bind(preference.updated_at.as_ref().map(format_timestamp))
        .bind(preference.user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, preference.user_id))?;

        if result.rows_affected() == 0 {
            return Err(PreferenceError::PreferencesNotFound(preference.user_id));
        }

        debug!(user_id = preference.user_id, "saved user preferences");
        Ok(())
    }

    /// Apply a partial update, creating the record first if needed
    pub async fn update(
        &self,
        user_id: i64,
        update: PreferenceUpdate,
    ) -> PreferenceResult<UserPreference> {
        let mut preference = self.get_or_create(user_id).await?;

        if update.is_empty() {
            return Ok(preference);
        }

        preference.apply(update);
        preference.validate().map_err(PreferenceError::Validation)?;
        self.save(&mut preference).await?;

        info!(user_id, "updated user preferences");
        Ok(preference)
    }

    /// Reset preferences to default
    pub async fn reset_to_default(&self, user_id: i64) -> PreferenceResult<UserPreference> {
        let mut preference = self.get_or_create(user_id).await?;
        preference.reset_to_defaults();
        self.save(&mut preference).await?;

        info!(user_id, "reset user preferences to defaults");
        Ok(preference)
    }

    /// Delete preferences
    pub async fn delete(&self, user_id: i64) -> PreferenceResult<()> {
        let result = sqlx::query("DELETE FROM user_preferences WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PreferenceError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PreferenceError::PreferencesNotFound(user_id));
        }

        info!(user_id, "deleted user preferences");
        Ok(())
    }
}

fn map_row(row: &SqliteRow) -> PreferenceResult<UserPreference> {
    let db = |e: sqlx::Error| PreferenceError::DatabaseError(e.to_string());

    Ok(UserPreference {
        id: row.try_get("id").map_err(db)?,
        user_id: row.try_get("user_id").map_err(db)?,
        theme: row.try_get("theme").map_err(db)?,
        language_preference: row.try_get("language_preference").map_err(db)?,
        sound_enabled: row.try_get("sound_enabled").map_err(db)?,
        volume_level: row.try_get("volume_level").map_err(db)?,
        prayer_notifications: decode_json(row.try_get("prayer_notifications").map_err(db)?)?,
        daily_goal: row.try_get("daily_goal").map_err(db)?,
        quran_audio_favorites: decode_json(row.try_get("quran_audio_favorites").map_err(db)?)?,
        hadith_favorites: decode_json(row.try_get("hadith_favorites").map_err(db)?)?,
        azkar_favorites: decode_json(row.try_get("azkar_favorites").map_err(db)?)?,
        last_reciter: row.try_get("last_reciter").map_err(db)?,
        last_server: row.try_get("last_server").map_err(db)?,
        created_at: decode_timestamp(row.try_get("created_at").map_err(db)?)?,
        updated_at: decode_timestamp(row.try_get("updated_at").map_err(db)?)?,
    })
}

fn encode_json<T: Serialize>(value: &Option<T>) -> PreferenceResult<Option<String>> {
    Ok(value.as_ref().map(serde_json::to_string).transpose()?)
}

/// A NULL column and a stored JSON `null` both come back as `None`.
fn decode_json<T: DeserializeOwned>(raw: Option<String>) -> PreferenceResult<Option<T>> {
    match raw {
        Some(raw) => Ok(serde_json::from_str::<Option<T>>(&raw)?),
        None => Ok(None),
    }
}

fn decode_timestamp(
    raw: Option<String>,
) -> PreferenceResult<Option<chrono::DateTime<chrono::Utc>>> {
    raw.map(|value| {
        parse_timestamp(&value)
            .map_err(|e| PreferenceError::Serialization(format!("bad timestamp {value}: {e}")))
    })
    .transpose()
}

fn map_write_error(error: sqlx::Error, user_id: i64) -> PreferenceError {
    if let Some(db_error) = error.as_database_error() {
        let message = db_error.message();
        if db_error.is_unique_violation() || message.contains("UNIQUE constraint failed") {
            return PreferenceError::AlreadyExists(user_id);
        }
        if db_error.is_foreign_key_violation() || message.contains("FOREIGN KEY constraint failed")
        {
            return PreferenceError::UserNotFound(user_id);
        }
    }
    PreferenceError::DatabaseError(error.to_string())
}
