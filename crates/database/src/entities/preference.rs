//! User preference entity definitions
//!
//! A [`UserPreference`] is the stored shape of one user's settings. Collection
//! columns stay nullable here; [`UserPreference::snapshot`] is the only place
//! that turns them into the always-present wire representation.

use std::fmt;

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_THEME: &str = "light";
pub const DEFAULT_LANGUAGE: &str = "ar";
pub const DEFAULT_SOUND_ENABLED: bool = true;
pub const DEFAULT_VOLUME_LEVEL: f64 = 1.0;
pub const DEFAULT_DAILY_GOAL: i64 = 100;

/// Column widths of the `user_preferences` table.
pub const THEME_MAX_LEN: usize = 20;
pub const LANGUAGE_MAX_LEN: usize = 10;
pub const LAST_SELECTION_MAX_LEN: usize = 50;

/// Stored preference record, one per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreference {
    /// Database primary key, `None` until inserted
    pub id: Option<i64>,
    /// Owning user
    pub user_id: i64,
    pub theme: String,
    /// Locale code
    pub language_preference: String,
    pub sound_enabled: bool,
    pub volume_level: f64,
    /// Free-form per-prayer notification settings
    pub prayer_notifications: Option<Map<String, Value>>,
    pub daily_goal: i64,
    /// Favorite reciter identifiers
    pub quran_audio_favorites: Option<Vec<String>>,
    pub hadith_favorites: Option<Vec<String>>,
    pub azkar_favorites: Option<Vec<String>>,
    pub last_reciter: Option<String>,
    pub last_server: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Wire representation of a [`UserPreference`].
///
/// Field order is the key order of the serialized object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceSnapshot {
    pub id: Option<i64>,
    pub user_id: i64,
    pub theme: String,
    pub language_preference: String,
    pub sound_enabled: bool,
    pub volume_level: f64,
    pub prayer_notifications: Map<String, Value>,
    pub daily_goal: i64,
    pub quran_audio_favorites: Vec<String>,
    pub hadith_favorites: Vec<String>,
    pub azkar_favorites: Vec<String>,
    pub last_reciter: Option<String>,
    pub last_server: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Partial update of a preference record.
///
/// `None` leaves a field untouched. For `last_reciter` and `last_server`,
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceUpdate {
    pub theme: Option<String>,
    pub language_preference: Option<String>,
    pub sound_enabled: Option<bool>,
    pub volume_level: Option<f64>,
    pub prayer_notifications: Option<Map<String, Value>>,
    pub daily_goal: Option<i64>,
    pub quran_audio_favorites: Option<Vec<String>>,
    pub hadith_favorites: Option<Vec<String>>,
    pub azkar_favorites: Option<Vec<String>>,
    pub last_reciter: Option<Option<String>>,
    pub last_server: Option<Option<String>>,
}

impl PreferenceUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Current time at the precision kept by the store.
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// ISO-8601 rendering used both for storage and the wire.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|timestamp| timestamp.with_timezone(&Utc))
}

impl UserPreference {
    /// Create a record for `user_id` with every field at its default
    pub fn new(user_id: i64) -> Self {
        let now = current_timestamp();
        Self {
            id: None,
            user_id,
            theme: DEFAULT_THEME.to_string(),
            language_preference: DEFAULT_LANGUAGE.to_string(),
            sound_enabled: DEFAULT_SOUND_ENABLED,
            volume_level: DEFAULT_VOLUME_LEVEL,
            prayer_notifications: Some(Map::new()),
            daily_goal: DEFAULT_DAILY_GOAL,
            quran_audio_favorites: Some(Vec::new()),
            hadith_favorites: Some(Vec::new()),
            azkar_favorites: Some(Vec::new()),
            last_reciter: None,
            last_server: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Normalized, null-free view of the record
    pub fn snapshot(&self) -> PreferenceSnapshot {
        PreferenceSnapshot {
            id: self.id,
            user_id: self.user_id,
            theme: self.theme.clone(),
            language_preference: self.language_preference.clone(),
            sound_enabled: self.sound_enabled,
            volume_level: self.volume_level,
            prayer_notifications: self.prayer_notifications.clone().unwrap_or_default(),
            daily_goal: self.daily_goal,
            quran_audio_favorites: self.quran_audio_favorites.clone().unwrap_or_default(),
            hadith_favorites: self.hadith_favorites.clone().unwrap_or_default(),
            azkar_favorites: self.azkar_favorites.clone().unwrap_or_default(),
            last_reciter: self.last_reciter.clone(),
            last_server: self.last_server.clone(),
            created_at: self.created_at.as_ref().map(format_timestamp),
            updated_at: self.updated_at.as_ref().map(format_timestamp),
        }
    }

    /// Advance `updated_at`. The new value is always strictly later than the
    /// previous one, even when the clock has not moved.
    pub fn touch(&mut self) {
        let now = current_timestamp();
        let next = match self.updated_at {
            Some(previous) if now <= previous => previous + Duration::microseconds(1),
            _ => now,
        };
        if self.created_at.is_none() {
            self.created_at = Some(next);
        }
        self.updated_at = Some(next);
    }

    /// Copy every field present in `update` onto the record
    pub fn apply(&mut self, update: PreferenceUpdate) {
        let PreferenceUpdate {
            theme,
            language_preference,
            sound_enabled,
            volume_level,
            prayer_notifications,
            daily_goal,
            quran_audio_favorites,
            hadith_favorites,
            azkar_favorites,
            last_reciter,
            last_server,
        } = update;

        if let Some(theme) = theme {
            self.theme = theme;
        }
        if let Some(language) = language_preference {
            self.language_preference = language;
        }
        if let Some(enabled) = sound_enabled {
            self.sound_enabled = enabled;
        }
        if let Some(volume) = volume_level {
            self.volume_level = volume;
        }
        if let Some(notifications) = prayer_notifications {
            self.prayer_notifications = Some(notifications);
        }
        if let Some(goal) = daily_goal {
            self.daily_goal = goal;
        }
        if let Some(favorites) = quran_audio_favorites {
            self.quran_audio_favorites = Some(favorites);
        }
        if let Some(favorites) = hadith_favorites {
            self.hadith_favorites = Some(favorites);
        }
        if let Some(favorites) = azkar_favorites {
            self.azkar_favorites = Some(favorites);
        }
        if let Some(reciter) = last_reciter {
            self.last_reciter = reciter;
        }
        if let Some(server) = last_server {
            self.last_server = server;
        }
    }

    /// Put every setting back to its default, keeping identity and `created_at`
    pub fn reset_to_defaults(&mut self) {
        let defaults = Self::new(self.user_id);
        *self = Self {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            ..defaults
        };
    }

    /// Check the record against the column constraints of the store.
    /// Empty strings are accepted.
    pub fn validate(&self) -> Result<(), String> {
        check_length("theme", &self.theme, THEME_MAX_LEN)?;
        check_length(
            "language_preference",
            &self.language_preference,
            LANGUAGE_MAX_LEN,
        )?;

        if let Some(reciter) = &self.last_reciter {
            check_length("last_reciter", reciter, LAST_SELECTION_MAX_LEN)?;
        }
        if let Some(server) = &self.last_server {
            check_length("last_server", server, LAST_SELECTION_MAX_LEN)?;
        }

        if !self.volume_level.is_finite() || !(0.0..=1.0).contains(&self.volume_level) {
            return Err(format!(
                "volume_level must be between 0.0 and 1.0, got {}",
                self.volume_level
            ));
        }

        if self.daily_goal < 0 {
            return Err("daily_goal cannot be negative".to_string());
        }

        Ok(())
    }
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("{field} cannot exceed {max} characters"));
    }
    Ok(())
}

impl fmt::Display for UserPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<UserPreference user_id:{}, theme:{}>", self.user_id, self.theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_new_uses_defaults() {
        let preference = UserPreference::new(7);

        assert_eq!(preference.id, None);
        assert_eq!(preference.user_id, 7);
        assert_eq!(preference.theme, "light");
        assert_eq!(preference.language_preference, "ar");
        assert!(preference.sound_enabled);
        assert_eq!(preference.volume_level, 1.0);
        assert_eq!(preference.daily_goal, 100);
        assert_eq!(preference.prayer_notifications, Some(Map::new()));
        assert_eq!(preference.quran_audio_favorites, Some(Vec::new()));
        assert_eq!(preference.hadith_favorites, Some(Vec::new()));
        assert_eq!(preference.azkar_favorites, Some(Vec::new()));
        assert!(preference.last_reciter.is_none());
        assert!(preference.last_server.is_none());
        assert_eq!(preference.created_at, preference.updated_at);
        assert!(preference.created_at.is_some());
    }

    #[test]
    fn test_snapshot_of_new_record() {
        let value = serde_json::to_value(UserPreference::new(7).snapshot()).unwrap();

        assert_eq!(value["user_id"], json!(7));
        assert_eq!(value["theme"], json!("light"));
        assert_eq!(value["volume_level"], json!(1.0));
        assert_eq!(value["prayer_notifications"], json!({}));
        assert_eq!(value["quran_audio_favorites"], json!([]));
        assert_eq!(value["last_reciter"], Value::Null);
        assert_eq!(value["last_server"], Value::Null);
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn test_snapshot_fills_unset_collections() {
        let mut preference = UserPreference::new(3);
        preference.prayer_notifications = None;
        preference.quran_audio_favorites = None;
        preference.hadith_favorites = None;
        preference.azkar_favorites = None;

        let value = serde_json::to_value(preference.snapshot()).unwrap();

        assert_eq!(value["prayer_notifications"], json!({}));
        assert_eq!(value["quran_audio_favorites"], json!([]));
        assert_eq!(value["hadith_favorites"], json!([]));
        assert_eq!(value["azkar_favorites"], json!([]));
    }

    #[test]
    fn test_snapshot_timestamps() {
        let mut preference = UserPreference::new(3);
        let created = Utc.with_ymd_and_hms(2024, 3, 10, 4, 30, 0).unwrap();
        preference.created_at = Some(created);
        preference.updated_at = None;

        let snapshot = preference.snapshot();

        assert_eq!(
            snapshot.created_at.as_deref(),
            Some("2024-03-10T04:30:00.000000Z")
        );
        assert_eq!(snapshot.updated_at, None);
        assert_eq!(parse_timestamp("2024-03-10T04:30:00.000000Z").unwrap(), created);
    }

    #[test]
    fn test_snapshot_key_order() {
        let serialized = serde_json::to_string(&UserPreference::new(1).snapshot()).unwrap();
        let keys = [
            "\"id\"",
            "\"user_id\"",
            "\"theme\"",
            "\"language_preference\"",
            "\"sound_enabled\"",
            "\"volume_level\"",
            "\"prayer_notifications\"",
            "\"daily_goal\"",
            "\"quran_audio_favorites\"",
            "\"hadith_favorites\"",
            "\"azkar_favorites\"",
            "\"last_reciter\"",
            "\"last_server\"",
            "\"created_at\"",
            "\"updated_at\"",
        ];

        let positions: Vec<usize> = keys
            .iter()
            .map(|key| serialized.find(key).expect("key missing from snapshot"))
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_display() {
        let mut preference = UserPreference::new(42);
        preference.theme = "dark".to_string();

        assert_eq!(preference.to_string(), "<UserPreference user_id:42, theme:dark>");
    }

    #[test]
    fn test_touch_strictly_increases() {
        let mut preference = UserPreference::new(1);
        let far_future = Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap();
        preference.updated_at = Some(far_future);

        preference.touch();
        assert_eq!(
            preference.updated_at,
            Some(far_future + Duration::microseconds(1))
        );

        let before = preference.updated_at;
        preference.touch();
        assert!(preference.updated_at > before);
        assert!(preference.updated_at >= preference.created_at);
    }

    #[test]
    fn test_apply_partial_update() {
        let mut preference = UserPreference::new(1);
        let update = PreferenceUpdate {
            theme: Some("dark".to_string()),
            quran_audio_favorites: Some(vec!["afs".to_string(), "minsh".to_string()]),
            last_reciter: Some(Some("afs".to_string())),
            last_server: Some(Some("server8".to_string())),
            ..PreferenceUpdate::default()
        };

        preference.apply(update);

        assert_eq!(preference.theme, "dark");
        assert_eq!(
            preference.quran_audio_favorites,
            Some(vec!["afs".to_string(), "minsh".to_string()])
        );
        assert_eq!(preference.last_reciter.as_deref(), Some("afs"));
        assert_eq!(preference.last_server.as_deref(), Some("server8"));
        assert_eq!(preference.language_preference, "ar");
        assert_eq!(preference.daily_goal, 100);
    }

    #[test]
    fn test_apply_null_clears_last_selection() {
        let mut preference = UserPreference::new(1);
        preference.last_reciter = Some("afs".to_string());
        preference.last_server = Some("server8".to_string());

        preference.apply(PreferenceUpdate {
            last_reciter: Some(None),
            ..PreferenceUpdate::default()
        });

        assert!(preference.last_reciter.is_none());
        assert_eq!(preference.last_server.as_deref(), Some("server8"));
    }

    #[test]
    fn test_default_update_is_empty() {
        assert!(PreferenceUpdate::default().is_empty());
        assert!(!PreferenceUpdate {
            last_server: Some(None),
            ..PreferenceUpdate::default()
        }
        .is_empty());
    }

    #[test]
    fn test_reset_to_defaults_keeps_identity() {
        let mut preference = UserPreference::new(9);
        preference.id = Some(12);
        preference.theme = "dark".to_string();
        preference.hadith_favorites = Some(vec!["bukhari-1".to_string()]);
        let created = preference.created_at;

        preference.reset_to_defaults();

        assert_eq!(preference.id, Some(12));
        assert_eq!(preference.user_id, 9);
        assert_eq!(preference.created_at, created);
        assert_eq!(preference.theme, "light");
        assert_eq!(preference.hadith_favorites, Some(Vec::new()));
    }

    #[test]
    fn test_validate() {
        let mut preference = UserPreference::new(1);
        assert!(preference.validate().is_ok());

        preference.volume_level = 1.5;
        assert!(preference.validate().is_err());
        preference.volume_level = f64::NAN;
        assert!(preference.validate().is_err());
        preference.volume_level = 0.0;
        assert!(preference.validate().is_ok());

        preference.theme = "x".repeat(THEME_MAX_LEN + 1);
        assert!(preference.validate().is_err());
        preference.theme = "dark".to_string();

        preference.last_server = Some("s".repeat(LAST_SELECTION_MAX_LEN + 1));
        assert!(preference.validate().is_err());
        preference.last_server = None;

        preference.daily_goal = -1;
        assert!(preference.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_empty_strings() {
        let mut preference = UserPreference::new(1);
        preference.theme = String::new();
        preference.language_preference = String::new();
        preference.last_reciter = Some(String::new());
        preference.last_server = Some(String::new());

        assert!(preference.validate().is_ok());
    }
}
