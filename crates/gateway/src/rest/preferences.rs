//! Preference REST endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use noor_database::{PreferenceSnapshot, PreferenceUpdate, UserPreference};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use utoipa::ToSchema;

use crate::error::GatewayResult;
use crate::extract::JsonBody;
use crate::state::GatewayState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PreferencesResponse {
    #[schema(value_type = Object)]
    pub preferences: PreferenceSnapshot,
}

impl From<UserPreference> for PreferencesResponse {
    fn from(preference: UserPreference) -> Self {
        Self {
            preferences: preference.snapshot(),
        }
    }
}

/// Body of `PUT /api/users/{user_id}/preferences`. Every field is optional
/// and unknown keys are ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePreferencesRequest {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub language_preference: Option<String>,
    #[serde(default)]
    pub sound_enabled: Option<bool>,
    #[serde(default)]
    pub volume_level: Option<f64>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub prayer_notifications: Option<Map<String, Value>>,
    #[serde(default)]
    pub daily_goal: Option<i64>,
    #[serde(default)]
    pub quran_audio_favorites: Option<Vec<String>>,
    #[serde(default)]
    pub hadith_favorites: Option<Vec<String>>,
    #[serde(default)]
    pub azkar_favorites: Option<Vec<String>>,
    /// `null` clears the stored value
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub last_reciter: Option<Option<String>>,
    /// `null` clears the stored value
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub last_server: Option<Option<String>>,
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<UpdatePreferencesRequest> for PreferenceUpdate {
    fn from(request: UpdatePreferencesRequest) -> Self {
        Self {
            theme: request.theme,
            language_preference: request.language_preference,
            sound_enabled: request.sound_enabled,
            volume_level: request.volume_level,
            prayer_notifications: request.prayer_notifications,
            daily_goal: request.daily_goal,
            quran_audio_favorites: request.quran_audio_favorites,
            hadith_favorites: request.hadith_favorites,
            azkar_favorites: request.azkar_favorites,
            last_reciter: request.last_reciter,
            last_server: request.last_server,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Create preference routes
pub fn create_preference_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route(
            "/users/:user_id/preferences",
            get(get_preferences).put(update_preferences),
        )
        .route("/users/:user_id/preferences/reset", post(reset_preferences))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/preferences",
    tag = "Preferences",
    params(
        ("user_id" = i64, Path, description = "Owning user ID")
    ),
    responses(
        (status = 200, description = "Current preferences, created with defaults on first access", body = PreferencesResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_preferences(
    Path(user_id): Path<i64>,
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<PreferencesResponse>> {
    let preference = state.preferences().get_or_create(user_id).await?;
    Ok(Json(preference.into()))
}

#[utoipa::path(
    put,
    path = "/api/users/{user_id}/preferences",
    tag = "Preferences",
    params(
        ("user_id" = i64, Path, description = "Owning user ID")
    ),
    request_body = UpdatePreferencesRequest,
    responses(
        (status = 200, description = "Updated preferences", body = PreferencesResponse),
        (status = 400, description = "Invalid preference values", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn update_preferences(
    Path(user_id): Path<i64>,
    State(state): State<Arc<GatewayState>>,
    JsonBody(request): JsonBody<UpdatePreferencesRequest>,
) -> GatewayResult<Json<PreferencesResponse>> {
    let update = PreferenceUpdate::from(request);
    debug!(user_id, ?update, "updating preferences");

    let preference = state.preferences().update(user_id, update).await?;
    Ok(Json(preference.into()))
}

#[utoipa::path(
    post,
    path = "/api/users/{user_id}/preferences/reset",
    tag = "Preferences",
    params(
        ("user_id" = i64, Path, description = "Owning user ID")
    ),
    responses(
        (status = 200, description = "Preferences restored to defaults", body = PreferencesResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn reset_preferences(
    Path(user_id): Path<i64>,
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<PreferencesResponse>> {
    let preference = state.preferences().reset_to_default(user_id).await?;
    Ok(Json(preference.into()))
}
