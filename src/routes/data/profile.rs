use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::access::SpotifyAccess;
use super::upstream_error;
use crate::AppState;

/// Relays Spotify's `/v1/me` payload untouched; the frontend reads fields
/// this service never models.
pub async fn profile(State(app_state): State<AppState>, access: SpotifyAccess) -> Response {
    match app_state.spotify.fetch_profile(&access.access_token).await {
        Ok(data) => Json(json!({"success": true, "data": data})).into_response(),
        Err(err) => upstream_error(err, "profile"),
    }
}
