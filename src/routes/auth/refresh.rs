use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use time::{Duration, OffsetDateTime};
use tracing::{error, info};

use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::AppState;

/// Trades the stored refresh token for a fresh access token. Spotify rarely
/// rotates the refresh token on this grant, so only the access token and its
/// expiry are overwritten.
pub async fn refresh_token(
    State(app_state): State<AppState>,
    auth: AuthSession,
) -> Response {
    let user = match app_state.db.find_user_by_id(auth.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return JsonResponse::unauthorized("Session user no longer exists").into_response()
        }
        Err(err) => {
            error!(user_id = %auth.user_id, ?err, "failed to load user for refresh");
            return JsonResponse::server_error("Failed to load user").into_response();
        }
    };

    let Some(refresh_token) = user
        .spotify_refresh_token
        .as_deref()
        .filter(|token| !token.is_empty())
    else {
        return JsonResponse::unauthorized_with_code(
            "No refresh token available",
            "no_refresh_token",
        )
        .into_response();
    };

    let grant = match app_state.spotify.refresh_access_token(refresh_token).await {
        Ok(grant) => grant,
        Err(err) => {
            error!(user_id = %user.id, ?err, "spotify token refresh failed");
            return JsonResponse::server_error(&err.to_string()).into_response();
        }
    };

    let expires_at = OffsetDateTime::now_utc() + Duration::seconds(grant.expires_in);
    if let Err(err) = app_state
        .db
        .update_spotify_access_token(user.id, &grant.access_token, expires_at)
        .await
    {
        error!(user_id = %user.id, ?err, "failed to store refreshed token");
        return JsonResponse::server_error("Failed to store refreshed token").into_response();
    }

    info!(user_id = %user.id, "spotify access token refreshed");
    Json(json!({
        "success": true,
        "access_token": grant.access_token,
        "expires_in": grant.expires_in,
    }))
    .into_response()
}
