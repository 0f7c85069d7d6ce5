use axum::{extract::State, response::IntoResponse};
use tracing::error;

use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::session;
use crate::AppState;

/// Revokes every session for the user and unlinks the Spotify tokens.
/// Idempotent: a request whose session is already gone still succeeds.
pub async fn logout(
    State(app_state): State<AppState>,
    auth: Option<AuthSession>,
) -> impl IntoResponse {
    if let Some(auth) = auth {
        if let Err(err) = session::delete_sessions_for_user(&app_state.db_pool, auth.user_id).await
        {
            error!(user_id = %auth.user_id, ?err, "failed to revoke sessions on logout");
        }
        if let Err(err) = app_state.db.clear_spotify_tokens(auth.user_id).await {
            error!(user_id = %auth.user_id, ?err, "failed to clear spotify tokens on logout");
        }
    }

    JsonResponse::success("Logged out successfully")
}
