use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::models::user::User;
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::AppState;

/// Gate for the data proxy: a live session whose user holds an unexpired
/// Spotify access token. Requests with a stale token get a 401 telling the
/// client to refresh; requests without a linked account get a different 401.
#[derive(Debug)]
pub struct SpotifyAccess {
    pub user: User,
    pub access_token: String,
}

impl FromRequestParts<AppState> for SpotifyAccess {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        app_state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth =
            <AuthSession as FromRequestParts<AppState>>::from_request_parts(parts, app_state)
                .await?;

        let user = match app_state.db.find_user_by_id(auth.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return Err(
                    JsonResponse::unauthorized("Session user no longer exists").into_response()
                )
            }
            Err(err) => {
                error!(user_id = %auth.user_id, ?err, "failed to load user for data access");
                return Err(JsonResponse::server_error("Failed to load user").into_response());
            }
        };

        let has_token = user
            .spotify_access_token
            .as_deref()
            .is_some_and(|token| !token.is_empty());
        if !has_token {
            return Err(JsonResponse::unauthorized_with_code(
                "No Spotify account linked",
                "no_spotify_token",
            )
            .into_response());
        }

        match user.valid_spotify_token() {
            Some(token) => {
                let access_token = token.to_owned();
                Ok(SpotifyAccess { user, access_token })
            }
            None => Err(JsonResponse::unauthorized_with_code(
                "Spotify token expired",
                "requires_refresh",
            )
            .into_response()),
        }
    }
}
