use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::db::user_repository::SpotifyUserUpsert;
use crate::models::user::User;
use crate::services::spotify::errors::SpotifyError;
use crate::services::spotify::models::SpotifyProfile;
use crate::session::{self, SESSION_TTL_HOURS};
use crate::AppState;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("spotify error: {0}")]
    Spotify(#[from] SpotifyError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// The back half of the authorization-code dance, shared by the redirect
/// callback and the SPA exchange endpoint: trade the code for tokens, pull
/// the profile, upsert the user row, and mint a bearer session.
pub async fn complete_login(
    app_state: &AppState,
    code: &str,
) -> Result<(Uuid, User), LoginError> {
    let grant = app_state.spotify.exchange_code(code).await?;
    let profile_json = app_state.spotify.fetch_profile(&grant.access_token).await?;
    let profile = SpotifyProfile::parse(profile_json)?;

    let upsert = SpotifyUserUpsert::from_profile(&profile, &grant);
    let user = app_state.db.upsert_spotify_user(&upsert).await?;

    let session_id =
        session::create_session(&app_state.db_pool, user.id, SESSION_TTL_HOURS).await?;
    info!(user_id = %user.id, spotify_id = %profile.id, "spotify login completed");

    Ok((session_id, user))
}
