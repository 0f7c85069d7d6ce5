use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use reqwest::Url;

use crate::utils::oauth_state::generate_state_token;
use crate::AppState;

const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";

/// Everything the frontend reads later: profile, listening history, library
/// and playback state.
pub const SPOTIFY_SCOPES: &str = "user-read-private user-read-email user-top-read \
     user-read-recently-played playlist-read-private user-library-read \
     user-read-playback-state user-read-currently-playing";

pub async fn spotify_login(State(app_state): State<AppState>) -> impl IntoResponse {
    let state = generate_state_token(&app_state.config.state_signing_key);

    let mut url = Url::parse(AUTHORIZE_URL).expect("authorize URL is valid");
    url.query_pairs_mut()
        .append_pair("client_id", &app_state.config.spotify.client_id)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", &app_state.config.spotify.redirect_uri)
        .append_pair("scope", SPOTIFY_SCOPES)
        .append_pair("state", &state)
        // always re-show the consent screen so account switching works
        .append_pair("show_dialog", "true");

    Redirect::to(url.as_str())
}
