use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::routes::auth::flow::complete_login;
use crate::utils::oauth_state::verify_state_token;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn frontend_error_redirect(origin: &str, error: &str) -> Redirect {
    Redirect::to(&format!("{origin}?error={error}"))
}

pub async fn spotify_callback(
    State(app_state): State<AppState>,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let origin = &app_state.config.frontend_origin;

    if let Some(error) = params.error {
        info!(%error, "user denied spotify authorization");
        return frontend_error_redirect(origin, "access_denied").into_response();
    }

    // Verify the state signature before anything else; a bad state must
    // never reach the token exchange.
    let state_ok = params
        .state
        .as_deref()
        .map(|state| verify_state_token(&app_state.config.state_signing_key, state))
        .unwrap_or(false);
    if !state_ok {
        warn!("callback state missing, expired or failed verification");
        return frontend_error_redirect(origin, "invalid_state").into_response();
    }

    let Some(code) = params.code.filter(|code| !code.is_empty()) else {
        warn!("callback arrived without an authorization code");
        return frontend_error_redirect(origin, "oauth_failed").into_response();
    };

    match complete_login(&app_state, &code).await {
        Ok((session_id, _user)) => {
            Redirect::to(&format!("{origin}/auth/callback?token={session_id}")).into_response()
        }
        Err(err) => {
            error!(?err, "spotify login failed");
            frontend_error_redirect(origin, "oauth_failed").into_response()
        }
    }
}
