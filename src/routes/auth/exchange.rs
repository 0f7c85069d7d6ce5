use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::models::user::PublicUser;
use crate::responses::JsonResponse;
use crate::routes::auth::flow::complete_login;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExchangeRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// SPA variant of the callback: the frontend received the redirect, compared
/// the state itself, and posts the code here for a JSON session instead of
/// another redirect hop.
pub async fn exchange_code(
    State(app_state): State<AppState>,
    Json(body): Json<ExchangeRequest>,
) -> Response {
    let Some(code) = body.code.filter(|code| !code.is_empty()) else {
        return JsonResponse::bad_request_with_code("Missing authorization code", "missing_code")
            .into_response();
    };
    if body.state.filter(|state| !state.is_empty()).is_none() {
        return JsonResponse::bad_request_with_code("Missing state parameter", "missing_state")
            .into_response();
    }

    match complete_login(&app_state, &code).await {
        Ok((session_id, user)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "token": session_id,
                "user": PublicUser::from(&user),
            })),
        )
            .into_response(),
        Err(err) => {
            error!(?err, "code exchange failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Authentication failed",
                    "message": err.to_string(),
                })),
            )
                .into_response()
        }
    }
}
