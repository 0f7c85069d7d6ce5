use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::models::user::PublicUser;
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::AppState;

pub async fn current_user(State(app_state): State<AppState>, auth: AuthSession) -> Response {
    match app_state.db.find_user_by_id(auth.user_id).await {
        Ok(Some(user)) => Json(PublicUser::from(&user)).into_response(),
        Ok(None) => JsonResponse::unauthorized("Session user no longer exists").into_response(),
        Err(err) => {
            error!(user_id = %auth.user_id, ?err, "failed to load current user");
            JsonResponse::server_error("Failed to load user").into_response()
        }
    }
}
