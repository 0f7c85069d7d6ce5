use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::responses::JsonResponse;
use crate::session;
use crate::AppState;

/// An authenticated request: the bearer token resolved to a live session.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: Uuid,
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        app_state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| JsonResponse::unauthorized("Missing bearer token").into_response())?;

        let session_id = Uuid::parse_str(bearer.token())
            .map_err(|_| JsonResponse::unauthorized("Invalid session token").into_response())?;

        let record = session::get_session(&app_state.db_pool, session_id)
            .await
            .map_err(|_| {
                JsonResponse::server_error("Failed to load session").into_response()
            })?;

        match record {
            Some(record) => Ok(AuthSession {
                session_id,
                user_id: record.user_id,
            }),
            None => Err(JsonResponse::unauthorized("Session expired or revoked").into_response()),
        }
    }
}

// Logout accepts requests whose session is already gone.
impl OptionalFromRequestParts<AppState> for AuthSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        app_state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(
            <AuthSession as FromRequestParts<AppState>>::from_request_parts(parts, app_state)
                .await
                .ok(),
        )
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header, Method, Request, StatusCode};
    use std::sync::Arc;
    use time::{Duration, OffsetDateTime};

    use super::*;
    use crate::db::mock_db::MockDb;
    use crate::db::user_repository::UserRepository;
    use crate::services::spotify::mock_spotify::MockSpotify;
    use crate::services::spotify::service::SpotifyService;
    use crate::session::{insert_test_session, SessionData};

    fn test_state() -> AppState {
        let db: Arc<dyn UserRepository> = Arc::new(MockDb::default());
        let spotify: Arc<dyn SpotifyService> = Arc::new(MockSpotify::default());
        AppState::test(db, spotify)
    }

    fn parts_with_bearer(token: &str) -> Parts {
        Request::builder()
            .method(Method::GET)
            .uri("/")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn valid_bearer_resolves_to_the_session_user() {
        let app_state = test_state();
        let session_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        insert_test_session(
            session_id,
            SessionData {
                user_id,
                created_at: now,
                expires_at: now + Duration::hours(1),
            },
        );

        let mut parts = parts_with_bearer(&session_id.to_string());
        let session =
            <AuthSession as FromRequestParts<AppState>>::from_request_parts(&mut parts, &app_state)
                .await
                .unwrap();

        assert_eq!(session.session_id, session_id);
        assert_eq!(session.user_id, user_id);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let app_state = test_state();
        let mut parts = Request::builder()
            .method(Method::GET)
            .uri("/")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let rejection =
            <AuthSession as FromRequestParts<AppState>>::from_request_parts(&mut parts, &app_state)
                .await
                .unwrap_err();
        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_uuid_bearer_is_unauthorized() {
        let app_state = test_state();
        let mut parts = parts_with_bearer("not-a-session-token");

        let rejection =
            <AuthSession as FromRequestParts<AppState>>::from_request_parts(&mut parts, &app_state)
                .await
                .unwrap_err();
        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_session_is_unauthorized_but_optional_extraction_succeeds() {
        let app_state = test_state();
        let stale = Uuid::new_v4();

        let mut parts = parts_with_bearer(&stale.to_string());
        let rejection =
            <AuthSession as FromRequestParts<AppState>>::from_request_parts(&mut parts, &app_state)
                .await
                .unwrap_err();
        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);

        let mut parts = parts_with_bearer(&stale.to_string());
        let optional = <AuthSession as OptionalFromRequestParts<AppState>>::from_request_parts(
            &mut parts, &app_state,
        )
        .await
        .unwrap();
        assert!(optional.is_none());
    }
}
