use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::access::SpotifyAccess;
use super::{parse_limit, upstream_error};
use crate::AppState;

const DEFAULT_LIMIT: u32 = 50;

#[derive(Debug, Default, Deserialize)]
pub struct RecentlyPlayedQuery {
    pub limit: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
}

pub async fn recently_played(
    State(app_state): State<AppState>,
    access: SpotifyAccess,
    Query(params): Query<RecentlyPlayedQuery>,
) -> Response {
    let limit = match parse_limit(params.limit.as_deref(), DEFAULT_LIMIT) {
        Ok(limit) => limit,
        Err(rejection) => return rejection,
    };

    match app_state
        .spotify
        .recently_played(
            &access.access_token,
            limit,
            params.after.as_deref(),
            params.before.as_deref(),
        )
        .await
    {
        Ok(data) => Json(json!({
            "success": true,
            "data": data,
            "meta": {
                "limit": limit,
                "after": params.after,
                "before": params.before,
            },
        }))
        .into_response(),
        Err(err) => upstream_error(err, "recently-played"),
    }
}
