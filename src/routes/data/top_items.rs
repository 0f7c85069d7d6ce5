use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::access::SpotifyAccess;
use super::{parse_limit, parse_offset, upstream_error};
use crate::responses::JsonResponse;
use crate::services::spotify::models::TopItemKind;
use crate::AppState;

pub const VALID_TIME_RANGES: [&str; 3] = ["short_term", "medium_term", "long_term"];

const DEFAULT_TIME_RANGE: &str = "medium_term";
const DEFAULT_LIMIT: u32 = 20;

// limit/offset arrive as strings so a non-numeric value can produce a
// structured 400 instead of axum's generic query rejection.
#[derive(Debug, Default, Deserialize)]
pub struct TopItemsQuery {
    pub time_range: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

pub async fn top_tracks(
    State(app_state): State<AppState>,
    access: SpotifyAccess,
    Query(params): Query<TopItemsQuery>,
) -> Response {
    top_items(app_state, access, params, TopItemKind::Tracks).await
}

pub async fn top_artists(
    State(app_state): State<AppState>,
    access: SpotifyAccess,
    Query(params): Query<TopItemsQuery>,
) -> Response {
    top_items(app_state, access, params, TopItemKind::Artists).await
}

async fn top_items(
    app_state: AppState,
    access: SpotifyAccess,
    params: TopItemsQuery,
    kind: TopItemKind,
) -> Response {
    let time_range = params
        .time_range
        .unwrap_or_else(|| DEFAULT_TIME_RANGE.to_string());
    if !VALID_TIME_RANGES.contains(&time_range.as_str()) {
        return JsonResponse::bad_request_with_code(
            "time_range must be one of short_term, medium_term, long_term",
            "invalid_time_range",
        )
        .into_response();
    }

    let limit = match parse_limit(params.limit.as_deref(), DEFAULT_LIMIT) {
        Ok(limit) => limit,
        Err(rejection) => return rejection,
    };
    let offset = match parse_offset(params.offset.as_deref()) {
        Ok(offset) => offset,
        Err(rejection) => return rejection,
    };

    match app_state
        .spotify
        .top_items(&access.access_token, kind, &time_range, limit, offset)
        .await
    {
        Ok(data) => Json(json!({
            "success": true,
            "data": data,
            "meta": {
                "time_range": time_range,
                "limit": limit,
                "offset": offset,
            },
        }))
        .into_response(),
        Err(err) => upstream_error(err, kind.as_str()),
    }
}
