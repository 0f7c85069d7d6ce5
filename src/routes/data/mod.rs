pub mod access;
pub mod profile;
pub mod recently_played;
pub mod top_items;

use axum::response::{IntoResponse, Response};
use axum::{routing::get, Router};
use tracing::error;

use crate::responses::JsonResponse;
use crate::services::spotify::errors::SpotifyError;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/top-tracks", get(top_items::top_tracks))
        .route("/top-artists", get(top_items::top_artists))
        .route("/recently-played", get(recently_played::recently_played))
        .route("/profile", get(profile::profile))
}

/// Parses a numeric query parameter that arrived as text. Returns the
/// default when absent, or the given 400 when out of range or not a number.
fn parse_bounded(
    raw: Option<&str>,
    default: u32,
    min: u32,
    max: u32,
    message: &str,
    code: &str,
) -> Result<u32, Response> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.parse::<u32>() {
        Ok(value) if (min..=max).contains(&value) => Ok(value),
        _ => Err(JsonResponse::bad_request_with_code(message, code).into_response()),
    }
}

pub(crate) fn parse_limit(raw: Option<&str>, default: u32) -> Result<u32, Response> {
    parse_bounded(
        raw,
        default,
        1,
        50,
        "limit must be an integer between 1 and 50",
        "invalid_limit",
    )
}

pub(crate) fn parse_offset(raw: Option<&str>) -> Result<u32, Response> {
    parse_bounded(
        raw,
        0,
        0,
        u32::MAX,
        "offset must be a non-negative integer",
        "invalid_offset",
    )
}

pub(crate) fn upstream_error(err: SpotifyError, endpoint: &str) -> Response {
    error!(endpoint, ?err, "spotify data request failed");
    JsonResponse::server_error(&err.to_string()).into_response()
}
