use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct JsonResponse {
    pub status: String,
    pub success: bool,
    pub message: String,
    pub code: Option<String>,
}

impl JsonResponse {
    fn body(status: &str, success: bool, msg: &str, code: Option<&str>) -> JsonResponse {
        JsonResponse {
            status: status.to_string(),
            success,
            message: msg.to_string(),
            code: code.map(|c| c.to_string()),
        }
    }

    pub fn success(msg: &str) -> impl IntoResponse {
        (StatusCode::OK, Json(Self::body("success", true, msg, None)))
    }

    pub fn bad_request(msg: &str) -> impl IntoResponse {
        (
            StatusCode::BAD_REQUEST,
            Json(Self::body("error", false, msg, None)),
        )
    }

    pub fn bad_request_with_code(msg: &str, code: &str) -> impl IntoResponse {
        (
            StatusCode::BAD_REQUEST,
            Json(Self::body("error", false, msg, Some(code))),
        )
    }

    pub fn unauthorized(msg: &str) -> impl IntoResponse {
        (
            StatusCode::UNAUTHORIZED,
            Json(Self::body("error", false, msg, None)),
        )
    }

    pub fn unauthorized_with_code(msg: &str, code: &str) -> impl IntoResponse {
        (
            StatusCode::UNAUTHORIZED,
            Json(Self::body("error", false, msg, Some(code))),
        )
    }

    pub fn server_error(msg: &str) -> impl IntoResponse {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Self::body("error", false, msg, None)),
        )
    }

    pub fn too_many_requests(msg: &str) -> impl IntoResponse {
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(Self::body("error", false, msg, None)),
        )
    }
}
