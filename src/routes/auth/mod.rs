pub mod callback;
pub mod exchange;
pub mod flow;
pub mod login;
pub mod logout;
pub mod me;
pub mod refresh;
pub mod session;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login::spotify_login))
        .route("/callback", get(callback::spotify_callback))
        .route("/exchange", post(exchange::exchange_code))
        .route("/refresh", post(refresh::refresh_token))
        .route("/logout", post(logout::logout))
}
