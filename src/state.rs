use crate::config::Config;
use crate::db::user_repository::UserRepository;
use crate::services::spotify::service::SpotifyService;
use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn UserRepository>,
    pub spotify: Arc<dyn SpotifyService>,
    pub db_pool: Arc<PgPool>,
    pub http_client: Arc<Client>,
    pub config: Arc<Config>,
}

/// Lazy pool that never connects; test sessions live in the in-memory store.
#[cfg(test)]
pub fn test_pg_pool() -> Arc<PgPool> {
    Arc::new(
        PgPool::connect_lazy("postgres://localhost/wrapped_lite_test")
            .expect("lazy test pool should build"),
    )
}

#[cfg(test)]
impl AppState {
    pub fn test(db: Arc<dyn UserRepository>, spotify: Arc<dyn SpotifyService>) -> Self {
        AppState {
            db,
            spotify,
            db_pool: test_pg_pool(),
            http_client: Arc::new(Client::new()),
            config: Config::test(),
        }
    }
}
