use async_trait::async_trait;
use serde_json::Value;

use super::errors::SpotifyError;
use super::models::{TokenGrant, TopItemKind};

#[async_trait]
pub trait SpotifyService: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, SpotifyError>;
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant, SpotifyError>;
    /// Raw `/v1/me` payload; auth flow parses it, the data proxy relays it.
    async fn fetch_profile(&self, access_token: &str) -> Result<Value, SpotifyError>;
    async fn top_items(
        &self,
        access_token: &str,
        kind: TopItemKind,
        time_range: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Value, SpotifyError>;
    async fn recently_played(
        &self,
        access_token: &str,
        limit: u32,
        after: Option<&str>,
        before: Option<&str>,
    ) -> Result<Value, SpotifyError>;
}
