use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::errors::SpotifyError;
use super::models::{TokenGrant, TopItemKind};
use super::service::SpotifyService;

/// Hand-rolled stand-in for route tests. Counts every upstream call so
/// tests can prove Spotify was never hit on a rejected request.
pub struct MockSpotify {
    pub grant: Mutex<TokenGrant>,
    pub profile: Mutex<Value>,
    pub data: Mutex<Value>,
    pub fail_exchange: bool,
    pub fail_refresh: bool,
    pub fail_profile: bool,
    pub fail_data: bool,
    pub exchange_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub data_calls: AtomicUsize,
    pub last_top_items: Mutex<Option<(String, String, u32, u32)>>,
    pub last_recently_played: Mutex<Option<(u32, Option<String>, Option<String>)>>,
}

impl Default for MockSpotify {
    fn default() -> Self {
        MockSpotify {
            grant: Mutex::new(TokenGrant {
                access_token: "mock-access-token".into(),
                refresh_token: Some("mock-refresh-token".into()),
                expires_in: 3600,
            }),
            profile: Mutex::new(json!({
                "id": "u1",
                "display_name": "Alice",
                "email": "a@example.com",
                "country": "US",
                "product": "premium",
                "images": [{"url": "https://img.example/a.png"}],
                "followers": {"total": 10},
                "explicit_content": {"filter_enabled": false}
            })),
            data: Mutex::new(json!({"items": []})),
            fail_exchange: false,
            fail_refresh: false,
            fail_profile: false,
            fail_data: false,
            exchange_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            data_calls: AtomicUsize::new(0),
            last_top_items: Mutex::new(None),
            last_recently_played: Mutex::new(None),
        }
    }
}

impl MockSpotify {
    pub fn upstream_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
            + self.refresh_calls.load(Ordering::SeqCst)
            + self.profile_calls.load(Ordering::SeqCst)
            + self.data_calls.load(Ordering::SeqCst)
    }

    fn upstream_failure() -> SpotifyError {
        SpotifyError::Api {
            status: reqwest::StatusCode::BAD_GATEWAY,
            message: "mock upstream failure".into(),
        }
    }
}

#[async_trait]
impl SpotifyService for MockSpotify {
    async fn exchange_code(&self, _code: &str) -> Result<TokenGrant, SpotifyError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exchange {
            return Err(Self::upstream_failure());
        }
        Ok(self.grant.lock().unwrap().clone())
    }

    async fn refresh_access_token(&self, _refresh_token: &str) -> Result<TokenGrant, SpotifyError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_refresh {
            return Err(Self::upstream_failure());
        }
        Ok(self.grant.lock().unwrap().clone())
    }

    async fn fetch_profile(&self, _access_token: &str) -> Result<Value, SpotifyError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_profile {
            return Err(Self::upstream_failure());
        }
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn top_items(
        &self,
        _access_token: &str,
        kind: TopItemKind,
        time_range: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Value, SpotifyError> {
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_top_items.lock().unwrap() = Some((
            kind.as_str().to_string(),
            time_range.to_string(),
            limit,
            offset,
        ));
        if self.fail_data {
            return Err(Self::upstream_failure());
        }
        Ok(self.data.lock().unwrap().clone())
    }

    async fn recently_played(
        &self,
        _access_token: &str,
        limit: u32,
        after: Option<&str>,
        before: Option<&str>,
    ) -> Result<Value, SpotifyError> {
        self.data_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_recently_played.lock().unwrap() = Some((
            limit,
            after.map(str::to_owned),
            before.map(str::to_owned),
        ));
        if self.fail_data {
            return Err(Self::upstream_failure());
        }
        Ok(self.data.lock().unwrap().clone())
    }
}
