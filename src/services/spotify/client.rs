use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;
use tracing::warn;

use super::errors::SpotifyError;
use super::models::{TokenGrant, TopItemKind};
use super::service::SpotifyService;
use crate::config::SpotifyConfig;

const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";
const API_BASE_URL: &str = "https://api.spotify.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: usize = 2;
#[cfg(not(test))]
const RETRY_DELAY: Duration = Duration::from_millis(500);
#[cfg(test)]
const RETRY_DELAY: Duration = Duration::from_millis(10);

pub struct SpotifyClient {
    client: Client,
    config: SpotifyConfig,
    accounts_base_url: String,
    api_base_url: String,
}

impl SpotifyClient {
    pub fn new(client: Client, config: SpotifyConfig) -> Self {
        SpotifyClient {
            client,
            config,
            accounts_base_url: ACCOUNTS_BASE_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_urls(
        client: Client,
        config: SpotifyConfig,
        accounts_base_url: &str,
        api_base_url: &str,
    ) -> Self {
        SpotifyClient {
            client,
            config,
            accounts_base_url: accounts_base_url.trim_end_matches('/').to_string(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn token_request(&self, form: &[(&str, &str)]) -> RequestBuilder {
        self.client
            .post(format!("{}/api/token", self.accounts_base_url))
            .form(form)
            .timeout(REQUEST_TIMEOUT)
    }

    fn api_get(&self, access_token: &str, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.api_base_url, path))
            .bearer_auth(access_token)
            .timeout(REQUEST_TIMEOUT)
    }
}

/// Shared wrapper for every Spotify call: bounded timeout plus up to
/// MAX_RETRIES retries at a fixed delay. Transport errors and 5xx responses
/// are retried; 4xx surfaces immediately since the request will not get
/// better on its own.
async fn send_with_retry<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, SpotifyError> {
    let mut attempt = 0usize;

    loop {
        let current = request
            .try_clone()
            .ok_or(SpotifyError::RequestNotCloneable)?;

        let response = match current.send().await {
            Ok(response) => response,
            Err(err) => {
                if attempt < MAX_RETRIES {
                    attempt += 1;
                    warn!(attempt, error = %err, "Spotify request failed, retrying");
                    sleep(RETRY_DELAY).await;
                    continue;
                }
                return Err(SpotifyError::Http(err));
            }
        };

        let status = response.status();
        if status.is_server_error() && attempt < MAX_RETRIES {
            attempt += 1;
            warn!(attempt, %status, "Spotify returned a server error, retrying");
            sleep(RETRY_DELAY).await;
            continue;
        }

        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(SpotifyError::Api {
                status,
                message: upstream_message(&body),
            });
        }

        return serde_json::from_str::<T>(&body)
            .map_err(|err| SpotifyError::InvalidResponse(err.to_string()));
    }
}

/// Spotify error bodies come in two shapes: `{"error": {"message": ..}}` on
/// the Web API and `{"error": .., "error_description": ..}` on the accounts
/// service.
fn upstream_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value.pointer("/error/message").and_then(Value::as_str) {
            return message.to_string();
        }
        if let Some(description) = value.get("error_description").and_then(Value::as_str) {
            return description.to_string();
        }
        if let Some(error) = value.get("error").and_then(Value::as_str) {
            return error.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Spotify API request failed".to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl SpotifyService for SpotifyClient {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, SpotifyError> {
        let request = self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ]);
        send_with_retry(request).await
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant, SpotifyError> {
        let request = self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ]);
        send_with_retry(request).await
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Value, SpotifyError> {
        send_with_retry(self.api_get(access_token, "/v1/me")).await
    }

    async fn top_items(
        &self,
        access_token: &str,
        kind: TopItemKind,
        time_range: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Value, SpotifyError> {
        let request = self
            .api_get(access_token, &format!("/v1/me/top/{}", kind.as_str()))
            .query(&[
                ("time_range", time_range),
                ("limit", &limit.to_string()),
                ("offset", &offset.to_string()),
            ]);
        send_with_retry(request).await
    }

    async fn recently_played(
        &self,
        access_token: &str,
        limit: u32,
        after: Option<&str>,
        before: Option<&str>,
    ) -> Result<Value, SpotifyError> {
        let mut params = vec![("limit", limit.to_string())];
        if let Some(after) = after {
            params.push(("after", after.to_string()));
        }
        if let Some(before) = before {
            params.push(("before", before.to_string()));
        }
        let request = self
            .api_get(access_token, "/v1/me/player/recently-played")
            .query(&params);
        send_with_retry(request).await
    }
}
