use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub spotify_id: Option<String>,
    pub spotify_display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
    pub followers_count: Option<i32>,
    pub explicit_content_filter: Option<bool>,
    #[serde(skip_serializing)]
    pub spotify_access_token: Option<String>,
    #[serde(skip_serializing)]
    pub spotify_refresh_token: Option<String>,
    pub spotify_token_expires_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl User {
    /// A token with no recorded expiry counts as expired; so does one whose
    /// expiry is exactly now.
    pub fn is_spotify_token_expired(&self) -> bool {
        match self.spotify_token_expires_at {
            Some(expires_at) => expires_at <= OffsetDateTime::now_utc(),
            None => true,
        }
    }

    /// The stored access token, only if present and not expired. Callers
    /// must not hit Spotify with a stale token.
    pub fn valid_spotify_token(&self) -> Option<&str> {
        let token = self.spotify_access_token.as_deref().filter(|t| !t.is_empty())?;
        if self.is_spotify_token_expired() {
            return None;
        }
        Some(token)
    }
}

/// Sanitized user projection returned to clients. Never carries Spotify
/// access or refresh tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub spotify_id: Option<String>,
    pub spotify_display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
    pub followers_count: Option<i32>,
    pub explicit_content_filter: Option<bool>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        PublicUser {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            spotify_id: user.spotify_id.clone(),
            spotify_display_name: user.spotify_display_name.clone(),
            avatar_url: user.avatar_url.clone(),
            country: user.country.clone(),
            product: user.product.clone(),
            followers_count: user.followers_count,
            explicit_content_filter: user.explicit_content_filter,
        }
    }
}

#[cfg(test)]
pub fn test_user() -> User {
    let now = OffsetDateTime::now_utc();
    User {
        id: Uuid::new_v4(),
        name: "Alice".into(),
        email: Some("a@example.com".into()),
        spotify_id: Some("u1".into()),
        spotify_display_name: Some("Alice".into()),
        avatar_url: None,
        country: Some("US".into()),
        product: Some("premium".into()),
        followers_count: Some(10),
        explicit_content_filter: Some(false),
        spotify_access_token: Some("access-token".into()),
        spotify_refresh_token: Some("refresh-token".into()),
        spotify_token_expires_at: Some(now + time::Duration::hours(1)),
        created_at: now,
    }
}
