use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::models::user::User;
use crate::services::spotify::models::{SpotifyProfile, TokenGrant};

/// Everything one login writes to the user row: profile snapshot plus the
/// token pair from the code exchange.
#[derive(Debug, Clone)]
pub struct SpotifyUserUpsert {
    pub spotify_id: String,
    pub name: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
    pub followers_count: Option<i32>,
    pub explicit_content_filter: Option<bool>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expires_at: OffsetDateTime,
}

impl SpotifyUserUpsert {
    pub fn from_profile(profile: &SpotifyProfile, grant: &TokenGrant) -> Self {
        SpotifyUserUpsert {
            spotify_id: profile.id.clone(),
            name: profile.preferred_name().to_string(),
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
            avatar_url: profile.avatar_url().map(str::to_owned),
            country: profile.country.clone(),
            product: profile.product.clone(),
            followers_count: profile.followers_total(),
            explicit_content_filter: profile.explicit_filter(),
            access_token: grant.access_token.clone(),
            refresh_token: grant.refresh_token.clone(),
            token_expires_at: OffsetDateTime::now_utc() + Duration::seconds(grant.expires_in),
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error>;

    /// Atomic create-or-update keyed by spotify_id. Profile fields are
    /// overwritten by the new snapshot where present; the stored refresh
    /// token survives when the grant did not include one.
    async fn upsert_spotify_user(&self, upsert: &SpotifyUserUpsert) -> Result<User, sqlx::Error>;

    async fn update_spotify_access_token(
        &self,
        user_id: Uuid,
        access_token: &str,
        expires_at: OffsetDateTime,
    ) -> Result<(), sqlx::Error>;

    async fn clear_spotify_tokens(&self, user_id: Uuid) -> Result<(), sqlx::Error>;
}
