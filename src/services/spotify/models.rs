use serde::Deserialize;
use serde_json::Value;

use super::errors::SpotifyError;

/// Token endpoint response for both the authorization-code and refresh
/// grants. Spotify omits `refresh_token` on most refresh responses.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileImage {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplicitContent {
    #[serde(default)]
    pub filter_enabled: Option<bool>,
}

/// The slice of Spotify's `/v1/me` payload this service cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub images: Vec<ProfileImage>,
    #[serde(default)]
    pub followers: Option<Followers>,
    #[serde(default)]
    pub explicit_content: Option<ExplicitContent>,
}

impl SpotifyProfile {
    pub fn parse(value: Value) -> Result<Self, SpotifyError> {
        serde_json::from_value(value).map_err(|err| SpotifyError::InvalidResponse(err.to_string()))
    }

    /// Spotify accounts may have no display name; fall back to the id.
    pub fn preferred_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }

    pub fn followers_total(&self) -> Option<i32> {
        self.followers.as_ref().and_then(|f| f.total)
    }

    pub fn explicit_filter(&self) -> Option<bool> {
        self.explicit_content.as_ref().and_then(|e| e.filter_enabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopItemKind {
    Tracks,
    Artists,
}

impl TopItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopItemKind::Tracks => "tracks",
            TopItemKind::Artists => "artists",
        }
    }
}
