use std::env;

/// Minimum acceptable size for the OAuth state signing key in bytes.
pub const MIN_STATE_SIGNING_KEY_LENGTH: usize = 32;

#[derive(Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

pub struct Config {
    pub database_url: String,
    pub frontend_origin: String,
    pub spotify: SpotifyConfig,
    pub state_signing_key: Vec<u8>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let frontend_origin = env::var("FRONTEND_ORIGIN").expect("FRONTEND_ORIGIN must be set");

        let spotify = SpotifyConfig {
            client_id: env::var("SPOTIFY_CLIENT_ID").expect("SPOTIFY_CLIENT_ID must be set"),
            client_secret: env::var("SPOTIFY_CLIENT_SECRET")
                .expect("SPOTIFY_CLIENT_SECRET must be set"),
            redirect_uri: env::var("SPOTIFY_REDIRECT_URI")
                .expect("SPOTIFY_REDIRECT_URI must be set"),
        };

        let state_signing_key = env::var("STATE_SIGNING_KEY")
            .expect("STATE_SIGNING_KEY must be set")
            .into_bytes();
        assert!(
            state_signing_key.len() >= MIN_STATE_SIGNING_KEY_LENGTH,
            "STATE_SIGNING_KEY must be at least {} bytes",
            MIN_STATE_SIGNING_KEY_LENGTH
        );

        Config {
            database_url,
            frontend_origin,
            spotify,
            state_signing_key,
        }
    }

    #[cfg(test)]
    pub fn test() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Config {
            database_url: String::new(),
            frontend_origin: "https://example.com".into(),
            spotify: SpotifyConfig {
                client_id: "test_client_id".into(),
                client_secret: "test_client_secret".into(),
                redirect_uri: "https://example.com/auth/callback".into(),
            },
            state_signing_key: b"0123456789abcdef0123456789abcdef".to_vec(),
        })
    }
}
