use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use rand_core::RngCore;
use sha2::Sha256;
use time::{Duration, OffsetDateTime};

type HmacSha256 = Hmac<Sha256>;

/// OAuth state tokens expire after this many minutes; a login attempt that
/// sits on the authorize page longer must start over.
pub const STATE_TTL_MINUTES: i64 = 10;

/// Builds a self-contained OAuth state value: `<nonce>.<expiry>.<signature>`.
/// The signature lets the callback verify the state without any server-side
/// session storage.
pub fn generate_state_token(key: &[u8]) -> String {
    let mut bytes = [0u8; 32];
    rand_core::OsRng.fill_bytes(&mut bytes);
    let nonce = BASE64_URL_SAFE_NO_PAD.encode(bytes);
    let expires_at =
        (OffsetDateTime::now_utc() + Duration::minutes(STATE_TTL_MINUTES)).unix_timestamp();
    let signature = sign(key, &nonce, expires_at);
    format!("{nonce}.{expires_at}.{signature}")
}

/// Recomputes the signature and checks expiry. Returns false for malformed,
/// tampered, or expired tokens.
pub fn verify_state_token(key: &[u8], token: &str) -> bool {
    let mut parts = token.splitn(3, '.');
    let (Some(nonce), Some(expires_raw), Some(signature)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let Ok(expires_at) = expires_raw.parse::<i64>() else {
        return false;
    };
    if expires_at <= OffsetDateTime::now_utc().unix_timestamp() {
        return false;
    }

    let Ok(signature_bytes) = hex::decode(signature) else {
        return false;
    };

    state_mac(key, nonce, expires_at)
        .verify_slice(&signature_bytes)
        .is_ok()
}

fn state_mac(key: &[u8], nonce: &str, expires_at: i64) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(nonce.as_bytes());
    mac.update(b".");
    mac.update(expires_at.to_string().as_bytes());
    mac
}

fn sign(key: &[u8], nonce: &str, expires_at: i64) -> String {
    hex::encode(state_mac(key, nonce, expires_at).finalize().into_bytes())
}

#[cfg(test)]
pub fn state_token_with_expiry(key: &[u8], expires_at: i64) -> String {
    let mut bytes = [0u8; 32];
    rand_core::OsRng.fill_bytes(&mut bytes);
    let nonce = BASE64_URL_SAFE_NO_PAD.encode(bytes);
    let signature = sign(key, &nonce, expires_at);
    format!("{nonce}.{expires_at}.{signature}")
}
