//! OAuth CSRF state
//!
//! The login step issues a random `state` value and keeps a signed copy
//! in a cookie. The callback only proceeds when the provider echoes the
//! same value back.
//!
//! Cookie format: `{state}.{base64(hmac_sha256(state))}`

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::error::AppError;

/// Cookie holding the signed state during the authorization round trip
pub const STATE_COOKIE: &str = "oauth_state";

type HmacSha256 = Hmac<Sha256>;

/// Generate a random state value (32 bytes, base64url)
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn sign(state: &str, secret: &str) -> Result<String, AppError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| AppError::Signing(e.to_string()))?;
    mac.update(state.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

/// Build the cookie value for `state`
pub fn create_state_cookie(state: &str, secret: &str) -> Result<String, AppError> {
    Ok(format!("{}.{}", state, sign(state, secret)?))
}

/// Check the callback `state` against the signed cookie value
///
/// # Errors
/// `InvalidState` if the cookie is malformed, its signature does not
/// verify, or it was issued for a different state
pub fn verify_state(cookie_value: &str, state: &str, secret: &str) -> Result<(), AppError> {
    let (cookie_state, signature_b64) = cookie_value
        .split_once('.')
        .ok_or(AppError::InvalidState)?;

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AppError::InvalidState)?;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| AppError::Signing(e.to_string()))?;
    mac.update(cookie_state.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| AppError::InvalidState)?;

    if cookie_state != state {
        return Err(AppError::InvalidState);
    }

    Ok(())
}
