//! Device identity
//!
//! Every client is identified by an opaque 256-bit random token carried in a
//! `device-id` cookie. The token rate-limits writes; it does not authenticate
//! anyone, and nothing stops a client from minting several. Issuance happens
//! on the sync handshake, before any mutation can reference the token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// Cookie name carrying the device token
pub const DEVICE_COOKIE: &str = "device-id";

/// Token entropy in bytes
const TOKEN_BYTES: usize = 32;

/// Cookie lifetime: 3 days
const COOKIE_MAX_AGE_SECS: u64 = 3 * 24 * 60 * 60;

/// Generate a fresh device token: 32 random bytes, URL-safe base64
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the `Set-Cookie` value issuing a token.
///
/// Same-site strict, whole-application path, multi-day expiry. Deliberately
/// not `HttpOnly`: non-browser clients read the value back and replay it on
/// mutation requests themselves.
#[must_use]
pub fn issue_cookie(token: &str) -> String {
    format!("{DEVICE_COOKIE}={token}; Max-Age={COOKIE_MAX_AGE_SECS}; Path=/; SameSite=Strict")
}

/// Extract the device token from a `Cookie` request header value
#[must_use]
pub fn token_from_cookie_header(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == DEVICE_COOKIE).then(|| value.to_string())
    })
}
