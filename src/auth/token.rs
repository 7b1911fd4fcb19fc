//! Stateless session tokens signed with HMAC-SHA256.
//!
//! # Token Format
//!
//! A token has three dot-separated segments, each URL-safe base64 without
//! padding:
//!
//! ```text
//! b64(header) . b64(payload) . b64(HMAC-SHA256(secret, "b64(header).b64(payload)"))
//! ```
//!
//! The header is always `{"alg":"HS256","typ":"JWT"}`. The payload carries
//! the user id, email, issue time and expiry (issue time + 1 hour).
//!
//! # Security Properties
//!
//! - **Self-contained**: verification needs only the secret, no session table
//! - **Signature first**: the payload is not decoded until the signature matches
//! - **Constant-time comparison**: signatures are compared with `subtle`
//! - **Strict expiry**: a token is rejected once `exp <= now`
//!
//! # Example
//!
//! ```rust
//! use coffee_api::auth::token::TokenService;
//!
//! let tokens = TokenService::new("a-long-random-secret");
//! let token = tokens.issue(42, "ada@example.com");
//!
//! let claims = tokens.verify(&token).unwrap();
//! assert_eq!(claims.user_id, 42);
//! assert_eq!(claims.email, "ada@example.com");
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Lifetime of an issued token in seconds (1 hour).
pub const TOKEN_TTL_SECS: u64 = 3600;

/// Canonical JSON header shared by every token.
const TOKEN_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Types
// =============================================================================

/// Verified token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user id
    pub user_id: i64,

    /// Subject email at issue time
    pub email: String,

    /// Issued-at, Unix epoch seconds
    pub iat: u64,

    /// Expiry, Unix epoch seconds
    pub exp: u64,
}

/// Token verification and header parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Wrong segment count or undecodable payload
    #[error("Malformed token")]
    Malformed,

    /// Signature does not match header and payload
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token expiry is not in the future
    #[error("Token expired at {expired_at} (current time: {current_time})")]
    Expired { expired_at: u64, current_time: u64 },

    /// Authorization header is absent or not a bearer credential
    #[error("Missing or malformed bearer authorization header")]
    MissingOrMalformedHeader,
}

// =============================================================================
// Token Service
// =============================================================================

/// Issues and verifies session tokens under a single secret key.
#[derive(Clone)]
pub struct TokenService {
    secret_key: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret_key", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    /// Create a token service signing with `secret_key`.
    ///
    /// The secret is the only trust anchor for every issued token; it must
    /// come from configuration and should be at least 32 bytes.
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self {
            secret_key: secret_key.as_ref().to_vec(),
            ttl: Duration::from_secs(TOKEN_TTL_SECS),
        }
    }

    /// Issue a token for a user, valid for one hour from now.
    pub fn issue(&self, user_id: i64, email: &str) -> String {
        self.issue_at(user_id, email, unix_now())
    }

    /// Issue a token with an explicit issue time (Unix epoch seconds).
    pub fn issue_at(&self, user_id: i64, email: &str, issued_at: u64) -> String {
        let payload = serde_json::json!({
            "user_id": user_id,
            "email": email,
            "iat": issued_at,
            "exp": issued_at + self.ttl.as_secs(),
        })
        .to_string();

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(TOKEN_HEADER),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = self.sign(&signing_input);

        format!("{}.{}", signing_input, signature)
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, unix_now())
    }

    /// Verify a token against an explicit clock reading.
    ///
    /// Checks, in order: segment count, signature, payload decoding, expiry.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (header, payload, signature) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(p), Some(s), None) => (h, p, s),
                _ => return Err(TokenError::Malformed),
            };

        let expected = self.sign(&format!("{}.{}", header, payload));
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return Err(TokenError::InvalidSignature);
        }

        let claims: Claims = URL_SAFE_NO_PAD
            .decode(payload)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or(TokenError::Malformed)?;

        if claims.exp <= now {
            return Err(TokenError::Expired {
                expired_at: claims.exp,
                current_time: now,
            });
        }

        Ok(claims)
    }

    /// Base64url-encoded HMAC-SHA256 of `signing_input`.
    fn sign(&self, signing_input: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret_key).expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively and must be followed by at
/// least one whitespace character and a non-empty credential.
pub fn extract_bearer(header_value: &str) -> Result<&str, TokenError> {
    let value = header_value.trim_start();
    let scheme_end = value
        .find(char::is_whitespace)
        .ok_or(TokenError::MissingOrMalformedHeader)?;

    let (scheme, rest) = value.split_at(scheme_end);
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenError::MissingOrMalformedHeader);
    }

    let token = rest.trim();
    if token.is_empty() {
        return Err(TokenError::MissingOrMalformedHeader);
    }
    Ok(token)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// =============================================================================
// Tests
// =============================================================================
