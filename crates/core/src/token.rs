//! Pseudo-auth tokens.
//!
//! Login first asks the REST API for a token. When no auth server answers,
//! the site fabricates a JWT-shaped token locally so the rest of the app can
//! treat both cases the same way:
//!
//! ```text
//! base64url({"alg":"HS256","typ":"JWT"}) . base64url(claims) . base64url(hmac)
//! ```
//!
//! Decoding only looks at the payload segment and never checks the
//! signature, because tokens minted by the API cannot be verified here.
//! [`TokenSigner::verify`] exists for tokens this process fabricated itself.

use core::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header every fabricated token carries.
const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Lifetime of a sign-in handoff token from the storefront to the admin.
pub const HANDOFF_TTL_SECS: i64 = 60;

/// Errors that can occur when decoding or signing a token.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Fewer than two dot-separated segments.
    #[error("token is not JWT-shaped")]
    Malformed,
    /// Payload segment is not valid base64url.
    #[error("token payload is not base64url")]
    InvalidEncoding,
    /// Payload is not a JSON object.
    #[error("token payload is not a JSON object")]
    InvalidPayload,
    /// The signing key was rejected.
    #[error("invalid signing key")]
    InvalidKey,
}

/// Identity carried by a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AuthUser {
    /// Name to show in page headers: name, then email, then `"Admin"`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.email.as_deref().filter(|e| !e.is_empty()))
            .unwrap_or("Admin")
    }
}

/// A decoded token: the identity plus its timing claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub user: AuthUser,
    /// `iat` claim, seconds since the epoch.
    pub issued_at: Option<i64>,
    /// `exp` claim, seconds since the epoch.
    pub expires_at: Option<i64>,
}

impl DecodedToken {
    /// Whether the token carries an `exp` claim that lies in the past.
    ///
    /// Tokens without `exp` never expire.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now.timestamp())
    }
}

/// Who a fabricated token is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub name: String,
}

impl Identity {
    /// Identity for a bare login: the name defaults to the email's local part.
    #[must_use]
    pub fn from_email(email: &str) -> Self {
        let name = email.split('@').next().unwrap_or(email).to_string();
        Self {
            email: email.to_string(),
            name,
        }
    }
}

#[derive(Serialize)]
struct FabricatedClaims<'a> {
    id: i64,
    email: &'a str,
    name: &'a str,
    iat: i64,
    exp: i64,
}

/// Fabricates and verifies locally issued tokens.
#[derive(Clone)]
pub struct TokenSigner {
    mac: HmacSha256,
    ttl: Duration,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("key", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenSigner {
    /// Create a signer keyed by `secret` issuing tokens valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if the key is rejected by HMAC.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, TokenError> {
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| TokenError::InvalidKey)?;
        Ok(Self { mac, ttl })
    }

    /// How long fabricated tokens stay valid.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fabricate a token for `identity` issued at `now`.
    ///
    /// The `id` claim is the issue time in milliseconds, which is unique
    /// enough for a session that has no backing user record.
    #[must_use]
    pub fn fabricate(&self, identity: &Identity, now: DateTime<Utc>) -> String {
        self.issue(now.timestamp_millis(), identity, now)
    }

    /// Sign a token for a known user record.
    #[must_use]
    pub fn issue(&self, id: i64, identity: &Identity, now: DateTime<Utc>) -> String {
        let claims = FabricatedClaims {
            id,
            email: &identity.email,
            name: &identity.name,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let payload = serde_json::to_string(&claims).unwrap_or_else(|_| "{}".to_string());

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER_JSON),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = self.sign(&signing_input);
        format!("{signing_input}.{signature}")
    }

    /// Signer for sign-in handoff tokens, valid for [`HANDOFF_TTL_SECS`].
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if the key is rejected by HMAC.
    pub fn handoff(secret: &[u8]) -> Result<Self, TokenError> {
        Self::new(secret, Duration::seconds(HANDOFF_TTL_SECS))
    }

    /// The user behind `token` if this signer issued it and its `exp` claim
    /// has not passed. Tokens without `exp` are refused.
    #[must_use]
    pub fn accept(&self, token: &str, now: DateTime<Utc>) -> Option<AuthUser> {
        if !self.verify(token) {
            return None;
        }
        decode(token)
            .ok()
            .filter(|decoded| decoded.expires_at.is_some() && !decoded.is_expired(now))
            .map(|decoded| decoded.user)
    }

    /// Check that `token` was fabricated with this signer's key.
    #[must_use]
    pub fn verify(&self, token: &str) -> bool {
        let Some((signing_input, signature)) = token.rsplit_once('.') else {
            return false;
        };
        if signing_input.split('.').count() != 2 {
            return false;
        }
        let Ok(signature) = decode_segment(signature) else {
            return false;
        };
        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature).is_ok()
    }

    fn sign(&self, signing_input: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

/// Decode a token's payload without verifying it.
///
/// Accepts URL-safe or standard base64, with or without padding. The user id
/// is read from `id`, falling back to `sub`; numeric ids are stringified.
///
/// # Errors
///
/// Returns an error when the token has fewer than two segments or the payload
/// does not decode to a JSON object.
pub fn decode(token: &str) -> Result<DecodedToken, TokenError> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload)) = (segments.next(), segments.next()) else {
        return Err(TokenError::Malformed);
    };

    let bytes = decode_segment(payload)?;
    let claims: Value = serde_json::from_slice(&bytes).map_err(|_| TokenError::InvalidPayload)?;
    let Value::Object(claims) = claims else {
        return Err(TokenError::InvalidPayload);
    };

    let text = |key: &str| match claims.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    Ok(DecodedToken {
        user: AuthUser {
            id: text("id").or_else(|| text("sub")),
            email: text("email"),
            name: text("name"),
        },
        issued_at: claims.get("iat").and_then(Value::as_i64),
        expires_at: claims.get("exp").and_then(Value::as_i64),
    })
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, TokenError> {
    let normalized: String = segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE_NO_PAD
        .decode(normalized)
        .map_err(|_| TokenError::InvalidEncoding)
}
