//! Issue and inspect JWT-shaped tokens.
//!
//! # Usage
//!
//! ```bash
//! shopfront token issue -e lan@example.com -n "Lan" --ttl-hours 2
//! shopfront token decode eyJhbGciOi...
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPFRONT_TOKEN_SECRET` - HMAC key for issued tokens

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use shopfront_core::token::decode;
use shopfront_core::{AuthUser, Email, Identity, TokenError};

/// Errors from the token commands.
#[derive(Debug, Error)]
pub enum TokenCommandError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("TTL must be at least one hour")]
    InvalidTtl,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Could not encode output: {0}")]
    Output(#[from] serde_json::Error),
}

/// What `token decode` prints.
#[derive(Debug, Serialize)]
pub struct DecodedView {
    #[serde(flatten)]
    pub user: AuthUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
}

/// Fabricate a signed token.
///
/// # Errors
///
/// Returns an error for a malformed email, a zero TTL or a rejected key.
pub fn issue(email: &str, name: Option<&str>, ttl_hours: i64) -> Result<String, TokenCommandError> {
    let email = Email::parse(email).map_err(|_| TokenCommandError::InvalidEmail(email.to_owned()))?;
    if ttl_hours < 1 {
        return Err(TokenCommandError::InvalidTtl);
    }

    let identity = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => Identity {
            email: email.to_string(),
            name: name.to_string(),
        },
        None => Identity::from_email(email.as_str()),
    };

    let signer = super::signer(Duration::hours(ttl_hours))?;
    tracing::debug!(email = %identity.email, ttl_hours, "issuing token");
    Ok(signer.fabricate(&identity, Utc::now()))
}

/// Decode a token (without verifying it) into pretty JSON.
///
/// # Errors
///
/// Returns an error when the token is not JWT-shaped.
pub fn describe(token: &str, now: DateTime<Utc>) -> Result<String, TokenCommandError> {
    let decoded = decode(token)?;
    let at = |secs: Option<i64>| secs.and_then(|s| DateTime::from_timestamp(s, 0));

    let view = DecodedView {
        expired: decoded.is_expired(now),
        issued_at: at(decoded.issued_at),
        expires_at: at(decoded.expires_at),
        user: decoded.user,
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn test_issue_then_describe() {
        let token = issue("lan@example.com", Some(" Lan "), 2).unwrap();
        let json: Value = serde_json::from_str(&describe(&token, Utc::now()).unwrap()).unwrap();

        assert_eq!(json["email"], "lan@example.com");
        assert_eq!(json["name"], "Lan");
        assert_eq!(json["expired"], false);
        assert!(json["expires_at"].is_string());
    }

    #[test]
    fn test_issue_defaults_name_to_local_part() {
        let token = issue("minh@example.com", None, 1).unwrap();
        let json: Value = serde_json::from_str(&describe(&token, Utc::now()).unwrap()).unwrap();
        assert_eq!(json["name"], "minh");
    }

    #[test]
    fn test_issue_rejects_bad_input() {
        assert!(matches!(
            issue("nope", None, 1),
            Err(TokenCommandError::InvalidEmail(_))
        ));
        assert!(matches!(
            issue("a@b.c", None, 0),
            Err(TokenCommandError::InvalidTtl)
        ));
    }

    #[test]
    fn test_describe_expired() {
        let token = issue("a@b.c", None, 1).unwrap();
        let later = Utc::now() + Duration::hours(2);
        let json: Value = serde_json::from_str(&describe(&token, later).unwrap()).unwrap();
        assert_eq!(json["expired"], true);
    }

    #[test]
    fn test_describe_garbage() {
        assert!(describe("garbage", Utc::now()).is_err());
    }
}
