//! Shop user as served by the REST API.

use serde::{Deserialize, Serialize};

use super::{Email, UserId};

/// A user record.
///
/// `email` stays plain text on read so a single malformed record from the
/// API does not fail a whole listing; writes go through [`UserPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl User {
    /// First character of the name, for avatar placeholders.
    #[must_use]
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map_or_else(|| "?".to_string(), |c| c.to_uppercase().collect())
    }
}

/// Body sent to the API when creating or replacing a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub name: String,
    pub email: Email,
}

impl UserPayload {
    /// Attach an id, producing a full user record.
    #[must_use]
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            email: self.email.into_inner(),
        }
    }
}
