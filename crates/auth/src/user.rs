//! Dashboard user record.

use serde::{Deserialize, Serialize};

use invoicedesk_core::{Entity, UserId};

/// A user as stored in `users`.
///
/// The password hash never leaves the process: it is skipped on
/// serialization and redacted from `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: UserId::from_string("u1"),
            name: "User".to_string(),
            email: "user@nextmail.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
        }
    }

    #[test]
    fn hash_is_not_serialized() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "user@nextmail.com");
    }

    #[test]
    fn hash_is_redacted_in_debug_output() {
        let dbg = format!("{:?}", user());
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
