use chrono::{DateTime, Utc};
use serde::Serialize;

use invoicedesk_auth::SessionClaims;
use invoicedesk_core::UserId;

/// Signed-in user for a request, taken from verified session claims.
///
/// Present on every request the gate allowed with a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    user_id: UserId,
    email: String,
    name: String,
    expires_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl From<SessionClaims> for SessionContext {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            expires_at: claims.expires_at,
        }
    }
}
