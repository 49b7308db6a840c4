//! Credential authenticator.
//!
//! Looks a user up by exact email and compares the supplied password with
//! the stored hash. Every outcome is a value: unknown email and wrong
//! password both yield `Ok(None)`, directory failures yield `Err`.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::credentials::parse_credentials;
use crate::password::verify_password;
use crate::user::User;

/// Lookup failure in the user directory (store unreachable, bad row, ...).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("user directory error: {0}")]
pub struct DirectoryError(pub String);

/// Read-only user lookup port, implemented by the storage layer.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("failed to fetch user: {0}")]
    Directory(#[from] DirectoryError),

    #[error("password hash error: {0}")]
    PasswordHash(String),
}

#[derive(Clone)]
pub struct Authenticator {
    directory: Arc<dyn UserDirectory>,
}

impl Authenticator {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Authenticate raw login fields.
    pub async fn authenticate(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Option<User>, AuthError> {
        let Some(credentials) = parse_credentials(email, password) else {
            tracing::info!("invalid credentials (schema)");
            return Ok(None);
        };

        let user = match self.directory.find_user_by_email(&credentials.email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::info!("invalid credentials");
                return Ok(None);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch user");
                return Err(e.into());
            }
        };

        let hash = user.password_hash.clone();
        let password = credentials.password;
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))??;

        if matches {
            tracing::info!(user_id = %user.id, "user authenticated");
            Ok(Some(user))
        } else {
            tracing::info!("invalid credentials");
            Ok(None)
        }
    }
}
