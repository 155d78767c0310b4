//! Domain service for login.
//!
//! A login attempt runs user lookup, password check, role check and token
//! issuance strictly in that order, stopping at the first failure.

use serde::Serialize;
use thiserror::Error;

use crate::services::token::TokenError;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password. Deliberately indistinguishable.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User has no valid access profile")]
    NoAccessProfile,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Configuration(msg) | TokenError::Signing(msg) => Self::Configuration(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Stored login material for one active user.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
}

/// Read-only lookups the login flow needs from persistence.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive match over active users.
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Credential>>;

    /// Name of the user's active role, `None` when nothing resolves.
    async fn find_active_role_name(&self, user_id: i32) -> anyhow::Result<Option<String>>;
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Exchanges a username and password for a signed access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user or wrong
    /// password, [`AuthError::NoAccessProfile`] when the user has no active role,
    /// and [`AuthError::Configuration`] when the token cannot be signed.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;
}
