//! Default implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, error};

use crate::db::Store;
use crate::services::auth_service::{
    AuthError, AuthService, Credential, CredentialStore, LoginResult,
};
use crate::services::password;
use crate::services::token::TokenService;

#[async_trait]
impl CredentialStore for Store {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Credential>> {
        let user = self.find_active_user_by_username(username).await?;
        Ok(user.map(|u| Credential {
            id: u.id,
            username: u.username,
            password_hash: u.password_hash,
        }))
    }

    async fn find_active_role_name(&self, user_id: i32) -> anyhow::Result<Option<String>> {
        Self::find_active_role_name(self, user_id).await
    }
}

const DUMMY_PASSWORD: &str = "motofleet-dummy-password";

pub struct DefaultAuthService {
    credentials: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    bcrypt_cost: u32,
    /// Compared against for unknown usernames. Built with the same cost as
    /// stored hashes so both rejections take the same time.
    dummy_hash: OnceCell<String>,
}

impl DefaultAuthService {
    #[must_use]
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            credentials,
            tokens,
            bcrypt_cost,
            dummy_hash: OnceCell::new(),
        }
    }

    async fn dummy_hash(&self) -> anyhow::Result<&str> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| {
                password::hash_blocking(DUMMY_PASSWORD.to_string(), self.bcrypt_cost)
            })
            .await?;
        Ok(hash.as_str())
    }
}

#[async_trait]
impl AuthService for DefaultAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let Some(credential) = self.credentials.find_by_username(username).await? else {
            // Spend the same bcrypt work as a wrong password would.
            let dummy = self.dummy_hash().await?.to_string();
            password::verify_blocking(password.to_string(), dummy).await?;
            debug!("Login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        };

        let valid =
            password::verify_blocking(password.to_string(), credential.password_hash.clone())
                .await?;
        if !valid {
            debug!("Login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let Some(role) = self
            .credentials
            .find_active_role_name(credential.id)
            .await?
        else {
            debug!(user_id = credential.id, "Login rejected: no access profile");
            return Err(AuthError::NoAccessProfile);
        };

        let issued = self
            .tokens
            .issue(credential.id, &credential.username, &role)
            .map_err(|e| {
                error!(user_id = credential.id, error = %e, "Login aborted while signing token");
                AuthError::from(e)
            })?;

        Ok(LoginResult {
            token: issued.token,
        })
    }
}
