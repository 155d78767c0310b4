//! Signed access tokens (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::JwtConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token signing is misconfigured: {0}")]
    Configuration(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Claims carried by every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Username
    pub name: String,
    pub role: String,
    /// Unique token id
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

impl Claims {
    #[must_use]
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

pub struct TokenService {
    keys: Result<SigningKeys, String>,
    issuer: String,
    audience: String,
    lifetime: Duration,
    validation: Validation,
}

impl TokenService {
    /// Builds the service from immutable JWT settings.
    ///
    /// A missing or short key does not fail here; every issue and validate call
    /// reports it as [`TokenError::Configuration`].
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let keys = config.check_key().map(|()| SigningKeys {
            encoding: EncodingKey::from_secret(config.key.as_bytes()),
            decoding: DecodingKey::from_secret(config.key.as_bytes()),
        });

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        // Expiry is checked by hand with zero leeway.
        validation.validate_exp = false;

        Self {
            keys,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            lifetime: Duration::hours(i64::from(config.lifetime_hours)),
            validation,
        }
    }

    fn keys(&self) -> Result<&SigningKeys, TokenError> {
        self.keys
            .as_ref()
            .map_err(|msg| TokenError::Configuration(msg.clone()))
    }

    pub fn issue(
        &self,
        user_id: i32,
        username: &str,
        role: &str,
    ) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, username, role, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: i32,
        username: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let result = self.sign(user_id, username, role, now);

        match &result {
            Ok(issued) => info!(
                user_id,
                role,
                jti = %issued.claims.jti,
                expires_at = issued.claims.exp,
                "Access token issued"
            ),
            Err(e) => error!(user_id, error = %e, "Access token issuance failed"),
        }

        result
    }

    fn sign(
        &self,
        user_id: i32,
        username: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let keys = self.keys()?;

        let claims = Claims {
            sub: user_id.to_string(),
            name: username.to_string(),
            role: role.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Checks signature, issuer and audience, then expiry against `now`.
    ///
    /// A token is expired from the instant `now` reaches `exp`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let keys = self.keys()?;

        let data = decode::<Claims>(token, &keys.decoding, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}
