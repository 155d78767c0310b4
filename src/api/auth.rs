use axum::{
    Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState, TokenResponse};
use crate::services::TokenError;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Identity taken from a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub username: String,
    pub role: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Requires `Authorization: Bearer <token>` and injects [`AuthenticatedUser`].
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer_token(&headers) else {
        return Err(ApiError::Unauthorized(
            "Missing bearer token".to_string(),
        ));
    };

    let claims = state.tokens.validate(token).map_err(|e| match e {
        TokenError::Expired => ApiError::Unauthorized("Token has expired".to_string()),
        TokenError::Invalid(reason) => {
            tracing::debug!(%reason, "Rejected bearer token");
            ApiError::Unauthorized("Invalid token".to_string())
        }
        TokenError::Configuration(_) | TokenError::Signing(_) => {
            ApiError::internal(e.to_string())
        }
    })?;

    let id = claims
        .user_id()
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    tracing::Span::current().record("user_id", id);

    request.extensions_mut().insert(AuthenticatedUser {
        id,
        username: claims.name,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Exchange username and password for a signed access token
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(payload) = body.map_err(|rejection| ApiError::validation(rejection.body_text()))?;

    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(TokenResponse {
        token: result.token,
    }))
}
