use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use super::pagination::Linked;
use super::resources::{ApiResource, created};
use super::validation::validated_body;
use super::{ApiError, AppState, Link};
use crate::db::UserFields;
use crate::entities::{ActiveFlag, users};
use crate::services::password;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[validate(length(min = 1, max = 20, message = "must be 1 to 20 characters"))]
    pub username: String,

    #[validate(
        email(message = "must be a valid email address"),
        length(max = 320, message = "must be at most 320 characters")
    )]
    pub email: String,

    #[validate(length(min = 6, max = 72, message = "must be 6 to 72 characters"))]
    pub password: String,

    #[validate(range(min = 1, message = "must reference an existing role"))]
    pub role_id: i32,
}

impl UserRequest {
    /// Swaps the plaintext password for its stored hash.
    #[must_use]
    pub fn into_fields(self, password_hash: String) -> UserFields {
        let Self {
            username,
            email,
            password: _,
            role_id,
        } = self;

        UserFields {
            username,
            email,
            password_hash,
            role_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub active: ActiveFlag,
    pub created_at: String,
    pub role_id: i32,
    pub links: Vec<Link>,
}

impl From<users::Model> for UserResponse {
    fn from(model: users::Model) -> Self {
        let users::Model {
            id,
            username,
            email,
            password_hash: _,
            active,
            created_at,
            role_id,
        } = model;

        Self {
            id,
            username,
            email,
            active,
            created_at,
            role_id,
            links: Vec::new(),
        }
    }
}

impl Linked for UserResponse {
    fn id(&self) -> i32 {
        self.id
    }

    fn set_links(&mut self, links: Vec<Link>) {
        self.links = links;
    }
}

impl ApiResource for UserResponse {
    type Entity = users::Entity;
    const PATH: &'static str = "users";
    const NAME: &'static str = "User";

    fn from_model(model: users::Model) -> Self {
        model.into()
    }
}

/// Rejects the request unless `role_id` names an active role, then hashes the password.
async fn prepare_fields(state: &AppState, request: UserRequest) -> Result<UserFields, ApiError> {
    if !state.store().role_is_active(request.role_id).await? {
        return Err(ApiError::validation(format!(
            "Role {} not found",
            request.role_id
        )));
    }

    let password_hash =
        password::hash_blocking(request.password.clone(), state.config.security.bcrypt_cost)
            .await?;

    Ok(request.into_fields(password_hash))
}

/// POST /users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = validated_body(body)?;
    let fields = prepare_fields(&state, request).await?;

    let model = state.store().create_user(fields).await?;

    tracing::info!(id = model.id, role_id = model.role_id, "User created");
    Ok(created::<UserResponse>(&state, model))
}

/// PUT /users/{id}
///
/// A missing user is a 404 even when the body names an unknown role.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = validated_body(body)?;

    if !state.store().user_exists(id).await? {
        return Err(ApiError::not_found(UserResponse::NAME, id));
    }

    let fields = prepare_fields(&state, request).await?;

    if !state.store().update_user(id, fields).await? {
        return Err(ApiError::not_found(UserResponse::NAME, id));
    }

    Ok(StatusCode::NO_CONTENT)
}
