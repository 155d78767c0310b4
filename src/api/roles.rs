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
use crate::db::RoleFields;
use crate::entities::{ActiveFlag, roles};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest {
    #[validate(length(min = 1, max = 20, message = "must be 1 to 20 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub description: String,
}

impl From<RoleRequest> for RoleFields {
    fn from(request: RoleRequest) -> Self {
        let RoleRequest { name, description } = request;
        Self { name, description }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub active: ActiveFlag,
    pub created_at: String,
    pub links: Vec<Link>,
}

impl From<roles::Model> for RoleResponse {
    fn from(model: roles::Model) -> Self {
        let roles::Model {
            id,
            name,
            description,
            active,
            created_at,
        } = model;

        Self {
            id,
            name,
            description,
            active,
            created_at,
            links: Vec::new(),
        }
    }
}

impl Linked for RoleResponse {
    fn id(&self) -> i32 {
        self.id
    }

    fn set_links(&mut self, links: Vec<Link>) {
        self.links = links;
    }
}

impl ApiResource for RoleResponse {
    type Entity = roles::Entity;
    const PATH: &'static str = "roles";
    const NAME: &'static str = "Role";

    fn from_model(model: roles::Model) -> Self {
        model.into()
    }
}

/// POST /roles
pub async fn create_role(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RoleRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = validated_body(body)?;

    let model = state.store().create_role(request.into()).await?;

    tracing::info!(id = model.id, name = %model.name, "Role created");
    Ok(created::<RoleResponse>(&state, model))
}

/// PUT /roles/{id}
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    body: Result<Json<RoleRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = validated_body(body)?;

    if !state.store().update_role(id, request.into()).await? {
        return Err(ApiError::not_found(RoleResponse::NAME, id));
    }

    Ok(StatusCode::NO_CONTENT)
}
