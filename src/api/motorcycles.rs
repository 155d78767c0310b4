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
use crate::db::MotorcycleFields;
use crate::entities::{ActiveFlag, motorcycles};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MotorcycleRequest {
    #[validate(range(min = 1900, max = 2100, message = "must be between 1900 and 2100"))]
    pub year: i32,

    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub model: String,

    #[validate(length(min = 1, max = 10, message = "must be 1 to 10 characters"))]
    pub plate: String,
}

impl From<MotorcycleRequest> for MotorcycleFields {
    fn from(request: MotorcycleRequest) -> Self {
        let MotorcycleRequest { year, model, plate } = request;
        Self { year, model, plate }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorcycleResponse {
    pub id: i32,
    pub year: i32,
    pub model: String,
    pub plate: String,
    pub active: ActiveFlag,
    pub created_at: String,
    pub links: Vec<Link>,
}

impl From<motorcycles::Model> for MotorcycleResponse {
    fn from(model: motorcycles::Model) -> Self {
        let motorcycles::Model {
            id,
            year,
            model,
            plate,
            active,
            created_at,
        } = model;

        Self {
            id,
            year,
            model,
            plate,
            active,
            created_at,
            links: Vec::new(),
        }
    }
}

impl Linked for MotorcycleResponse {
    fn id(&self) -> i32 {
        self.id
    }

    fn set_links(&mut self, links: Vec<Link>) {
        self.links = links;
    }
}

impl ApiResource for MotorcycleResponse {
    type Entity = motorcycles::Entity;
    const PATH: &'static str = "motorcycles";
    const NAME: &'static str = "Motorcycle";

    fn from_model(model: motorcycles::Model) -> Self {
        model.into()
    }
}

/// POST /motorcycles
pub async fn create_motorcycle(
    State(state): State<Arc<AppState>>,
    body: Result<Json<MotorcycleRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = validated_body(body)?;

    let model = state.store().create_motorcycle(request.into()).await?;

    tracing::info!(id = model.id, "Motorcycle created");
    Ok(created::<MotorcycleResponse>(&state, model))
}

/// PUT /motorcycles/{id}
///
/// Soft-deleted motorcycles are treated as missing.
pub async fn update_motorcycle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    body: Result<Json<MotorcycleRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = validated_body(body)?;

    if !state.store().update_motorcycle(id, request.into()).await? {
        return Err(ApiError::not_found(MotorcycleResponse::NAME, id));
    }

    Ok(StatusCode::NO_CONTENT)
}
