//! Handlers shared by every soft-deletable resource collection.

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use sea_orm::EntityTrait;
use serde::Serialize;
use std::sync::Arc;

use super::pagination::{LinkFactory, Linked, PageQuery, build_page};
use super::validation::validate_page;
use super::{API_PREFIX, ApiError, AppState, AuthenticatedUser, PagedResponse};
use crate::db::SoftDeletable;

pub type ModelOf<R> = <<R as ApiResource>::Entity as EntityTrait>::Model;

/// Response body projected from one entity row.
pub trait ApiResource: Linked + Serialize + Send + Sized + 'static {
    type Entity: SoftDeletable;

    /// Collection path segment under the API prefix.
    const PATH: &'static str;

    /// Singular name used in error messages.
    const NAME: &'static str;

    fn from_model(model: ModelOf<Self>) -> Self;
}

pub fn link_factory<R: ApiResource>(state: &AppState) -> LinkFactory {
    LinkFactory::new(
        &state.config.server.public_url,
        &format!("{API_PREFIX}/{}", R::PATH),
    )
}

/// 201 with a `Location` header pointing at the new resource.
pub fn created<R: ApiResource>(state: &AppState, model: ModelOf<R>) -> Response {
    let links = link_factory::<R>(state);
    let body = links.attach(R::from_model(model));

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&links.item_href(body.id())) {
        headers.insert(header::LOCATION, location);
    }

    (StatusCode::CREATED, headers, Json(body)).into_response()
}

/// GET /{resource}?pageNumber&pageSize
pub async fn list<R>(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResponse<R>>, ApiError>
where
    R: ApiResource,
    ModelOf<R>: Sync,
{
    let (page_number, page_size) = validate_page(query.page_number, query.page_size)?;

    let (models, total) = state
        .store()
        .list_active::<R::Entity>(page_number, page_size)
        .await?;

    let items = models.into_iter().map(R::from_model).collect();

    Ok(Json(build_page(
        items,
        page_number,
        page_size,
        total,
        &link_factory::<R>(&state),
    )))
}

/// GET /{resource}/{id}
pub async fn get<R>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<R>, ApiError>
where
    R: ApiResource,
    ModelOf<R>: Sync,
{
    let model = state
        .store()
        .find_active::<R::Entity>(id)
        .await?
        .ok_or_else(|| ApiError::not_found(R::NAME, id))?;

    Ok(Json(link_factory::<R>(&state).attach(R::from_model(model))))
}

/// DELETE /{resource}/{id}
pub async fn delete<R>(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError>
where
    R: ApiResource,
    ModelOf<R>: Sync,
{
    if !state.store().soft_delete::<R::Entity>(id).await? {
        return Err(ApiError::not_found(R::NAME, id));
    }

    tracing::info!(
        resource = R::PATH,
        id,
        deactivated_by = caller.id,
        "Resource deactivated"
    );
    Ok(StatusCode::NO_CONTENT)
}
