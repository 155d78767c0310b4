use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, DefaultAuthService, TokenService};
use metrics_exporter_prometheus::PrometheusHandle;

pub mod auth;
mod error;
pub mod motorcycles;
mod observability;
pub mod pagination;
pub mod resources;
pub mod roles;
mod types;
pub mod users;
mod validation;

pub use auth::AuthenticatedUser;
pub use error::{ApiError, FieldErrors};
pub use types::*;

/// Version segment every route lives under.
pub const API_PREFIX: &str = "/api/v1";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: Arc<TokenService>,

    pub auth_service: Arc<dyn AuthService>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_url,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    Ok(create_app_state(config, store, prometheus_handle))
}

#[must_use]
pub fn create_app_state(
    config: Config,
    store: Store,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    let tokens = Arc::new(TokenService::new(&config.jwt));
    let auth_service = Arc::new(DefaultAuthService::new(
        Arc::new(store.clone()),
        tokens.clone(),
        config.security.bcrypt_cost,
    ));

    Arc::new(AppState {
        config: Arc::new(config),
        store,
        tokens,
        auth_service,
        prometheus_handle,
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = &state.config.server.cors_allowed_origins;

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest(API_PREFIX, api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use motorcycles::MotorcycleResponse;
    use roles::RoleResponse;
    use users::UserResponse;

    Router::new()
        .route(
            "/users",
            get(resources::list::<UserResponse>).post(users::create_user),
        )
        .route(
            "/users/{id}",
            get(resources::get::<UserResponse>)
                .put(users::update_user)
                .delete(resources::delete::<UserResponse>),
        )
        .route(
            "/roles",
            get(resources::list::<RoleResponse>).post(roles::create_role),
        )
        .route(
            "/roles/{id}",
            get(resources::get::<RoleResponse>)
                .put(roles::update_role)
                .delete(resources::delete::<RoleResponse>),
        )
        .route(
            "/motorcycles",
            get(resources::list::<MotorcycleResponse>).post(motorcycles::create_motorcycle),
        )
        .route(
            "/motorcycles/{id}",
            get(resources::get::<MotorcycleResponse>)
                .put(motorcycles::update_motorcycle)
                .delete(resources::delete::<MotorcycleResponse>),
        )
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::auth_middleware,
        ))
}
