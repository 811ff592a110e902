//! API route definitions
use crate::middleware::{auth_middleware, correlation_id_middleware};
use crate::state::AppState;
use axum::{Json, Router, middleware, routing::get};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

pub mod health;
pub mod permissions;

#[derive(OpenApi)]
#[openapi(
    info(title = "Snippet grants API", description = "Who may read, edit and share snippets"),
    components(
        schemas(crate::error::ErrorResponse)
    ),
    tags(
        (name = "permissions", description = "Snippet permission endpoints"),
        (name = "health", description = "Liveness and health endpoints"),
    ),
)]
struct ApiDoc;

/// Every documented route, without state or middleware
pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(health::ping))
        .routes(routes!(health::health_check))
        .merge(permissions::router())
}

/// Assemble the service router: routes, the OpenAPI document at
/// `/v3/api-docs`, auth and correlation ids
pub fn build_router(state: AppState) -> Router {
    let (router, api) = router().split_for_parts();

    router
        .route(
            "/v3/api-docs",
            get(move || {
                let api = api.clone();
                async move { Json(api) }
            }),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(middleware::from_fn(correlation_id_middleware))
        .with_state(state)
}
