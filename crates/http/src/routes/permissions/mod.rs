//! Snippet permission routes
//!
//! Thin adapters from HTTP to [`grants_core::PermissionService`]. The acting
//! user is always the authenticated token subject, never a request field.

use crate::{
    error::HttpError,
    extract::{JsonBody, QueryParams},
    middleware::AuthenticatedUser,
    response::ApiResponse,
    state::AppState,
};
use axum::extract::{Path, State};
use grants_core::{GrantType, GrantTypeFilter, ShareSnippet, SnippetGrant, UserInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};


/// Page size used when `limit` is omitted
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Request to grant the caller access to a snippet
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveRelationRequest {
    pub snippet_id: String,
    /// OWNER, READ or WRITE
    pub grant_type: String,
}

/// Request to share a snippet with another user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShareSnippetRequest {
    pub snippet_id: String,
    /// Username as known by the user directory
    pub username: String,
}

impl From<ShareSnippetRequest> for ShareSnippet {
    fn from(request: ShareSnippetRequest) -> Self {
        ShareSnippet {
            snippet_id: request.snippet_id,
            username: request.username,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GrantsQuery {
    /// ALL (default), OWNER, READ or WRITE
    pub grant_type: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UsersQuery {
    /// Maximum number of users returned
    pub limit: Option<usize>,
    /// Matching users skipped before the page starts
    pub offset: Option<usize>,
    /// Case-insensitive substring of the username or email
    pub search: Option<String>,
}

/// Snippet ids the caller holds any grant on
#[utoipa::path(
    get,
    path = "/snippets",
    responses(
        (status = 200, description = "Snippet ids in grant order", body = JsonValue),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error", body = JsonValue)
    ),
    tag = "permissions"
)]
#[instrument(name = "http.list_snippets", skip_all, fields(user_id = %user.id))]
pub async fn list_snippets(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResponse<Vec<String>> {
    app_state
        .service
        .get_all_snippets_by_user(&user.id)
        .await
        .into()
}

/// Grant the caller access to a snippet
#[utoipa::path(
    post,
    path = "/snippets/relations",
    request_body = SaveRelationRequest,
    responses(
        (status = 200, description = "Relationship saved", body = JsonValue),
        (status = 400, description = "Unknown grant type"),
        (status = 409, description = "Grant already exists or snippet already owned", body = JsonValue),
        (status = 500, description = "Internal server error", body = JsonValue)
    ),
    tag = "permissions"
)]
#[instrument(
    name = "http.save_relation",
    skip_all,
    fields(user_id = %user.id, snippet_id = %request.snippet_id)
)]
pub async fn save_relation(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(request): JsonBody<SaveRelationRequest>,
) -> Result<ApiResponse<String>, HttpError> {
    let grant_type: GrantType = request
        .grant_type
        .parse()
        .map_err(|e: grants_core::Error| HttpError::BadRequest(e.to_string()))?;

    Ok(app_state
        .service
        .save_relation(&request.snippet_id, &user.id, grant_type)
        .await
        .into())
}

/// The caller's grants, optionally filtered by grant type
#[utoipa::path(
    get,
    path = "/snippets/grants",
    params(GrantsQuery),
    responses(
        (status = 200, description = "Grants in insertion order", body = JsonValue),
        (status = 400, description = "Unknown grant type filter"),
        (status = 500, description = "Internal server error", body = JsonValue)
    ),
    tag = "permissions"
)]
#[instrument(name = "http.get_grants", skip_all, fields(user_id = %user.id))]
pub async fn get_grants(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    QueryParams(query): QueryParams<GrantsQuery>,
) -> Result<ApiResponse<Vec<SnippetGrant>>, HttpError> {
    let filter = match query.grant_type.as_deref() {
        None | Some("") => GrantTypeFilter::All,
        Some(raw) => raw
            .parse::<GrantTypeFilter>()
            .map_err(|e| HttpError::BadRequest(e.to_string()))?,
    };

    Ok(app_state
        .service
        .get_snippet_grants(&user.id, filter)
        .await
        .into())
}

/// Give another user WRITE access to a snippet the caller can edit
#[utoipa::path(
    post,
    path = "/snippets/share",
    request_body = ShareSnippetRequest,
    responses(
        (status = 200, description = "Snippet shared", body = JsonValue),
        (status = 404, description = "Unknown user, no edit rights, or already shared", body = JsonValue),
        (status = 500, description = "Internal server error", body = JsonValue)
    ),
    tag = "permissions"
)]
#[instrument(
    name = "http.share_snippet",
    skip_all,
    fields(user_id = %user.id, snippet_id = %request.snippet_id)
)]
pub async fn share_snippet(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(request): JsonBody<ShareSnippetRequest>,
) -> ApiResponse<String> {
    let share = ShareSnippet::from(request);
    app_state
        .service
        .save_share_relation(&share, &user.id)
        .await
        .into()
}

/// Page through directory users
#[utoipa::path(
    get,
    path = "/snippets/users",
    params(UsersQuery),
    responses(
        (status = 200, description = "One page of users", body = JsonValue),
        (status = 404, description = "Directory returned no user list", body = JsonValue),
        (status = 500, description = "Directory failure", body = JsonValue)
    ),
    tag = "permissions"
)]
#[instrument(name = "http.list_users", skip_all)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    QueryParams(query): QueryParams<UsersQuery>,
) -> ApiResponse<Vec<UserInfo>> {
    app_state
        .service
        .get_users_paginated(
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            query.offset.unwrap_or(0),
            query.search.as_deref().unwrap_or(""),
        )
        .await
        .into()
}

/// Whether the caller holds any grant on the snippet
#[utoipa::path(
    get,
    path = "/snippets/{snippet_id}/access",
    params(("snippet_id" = String, Path, description = "Snippet id")),
    responses(
        (status = 200, description = "Caller has access", body = JsonValue),
        (status = 404, description = "Caller has no grant", body = JsonValue)
    ),
    tag = "permissions"
)]
#[instrument(name = "http.has_access", skip_all, fields(user_id = %user.id, snippet_id = %snippet_id))]
pub async fn has_access(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(snippet_id): Path<String>,
) -> ApiResponse<bool> {
    app_state
        .service
        .has_access(&snippet_id, &user.id)
        .await
        .into()
}

/// Whether the caller holds an OWNER or WRITE grant on the snippet
#[utoipa::path(
    get,
    path = "/snippets/{snippet_id}/can-edit",
    params(("snippet_id" = String, Path, description = "Snippet id")),
    responses(
        (status = 200, description = "Caller can edit", body = JsonValue),
        (status = 404, description = "Caller cannot edit", body = JsonValue)
    ),
    tag = "permissions"
)]
#[instrument(name = "http.can_edit", skip_all, fields(user_id = %user.id, snippet_id = %snippet_id))]
pub async fn can_edit(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(snippet_id): Path<String>,
) -> ApiResponse<bool> {
    app_state
        .service
        .can_edit(&snippet_id, &user.id)
        .await
        .into()
}

/// Username of the snippet's owner
#[utoipa::path(
    get,
    path = "/snippets/{snippet_id}/author",
    params(("snippet_id" = String, Path, description = "Snippet id")),
    responses(
        (status = 200, description = "Owner username", body = JsonValue),
        (status = 404, description = "Snippet has no owner", body = JsonValue),
        (status = 500, description = "Directory failure", body = JsonValue)
    ),
    tag = "permissions"
)]
#[instrument(name = "http.get_author", skip_all, fields(snippet_id = %snippet_id))]
pub async fn get_author(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(snippet_id): Path<String>,
) -> ApiResponse<String> {
    app_state
        .service
        .get_snippet_author(&snippet_id)
        .await
        .into()
}

/// Remove the caller's grant on the snippet
#[utoipa::path(
    delete,
    path = "/snippets/{snippet_id}/relation",
    params(("snippet_id" = String, Path, description = "Snippet id")),
    responses(
        (status = 200, description = "Relationship deleted", body = JsonValue),
        (status = 404, description = "No such grant", body = JsonValue)
    ),
    tag = "permissions"
)]
#[instrument(name = "http.delete_relation", skip_all, fields(user_id = %user.id, snippet_id = %snippet_id))]
pub async fn delete_relation(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(snippet_id): Path<String>,
) -> ApiResponse<String> {
    app_state
        .service
        .delete_relation(&snippet_id, &user.id)
        .await
        .into()
}

/// Remove every grant on the snippet
#[utoipa::path(
    delete,
    path = "/snippets/{snippet_id}/relations",
    params(("snippet_id" = String, Path, description = "Snippet id")),
    responses(
        (status = 200, description = "All relationships deleted", body = JsonValue),
        (status = 404, description = "Snippet has no grants", body = JsonValue)
    ),
    tag = "permissions"
)]
#[instrument(name = "http.delete_all_relations", skip_all, fields(snippet_id = %snippet_id))]
pub async fn delete_all_relations(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(snippet_id): Path<String>,
) -> ApiResponse<String> {
    app_state
        .service
        .delete_all_relations(&snippet_id)
        .await
        .into()
}

/// Create the permissions router
pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_snippets))
        .routes(routes!(save_relation))
        .routes(routes!(get_grants))
        .routes(routes!(share_snippet))
        .routes(routes!(list_users))
        .routes(routes!(has_access))
        .routes(routes!(can_edit))
        .routes(routes!(get_author))
        .routes(routes!(delete_relation))
        .routes(routes!(delete_all_relations))
}
