//! Permission business rules
//!
//! [`PermissionService`] decides who may read, edit or share a snippet. Every
//! operation answers with a [`Response`]; storage and directory failures are
//! logged and reported as 500s instead of being propagated.

use crate::{
    DirectoryUser, Error, GrantType, GrantTypeFilter, PermissionStore, Response, ShareSnippet,
    SnippetGrant, SnippetPermission, UserDirectory, UserInfo,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub const RELATIONSHIP_SAVED: &str = "Relationship saved";
pub const RELATIONSHIP_DELETED: &str = "Relationship deleted";
pub const ALL_RELATIONSHIPS_DELETED: &str = "All relationships deleted";
pub const SNIPPET_SHARED: &str = "Snippet shared";

/// Grants and checks snippet permissions
#[derive(Clone)]
pub struct PermissionService {
    store: Arc<dyn PermissionStore>,
    directory: Arc<dyn UserDirectory>,
}

impl PermissionService {
    pub fn new(store: Arc<dyn PermissionStore>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { store, directory }
    }

    pub fn store(&self) -> &Arc<dyn PermissionStore> {
        &self.store
    }

    /// Whether the user holds any grant on the snippet
    #[instrument(name = "permissions.has_access", skip(self))]
    pub async fn has_access(&self, snippet_id: &str, user_id: &str) -> Response<bool> {
        match self.store.find_by_snippet_and_user(snippet_id, user_id).await {
            Ok(Some(_)) => Response::ok(true),
            Ok(None) => Response::not_found(format!(
                "User {user_id} has no access to snippet {snippet_id}"
            )),
            Err(e) => storage_failure(e),
        }
    }

    /// Whether the user holds an OWNER or WRITE grant on the snippet
    #[instrument(name = "permissions.can_edit", skip(self))]
    pub async fn can_edit(&self, snippet_id: &str, user_id: &str) -> Response<bool> {
        match self.store.find_by_snippet_and_user(snippet_id, user_id).await {
            Ok(Some(permission)) if permission.grant_type.can_edit() => Response::ok(true),
            Ok(_) => Response::not_found(format!(
                "User {user_id} cannot edit snippet {snippet_id}"
            )),
            Err(e) => storage_failure(e),
        }
    }

    /// Create a grant; an existing grant for the pair is rejected, never replaced
    #[instrument(name = "permissions.save_relation", skip(self))]
    pub async fn save_relation(
        &self,
        snippet_id: &str,
        user_id: &str,
        grant_type: GrantType,
    ) -> Response<String> {
        match self.store.find_by_snippet_and_user(snippet_id, user_id).await {
            Ok(Some(_)) => {
                return Response::conflict(format!(
                    "Relationship between snippet {snippet_id} and user {user_id} already exists"
                ));
            }
            Ok(None) => {}
            Err(e) => return storage_failure(e),
        }

        if grant_type == GrantType::Owner {
            match self
                .store
                .find_by_snippet_and_grant_type(snippet_id, GrantType::Owner)
                .await
            {
                Ok(Some(_)) => {
                    return Response::conflict(format!(
                        "Snippet {snippet_id} already has an owner"
                    ));
                }
                Ok(None) => {}
                Err(e) => return storage_failure(e),
            }
        }

        let permission = SnippetPermission::new(snippet_id, user_id, grant_type);
        match self.store.save(&permission).await {
            Ok(()) => {
                info!(permission_id = %permission.id, "Grant created");
                Response::ok(RELATIONSHIP_SAVED.to_string())
            }
            Err(e @ Error::DuplicateGrant { .. }) => {
                warn!("Lost race creating grant: {}", e);
                Response::conflict(e.to_string())
            }
            Err(e) => storage_failure(e),
        }
    }

    /// Username of the snippet's owner
    #[instrument(name = "permissions.get_snippet_author", skip(self))]
    pub async fn get_snippet_author(&self, snippet_id: &str) -> Response<String> {
        let owner = match self
            .store
            .find_by_snippet_and_grant_type(snippet_id, GrantType::Owner)
            .await
        {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                return Response::not_found(format!("Snippet {snippet_id} has no owner"));
            }
            Err(e) => return storage_failure(e),
        };

        match self.directory.username_for(&owner.user_id).await {
            Ok(username) => Response::ok(username),
            Err(e) => directory_failure(e),
        }
    }

    /// The user's grants, optionally restricted to one grant type
    #[instrument(name = "permissions.get_snippet_grants", skip(self))]
    pub async fn get_snippet_grants(
        &self,
        user_id: &str,
        filter: GrantTypeFilter,
    ) -> Response<Vec<SnippetGrant>> {
        let permissions = match filter {
            GrantTypeFilter::All => self.store.find_all_by_user(user_id).await,
            GrantTypeFilter::Only(grant_type) => {
                self.store
                    .find_all_by_user_and_grant_type(user_id, grant_type)
                    .await
            }
        };

        match permissions {
            Ok(permissions) => {
                Response::ok(permissions.into_iter().map(SnippetGrant::from).collect())
            }
            Err(e) => storage_failure(e),
        }
    }

    /// Distinct snippet ids the user holds any grant on
    #[instrument(name = "permissions.get_all_snippets_by_user", skip(self))]
    pub async fn get_all_snippets_by_user(&self, user_id: &str) -> Response<Vec<String>> {
        match self.store.find_all_by_user(user_id).await {
            Ok(permissions) => {
                let mut snippet_ids: Vec<String> = Vec::with_capacity(permissions.len());
                for permission in permissions {
                    if !snippet_ids.contains(&permission.snippet_id) {
                        snippet_ids.push(permission.snippet_id);
                    }
                }
                Response::ok(snippet_ids)
            }
            Err(e) => storage_failure(e),
        }
    }

    #[instrument(name = "permissions.delete_relation", skip(self))]
    pub async fn delete_relation(&self, snippet_id: &str, user_id: &str) -> Response<String> {
        let permission = match self.store.find_by_snippet_and_user(snippet_id, user_id).await {
            Ok(Some(permission)) => permission,
            Ok(None) => {
                return Response::not_found(format!(
                    "No relationship between snippet {snippet_id} and user {user_id}"
                ));
            }
            Err(e) => return storage_failure(e),
        };

        match self.store.delete(&permission).await {
            Ok(()) => Response::ok(RELATIONSHIP_DELETED.to_string()),
            Err(e) => storage_failure(e),
        }
    }

    #[instrument(name = "permissions.delete_all_relations", skip(self))]
    pub async fn delete_all_relations(&self, snippet_id: &str) -> Response<String> {
        let permissions = match self.store.find_all_by_snippet(snippet_id).await {
            Ok(permissions) if permissions.is_empty() => {
                return Response::not_found(format!(
                    "No relationships found for snippet {snippet_id}"
                ));
            }
            Ok(permissions) => permissions,
            Err(e) => return storage_failure(e),
        };

        match self.store.delete_all(&permissions).await {
            Ok(()) => {
                info!(count = permissions.len(), "Deleted all grants of snippet");
                Response::ok(ALL_RELATIONSHIPS_DELETED.to_string())
            }
            Err(e) => storage_failure(e),
        }
    }

    /// Give the user named in `share` a WRITE grant on the snippet
    ///
    /// The acting user needs edit rights. Sharing with someone who already
    /// holds a grant answers 404, not 409.
    #[instrument(
        name = "permissions.save_share_relation",
        skip(self, share),
        fields(snippet_id = %share.snippet_id, username = %share.username)
    )]
    pub async fn save_share_relation(
        &self,
        share: &ShareSnippet,
        acting_user_id: &str,
    ) -> Response<String> {
        let target = match self.directory.all_users().await {
            Ok(Some(users)) => users.into_iter().find(|user| user.username == share.username),
            Ok(None) => None,
            Err(e) => return directory_failure(e),
        };
        let Some(target) = target else {
            return Response::not_found(format!("User {} not found", share.username));
        };

        match self.can_edit(&share.snippet_id, acting_user_id).await {
            Response::Success(_) => {}
            Response::Failure(e) if e.is_not_found() => {
                return Response::not_found(format!(
                    "User {acting_user_id} cannot share snippet {}",
                    share.snippet_id
                ));
            }
            Response::Failure(e) => return Response::Failure(e),
        }

        let already_shared = match self
            .store
            .find_by_snippet_and_user(&share.snippet_id, &target.id)
            .await
        {
            Ok(existing) => existing.is_some(),
            Err(e) => return storage_failure(e),
        };
        if already_shared {
            return Response::not_found(format!(
                "Snippet {} is already shared with {}",
                share.snippet_id, share.username
            ));
        }

        let permission = SnippetPermission::new(&share.snippet_id, &target.id, GrantType::Write);
        match self.store.save(&permission).await {
            Ok(()) => {
                info!(target_user_id = %target.id, "Snippet shared");
                Response::ok(SNIPPET_SHARED.to_string())
            }
            Err(e @ Error::DuplicateGrant { .. }) => Response::not_found(e.to_string()),
            Err(e) => storage_failure(e),
        }
    }

    /// Page through the directory's users, filtered by username or email
    #[instrument(name = "permissions.get_users_paginated", skip(self))]
    pub async fn get_users_paginated(
        &self,
        limit: usize,
        offset: usize,
        search: &str,
    ) -> Response<Vec<UserInfo>> {
        let users = match self.directory.all_users().await {
            Ok(Some(users)) => users,
            Ok(None) => return Response::not_found("Users not found"),
            Err(e) => return directory_failure(e),
        };

        let needle = search.to_lowercase();
        let page: Vec<UserInfo> = users
            .into_iter()
            .filter(|user| matches_search(user, &needle))
            .skip(offset)
            .take(limit)
            .map(UserInfo::from)
            .collect();

        debug!(returned = page.len(), "Users page built");
        Response::ok(page)
    }
}

fn matches_search(user: &DirectoryUser, needle: &str) -> bool {
    needle.is_empty()
        || user.username.to_lowercase().contains(needle)
        || user.email.to_lowercase().contains(needle)
}

fn storage_failure<T>(err: Error) -> Response<T> {
    error!("Permission store failure: {}", err);
    Response::internal(err.to_string())
}

fn directory_failure<T>(err: Error) -> Response<T> {
    error!("User directory failure: {}", err);
    Response::internal(err.to_string())
}
