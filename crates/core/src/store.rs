use crate::{GrantType, Result, SnippetPermission};
use async_trait::async_trait;

/// Persistence for snippet grants
///
/// Implementations hold no business rules. A row is unique per
/// `(snippet_id, user_id)`; `save` reports a violation as
/// [`Error::DuplicateGrant`](crate::Error::DuplicateGrant). Listings come back
/// in insertion order.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    async fn find_by_snippet_and_user(
        &self,
        snippet_id: &str,
        user_id: &str,
    ) -> Result<Option<SnippetPermission>>;

    async fn find_all_by_user(&self, user_id: &str) -> Result<Vec<SnippetPermission>>;

    async fn find_all_by_user_and_grant_type(
        &self,
        user_id: &str,
        grant_type: GrantType,
    ) -> Result<Vec<SnippetPermission>>;

    async fn find_all_by_snippet(&self, snippet_id: &str) -> Result<Vec<SnippetPermission>>;

    async fn find_by_snippet_and_grant_type(
        &self,
        snippet_id: &str,
        grant_type: GrantType,
    ) -> Result<Option<SnippetPermission>>;

    async fn save(&self, permission: &SnippetPermission) -> Result<()>;

    async fn delete(&self, permission: &SnippetPermission) -> Result<()>;

    /// Remove every given row, all or nothing
    async fn delete_all(&self, permissions: &[SnippetPermission]) -> Result<()>;
}
