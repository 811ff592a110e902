//! In-memory permission store

use crate::{Error, GrantType, PermissionStore, Result, SnippetPermission};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory implementation of PermissionStore for integration testing
///
/// Rows are kept in insertion order and the uniqueness checks run under the
/// same lock as the insert, so it behaves like a real backend.
///
/// For unit tests that need to verify specific calls and mock errors,
/// use the mockall-based MockPermissionStore instead.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    rows: Arc<Mutex<Vec<SnippetPermission>>>,
}

impl InMemoryStore {
    fn rows(&self) -> Result<MutexGuard<'_, Vec<SnippetPermission>>> {
        self.rows
            .lock()
            .map_err(|e| Error::StateError(format!("Store lock poisoned: {e}")))
    }

    fn select<F>(&self, predicate: F) -> Result<Vec<SnippetPermission>>
    where
        F: Fn(&SnippetPermission) -> bool,
    {
        Ok(self
            .rows()?
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect())
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.rows().map(|rows| rows.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PermissionStore for InMemoryStore {
    async fn find_by_snippet_and_user(
        &self,
        snippet_id: &str,
        user_id: &str,
    ) -> Result<Option<SnippetPermission>> {
        Ok(self
            .select(|row| row.snippet_id == snippet_id && row.user_id == user_id)?
            .into_iter()
            .next())
    }

    async fn find_all_by_user(&self, user_id: &str) -> Result<Vec<SnippetPermission>> {
        self.select(|row| row.user_id == user_id)
    }

    async fn find_all_by_user_and_grant_type(
        &self,
        user_id: &str,
        grant_type: GrantType,
    ) -> Result<Vec<SnippetPermission>> {
        self.select(|row| row.user_id == user_id && row.grant_type == grant_type)
    }

    async fn find_all_by_snippet(&self, snippet_id: &str) -> Result<Vec<SnippetPermission>> {
        self.select(|row| row.snippet_id == snippet_id)
    }

    async fn find_by_snippet_and_grant_type(
        &self,
        snippet_id: &str,
        grant_type: GrantType,
    ) -> Result<Option<SnippetPermission>> {
        Ok(self
            .select(|row| row.snippet_id == snippet_id && row.grant_type == grant_type)?
            .into_iter()
            .next())
    }

    async fn save(&self, permission: &SnippetPermission) -> Result<()> {
        let mut rows = self.rows()?;

        let duplicate = rows.iter().any(|row| {
            (row.snippet_id == permission.snippet_id && row.user_id == permission.user_id)
                || (permission.grant_type == GrantType::Owner
                    && row.snippet_id == permission.snippet_id
                    && row.grant_type == GrantType::Owner)
        });
        if duplicate {
            return Err(Error::DuplicateGrant {
                snippet_id: permission.snippet_id.clone(),
                user_id: permission.user_id.clone(),
            });
        }

        rows.push(permission.clone());
        Ok(())
    }

    async fn delete(&self, permission: &SnippetPermission) -> Result<()> {
        self.rows()?.retain(|row| row.id != permission.id);
        Ok(())
    }

    async fn delete_all(&self, permissions: &[SnippetPermission]) -> Result<()> {
        let mut rows = self.rows()?;
        rows.retain(|row| !permissions.iter().any(|doomed| doomed.id == row.id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::store::PermissionStoreTestSuite;

    #[tokio::test]
    async fn test_in_memory_compliance() {
        let store = InMemoryStore::default();
        let suite = PermissionStoreTestSuite::new(store);
        suite
            .run_all_tests()
            .await
            .expect("InMemoryStore should pass all tests");
    }

    #[tokio::test]
    async fn test_clones_share_rows() {
        let store = InMemoryStore::default();
        let clone = store.clone();

        clone
            .save(&SnippetPermission::new("s1", "u1", GrantType::Read))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
    }
}
