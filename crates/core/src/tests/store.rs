//! Test harness for PermissionStore implementations
//!
//! This module provides a test suite that can be used to verify any
//! implementation of the PermissionStore trait. Every run uses fresh random
//! ids, so the suite can share a database with other tests.

use crate::{Error, GrantType, PermissionStore, Result, SnippetPermission};

/// Test suite for PermissionStore implementations
pub struct PermissionStoreTestSuite<S: PermissionStore> {
    store: S,
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

impl<S: PermissionStore> PermissionStoreTestSuite<S> {
    /// Create a new test suite with the given store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run all tests
    pub async fn run_all_tests(&self) -> Result<()> {
        self.test_save_and_find().await?;
        self.test_uniqueness().await?;
        self.test_single_owner().await?;
        self.test_user_listings().await?;
        self.test_snippet_listings().await?;
        self.test_delete().await?;
        self.test_delete_all().await?;
        Ok(())
    }

    /// A saved row can be read back by its pair
    pub async fn test_save_and_find(&self) -> Result<()> {
        let permission = SnippetPermission::new(unique("snippet"), unique("user"), GrantType::Write);
        self.store.save(&permission).await?;

        let found = self
            .store
            .find_by_snippet_and_user(&permission.snippet_id, &permission.user_id)
            .await?;
        let found = found.expect("Row should exist after save");
        assert_eq!(found.id, permission.id);
        assert_eq!(found.grant_type, GrantType::Write);
        assert_eq!(found.created_at.timestamp(), permission.created_at.timestamp());

        let missing = self
            .store
            .find_by_snippet_and_user(&permission.snippet_id, "someone-else")
            .await?;
        assert!(missing.is_none());

        Ok(())
    }

    /// A second row for the same pair is refused
    pub async fn test_uniqueness(&self) -> Result<()> {
        let snippet_id = unique("snippet");
        let user_id = unique("user");
        self.store
            .save(&SnippetPermission::new(&snippet_id, &user_id, GrantType::Read))
            .await?;

        let result = self
            .store
            .save(&SnippetPermission::new(&snippet_id, &user_id, GrantType::Write))
            .await;
        assert!(
            matches!(result, Err(Error::DuplicateGrant { .. })),
            "Duplicate pair should be rejected"
        );

        let rows = self.store.find_all_by_snippet(&snippet_id).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].grant_type, GrantType::Read);

        Ok(())
    }

    /// A snippet keeps at most one OWNER row
    pub async fn test_single_owner(&self) -> Result<()> {
        let snippet_id = unique("snippet");
        let owner = SnippetPermission::new(&snippet_id, unique("user"), GrantType::Owner);
        self.store.save(&owner).await?;

        let result = self
            .store
            .save(&SnippetPermission::new(&snippet_id, unique("user"), GrantType::Owner))
            .await;
        assert!(matches!(result, Err(Error::DuplicateGrant { .. })));

        let found = self
            .store
            .find_by_snippet_and_grant_type(&snippet_id, GrantType::Owner)
            .await?;
        assert_eq!(found.map(|row| row.user_id), Some(owner.user_id));

        let none = self
            .store
            .find_by_snippet_and_grant_type(&snippet_id, GrantType::Read)
            .await?;
        assert!(none.is_none());

        Ok(())
    }

    /// Listing by user, with and without a grant type
    pub async fn test_user_listings(&self) -> Result<()> {
        let user_id = unique("user");
        let snippets: Vec<String> = (0..3).map(|_| unique("snippet")).collect();
        self.store
            .save(&SnippetPermission::new(&snippets[0], &user_id, GrantType::Owner))
            .await?;
        self.store
            .save(&SnippetPermission::new(&snippets[1], &user_id, GrantType::Read))
            .await?;
        self.store
            .save(&SnippetPermission::new(&snippets[2], &user_id, GrantType::Read))
            .await?;

        let all = self.store.find_all_by_user(&user_id).await?;
        let ids: Vec<&str> = all.iter().map(|row| row.snippet_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![snippets[0].as_str(), snippets[1].as_str(), snippets[2].as_str()]
        );

        let reads = self
            .store
            .find_all_by_user_and_grant_type(&user_id, GrantType::Read)
            .await?;
        assert_eq!(reads.len(), 2);
        assert!(reads.iter().all(|row| row.grant_type == GrantType::Read));

        let writes = self
            .store
            .find_all_by_user_and_grant_type(&user_id, GrantType::Write)
            .await?;
        assert!(writes.is_empty());

        assert!(self.store.find_all_by_user(&unique("user")).await?.is_empty());

        Ok(())
    }

    /// Listing by snippet
    pub async fn test_snippet_listings(&self) -> Result<()> {
        let snippet_id = unique("snippet");
        for grant_type in [GrantType::Owner, GrantType::Write, GrantType::Read] {
            self.store
                .save(&SnippetPermission::new(&snippet_id, unique("user"), grant_type))
                .await?;
        }

        let rows = self.store.find_all_by_snippet(&snippet_id).await?;
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.snippet_id == snippet_id));

        assert!(
            self.store
                .find_all_by_snippet(&unique("snippet"))
                .await?
                .is_empty()
        );

        Ok(())
    }

    /// Deleting one row leaves the others in place
    pub async fn test_delete(&self) -> Result<()> {
        let snippet_id = unique("snippet");
        let doomed = SnippetPermission::new(&snippet_id, unique("user"), GrantType::Read);
        let kept = SnippetPermission::new(&snippet_id, unique("user"), GrantType::Write);
        self.store.save(&doomed).await?;
        self.store.save(&kept).await?;

        self.store.delete(&doomed).await?;

        let gone = self
            .store
            .find_by_snippet_and_user(&snippet_id, &doomed.user_id)
            .await?;
        assert!(gone.is_none(), "Row should be gone after delete");

        let rows = self.store.find_all_by_snippet(&snippet_id).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, kept.id);

        // The pair is free again
        self.store
            .save(&SnippetPermission::new(&snippet_id, &doomed.user_id, GrantType::Write))
            .await?;

        Ok(())
    }

    /// Bulk deletion removes every given row
    pub async fn test_delete_all(&self) -> Result<()> {
        let snippet_id = unique("snippet");
        let other_snippet = unique("snippet");
        for _ in 0..3 {
            self.store
                .save(&SnippetPermission::new(&snippet_id, unique("user"), GrantType::Read))
                .await?;
        }
        self.store
            .save(&SnippetPermission::new(&other_snippet, unique("user"), GrantType::Read))
            .await?;

        let rows = self.store.find_all_by_snippet(&snippet_id).await?;
        self.store.delete_all(&rows).await?;

        assert!(self.store.find_all_by_snippet(&snippet_id).await?.is_empty());
        assert_eq!(self.store.find_all_by_snippet(&other_snippet).await?.len(), 1);

        // Empty input is a no-op
        self.store.delete_all(&[]).await?;

        Ok(())
    }
}
