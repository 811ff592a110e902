//! PostgreSQL-specific implementation

use crate::common::{
    SnippetPermissionRow, datetime_to_string, duplicate_grant, query_error, row_to_permission,
    rows_to_permissions, save_error,
};
use async_trait::async_trait;
use grants_core::{Error, GrantType, PermissionStore, Result, SnippetPermission};
use sqlx::{Pool, Postgres};
use tracing::{debug, instrument};

/// PostgreSQL implementation of PermissionStore
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    /// Connect and apply migrations
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(database_url)
            .await
            .map_err(|e| Error::StateError(format!("Failed to connect to database: {e}")))?;

        sqlx::migrate!("./migrations/postgres")
            .run(&pool)
            .await
            .map_err(|e| Error::StateError(format!("Failed to run migrations: {e}")))?;

        debug!("PostgreSQL permission store ready");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get the underlying pool (for running migrations externally)
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl PermissionStore for PostgresStore {
    #[instrument(name = "db.find_by_snippet_and_user", skip(self))]
    async fn find_by_snippet_and_user(
        &self,
        snippet_id: &str,
        user_id: &str,
    ) -> Result<Option<SnippetPermission>> {
        let row = sqlx::query_as::<_, SnippetPermissionRow>(
            "SELECT id, snippet_id, user_id, grant_type, created_at
             FROM snippet_permissions WHERE snippet_id = $1 AND user_id = $2",
        )
        .bind(snippet_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("Database error", e))?;

        row_to_permission(row)
    }

    #[instrument(name = "db.find_all_by_user", skip(self))]
    async fn find_all_by_user(&self, user_id: &str) -> Result<Vec<SnippetPermission>> {
        let rows = sqlx::query_as::<_, SnippetPermissionRow>(
            "SELECT id, snippet_id, user_id, grant_type, created_at
             FROM snippet_permissions WHERE user_id = $1 ORDER BY seq",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("Database error", e))?;

        rows_to_permissions(rows)
    }

    #[instrument(name = "db.find_all_by_user_and_grant_type", skip(self))]
    async fn find_all_by_user_and_grant_type(
        &self,
        user_id: &str,
        grant_type: GrantType,
    ) -> Result<Vec<SnippetPermission>> {
        let rows = sqlx::query_as::<_, SnippetPermissionRow>(
            "SELECT id, snippet_id, user_id, grant_type, created_at
             FROM snippet_permissions WHERE user_id = $1 AND grant_type = $2 ORDER BY seq",
        )
        .bind(user_id)
        .bind(grant_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("Database error", e))?;

        rows_to_permissions(rows)
    }

    #[instrument(name = "db.find_all_by_snippet", skip(self))]
    async fn find_all_by_snippet(&self, snippet_id: &str) -> Result<Vec<SnippetPermission>> {
        let rows = sqlx::query_as::<_, SnippetPermissionRow>(
            "SELECT id, snippet_id, user_id, grant_type, created_at
             FROM snippet_permissions WHERE snippet_id = $1 ORDER BY seq",
        )
        .bind(snippet_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("Database error", e))?;

        rows_to_permissions(rows)
    }

    #[instrument(name = "db.find_by_snippet_and_grant_type", skip(self))]
    async fn find_by_snippet_and_grant_type(
        &self,
        snippet_id: &str,
        grant_type: GrantType,
    ) -> Result<Option<SnippetPermission>> {
        let row = sqlx::query_as::<_, SnippetPermissionRow>(
            "SELECT id, snippet_id, user_id, grant_type, created_at
             FROM snippet_permissions WHERE snippet_id = $1 AND grant_type = $2
             ORDER BY seq LIMIT 1",
        )
        .bind(snippet_id)
        .bind(grant_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("Database error", e))?;

        row_to_permission(row)
    }

    #[instrument(
        name = "db.save",
        skip(self, permission),
        fields(snippet_id = %permission.snippet_id, user_id = %permission.user_id)
    )]
    async fn save(&self, permission: &SnippetPermission) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_error("Failed to begin transaction", e))?;

        let conflict: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM snippet_permissions
             WHERE snippet_id = $1 AND (user_id = $2 OR ($3 = 'OWNER' AND grant_type = 'OWNER'))
             LIMIT 1",
        )
        .bind(&permission.snippet_id)
        .bind(&permission.user_id)
        .bind(permission.grant_type.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| query_error("Failed to check existing grants", e))?;
        if conflict.is_some() {
            return Err(duplicate_grant(permission));
        }

        // The unique indexes still settle inserts racing past the check
        sqlx::query(
            "INSERT INTO snippet_permissions (id, snippet_id, user_id, grant_type, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&permission.id)
        .bind(&permission.snippet_id)
        .bind(&permission.user_id)
        .bind(permission.grant_type.as_str())
        .bind(datetime_to_string(permission.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| save_error(e, permission))?;

        tx.commit()
            .await
            .map_err(|e| query_error("Failed to commit permission", e))?;

        Ok(())
    }

    #[instrument(name = "db.delete", skip(self, permission), fields(permission_id = %permission.id))]
    async fn delete(&self, permission: &SnippetPermission) -> Result<()> {
        sqlx::query("DELETE FROM snippet_permissions WHERE id = $1")
            .bind(&permission.id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("Failed to delete permission", e))?;

        Ok(())
    }

    #[instrument(name = "db.delete_all", skip(self, permissions), fields(count = permissions.len()))]
    async fn delete_all(&self, permissions: &[SnippetPermission]) -> Result<()> {
        if permissions.is_empty() {
            return Ok(());
        }

        let ids: Vec<String> = permissions.iter().map(|p| p.id.clone()).collect();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_error("Failed to begin transaction", e))?;

        sqlx::query("DELETE FROM snippet_permissions WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| query_error("Failed to delete permissions", e))?;

        tx.commit()
            .await
            .map_err(|e| query_error("Failed to commit deletion", e))?;

        Ok(())
    }
}
