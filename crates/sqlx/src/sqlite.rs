use crate::common::{
    SnippetPermissionRow, datetime_to_string, duplicate_grant, query_error, row_to_permission,
    rows_to_permissions, save_error,
};
use async_trait::async_trait;
use grants_core::{Error, GrantType, PermissionStore, Result, SnippetPermission};
use sqlx::{Pool, Sqlite};
use tracing::{debug, instrument};

pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Connect, creating the database file if needed, and apply migrations
    ///
    /// In-memory databases live only as long as their connection, so they are
    /// always served by a single pooled connection that is never recycled.
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| Error::StateError(format!("Invalid database URL: {e}")))?
            .create_if_missing(true);

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| Error::StateError(format!("Failed to connect to database: {e}")))?;

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .map_err(|e| Error::StateError(format!("Failed to run migrations: {e}")))?;

        debug!(in_memory, "SQLite permission store ready");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl PermissionStore for SqliteStore {
    #[instrument(name = "db.find_by_snippet_and_user", skip(self))]
    async fn find_by_snippet_and_user(
        &self,
        snippet_id: &str,
        user_id: &str,
    ) -> Result<Option<SnippetPermission>> {
        let row = sqlx::query_as::<_, SnippetPermissionRow>(
            "SELECT id, snippet_id, user_id, grant_type, created_at
             FROM snippet_permissions WHERE snippet_id = ?1 AND user_id = ?2",
        )
        .bind(snippet_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("Failed to get permission", e))?;

        row_to_permission(row)
    }

    #[instrument(name = "db.find_all_by_user", skip(self))]
    async fn find_all_by_user(&self, user_id: &str) -> Result<Vec<SnippetPermission>> {
        let rows = sqlx::query_as::<_, SnippetPermissionRow>(
            "SELECT id, snippet_id, user_id, grant_type, created_at
             FROM snippet_permissions WHERE user_id = ?1 ORDER BY seq",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("Failed to list user permissions", e))?;

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
             FROM snippet_permissions WHERE user_id = ?1 AND grant_type = ?2 ORDER BY seq",
        )
        .bind(user_id)
        .bind(grant_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("Failed to list user permissions", e))?;

        rows_to_permissions(rows)
    }

    #[instrument(name = "db.find_all_by_snippet", skip(self))]
    async fn find_all_by_snippet(&self, snippet_id: &str) -> Result<Vec<SnippetPermission>> {
        let rows = sqlx::query_as::<_, SnippetPermissionRow>(
            "SELECT id, snippet_id, user_id, grant_type, created_at
             FROM snippet_permissions WHERE snippet_id = ?1 ORDER BY seq",
        )
        .bind(snippet_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("Failed to list snippet permissions", e))?;

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
             FROM snippet_permissions WHERE snippet_id = ?1 AND grant_type = ?2
             ORDER BY seq LIMIT 1",
        )
        .bind(snippet_id)
        .bind(grant_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("Failed to get permission", e))?;

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
             WHERE snippet_id = ?1 AND (user_id = ?2 OR (?3 = 'OWNER' AND grant_type = 'OWNER'))
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
             VALUES (?1, ?2, ?3, ?4, ?5)",
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
        sqlx::query("DELETE FROM snippet_permissions WHERE id = ?1")
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

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_error("Failed to begin transaction", e))?;

        for permission in permissions {
            sqlx::query("DELETE FROM snippet_permissions WHERE id = ?1")
                .bind(&permission.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| query_error("Failed to delete permission", e))?;
        }

        // Dropping the transaction on an early return rolls it back
        tx.commit()
            .await
            .map_err(|e| query_error("Failed to commit deletion", e))?;

        Ok(())
    }
}
