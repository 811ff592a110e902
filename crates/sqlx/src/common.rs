//! Common types and utilities shared between database implementations

use chrono::{DateTime, Utc};
use grants_core::{Error, GrantType, Result, SnippetPermission};
use sqlx::FromRow;

// Helper functions for timestamp conversion
pub fn datetime_to_string(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub fn string_to_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::StateError(format!("Invalid timestamp format: {e}")))
}

#[derive(FromRow)]
pub struct SnippetPermissionRow {
    pub id: String,
    pub snippet_id: String,
    pub user_id: String,
    pub grant_type: String, // OWNER, READ or WRITE
    pub created_at: String, // ISO8601 format
}

impl TryFrom<SnippetPermissionRow> for SnippetPermission {
    type Error = Error;

    fn try_from(row: SnippetPermissionRow) -> Result<Self> {
        Ok(SnippetPermission {
            grant_type: row.grant_type.parse::<GrantType>()?,
            created_at: string_to_datetime(&row.created_at)?,
            id: row.id,
            snippet_id: row.snippet_id,
            user_id: row.user_id,
        })
    }
}

pub fn rows_to_permissions(rows: Vec<SnippetPermissionRow>) -> Result<Vec<SnippetPermission>> {
    rows.into_iter().map(SnippetPermission::try_from).collect()
}

pub fn row_to_permission(row: Option<SnippetPermissionRow>) -> Result<Option<SnippetPermission>> {
    row.map(SnippetPermission::try_from).transpose()
}

pub fn duplicate_grant(permission: &SnippetPermission) -> Error {
    Error::DuplicateGrant {
        snippet_id: permission.snippet_id.clone(),
        user_id: permission.user_id.clone(),
    }
}

/// Map an insert failure, reporting constraint violations as duplicates
pub fn save_error(e: sqlx::Error, permission: &SnippetPermission) -> Error {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => duplicate_grant(permission),
        _ => Error::StateError(format!("Failed to save permission: {e}")),
    }
}

pub fn query_error(context: &str, e: sqlx::Error) -> Error {
    Error::StateError(format!("{context}: {e}"))
}
