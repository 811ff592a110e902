use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Access level a user holds on a snippet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum GrantType {
    Owner,
    Read,
    Write,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::Owner => "OWNER",
            GrantType::Read => "READ",
            GrantType::Write => "WRITE",
        }
    }

    /// OWNER and WRITE both allow editing the snippet
    pub fn can_edit(&self) -> bool {
        matches!(self, GrantType::Owner | GrantType::Write)
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OWNER" => Ok(GrantType::Owner),
            "READ" => Ok(GrantType::Read),
            "WRITE" => Ok(GrantType::Write),
            _ => Err(Error::InvalidGrantType(s.to_string())),
        }
    }
}

/// Grant type filter used when listing a user's grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrantTypeFilter {
    #[default]
    All,
    Only(GrantType),
}

impl GrantTypeFilter {
    pub fn matches(&self, grant_type: GrantType) -> bool {
        match self {
            GrantTypeFilter::All => true,
            GrantTypeFilter::Only(wanted) => *wanted == grant_type,
        }
    }
}

impl FromStr for GrantTypeFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ALL") {
            Ok(GrantTypeFilter::All)
        } else {
            s.parse().map(GrantTypeFilter::Only)
        }
    }
}

impl fmt::Display for GrantTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantTypeFilter::All => f.write_str("ALL"),
            GrantTypeFilter::Only(grant_type) => grant_type.fmt(f),
        }
    }
}

/// A single grant row: one user, one snippet, one access level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnippetPermission {
    pub id: String,
    pub snippet_id: String,
    pub user_id: String,
    pub grant_type: GrantType,
    pub created_at: DateTime<Utc>,
}

impl SnippetPermission {
    pub fn new(
        snippet_id: impl Into<String>,
        user_id: impl Into<String>,
        grant_type: GrantType,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            snippet_id: snippet_id.into(),
            user_id: user_id.into(),
            grant_type,
            created_at: Utc::now(),
        }
    }
}

/// Projection of a grant as seen by its holder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnippetGrant {
    pub snippet_id: String,
    pub grant_type: GrantType,
}

impl From<SnippetPermission> for SnippetGrant {
    fn from(permission: SnippetPermission) -> Self {
        SnippetGrant {
            snippet_id: permission.snippet_id,
            grant_type: permission.grant_type,
        }
    }
}

/// Request to share a snippet with another user, addressed by username
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShareSnippet {
    pub snippet_id: String,
    pub username: String,
}

/// User record as reported by the user directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectoryUser {
    pub id: String,
    pub email: String,
    pub username: String,
}

/// Entry of a paginated user listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<DirectoryUser> for UserInfo {
    fn from(user: DirectoryUser) -> Self {
        UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}
