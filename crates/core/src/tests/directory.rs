//! In-memory user directory for tests

use crate::{DirectoryUser, Error, Result, UserDirectory};
use async_trait::async_trait;

/// What a [`StaticDirectory`] answers when asked for its users
#[derive(Debug, Clone)]
pub enum DirectoryBehavior {
    Users(Vec<DirectoryUser>),
    /// The directory answers without a user list
    Absent,
    /// Every call fails
    Failing(String),
}

/// User directory backed by a fixed answer
#[derive(Debug, Clone)]
pub struct StaticDirectory {
    behavior: DirectoryBehavior,
}

impl StaticDirectory {
    pub fn new(behavior: DirectoryBehavior) -> Self {
        Self { behavior }
    }

    pub fn with_users(users: Vec<DirectoryUser>) -> Self {
        Self::new(DirectoryBehavior::Users(users))
    }

    pub fn empty() -> Self {
        Self::with_users(Vec::new())
    }

    pub fn absent() -> Self {
        Self::new(DirectoryBehavior::Absent)
    }

    pub fn failing() -> Self {
        Self::new(DirectoryBehavior::Failing(
            "user directory unavailable".to_string(),
        ))
    }
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn username_for(&self, user_id: &str) -> Result<String> {
        match &self.behavior {
            DirectoryBehavior::Users(users) => users
                .iter()
                .find(|user| user.id == user_id)
                .map(|user| user.username.clone())
                .ok_or_else(|| Error::UserNotFound(user_id.to_string())),
            DirectoryBehavior::Absent => Err(Error::UserNotFound(user_id.to_string())),
            DirectoryBehavior::Failing(reason) => Err(Error::Directory(reason.clone())),
        }
    }

    async fn all_users(&self) -> Result<Option<Vec<DirectoryUser>>> {
        match &self.behavior {
            DirectoryBehavior::Users(users) => Ok(Some(users.clone())),
            DirectoryBehavior::Absent => Ok(None),
            DirectoryBehavior::Failing(reason) => Err(Error::Directory(reason.clone())),
        }
    }
}
