use crate::{DirectoryUser, Result};
use async_trait::async_trait;

/// External user directory resolving user ids and usernames
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Username of the user with the given id
    async fn username_for(&self, user_id: &str) -> Result<String>;

    /// Every user known to the directory
    ///
    /// `Ok(None)` means the directory answered without a list, which callers
    /// treat differently from an empty one.
    async fn all_users(&self) -> Result<Option<Vec<DirectoryUser>>>;
}
