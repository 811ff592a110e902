//! Grants core types and permission logic

pub mod directory;
pub mod error;
pub mod response;
pub mod service;
pub mod store;
pub mod tracing;
pub mod types;

#[cfg(any(test, feature = "tests"))]
pub mod tests;

pub use directory::UserDirectory;
pub use error::{Error, Result};
pub use response::{Response, ResponseError};
pub use service::PermissionService;
pub use store::PermissionStore;
pub use types::{
    DirectoryUser, GrantType, GrantTypeFilter, ShareSnippet, SnippetGrant, SnippetPermission,
    UserInfo,
};
