use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Grant already exists for snippet {snippet_id} and user {user_id}")]
    DuplicateGrant { snippet_id: String, user_id: String },

    #[error("Invalid grant type: {0}")]
    InvalidGrantType(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User directory error: {0}")]
    Directory(String),

    #[error("State backend error: {0}")]
    StateError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
