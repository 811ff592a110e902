//! Failures talking to the user directory

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or an undecodable body
    #[error("User directory request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The directory refused the service's credentials (401 or 403)
    #[error("User directory rejected credentials: {0}")]
    Unauthorized(String),

    #[error("User not found in directory: {0}")]
    NotFound(String),

    #[error("User directory answered {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("Invalid user directory configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Classify a non-2xx directory response
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unauthorized(message)
            }
            reqwest::StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::UnexpectedStatus {
                status: status.as_u16(),
                message,
            },
        }
    }
}

impl From<ClientError> for grants_core::Error {
    fn from(err: ClientError) -> Self {
        grants_core::Error::Directory(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            ClientError::from_status(StatusCode::FORBIDDEN, "no".into()),
            ClientError::Unauthorized(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::NOT_FOUND, "gone".into()),
            ClientError::NotFound(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::BAD_REQUEST, "bad".into()),
            ClientError::UnexpectedStatus { status: 400, .. }
        ));
    }
}
