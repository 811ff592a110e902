//! Result envelope returned by every permission operation
//!
//! A [`Response`] carries either a success payload or a structured error with
//! an HTTP-style status code. Callers branch on the code: "not found" and
//! "conflict" are ordinary business outcomes, not defects.

use http::StatusCode;
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};
use thiserror::Error;

/// Structured failure carried by a [`Response`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct ResponseError {
    pub code: u16,
    pub message: String,
}

impl ResponseError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
        }
    }

    /// Status code as an [`http::StatusCode`], falling back to 500 for codes
    /// outside the valid range
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn is_not_found(&self) -> bool {
        self.code == StatusCode::NOT_FOUND.as_u16()
    }
}

/// Success-or-error envelope, serialized as `{"data": .., "error": ..}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response<T> {
    Success(T),
    Failure(ResponseError),
}

impl<T> Response<T> {
    pub fn ok(data: T) -> Self {
        Response::Success(data)
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Response::Failure(ResponseError::new(status, message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::error(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::error(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Response::Success(data) => Some(data),
            Response::Failure(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&ResponseError> {
        match self {
            Response::Success(_) => None,
            Response::Failure(error) => Some(error),
        }
    }

    /// HTTP status this envelope should be delivered with
    pub fn status(&self) -> StatusCode {
        match self {
            Response::Success(_) => StatusCode::OK,
            Response::Failure(error) => error.status(),
        }
    }

    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Response::Success(data) => Response::Success(f(data)),
            Response::Failure(error) => Response::Failure(error),
        }
    }

    pub fn into_result(self) -> Result<T, ResponseError> {
        self.into()
    }
}

impl<T> From<Response<T>> for Result<T, ResponseError> {
    fn from(response: Response<T>) -> Self {
        match response {
            Response::Success(data) => Ok(data),
            Response::Failure(error) => Err(error),
        }
    }
}

impl<T> From<Result<T, ResponseError>> for Response<T> {
    fn from(result: Result<T, ResponseError>) -> Self {
        match result {
            Ok(data) => Response::Success(data),
            Err(error) => Response::Failure(error),
        }
    }
}

impl<T: Serialize> Serialize for Response<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Response", 2)?;
        match self {
            Response::Success(data) => {
                state.serialize_field("data", data)?;
                state.serialize_field("error", &Option::<ResponseError>::None)?;
            }
            Response::Failure(error) => {
                state.serialize_field("data", &Option::<T>::None)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let response = Response::ok(true);
        assert!(response.is_success());
        assert_eq!(response.data(), Some(&true));
        assert!(response.as_error().is_none());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"data": true, "error": null})
        );
    }

    #[test]
    fn test_failure_envelope() {
        let response: Response<String> = Response::conflict("Relationship already exists");
        assert!(!response.is_success());
        assert_eq!(response.as_error().map(|e| e.code), Some(409));
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "data": null,
                "error": {"code": 409, "message": "Relationship already exists"}
            })
        );
    }

    #[test]
    fn test_result_conversion() {
        let response: Response<u32> = Response::not_found("missing");
        let result = response.into_result();
        assert!(matches!(result, Err(ref e) if e.is_not_found()));

        let back: Response<u32> = Ok(7).into();
        assert_eq!(back.map(|v| v * 2).data(), Some(&14));
    }

    #[test]
    fn test_out_of_range_code_maps_to_internal() {
        let error = ResponseError {
            code: 42,
            message: "bogus".to_string(),
        };
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
