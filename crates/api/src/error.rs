//! Response envelope and API errors
//!
//! Every JSON response, successful or not, uses the same envelope:
//! `{success, data, message, error, error_code}`.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Fixed error codes reported in the `error_code` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    AuthRequired,
    InvalidCredentials,
    FileNotFound,
    UploadFailed,
    DownloadFailed,
    DeleteFailed,
    ListFailed,
    SearchFailed,
    S3Connection,
    S3Permission,
    S3Bucket,
    InvalidRequest,
    Validation,
    Server,
    ServiceUnavailable,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::AuthRequired => "AUTH_001",
            ErrorCode::InvalidCredentials => "AUTH_002",
            ErrorCode::FileNotFound => "FILE_001",
            ErrorCode::UploadFailed => "FILE_002",
            ErrorCode::DownloadFailed => "FILE_003",
            ErrorCode::DeleteFailed => "FILE_004",
            ErrorCode::ListFailed => "FILE_005",
            ErrorCode::SearchFailed => "FILE_006",
            ErrorCode::S3Connection => "S3_001",
            ErrorCode::S3Permission => "S3_002",
            ErrorCode::S3Bucket => "S3_003",
            ErrorCode::InvalidRequest => "REQ_001",
            ErrorCode::Validation => "REQ_002",
            ErrorCode::Server => "SRV_001",
            ErrorCode::ServiceUnavailable => "SRV_002",
        }
    }
}

/// Standard response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
    pub error: String,
    pub error_code: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: String::new(),
            error_code: String::new(),
        })
    }
}

/// A failed request, rendered as an envelope with `success: false`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,
    message: String,
    error: String,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: ErrorCode,
        message: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            error: error.into(),
        }
    }

    pub fn missing_auth() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ErrorCode::AuthRequired,
            "Authentication required",
            "Missing Authorization header",
        )
    }

    pub fn malformed_auth() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidCredentials,
            "Invalid authentication format",
            "Malformed Authorization header",
        )
    }

    pub fn invalid_credentials() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidCredentials,
            "Invalid credentials",
            "Username or password incorrect",
        )
    }

    pub fn not_configured() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::S3Connection,
            "Please configure S3 settings first",
            "S3 configuration not found or invalid",
        )
    }

    pub fn validation(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::Validation, message, error)
    }

    pub fn internal(code: ErrorCode, message: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message, error)
    }

    /// Map a storage error from a listing to a response
    ///
    /// `code` is used for anything that is not a permission or bucket problem.
    pub fn storage(err: &syncer_core::Error, code: ErrorCode, message: &str) -> Self {
        match err {
            syncer_core::Error::Auth(_) => {
                Self::new(StatusCode::FORBIDDEN, ErrorCode::S3Permission, message, err.to_string())
            }
            syncer_core::Error::NotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, ErrorCode::S3Bucket, message, err.to_string())
            }
            _ => Self::internal(code, message, err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            message: self.message,
            error: self.error,
            error_code: self.code.as_str().to_string(),
        };
        let mut response = (self.status, Json(body)).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorCode::AuthRequired.as_str(), "AUTH_001");
        assert_eq!(ErrorCode::SearchFailed.as_str(), "FILE_006");
        assert_eq!(ErrorCode::ServiceUnavailable.as_str(), "SRV_002");
    }

    #[test]
    fn test_unauthorized_sets_challenge_header() {
        let response = ApiError::missing_auth().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Basic");

        let response = ApiError::not_configured().into_response();
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_storage_error_mapping() {
        let err = ApiError::storage(
            &syncer_core::Error::Auth("denied".into()),
            ErrorCode::ListFailed,
            "Failed to list files",
        );
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.code, ErrorCode::S3Permission);

        let err = ApiError::storage(
            &syncer_core::Error::Connectivity("timeout".into()),
            ErrorCode::SearchFailed,
            "Failed to search files",
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, ErrorCode::SearchFailed);
    }

    #[test]
    fn test_success_envelope_shape() {
        let Json(body) = ApiResponse::ok(serde_json::json!({ "n": 1 }), "done");
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["n"], 1);
        assert_eq!(value["error_code"], "");
    }
}
