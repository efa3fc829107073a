// Error handling module for the booking API
// Provides the central error type and its conversion to the response envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{debug, error, warn};

use crate::response::ApiResponse;

/// Main error type for the API
/// All handlers return Result<T, ApiError> (module errors convert into it)
#[derive(Debug)]
pub enum ApiError {
    /// Validation errors from request DTOs (400)
    ValidationError(validator::ValidationErrors),

    /// Business-rule or argument errors (400)
    BadRequest(String),

    /// Resource not found by ID (404)
    NotFound { resource: String, id: String },

    /// Duplicate resource or slot conflict (409)
    Conflict { message: String },

    /// Database operation errors (500)
    /// Driver details are logged, never returned
    DatabaseError(sqlx::Error),

    /// Internal server errors (500)
    InternalError(String),

    /// Authentication failures (401)
    Unauthorized(String),

    /// Authorization failures (403)
    Forbidden(String),
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        ApiError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
        }
    }

    pub fn forbidden() -> Self {
        ApiError::Forbidden("Bạn không có quyền thực hiện thao tác này".to_string())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Convert to status code and envelope, logging at a level matching severity:
    /// debug for expected client errors, warn for security and conflicts, error for 500s
    fn to_envelope(&self) -> (StatusCode, ApiResponse<serde_json::Value>) {
        let status = self.status_code();
        let envelope = match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                let details = serde_json::to_value(errors).ok();
                ApiResponse::failure(first_validation_message(errors), details)
            }
            ApiError::BadRequest(message) => {
                debug!("Bad request: {}", message);
                ApiResponse::failure(message.clone(), None)
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);
                ApiResponse::failure(format!("Không tìm thấy {} với id {}", resource, id), None)
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);
                ApiResponse::failure(message.clone(), None)
            }
            ApiError::DatabaseError(db_error) => {
                error!("Database error: {:?}", db_error);
                ApiResponse::failure("Đã xảy ra lỗi cơ sở dữ liệu", None)
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);
                ApiResponse::failure("Đã xảy ra lỗi hệ thống", None)
            }
            ApiError::Unauthorized(message) => {
                warn!("Unauthorized access attempt: {}", message);
                ApiResponse::failure(message.clone(), None)
            }
            ApiError::Forbidden(message) => {
                warn!("Forbidden access attempt: {}", message);
                ApiResponse::failure(message.clone(), None)
            }
        };
        (status, envelope)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::ValidationError(errors) => write!(f, "{}", first_validation_message(errors)),
            ApiError::BadRequest(msg)
            | ApiError::InternalError(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg) => write!(f, "{}", msg),
            ApiError::NotFound { resource, id } => write!(f, "{} {} not found", resource, id),
            ApiError::Conflict { message } => write!(f, "{}", message),
            ApiError::DatabaseError(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, envelope) = self.to_envelope();
        (status, Json(envelope)).into_response()
    }
}

/// Pick a stable, human readable message out of field-level validation errors.
/// Fields are visited in name order so the message does not depend on hash order.
pub fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.keys().copied().collect();
    fields.sort_unstable();

    fields
        .into_iter()
        .filter_map(|field| field_errors.get(field))
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Dữ liệu không hợp lệ".to_string())
}

/// Convert sqlx errors to ApiError; constraint violations become client errors
impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &error {
            if db_err.is_unique_violation() {
                return ApiError::conflict("Dữ liệu đã tồn tại");
            }
            if db_err.is_foreign_key_violation() {
                return ApiError::bad_request("Dữ liệu tham chiếu không hợp lệ");
            }
            if db_err.is_check_violation() {
                return ApiError::bad_request("Dữ liệu vi phạm ràng buộc");
            }
            // numeric_value_out_of_range
            if db_err.code().as_deref() == Some("22003") {
                return ApiError::bad_request("Giá trị vượt quá giới hạn cho phép");
            }
        }
        ApiError::DatabaseError(error)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn errors_with(field: &'static str, message: &'static str) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("invalid");
        err.message = Some(message.into());
        errors.add(field, err);
        errors
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("sân", 1).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError::forbidden().status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::InternalError("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_envelope() {
        let (status, body) = ApiError::not_found("sân", 42).to_envelope();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.success);
        assert_eq!(body.message, "Không tìm thấy sân với id 42");
        assert!(body.data.is_none());
    }

    #[test]
    fn test_internal_error_hides_details() {
        let (_, body) = ApiError::InternalError("secret connection string".into()).to_envelope();
        assert!(!body.message.contains("secret"));
    }

    #[test]
    fn test_validation_message_uses_field_message() {
        let errors = errors_with("title", "Tiêu đề không được vượt quá 100 ký tự");
        let (status, body) = ApiError::from(errors).to_envelope();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "Tiêu đề không được vượt quá 100 ký tự");
        assert!(body.data.is_some());
    }

    #[test]
    fn test_validation_message_is_deterministic() {
        let mut errors = errors_with("title", "title message");
        let mut err = ValidationError::new("invalid");
        err.message = Some("address message".into());
        errors.add("address", err);
        assert_eq!(first_validation_message(&errors), "address message");
    }

    #[test]
    fn test_row_not_found_maps_to_500() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
