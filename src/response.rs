// JSON response envelope shared by every endpoint
// Shape: { success, message, data, count? }

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Envelope wrapping every API payload
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    /// Total number of matching rows, only present on list responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            count: None,
        }
    }

    /// Successful response without a payload (e.g. deletes)
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            count: None,
        }
    }

    pub fn failure(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data,
            count: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// List response where `count` is the total across all pages
    pub fn page(message: impl Into<String>, items: Vec<T>, total: i64) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(items),
            count: Some(total),
        }
    }

    /// List response where `count` is simply the number of items returned
    pub fn list(message: impl Into<String>, items: Vec<T>) -> Self {
        let total = items.len() as i64;
        Self::page(message, items, total)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// 201 Created response carrying a `Location` header
#[derive(Debug)]
pub struct Created<T> {
    pub location: String,
    pub body: ApiResponse<T>,
}

impl<T> Created<T> {
    pub fn new(location: impl Into<String>, message: impl Into<String>, data: T) -> Self {
        Self {
            location: location.into(),
            body: ApiResponse::ok(message, data),
        }
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (
            StatusCode::CREATED,
            [(header::LOCATION, self.location)],
            Json(self.body),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_count_is_omitted_for_single_items() {
        let body = serde_json::to_value(ApiResponse::ok("OK", 5)).unwrap();
        assert_eq!(body, json!({ "success": true, "message": "OK", "data": 5 }));
    }

    #[test]
    fn test_page_reports_total_not_page_size() {
        let body = serde_json::to_value(ApiResponse::page("OK", vec![1, 2], 17)).unwrap();
        assert_eq!(body["count"], 17);
        assert_eq!(body["data"], json!([1, 2]));
    }

    #[test]
    fn test_empty_has_null_data() {
        let body = serde_json::to_value(ApiResponse::<()>::empty("Đã xóa")).unwrap();
        assert_eq!(body["data"], serde_json::Value::Null);
        assert_eq!(body["success"], true);
    }

    #[test]
    fn test_created_sets_location_header() {
        let response = Created::new("/api/facilities/7", "Tạo thành công", 7).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/api/facilities/7"
        );
    }
}
