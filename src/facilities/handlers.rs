// HTTP handlers for facility endpoints

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::facilities::models::{CreateFacility, Facility, FacilityFilter, UpdateFacility};
use crate::query::QueryParams;
use crate::response::{ApiResponse, Created};
use crate::AppState;

/// Handler for GET /api/facilities
/// Supports search, is_active/owner filters, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/facilities",
    params(
        ("search" = Option<String>, Query, description = "Match on name or address"),
        ("sort" = Option<String>, Query, description = "name | created_at"),
        ("order" = Option<String>, Query, description = "asc | desc"),
        ("page" = Option<u32>, Query, description = "1-indexed page"),
        ("limit" = Option<u32>, Query, description = "Page size, at most 100"),
        ("is_active" = Option<bool>, Query, description = "Only active or inactive facilities")
    ),
    responses(
        (status = 200, description = "Page of facilities", body = Vec<Facility>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "facilities"
)]
pub async fn list_facilities(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
    Query(filter): Query<FacilityFilter>,
) -> Result<ApiResponse<Vec<Facility>>, ApiError> {
    tracing::debug!("Listing facilities: {:?} {:?}", params, filter);
    let (facilities, total) = state.facility_service.list(params, filter).await?;
    Ok(ApiResponse::page("Lấy danh sách cơ sở thành công", facilities, total))
}

#[utoipa::path(
    get,
    path = "/api/facilities/{id}",
    params(("id" = i32, Path, description = "Facility ID")),
    responses(
        (status = 200, description = "Facility found", body = Facility),
        (status = 404, description = "Facility not found")
    ),
    tag = "facilities"
)]
pub async fn get_facility(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<ApiResponse<Facility>, ApiError> {
    let facility = state.facility_service.get(id).await?;
    Ok(ApiResponse::ok("Lấy thông tin cơ sở thành công", facility))
}

/// Handler for POST /api/facilities (admin or owner)
#[utoipa::path(
    post,
    path = "/api/facilities",
    request_body = CreateFacility,
    responses(
        (status = 201, description = "Facility created", body = Facility),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not allowed")
    ),
    security(("bearer" = [])),
    tag = "facilities"
)]
pub async fn create_facility(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateFacility>,
) -> Result<Created<Facility>, ApiError> {
    tracing::debug!("Creating facility: {}", payload.name);
    let facility = state.facility_service.create(&user, payload).await?;
    Ok(Created::new(
        format!("/api/facilities/{}", facility.id),
        "Tạo cơ sở thành công",
        facility,
    ))
}

#[utoipa::path(
    put,
    path = "/api/facilities/{id}",
    params(("id" = i32, Path, description = "Facility ID")),
    request_body = UpdateFacility,
    responses(
        (status = 200, description = "Facility updated", body = Facility),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "Facility not found")
    ),
    security(("bearer" = [])),
    tag = "facilities"
)]
pub async fn update_facility(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateFacility>,
) -> Result<ApiResponse<Facility>, ApiError> {
    let facility = state.facility_service.update(&user, id, payload).await?;
    Ok(ApiResponse::ok("Cập nhật cơ sở thành công", facility))
}

#[utoipa::path(
    delete,
    path = "/api/facilities/{id}",
    params(("id" = i32, Path, description = "Facility ID")),
    responses(
        (status = 200, description = "Facility deleted"),
        (status = 404, description = "Facility not found"),
        (status = 409, description = "Facility has upcoming bookings")
    ),
    security(("bearer" = [])),
    tag = "facilities"
)]
pub async fn delete_facility(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<()>, ApiError> {
    state.facility_service.delete(&user, id).await?;
    Ok(ApiResponse::empty("Xóa cơ sở thành công"))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{lazy_server, TestAuth};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_create_requires_authentication() {
        let server = lazy_server();
        let response = server
            .post("/api/facilities")
            .json(&json!({
                "name": "Sân A",
                "address": "1 Lê Lợi",
                "open_time": "06:00:00",
                "close_time": "22:00:00"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_rejects_close_before_open() {
        let server = lazy_server();
        let (name, value) = TestAuth::owner(2).header();
        let response = server
            .post("/api/facilities")
            .add_header(name, value)
            .json(&json!({
                "name": "Sân A",
                "address": "1 Lê Lợi",
                "open_time": "22:00:00",
                "close_time": "06:00:00"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["message"],
            "Giờ đóng cửa phải sau giờ mở cửa"
        );
    }

    #[tokio::test]
    async fn test_customer_cannot_create_facility() {
        let server = lazy_server();
        let (name, value) = TestAuth::customer(9).header();
        let response = server
            .post("/api/facilities")
            .add_header(name, value)
            .json(&json!({
                "name": "Sân A",
                "address": "1 Lê Lợi",
                "open_time": "06:00:00",
                "close_time": "22:00:00"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_sort_key() {
        let server = lazy_server();
        let response = server.get("/api/facilities?sort=password").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["success"], false);
    }

    #[tokio::test]
    async fn test_list_rejects_page_past_maximum() {
        let server = lazy_server();
        let response = server
            .get("/api/facilities")
            .add_query_param("page", "50000000")
            .add_query_param("limit", "100")
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
