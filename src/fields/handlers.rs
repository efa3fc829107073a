// HTTP handlers for fields of a facility

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::fields::models::{CreateField, Field, FieldFilter, FieldSlots, SlotQuery, UpdateField};
use crate::query::QueryParams;
use crate::response::{ApiResponse, Created};
use crate::AppState;

/// Handler for GET /api/facilities/{id}/fields
#[utoipa::path(
    get,
    path = "/api/facilities/{id}/fields",
    params(
        ("id" = i32, Path, description = "Facility ID"),
        ("search" = Option<String>, Query, description = "Match on field name"),
        ("sort" = Option<String>, Query, description = "name | price_per_hour | created_at"),
        ("category_id" = Option<i32>, Query, description = "Only fields of this category")
    ),
    responses(
        (status = 200, description = "Fields of the facility", body = Vec<Field>),
        (status = 404, description = "Facility not found")
    ),
    tag = "fields"
)]
pub async fn list_fields(
    State(state): State<AppState>,
    Path(facility_id): Path<i32>,
    Query(params): Query<QueryParams>,
    Query(filter): Query<FieldFilter>,
) -> Result<ApiResponse<Vec<Field>>, ApiError> {
    let (fields, total) = state
        .field_service
        .list(facility_id, params, filter)
        .await?;
    Ok(ApiResponse::page("Lấy danh sách sân thành công", fields, total))
}

#[utoipa::path(
    get,
    path = "/api/fields/{id}",
    params(("id" = i32, Path, description = "Field ID")),
    responses(
        (status = 200, description = "Field found", body = Field),
        (status = 404, description = "Field not found")
    ),
    tag = "fields"
)]
pub async fn get_field(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<ApiResponse<Field>, ApiError> {
    let field = state.field_service.get(id).await?;
    Ok(ApiResponse::ok("Lấy thông tin sân thành công", field))
}

#[utoipa::path(
    post,
    path = "/api/facilities/{id}/fields",
    params(("id" = i32, Path, description = "Facility ID")),
    request_body = CreateField,
    responses(
        (status = 201, description = "Field created", body = Field),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Not allowed"),
        (status = 409, description = "Field name already used in this facility")
    ),
    security(("bearer" = [])),
    tag = "fields"
)]
pub async fn create_field(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(facility_id): Path<i32>,
    Json(payload): Json<CreateField>,
) -> Result<Created<Field>, ApiError> {
    tracing::debug!("Creating field {} in facility {}", payload.name, facility_id);
    let field = state
        .field_service
        .create(&user, facility_id, payload)
        .await?;
    Ok(Created::new(
        format!("/api/fields/{}", field.id),
        "Tạo sân thành công",
        field,
    ))
}

#[utoipa::path(
    put,
    path = "/api/fields/{id}",
    params(("id" = i32, Path, description = "Field ID")),
    request_body = UpdateField,
    responses(
        (status = 200, description = "Field updated", body = Field),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "Field not found")
    ),
    security(("bearer" = [])),
    tag = "fields"
)]
pub async fn update_field(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateField>,
) -> Result<ApiResponse<Field>, ApiError> {
    let field = state.field_service.update(&user, id, payload).await?;
    Ok(ApiResponse::ok("Cập nhật sân thành công", field))
}

#[utoipa::path(
    delete,
    path = "/api/fields/{id}",
    params(("id" = i32, Path, description = "Field ID")),
    responses(
        (status = 200, description = "Field deleted"),
        (status = 404, description = "Field not found"),
        (status = 409, description = "Field has upcoming bookings")
    ),
    security(("bearer" = [])),
    tag = "fields"
)]
pub async fn delete_field(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<()>, ApiError> {
    state.field_service.delete(&user, id).await?;
    Ok(ApiResponse::empty("Xóa sân thành công"))
}

/// Handler for GET /api/fields/{id}/slots?date=YYYY-MM-DD
#[utoipa::path(
    get,
    path = "/api/fields/{id}/slots",
    params(
        ("id" = i32, Path, description = "Field ID"),
        ("date" = String, Query, description = "Day to inspect, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Booked and free ranges", body = FieldSlots),
        (status = 404, description = "Field not found")
    ),
    tag = "fields"
)]
pub async fn field_slots(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<SlotQuery>,
) -> Result<ApiResponse<FieldSlots>, ApiError> {
    let slots = state.field_service.slots(id, query.date).await?;
    Ok(ApiResponse::ok("Lấy lịch sân thành công", slots))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{lazy_server, TestAuth};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let server = lazy_server();
        let (name, value) = TestAuth::owner(2).header();
        let response = server
            .post("/api/facilities/1/fields")
            .add_header(name, value)
            .json(&json!({
                "name": "   ",
                "category_id": 1,
                "price_per_hour": 150000
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_requires_authentication() {
        let server = lazy_server();
        let response = server
            .put("/api/fields/1")
            .json(&json!({ "price_per_hour": 100000 }))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_slots_require_valid_date() {
        let server = lazy_server();
        let response = server.get("/api/fields/1/slots?date=not-a-date").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
