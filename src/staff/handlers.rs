use axum::extract::{Path, Query, State};
use axum::Json;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::query::QueryParams;
use crate::response::{ApiResponse, Created};
use crate::staff::models::{CreateStaff, CreatedStaff, StaffMember, UpdateStaff};
use crate::AppState;

/// GET /api/facilities/{id}/staff
#[utoipa::path(
    get,
    path = "/api/facilities/{id}/staff",
    params(("id" = i32, Path, description = "Facility ID")),
    responses(
        (status = 200, description = "Staff of the facility", body = Vec<StaffMember>),
        (status = 403, description = "Managers only")
    ),
    security(("bearer" = [])),
    tag = "staff"
)]
pub async fn list_staff(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(facility_id): Path<i32>,
    Query(params): Query<QueryParams>,
) -> Result<ApiResponse<Vec<StaffMember>>, ApiError> {
    let (staff, total) = state.staff_service.list(&user, facility_id, params).await?;
    Ok(ApiResponse::page("Lấy danh sách nhân viên thành công", staff, total))
}

/// POST /api/facilities/{id}/staff
#[utoipa::path(
    post,
    path = "/api/facilities/{id}/staff",
    params(("id" = i32, Path, description = "Facility ID")),
    request_body = CreateStaff,
    responses(
        (status = 201, description = "Staff account created", body = CreatedStaff),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer" = [])),
    tag = "staff"
)]
pub async fn create_staff(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(facility_id): Path<i32>,
    Json(payload): Json<CreateStaff>,
) -> Result<Created<CreatedStaff>, ApiError> {
    let created = state
        .staff_service
        .create(&user, facility_id, payload)
        .await?;
    Ok(Created::new(
        format!("/api/staff/{}", created.staff.id),
        "Thêm nhân viên thành công",
        created,
    ))
}

#[utoipa::path(
    put,
    path = "/api/staff/{id}",
    params(("id" = i32, Path, description = "Staff ID")),
    request_body = UpdateStaff,
    responses(
        (status = 200, description = "Staff updated", body = StaffMember),
        (status = 400, description = "Invalid input data"),
        (status = 404, description = "Staff not found")
    ),
    security(("bearer" = [])),
    tag = "staff"
)]
pub async fn update_staff(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStaff>,
) -> Result<ApiResponse<StaffMember>, ApiError> {
    let staff = state.staff_service.update(&user, id, payload).await?;
    Ok(ApiResponse::ok("Cập nhật nhân viên thành công", staff))
}

#[utoipa::path(
    delete,
    path = "/api/staff/{id}",
    params(("id" = i32, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff removed and account disabled"),
        (status = 404, description = "Staff not found")
    ),
    security(("bearer" = [])),
    tag = "staff"
)]
pub async fn delete_staff(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<()>, ApiError> {
    state.staff_service.delete(&user, id).await?;
    Ok(ApiResponse::empty("Xóa nhân viên thành công"))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{lazy_server, TestAuth};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_create_rejects_invalid_email() {
        let server = lazy_server();
        let (name, value) = TestAuth::owner(2).header();
        let response = server
            .post("/api/facilities/1/staff")
            .add_header(name, value)
            .json(&json!({
                "email": "not-an-email",
                "full_name": "Phạm Minh",
                "position": "Lễ tân"
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], "Email không hợp lệ");
    }

    #[tokio::test]
    async fn test_list_requires_authentication() {
        let server = lazy_server();
        let response = server.get("/api/facilities/1/staff").await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_position() {
        let server = lazy_server();
        let (name, value) = TestAuth::admin(1).header();
        let response = server
            .put("/api/staff/4")
            .add_header(name, value)
            .json(&json!({ "position": "   " }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
