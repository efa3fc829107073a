use axum::extract::{Path, Query, State};
use axum::Json;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::facility_services::models::{CreateService, ServiceFilter, ServiceItem, UpdateService};
use crate::query::QueryParams;
use crate::response::{ApiResponse, Created};
use crate::AppState;

/// GET /api/facilities/{id}/services
#[utoipa::path(
    get,
    path = "/api/facilities/{id}/services",
    params(
        ("id" = i32, Path, description = "Facility ID"),
        ("search" = Option<String>, Query, description = "Match on service name"),
        ("is_active" = Option<bool>, Query, description = "Only active or inactive services")
    ),
    responses(
        (status = 200, description = "Services of the facility", body = Vec<ServiceItem>),
        (status = 404, description = "Facility not found")
    ),
    tag = "services"
)]
pub async fn list_services(
    State(state): State<AppState>,
    Path(facility_id): Path<i32>,
    Query(params): Query<QueryParams>,
    Query(filter): Query<ServiceFilter>,
) -> Result<ApiResponse<Vec<ServiceItem>>, ApiError> {
    let (services, total) = state
        .service_catalog
        .list(facility_id, params, filter)
        .await?;
    Ok(ApiResponse::page("Lấy danh sách dịch vụ thành công", services, total))
}

#[utoipa::path(
    get,
    path = "/api/services/{id}",
    params(("id" = i32, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service found", body = ServiceItem),
        (status = 404, description = "Service not found")
    ),
    tag = "services"
)]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<ApiResponse<ServiceItem>, ApiError> {
    let service = state.service_catalog.get(id).await?;
    Ok(ApiResponse::ok("Lấy thông tin dịch vụ thành công", service))
}

#[utoipa::path(
    post,
    path = "/api/facilities/{id}/services",
    params(("id" = i32, Path, description = "Facility ID")),
    request_body = CreateService,
    responses(
        (status = 201, description = "Service created", body = ServiceItem),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Not allowed")
    ),
    security(("bearer" = [])),
    tag = "services"
)]
pub async fn create_service(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(facility_id): Path<i32>,
    Json(payload): Json<CreateService>,
) -> Result<Created<ServiceItem>, ApiError> {
    let service = state
        .service_catalog
        .create(&user, facility_id, payload)
        .await?;
    Ok(Created::new(
        format!("/api/services/{}", service.id),
        "Tạo dịch vụ thành công",
        service,
    ))
}

#[utoipa::path(
    put,
    path = "/api/services/{id}",
    params(("id" = i32, Path, description = "Service ID")),
    request_body = UpdateService,
    responses(
        (status = 200, description = "Service updated", body = ServiceItem),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "Service not found")
    ),
    security(("bearer" = [])),
    tag = "services"
)]
pub async fn update_service(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateService>,
) -> Result<ApiResponse<ServiceItem>, ApiError> {
    let service = state.service_catalog.update(&user, id, payload).await?;
    Ok(ApiResponse::ok("Cập nhật dịch vụ thành công", service))
}

#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    params(("id" = i32, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service deleted"),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "Service not found")
    ),
    security(("bearer" = [])),
    tag = "services"
)]
pub async fn delete_service(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<()>, ApiError> {
    state.service_catalog.delete(&user, id).await?;
    Ok(ApiResponse::empty("Xóa dịch vụ thành công"))
}
