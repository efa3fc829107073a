// HTTP handlers for discount codes

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::auth::AuthenticatedUser;
use crate::discounts::models::{
    CreateDiscount, Discount, DiscountCheck, DiscountCheckQuery, DiscountFilter, UpdateDiscount,
};
use crate::error::ApiError;
use crate::query::QueryParams;
use crate::response::{ApiResponse, Created};
use crate::AppState;

/// GET /api/facilities/{id}/discounts
#[utoipa::path(
    get,
    path = "/api/facilities/{id}/discounts",
    params(
        ("id" = i32, Path, description = "Facility ID"),
        ("search" = Option<String>, Query, description = "Match on code"),
        ("is_active" = Option<bool>, Query, description = "Only active or inactive codes")
    ),
    responses(
        (status = 200, description = "Discount codes of the facility", body = Vec<Discount>),
        (status = 403, description = "Not allowed")
    ),
    security(("bearer" = [])),
    tag = "discounts"
)]
pub async fn list_discounts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(facility_id): Path<i32>,
    Query(params): Query<QueryParams>,
    Query(filter): Query<DiscountFilter>,
) -> Result<ApiResponse<Vec<Discount>>, ApiError> {
    let (discounts, total) = state
        .discount_service
        .list(&user, facility_id, params, filter)
        .await?;
    Ok(ApiResponse::page("Lấy danh sách mã giảm giá thành công", discounts, total))
}

#[utoipa::path(
    get,
    path = "/api/discounts/{id}",
    params(("id" = i32, Path, description = "Discount ID")),
    responses(
        (status = 200, description = "Discount found", body = Discount),
        (status = 404, description = "Discount not found")
    ),
    security(("bearer" = [])),
    tag = "discounts"
)]
pub async fn get_discount(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<Discount>, ApiError> {
    let discount = state.discount_service.get(&user, id).await?;
    Ok(ApiResponse::ok("Lấy thông tin mã giảm giá thành công", discount))
}

/// POST /api/facilities/{id}/discounts (facility managers)
#[utoipa::path(
    post,
    path = "/api/facilities/{id}/discounts",
    params(("id" = i32, Path, description = "Facility ID")),
    request_body = CreateDiscount,
    responses(
        (status = 201, description = "Discount created", body = Discount),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Not allowed"),
        (status = 409, description = "Code already exists in this facility")
    ),
    security(("bearer" = [])),
    tag = "discounts"
)]
pub async fn create_discount(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(facility_id): Path<i32>,
    Json(payload): Json<CreateDiscount>,
) -> Result<Created<Discount>, ApiError> {
    tracing::debug!("Creating discount {} for facility {}", payload.code, facility_id);
    let discount = state
        .discount_service
        .create(&user, facility_id, payload)
        .await?;
    Ok(Created::new(
        format!("/api/discounts/{}", discount.id),
        "Tạo mã giảm giá thành công",
        discount,
    ))
}

#[utoipa::path(
    put,
    path = "/api/discounts/{id}",
    params(("id" = i32, Path, description = "Discount ID")),
    request_body = UpdateDiscount,
    responses(
        (status = 200, description = "Discount updated", body = Discount),
        (status = 400, description = "Invalid input data"),
        (status = 404, description = "Discount not found")
    ),
    security(("bearer" = [])),
    tag = "discounts"
)]
pub async fn update_discount(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateDiscount>,
) -> Result<ApiResponse<Discount>, ApiError> {
    let discount = state.discount_service.update(&user, id, payload).await?;
    Ok(ApiResponse::ok("Cập nhật mã giảm giá thành công", discount))
}

#[utoipa::path(
    delete,
    path = "/api/discounts/{id}",
    params(("id" = i32, Path, description = "Discount ID")),
    responses(
        (status = 200, description = "Discount deleted"),
        (status = 404, description = "Discount not found")
    ),
    security(("bearer" = [])),
    tag = "discounts"
)]
pub async fn delete_discount(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<()>, ApiError> {
    state.discount_service.delete(&user, id).await?;
    Ok(ApiResponse::empty("Xóa mã giảm giá thành công"))
}

/// Handler for GET /api/facilities/{id}/discounts/check
/// Public; tells the booking form whether a code applies on a date
#[utoipa::path(
    get,
    path = "/api/facilities/{id}/discounts/check",
    params(
        ("id" = i32, Path, description = "Facility ID"),
        ("code" = String, Query, description = "Discount code, case-insensitive"),
        ("date" = Option<String>, Query, description = "Booking date, defaults to today")
    ),
    responses(
        (status = 200, description = "Check result", body = DiscountCheck),
        (status = 400, description = "Missing code"),
        (status = 404, description = "Facility not found")
    ),
    tag = "discounts"
)]
pub async fn check_discount(
    State(state): State<AppState>,
    Path(facility_id): Path<i32>,
    Query(query): Query<DiscountCheckQuery>,
) -> Result<ApiResponse<DiscountCheck>, ApiError> {
    let check = state.discount_service.check(facility_id, query).await?;
    let message = if check.valid {
        "Mã giảm giá hợp lệ"
    } else {
        "Mã giảm giá không thể sử dụng"
    };
    Ok(ApiResponse::ok(message, check))
}
