// HTTP handlers for booking endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::auth::{AuthenticatedUser, OptionalUser};
use crate::bookings::models::{
    Booking, BookingDetail, BookingFilter, BookingStatus, BookingSummary, CreateBookingRequest,
    UpdateBookingStatusRequest,
};
use crate::error::ApiError;
use crate::query::QueryParams;
use crate::response::{ApiResponse, Created};
use crate::AppState;

/// Handler for POST /api/bookings
/// Open to guests; a signed-in customer books for themselves
#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created with its order", body = BookingDetail),
        (status = 400, description = "Invalid input or slot"),
        (status = 404, description = "Field not found"),
        (status = 409, description = "Slot already booked")
    ),
    tag = "bookings"
)]
pub async fn create_booking_handler(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Created<BookingDetail>, ApiError> {
    tracing::debug!(
        "Booking request for field {} on {} {}-{}",
        request.field_id,
        request.booking_date,
        request.start_time,
        request.end_time
    );

    let detail = state.booking_service.create(user.as_ref(), request).await?;
    Ok(Created::new(
        format!("/api/bookings/{}", detail.booking.id),
        "Đặt sân thành công",
        detail,
    ))
}

/// Handler for GET /api/bookings
#[utoipa::path(
    get,
    path = "/api/bookings",
    params(
        ("facility_id" = Option<i32>, Query, description = "Only bookings of this facility"),
        ("field_id" = Option<i32>, Query, description = "Only bookings of this field"),
        ("date" = Option<String>, Query, description = "Only bookings on this day, YYYY-MM-DD"),
        ("status" = Option<BookingStatus>, Query, description = "Only bookings in this status"),
        ("sort" = Option<String>, Query, description = "booking_date | start_time | status | created_at"),
        ("page" = Option<u32>, Query, description = "1-indexed page")
    ),
    responses(
        (status = 200, description = "Bookings visible to the caller", body = Vec<BookingSummary>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "bookings"
)]
pub async fn list_bookings_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<QueryParams>,
    Query(filter): Query<BookingFilter>,
) -> Result<ApiResponse<Vec<BookingSummary>>, ApiError> {
    let (bookings, total) = state.booking_service.list(&user, params, filter).await?;
    Ok(ApiResponse::page("Lấy danh sách lịch đặt thành công", bookings, total))
}

/// Handler for GET /api/bookings/{id}
#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking with its order", body = BookingDetail),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer" = [])),
    tag = "bookings"
)]
pub async fn get_booking_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<BookingDetail>, ApiError> {
    let detail = state.booking_service.get(&user, id).await?;
    Ok(ApiResponse::ok("Lấy thông tin lịch đặt thành công", detail))
}

/// Handler for PATCH /api/bookings/{id}/status
#[utoipa::path(
    patch,
    path = "/api/bookings/{id}/status",
    params(("id" = i32, Path, description = "Booking ID")),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Booking),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Not allowed for this booking"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer" = [])),
    tag = "bookings"
)]
pub async fn update_booking_status_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<ApiResponse<Booking>, ApiError> {
    let booking = state
        .booking_service
        .update_status(&user, id, request)
        .await?;
    Ok(ApiResponse::ok("Cập nhật trạng thái lịch đặt thành công", booking))
}
