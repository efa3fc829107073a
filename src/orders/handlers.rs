// HTTP handlers for order endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ApiError;
use crate::orders::models::{
    Order, OrderDetail, OrderFilter, PaymentStatus, RevenueQuery, RevenueReport,
    UpdatePaymentRequest,
};
use crate::query::QueryParams;
use crate::response::ApiResponse;
use crate::AppState;

/// Handler for GET /api/orders
/// Orders of the facilities the caller operates, filterable by facility and payment status
#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("facility_id" = Option<i32>, Query, description = "Only orders of this facility"),
        ("payment_status" = Option<PaymentStatus>, Query, description = "unpaid | paid | refunded"),
        ("page" = Option<u32>, Query, description = "1-indexed page")
    ),
    responses(
        (status = 200, description = "Orders of operated facilities", body = Vec<Order>),
        (status = 403, description = "Operators only")
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn list_orders_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<QueryParams>,
    Query(filter): Query<OrderFilter>,
) -> Result<ApiResponse<Vec<Order>>, ApiError> {
    let (orders, total) = state.order_service.list(&user, params, filter).await?;
    Ok(ApiResponse::page("Lấy danh sách hóa đơn thành công", orders, total))
}

/// Handler for GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with its service lines", body = OrderDetail),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn get_order_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<OrderDetail>, ApiError> {
    let order = state.order_service.get(&user, id).await?;
    Ok(ApiResponse::ok("Lấy thông tin hóa đơn thành công", order))
}

/// Handler for PATCH /api/orders/{id}/payment
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/payment",
    params(("id" = i32, Path, description = "Order ID")),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Payment status updated", body = Order),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Caller does not operate the facility"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn update_payment_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<ApiResponse<Order>, ApiError> {
    let order = state.order_service.update_payment(&user, id, request).await?;
    Ok(ApiResponse::ok("Cập nhật thanh toán thành công", order))
}

/// Handler for GET /api/facilities/{id}/revenue?from=&to=
#[utoipa::path(
    get,
    path = "/api/facilities/{id}/revenue",
    params(
        ("id" = i32, Path, description = "Facility ID"),
        ("from" = String, Query, description = "First day, YYYY-MM-DD"),
        ("to" = String, Query, description = "Last day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Revenue report", body = RevenueReport),
        (status = 400, description = "from is after to"),
        (status = 403, description = "Caller does not manage the facility")
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn revenue_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(facility_id): Path<i32>,
    Query(query): Query<RevenueQuery>,
) -> Result<ApiResponse<RevenueReport>, ApiError> {
    let report = state
        .order_service
        .revenue(&user, facility_id, query)
        .await?;
    Ok(ApiResponse::ok("Lấy báo cáo doanh thu thành công", report))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{lazy_server, TestAuth};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_customer_cannot_list_orders() {
        let server = lazy_server();
        let (name, value) = TestAuth::customer(4).header();
        let response = server.get("/api/orders").add_header(name, value).await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_customer_cannot_record_payment() {
        let server = lazy_server();
        let (name, value) = TestAuth::customer(4).header();
        let response = server
            .patch("/api/orders/1/payment")
            .add_header(name, value)
            .json(&json!({ "payment_status": "paid" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_payment_status_rejected() {
        let server = lazy_server();
        let (name, value) = TestAuth::staff(5, 1).header();
        let response = server
            .patch("/api/orders/1/payment")
            .add_header(name, value)
            .json(&json!({ "payment_status": "waived" }))
            .await;

        assert!(response.status_code().is_client_error());
    }

    #[tokio::test]
    async fn test_revenue_rejects_inverted_range() {
        let server = lazy_server();
        let (name, value) = TestAuth::owner(2).header();
        let response = server
            .get("/api/facilities/1/revenue?from=2025-06-30&to=2025-06-01")
            .add_header(name, value)
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
