use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::bookings::slot::{TimeRange, MIN_BOOKING_MINUTES};
use crate::error::ApiError;
use crate::orders::models::{OrderDetail, PaymentStatus};

/// Lifecycle of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Booking row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: i32,
    pub facility_id: i32,
    pub field_id: i32,
    pub customer_id: Option<i32>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub title: Option<String>,
    pub note: Option<String>,
    #[schema(value_type = String, example = "2025-06-01")]
    pub booking_date: NaiveDate,
    #[schema(value_type = String, example = "18:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "19:30:00")]
    pub end_time: NaiveTime,
    pub status: BookingStatus,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const BOOKING_COLUMNS: &str = "id, facility_id, field_id, customer_id, guest_name, guest_phone, \
     title, note, booking_date, start_time, end_time, status, created_by, created_at, updated_at";

/// List row: booking joined with its field and order
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookingSummary {
    pub id: i32,
    pub facility_id: i32,
    pub field_id: i32,
    pub field_name: String,
    pub customer_id: Option<i32>,
    pub customer_name: Option<String>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub title: Option<String>,
    #[schema(value_type = String)]
    pub booking_date: NaiveDate,
    #[schema(value_type = String)]
    pub start_time: NaiveTime,
    #[schema(value_type = String)]
    pub end_time: NaiveTime,
    pub status: BookingStatus,
    #[schema(value_type = Option<f64>)]
    pub total_price: Option<Decimal>,
    pub payment_status: Option<PaymentStatus>,
    pub created_at: DateTime<Utc>,
}

pub const BOOKING_SUMMARY_COLUMNS: &str = "b.id, b.facility_id, b.field_id, fl.name AS field_name, \
     b.customer_id, u.full_name AS customer_name, b.guest_name, b.guest_phone, b.title, \
     b.booking_date, b.start_time, b.end_time, b.status, o.total_price, o.payment_status, b.created_at";

pub const BOOKING_SUMMARY_FROM: &str = "bookings b \
     JOIN fields fl ON fl.id = b.field_id \
     LEFT JOIN users u ON u.id = b.customer_id \
     LEFT JOIN orders o ON o.booking_id = b.id";

/// Booking with its order and service lines
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    pub field_name: String,
    pub facility_name: String,
    pub order: Option<OrderDetail>,
}

/// Requested extra service with quantity
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BookingServiceRequest {
    pub service_id: i32,
    pub quantity: i32,
}

/// Upper bound on the quantity of one service in a booking
pub const MAX_SERVICE_QUANTITY: i32 = 1000;

fn quantity_too_large() -> String {
    format!("Số lượng dịch vụ không được vượt quá {}", MAX_SERVICE_QUANTITY)
}

fn validate_service_items(items: &Vec<BookingServiceRequest>) -> Result<(), validator::ValidationError> {
    if items.iter().any(|item| item.quantity < 1) {
        let mut err = validator::ValidationError::new("invalid_quantity");
        err.message = Some("Số lượng dịch vụ phải lớn hơn 0".into());
        return Err(err);
    }
    if items.iter().any(|item| item.quantity > MAX_SERVICE_QUANTITY) {
        let mut err = validator::ValidationError::new("quantity_too_large");
        err.message = Some(quantity_too_large().into());
        return Err(err);
    }
    Ok(())
}

/// Request body for POST /api/bookings
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    pub field_id: i32,

    #[schema(value_type = String, example = "2025-06-01")]
    pub booking_date: NaiveDate,

    #[schema(value_type = String, example = "18:00:00")]
    pub start_time: NaiveTime,

    #[schema(value_type = String, example = "19:30:00")]
    pub end_time: NaiveTime,

    #[validate(length(max = 100, message = "Tiêu đề không được vượt quá 100 ký tự"))]
    pub title: Option<String>,

    #[validate(length(max = 500, message = "Ghi chú không được vượt quá 500 ký tự"))]
    pub note: Option<String>,

    /// Required unless the caller is a signed-in customer
    pub guest_name: Option<String>,

    /// Required unless the caller is a signed-in customer
    pub guest_phone: Option<String>,

    #[serde(default)]
    #[validate(custom = "validate_service_items")]
    pub services: Vec<BookingServiceRequest>,

    pub discount_code: Option<String>,
}

impl CreateBookingRequest {
    /// Requested slot, checked for ordering and minimum length
    pub fn slot(&self) -> Result<TimeRange, ApiError> {
        let range = TimeRange::new(self.start_time, self.end_time)
            .ok_or_else(|| ApiError::bad_request("Giờ kết thúc phải sau giờ bắt đầu"))?;
        if range.minutes() < MIN_BOOKING_MINUTES {
            return Err(ApiError::bad_request(format!(
                "Thời lượng đặt sân tối thiểu là {} phút",
                MIN_BOOKING_MINUTES
            )));
        }
        Ok(range)
    }

    /// Requested services with duplicate ids merged by summing quantities.
    /// A merged quantity above the per-service limit is rejected.
    pub fn merged_services(&self) -> Result<Vec<BookingServiceRequest>, ApiError> {
        let mut merged: Vec<BookingServiceRequest> = Vec::new();
        for item in &self.services {
            match merged.iter_mut().find(|m| m.service_id == item.service_id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(item.quantity)
                        .filter(|q| *q <= MAX_SERVICE_QUANTITY)
                        .ok_or_else(|| ApiError::bad_request(quantity_too_large()))?;
                }
                None => merged.push(item.clone()),
            }
        }
        Ok(merged)
    }

    /// Normalised discount code (trimmed, upper-case); blank means none
    pub fn discount_code(&self) -> Option<String> {
        self.discount_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_uppercase)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

/// Extra list filters next to the shared paging parameters
#[derive(Debug, Default, Deserialize)]
pub struct BookingFilter {
    pub facility_id: Option<i32>,
    pub field_id: Option<i32>,
    pub date: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
}
