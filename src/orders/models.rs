use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Payment state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// unpaid -> paid -> refunded; staying put is always allowed
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Unpaid, PaymentStatus::Paid)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        ) || *self == next
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unpaid
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Order row; one per booking
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Order {
    pub id: i32,
    pub booking_id: i32,
    pub facility_id: i32,
    #[schema(value_type = f64)]
    pub field_price: Decimal,
    #[schema(value_type = f64)]
    pub services_total: Decimal,
    pub discount_id: Option<i32>,
    #[schema(value_type = f64)]
    pub discount_percentage: Decimal,
    #[schema(value_type = f64)]
    pub discount_amount: Decimal,
    #[schema(value_type = f64)]
    pub total_price: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const ORDER_COLUMNS: &str = "id, booking_id, facility_id, field_price, services_total, \
     discount_id, discount_percentage, discount_amount, total_price, payment_status, \
     payment_method, paid_at, created_at, updated_at";

/// Service line of an order, with name and price captured at booking time
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrderServiceLine {
    pub id: i32,
    pub order_id: i32,
    /// Null once the service itself has been deleted
    pub service_id: Option<i32>,
    pub service_name: String,
    pub quantity: i32,
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
}

/// Order with its service lines
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub services: Vec<OrderServiceLine>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
    #[validate(length(max = 50, message = "Phương thức thanh toán không được vượt quá 50 ký tự"))]
    pub payment_method: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub facility_id: Option<i32>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct RevenueQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DailyRevenue {
    #[schema(value_type = String, example = "2025-06-01")]
    pub date: NaiveDate,
    #[schema(value_type = f64)]
    pub revenue: Decimal,
    pub orders: i64,
}

/// Revenue of paid orders (by payment date) for one facility
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RevenueReport {
    pub facility_id: i32,
    #[schema(value_type = String)]
    pub from: NaiveDate,
    #[schema(value_type = String)]
    pub to: NaiveDate,
    #[schema(value_type = f64)]
    pub total_revenue: Decimal,
    pub paid_orders: i64,
    /// Non-cancelled bookings played in the range
    pub bookings: i64,
    pub daily: Vec<DailyRevenue>,
}
