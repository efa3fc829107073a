use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::{validate_not_blank, validate_percentage};

/// Percentage discount code of a facility
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Discount {
    pub id: i32,
    pub facility_id: i32,
    pub code: String,
    pub description: Option<String>,
    #[schema(value_type = f64)]
    pub percentage: Decimal,
    #[schema(value_type = String, example = "2025-06-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, example = "2025-06-30")]
    pub end_date: NaiveDate,
    /// Remaining uses
    pub quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const DISCOUNT_COLUMNS: &str = "id, facility_id, code, description, percentage, start_date, \
     end_date, quantity, is_active, created_at, updated_at";

impl Discount {
    /// Active, inside its date range and with uses left
    pub fn is_usable_on(&self, date: NaiveDate) -> bool {
        self.is_active && self.start_date <= date && date <= self.end_date && self.quantity > 0
    }
}

/// Codes are compared and stored upper-case without surrounding spaces
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDiscount {
    #[validate(
        length(max = 50, message = "Mã giảm giá không được vượt quá 50 ký tự"),
        custom = "validate_not_blank"
    )]
    pub code: String,

    pub description: Option<String>,

    #[schema(value_type = f64)]
    #[validate(custom = "validate_percentage")]
    pub percentage: Decimal,

    #[schema(value_type = String)]
    pub start_date: NaiveDate,

    #[schema(value_type = String)]
    pub end_date: NaiveDate,

    #[validate(range(min = 0, message = "Số lượng không được âm"))]
    pub quantity: i32,

    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDiscount {
    #[validate(
        length(max = 50, message = "Mã giảm giá không được vượt quá 50 ký tự"),
        custom = "validate_not_blank"
    )]
    pub code: Option<String>,

    pub description: Option<String>,

    #[schema(value_type = Option<f64>)]
    #[validate(custom = "validate_percentage")]
    pub percentage: Option<Decimal>,

    #[schema(value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,

    #[schema(value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,

    #[validate(range(min = 0, message = "Số lượng không được âm"))]
    pub quantity: Option<i32>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiscountFilter {
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DiscountCheckQuery {
    pub code: String,
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

/// Result of checking whether a code can be applied
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DiscountCheck {
    pub code: String,
    pub valid: bool,
    #[schema(value_type = Option<f64>)]
    pub percentage: Option<Decimal>,
    pub discount_id: Option<i32>,
    pub reason: Option<String>,
}
