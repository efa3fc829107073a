use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::{validate_non_negative_amount, validate_not_blank};

/// Extra sold with a booking (drinks, racket rental, ...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ServiceItem {
    pub id: i32,
    pub facility_id: i32,
    pub name: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub unit: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const SERVICE_COLUMNS: &str =
    "id, facility_id, name, price, unit, description, is_active, created_at, updated_at";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateService {
    #[validate(
        length(max = 100, message = "Tên dịch vụ không được vượt quá 100 ký tự"),
        custom = "validate_not_blank"
    )]
    pub name: String,

    #[schema(value_type = f64)]
    #[validate(custom = "validate_non_negative_amount")]
    pub price: Decimal,

    #[validate(
        length(max = 20, message = "Đơn vị không được vượt quá 20 ký tự"),
        custom = "validate_not_blank"
    )]
    pub unit: String,

    pub description: Option<String>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateService {
    #[validate(
        length(max = 100, message = "Tên dịch vụ không được vượt quá 100 ký tự"),
        custom = "validate_not_blank"
    )]
    pub name: Option<String>,

    #[schema(value_type = Option<f64>)]
    #[validate(custom = "validate_non_negative_amount")]
    pub price: Option<Decimal>,

    #[validate(
        length(max = 20, message = "Đơn vị không được vượt quá 20 ký tự"),
        custom = "validate_not_blank"
    )]
    pub unit: Option<String>,

    pub description: Option<String>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceFilter {
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_over_20_chars_rejected() {
        let request: CreateService = serde_json::from_value(json!({
            "name": "Nước suối",
            "price": 10000,
            "unit": "u".repeat(21)
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("unit"));
    }

    #[test]
    fn test_zero_price_allowed() {
        let request: CreateService = serde_json::from_value(json!({
            "name": "Gửi xe",
            "price": 0,
            "unit": "lượt"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
    }
}
