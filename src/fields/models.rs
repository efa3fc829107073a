use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::bookings::slot::TimeRange;
use crate::validation::{validate_non_negative_amount, validate_not_blank};

/// Whether a field takes bookings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    Active,
    Maintenance,
    Inactive,
}

impl FieldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldStatus::Active => "active",
            FieldStatus::Maintenance => "maintenance",
            FieldStatus::Inactive => "inactive",
        }
    }
}

impl Default for FieldStatus {
    fn default() -> Self {
        FieldStatus::Active
    }
}

/// Bookable court or pitch of a facility
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Field {
    pub id: i32,
    pub facility_id: i32,
    pub category_id: i32,
    pub name: String,
    #[schema(value_type = f64)]
    pub price_per_hour: Decimal,
    pub description: Option<String>,
    pub status: FieldStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const FIELD_COLUMNS: &str = "id, facility_id, category_id, name, price_per_hour, \
     description, status, created_at, updated_at";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateField {
    #[validate(
        length(max = 100, message = "Tên sân không được vượt quá 100 ký tự"),
        custom = "validate_not_blank"
    )]
    pub name: String,

    pub category_id: i32,

    #[schema(value_type = f64)]
    #[validate(custom = "validate_non_negative_amount")]
    pub price_per_hour: Decimal,

    pub description: Option<String>,

    pub status: Option<FieldStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateField {
    #[validate(
        length(max = 100, message = "Tên sân không được vượt quá 100 ký tự"),
        custom = "validate_not_blank"
    )]
    pub name: Option<String>,

    pub category_id: Option<i32>,

    #[schema(value_type = Option<f64>)]
    #[validate(custom = "validate_non_negative_amount")]
    pub price_per_hour: Option<Decimal>,

    pub description: Option<String>,

    pub status: Option<FieldStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FieldFilter {
    pub category_id: Option<i32>,
    pub status: Option<FieldStatus>,
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub date: NaiveDate,
}

/// Occupancy of one field on one day
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldSlots {
    pub field_id: i32,
    #[schema(value_type = String, example = "2025-06-01")]
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub open_time: NaiveTime,
    #[schema(value_type = String)]
    pub close_time: NaiveTime,
    pub booked: Vec<TimeRange>,
    pub free: Vec<TimeRange>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_defaults_to_active_when_omitted() {
        let request: CreateField = serde_json::from_value(json!({
            "name": "Sân 1",
            "category_id": 1,
            "price_per_hour": "200000"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.status.unwrap_or_default(), FieldStatus::Active);
    }

    #[test]
    fn test_negative_price_rejected() {
        let request: CreateField = serde_json::from_value(json!({
            "name": "Sân 1",
            "category_id": 1,
            "price_per_hour": -1
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price_per_hour"));
    }

    #[test]
    fn test_status_serialises_lowercase() {
        assert_eq!(
            serde_json::to_value(FieldStatus::Maintenance).unwrap(),
            json!("maintenance")
        );
    }
}
