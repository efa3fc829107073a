use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::{validate_not_blank, validate_password_strength, validate_phone};

/// Staff row joined with its user account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StaffMember {
    pub id: i32,
    pub user_id: i32,
    pub facility_id: i32,
    pub position: String,
    #[schema(value_type = String, example = "2025-01-01")]
    pub hired_at: NaiveDate,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub const STAFF_COLUMNS: &str = "s.id, s.user_id, s.facility_id, s.position, s.hired_at, \
     u.email, u.full_name, u.phone, u.is_active, s.created_at";

pub const STAFF_FROM: &str = "staff s JOIN users u ON u.id = s.user_id";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStaff {
    #[validate(email(message = "Email không hợp lệ"))]
    pub email: String,

    #[validate(
        length(max = 100, message = "Họ tên không được vượt quá 100 ký tự"),
        custom = "validate_not_blank"
    )]
    pub full_name: String,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[validate(
        length(max = 50, message = "Chức vụ không được vượt quá 50 ký tự"),
        custom = "validate_not_blank"
    )]
    pub position: String,

    /// Generated when omitted and returned once in the response
    #[validate(custom = "validate_password_strength")]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStaff {
    #[validate(
        length(max = 50, message = "Chức vụ không được vượt quá 50 ký tự"),
        custom = "validate_not_blank"
    )]
    pub position: Option<String>,

    #[validate(
        length(max = 100, message = "Họ tên không được vượt quá 100 ký tự"),
        custom = "validate_not_blank"
    )]
    pub full_name: Option<String>,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    pub is_active: Option<bool>,
}

/// Response of staff creation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedStaff {
    #[serde(flatten)]
    pub staff: StaffMember,
    /// Only present when the password was generated by the server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_password: Option<String>,
}
