use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::{validate_image_urls, validate_not_blank, validate_phone};

/// Sports facility (a venue holding several fields)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Facility {
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    #[schema(value_type = String, example = "06:00:00")]
    pub open_time: NaiveTime,
    #[schema(value_type = String, example = "22:00:00")]
    pub close_time: NaiveTime,
    pub images: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const FACILITY_COLUMNS: &str = "id, owner_id, name, address, description, phone, \
     open_time, close_time, images, is_active, created_at, updated_at";

/// Request body for creating a facility
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFacility {
    #[validate(
        length(max = 100, message = "Tên cơ sở không được vượt quá 100 ký tự"),
        custom = "validate_not_blank"
    )]
    pub name: String,

    #[validate(
        length(max = 255, message = "Địa chỉ không được vượt quá 255 ký tự"),
        custom = "validate_not_blank"
    )]
    pub address: String,

    pub description: Option<String>,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[schema(value_type = String, example = "06:00:00")]
    pub open_time: NaiveTime,

    #[schema(value_type = String, example = "22:00:00")]
    pub close_time: NaiveTime,

    #[serde(default)]
    #[validate(
        length(max = 10, message = "Tối đa 10 hình ảnh"),
        custom = "validate_image_urls"
    )]
    pub images: Vec<String>,

    /// Only honoured for admins; owners always own what they create
    pub owner_id: Option<i32>,
}

/// Request body for updating a facility (all fields optional)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFacility {
    #[validate(
        length(max = 100, message = "Tên cơ sở không được vượt quá 100 ký tự"),
        custom = "validate_not_blank"
    )]
    pub name: Option<String>,

    #[validate(
        length(max = 255, message = "Địa chỉ không được vượt quá 255 ký tự"),
        custom = "validate_not_blank"
    )]
    pub address: Option<String>,

    pub description: Option<String>,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[schema(value_type = Option<String>)]
    pub open_time: Option<NaiveTime>,

    #[schema(value_type = Option<String>)]
    pub close_time: Option<NaiveTime>,

    #[validate(
        length(max = 10, message = "Tối đa 10 hình ảnh"),
        custom = "validate_image_urls"
    )]
    pub images: Option<Vec<String>>,

    pub is_active: Option<bool>,
}

/// Extra list filters next to the shared paging parameters
#[derive(Debug, Default, Deserialize)]
pub struct FacilityFilter {
    pub is_active: Option<bool>,
    pub owner_id: Option<i32>,
}
