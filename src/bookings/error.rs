use chrono::NaiveTime;

use crate::error::ApiError;

/// Error types for booking operations
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Không tìm thấy lịch đặt với id {0}")]
    NotFound(i32),

    #[error("Không tìm thấy sân với id {0}")]
    FieldNotFound(i32),

    #[error("Sân hiện không nhận đặt lịch")]
    FieldUnavailable,

    #[error("Cơ sở hiện không hoạt động")]
    FacilityInactive,

    #[error("Vui lòng nhập tên khách hàng")]
    GuestNameRequired,

    #[error("Tên khách hàng không được vượt quá 100 ký tự")]
    GuestNameTooLong,

    #[error("Số điện thoại khách hàng chỉ được chứa 9-11 chữ số")]
    GuestPhoneInvalid,

    #[error("Khung giờ phải nằm trong giờ mở cửa ({}-{})", .open.format("%H:%M"), .close.format("%H:%M"))]
    OutsideOpeningHours { open: NaiveTime, close: NaiveTime },

    #[error("Không thể đặt sân cho thời điểm đã qua")]
    InPast,

    #[error("Dịch vụ {0} không tồn tại hoặc không thuộc cơ sở này")]
    InvalidService(i32),

    #[error("Mã giảm giá không hợp lệ hoặc đã hết lượt sử dụng")]
    InvalidDiscount,

    #[error("Khung giờ này đã có người đặt")]
    SlotTaken,

    #[error("{0}")]
    InvalidTransition(String),

    #[error("Bạn không có quyền thao tác trên lịch đặt này")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotFound(id) => ApiError::not_found("lịch đặt", id),
            BookingError::FieldNotFound(id) => ApiError::not_found("sân", id),
            BookingError::SlotTaken => ApiError::conflict(err.to_string()),
            BookingError::Forbidden => ApiError::Forbidden(err.to_string()),
            BookingError::Database(e) => ApiError::from(e),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::from(BookingError::SlotTaken).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(BookingError::FieldNotFound(3)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(BookingError::InvalidDiscount).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(BookingError::Forbidden).status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_opening_hours_message() {
        let err = BookingError::OutsideOpeningHours {
            open: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            close: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
        };
        assert_eq!(err.to_string(), "Khung giờ phải nằm trong giờ mở cửa (06:00-22:00)");
    }
}
