use crate::error::ApiError;
use crate::orders::models::PaymentStatus;

/// Error types for order operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Không tìm thấy hóa đơn với id {0}")]
    NotFound(i32),

    #[error("Không thể chuyển trạng thái thanh toán từ {from} sang {to}")]
    InvalidTransition { from: PaymentStatus, to: PaymentStatus },

    #[error("Không thể thanh toán cho lịch đặt đã hủy")]
    BookingCancelled,

    #[error("Khoảng thời gian không hợp lệ: ngày bắt đầu phải trước hoặc bằng ngày kết thúc")]
    InvalidRange,

    #[error("Bạn không có quyền thao tác trên hóa đơn này")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(id) => ApiError::not_found("hóa đơn", id),
            OrderError::Forbidden => ApiError::Forbidden(err.to_string()),
            OrderError::Database(e) => ApiError::from(e),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}
