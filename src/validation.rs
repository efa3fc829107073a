// Validation utilities module
// Custom validator functions for booking-domain rules

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{9,11}$").expect("phone pattern compiles"));

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Phone numbers are 9 to 11 digits, nothing else
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(error(
            "invalid_phone",
            "Số điện thoại chỉ được chứa 9-11 chữ số",
        ))
    }
}

/// Rejects strings that are empty after trimming
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "Giá trị không được để trống"))
    } else {
        Ok(())
    }
}

/// Money amounts must be zero or positive
pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        Err(error("negative_amount", "Giá không được âm"))
    } else {
        Ok(())
    }
}

/// Discount percentage between 0 and 100 inclusive
pub fn validate_percentage(percentage: &Decimal) -> Result<(), ValidationError> {
    if *percentage < Decimal::ZERO || *percentage > Decimal::ONE_HUNDRED {
        Err(error(
            "percentage_out_of_range",
            "Phần trăm giảm giá phải nằm trong khoảng 0 đến 100",
        ))
    } else {
        Ok(())
    }
}

/// Image lists hold absolute http(s) URLs
pub fn validate_image_urls(urls: &Vec<String>) -> Result<(), ValidationError> {
    let all_valid = urls.iter().all(|url| {
        let url = url.trim();
        (url.starts_with("http://") || url.starts_with("https://")) && !url.contains(' ')
    });
    if all_valid {
        Ok(())
    } else {
        Err(error("invalid_image_url", "Đường dẫn hình ảnh không hợp lệ"))
    }
}

/// Passwords need at least one letter and one digit (length is checked separately)
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if has_letter && has_digit {
        Ok(())
    } else {
        Err(error(
            "weak_password",
            "Mật khẩu phải chứa ít nhất một chữ cái và một chữ số",
        ))
    }
}

/// Shared check for open/close and start/end pairs
pub fn ensure_time_order(start: NaiveTime, end: NaiveTime) -> Result<(), ValidationError> {
    if end > start {
        Ok(())
    } else {
        Err(error(
            "invalid_time_range",
            "Giờ kết thúc phải sau giờ bắt đầu",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_phone_digits_only() {
        assert!(validate_phone("0912345678").is_ok());
        assert!(validate_phone("091234567").is_ok());
        assert!(validate_phone("09123abc78").is_err());
        assert!(validate_phone("+84912345678").is_err());
        assert!(validate_phone("0912").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn test_not_blank() {
        assert!(validate_not_blank("Nguyễn Văn A").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(validate_percentage(&dec!(0)).is_ok());
        assert!(validate_percentage(&dec!(100)).is_ok());
        assert!(validate_percentage(&dec!(12.5)).is_ok());
        assert!(validate_percentage(&dec!(-0.01)).is_err());
        assert!(validate_percentage(&dec!(100.01)).is_err());
    }

    #[test]
    fn test_non_negative_amount() {
        assert!(validate_non_negative_amount(&dec!(0)).is_ok());
        assert!(validate_non_negative_amount(&dec!(150000)).is_ok());
        assert!(validate_non_negative_amount(&dec!(-1)).is_err());
    }

    #[test]
    fn test_image_urls() {
        assert!(validate_image_urls(&vec!["https://cdn.example.com/a.jpg".into()]).is_ok());
        assert!(validate_image_urls(&vec![]).is_ok());
        assert!(validate_image_urls(&vec!["ftp://x/a.jpg".into()]).is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("abc12345").is_ok());
        assert!(validate_password_strength("abcdefgh").is_err());
        assert!(validate_password_strength("12345678").is_err());
    }

    #[test]
    fn test_time_order() {
        let six = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        let ten = NaiveTime::from_hms_opt(22, 0, 0).unwrap();
        assert!(ensure_time_order(six, ten).is_ok());
        assert!(ensure_time_order(ten, six).is_err());
        assert!(ensure_time_order(six, six).is_err());
    }
}
