use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::bookings::slot::local_now;
use crate::discounts::{
    models::{
        normalize_code, CreateDiscount, Discount, DiscountCheck, DiscountCheckQuery,
        DiscountFilter, UpdateDiscount,
    },
    repository::{DiscountRecord, DiscountRepository},
};
use crate::error::ApiError;
use crate::facilities::FacilityService;
use crate::query::{QueryParams, QueryValidator};

const SORTABLE: &[(&str, &str)] = &[
    ("code", "code"),
    ("percentage", "percentage"),
    ("start_date", "start_date"),
    ("end_date", "end_date"),
];

fn ensure_date_order(start: chrono::NaiveDate, end: chrono::NaiveDate) -> Result<(), ApiError> {
    if start <= end {
        Ok(())
    } else {
        Err(ApiError::bad_request("Ngày bắt đầu phải trước hoặc bằng ngày kết thúc"))
    }
}

#[derive(Clone)]
pub struct DiscountService {
    repo: DiscountRepository,
    facilities: FacilityService,
}

impl DiscountService {
    pub fn new(repo: DiscountRepository, facilities: FacilityService) -> Self {
        Self { repo, facilities }
    }

    /// Discounts of a facility; only its managers and staff may list them
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        facility_id: i32,
        params: QueryParams,
        filter: DiscountFilter,
    ) -> Result<(Vec<Discount>, i64), ApiError> {
        let validated = QueryValidator::validate(params, SORTABLE)?;
        self.facilities.get_operated(user, facility_id).await?;
        Ok(self
            .repo
            .list_by_facility(facility_id, &validated, &filter)
            .await?)
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: i32) -> Result<Discount, ApiError> {
        let discount = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("mã giảm giá", id))?;
        self.facilities.get_operated(user, discount.facility_id).await?;
        Ok(discount)
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        facility_id: i32,
        request: CreateDiscount,
    ) -> Result<Discount, ApiError> {
        request.validate()?;
        ensure_date_order(request.start_date, request.end_date)?;
        self.facilities.get_managed(user, facility_id).await?;

        let code = normalize_code(&request.code);
        if self.repo.code_taken(facility_id, &code, None).await? {
            return Err(ApiError::conflict(format!("Mã giảm giá '{}' đã tồn tại", code)));
        }

        let discount = self
            .repo
            .create(
                facility_id,
                DiscountRecord {
                    code,
                    description: request.description,
                    percentage: request.percentage,
                    start_date: request.start_date,
                    end_date: request.end_date,
                    quantity: request.quantity,
                    is_active: request.is_active.unwrap_or(true),
                },
            )
            .await?;

        tracing::info!("Discount {} created for facility {}", discount.id, facility_id);
        Ok(discount)
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: i32,
        request: UpdateDiscount,
    ) -> Result<Discount, ApiError> {
        request.validate()?;
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("mã giảm giá", id))?;
        self.facilities.get_managed(user, existing.facility_id).await?;

        let start_date = request.start_date.unwrap_or(existing.start_date);
        let end_date = request.end_date.unwrap_or(existing.end_date);
        ensure_date_order(start_date, end_date)?;

        let code = match request.code {
            Some(code) => {
                let code = normalize_code(&code);
                if code != existing.code
                    && self.repo.code_taken(existing.facility_id, &code, Some(id)).await?
                {
                    return Err(ApiError::conflict(format!("Mã giảm giá '{}' đã tồn tại", code)));
                }
                code
            }
            None => existing.code,
        };

        let discount = self
            .repo
            .update(
                id,
                DiscountRecord {
                    code,
                    description: request.description.or(existing.description),
                    percentage: request.percentage.unwrap_or(existing.percentage),
                    start_date,
                    end_date,
                    quantity: request.quantity.unwrap_or(existing.quantity),
                    is_active: request.is_active.unwrap_or(existing.is_active),
                },
            )
            .await?;

        tracing::info!("Discount {} updated", id);
        Ok(discount)
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: i32) -> Result<(), ApiError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("mã giảm giá", id))?;
        self.facilities.get_managed(user, existing.facility_id).await?;
        self.repo.delete(id).await?;

        tracing::info!("Discount {} deleted", id);
        Ok(())
    }

    /// Whether a code can be applied to a booking on the given date (today by default).
    /// Open to guests, so an unknown code is a negative answer rather than a 404.
    pub async fn check(
        &self,
        facility_id: i32,
        query: DiscountCheckQuery,
    ) -> Result<DiscountCheck, ApiError> {
        let code = normalize_code(&query.code);
        if code.is_empty() {
            return Err(ApiError::bad_request("Vui lòng nhập mã giảm giá"));
        }
        self.facilities.get(facility_id).await?;

        let date = query.date.unwrap_or_else(|| local_now().date());
        let check = match self.repo.find_by_code(facility_id, &code).await? {
            Some(discount) if discount.is_usable_on(date) => DiscountCheck {
                code,
                valid: true,
                percentage: Some(discount.percentage),
                discount_id: Some(discount.id),
                reason: None,
            },
            Some(discount) => DiscountCheck {
                code,
                valid: false,
                percentage: None,
                discount_id: Some(discount.id),
                reason: Some(unusable_reason(&discount, date).to_string()),
            },
            None => DiscountCheck {
                code,
                valid: false,
                percentage: None,
                discount_id: None,
                reason: Some("Mã giảm giá không tồn tại".to_string()),
            },
        };
        Ok(check)
    }
}

fn unusable_reason(discount: &Discount, date: chrono::NaiveDate) -> &'static str {
    if !discount.is_active {
        "Mã giảm giá đã bị vô hiệu hóa"
    } else if date < discount.start_date {
        "Mã giảm giá chưa đến thời gian áp dụng"
    } else if date > discount.end_date {
        "Mã giảm giá đã hết hạn"
    } else {
        "Mã giảm giá đã hết lượt sử dụng"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn discount(is_active: bool, quantity: i32) -> Discount {
        Discount {
            id: 1,
            facility_id: 1,
            code: "A".into(),
            description: None,
            percentage: dec!(5),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            quantity,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_unusable_reasons() {
        let mid = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(unusable_reason(&discount(false, 3), mid), "Mã giảm giá đã bị vô hiệu hóa");
        assert_eq!(
            unusable_reason(&discount(true, 3), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            "Mã giảm giá chưa đến thời gian áp dụng"
        );
        assert_eq!(
            unusable_reason(&discount(true, 3), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()),
            "Mã giảm giá đã hết hạn"
        );
        assert_eq!(unusable_reason(&discount(true, 0), mid), "Mã giảm giá đã hết lượt sử dụng");
    }

    #[test]
    fn test_date_order() {
        let d1 = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert!(ensure_date_order(d1, d1).is_ok());
        assert!(ensure_date_order(d1, d2).is_ok());
        assert!(ensure_date_order(d2, d1).is_err());
    }
}
