use validator::Validate;

use crate::auth::{policy, policy::FacilityScope, AuthenticatedUser, Role};
use crate::bookings::slot::local_now;
use crate::error::ApiError;
use crate::facilities::{
    models::{CreateFacility, Facility, FacilityFilter, UpdateFacility},
    repository::{FacilityRecord, FacilityRepository},
};
use crate::query::{QueryParams, QueryValidator};
use crate::validation::ensure_time_order;

const SORTABLE: &[(&str, &str)] = &[("name", "name"), ("created_at", "created_at")];

/// Business logic for facilities
#[derive(Clone)]
pub struct FacilityService {
    repo: FacilityRepository,
}

impl FacilityService {
    pub fn new(repo: FacilityRepository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &FacilityRepository {
        &self.repo
    }

    pub async fn list(
        &self,
        params: QueryParams,
        filter: FacilityFilter,
    ) -> Result<(Vec<Facility>, i64), ApiError> {
        let validated = QueryValidator::validate(params, SORTABLE)?;
        Ok(self.repo.list(&validated, &filter).await?)
    }

    pub async fn get(&self, id: i32) -> Result<Facility, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("cơ sở", id))
    }

    /// Load a facility and check the caller may manage it
    pub async fn get_managed(&self, user: &AuthenticatedUser, id: i32) -> Result<Facility, ApiError> {
        let facility = self.get(id).await?;
        policy::ensure_can_manage(user, facility.owner_id)?;
        Ok(facility)
    }

    /// Load a facility and check the caller may operate it (managers and its staff)
    pub async fn get_operated(&self, user: &AuthenticatedUser, id: i32) -> Result<Facility, ApiError> {
        let facility = self.get(id).await?;
        policy::ensure_can_operate(user, facility.id, facility.owner_id)?;
        Ok(facility)
    }

    /// Facilities whose bookings and orders the caller can see
    pub async fn scope_for(&self, user: &AuthenticatedUser) -> Result<FacilityScope, ApiError> {
        let scope = match user.role {
            Role::Admin => FacilityScope::All,
            Role::Owner => FacilityScope::Facilities(self.repo.ids_owned_by(user.user_id).await?),
            Role::Staff => FacilityScope::Facilities(user.facility_id.into_iter().collect()),
            Role::Customer => FacilityScope::Customer(user.user_id),
        };
        Ok(scope)
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateFacility,
    ) -> Result<Facility, ApiError> {
        request.validate()?;
        ensure_time_order(request.open_time, request.close_time).map_err(|_| {
            ApiError::bad_request("Giờ đóng cửa phải sau giờ mở cửa")
        })?;

        let owner_id = match (user.role, request.owner_id) {
            (Role::Admin, Some(owner_id)) => {
                if !self.repo.is_valid_owner(owner_id).await? {
                    return Err(ApiError::bad_request("Chủ sở hữu không hợp lệ"));
                }
                owner_id
            }
            (Role::Admin, None) | (Role::Owner, _) => user.user_id,
            _ => return Err(ApiError::forbidden()),
        };

        let facility = self
            .repo
            .create(
                owner_id,
                FacilityRecord {
                    name: request.name.trim().to_string(),
                    address: request.address.trim().to_string(),
                    description: request.description,
                    phone: request.phone,
                    open_time: request.open_time,
                    close_time: request.close_time,
                    images: request.images,
                    is_active: true,
                },
            )
            .await?;

        tracing::info!("Facility {} created by user {}", facility.id, user.user_id);
        Ok(facility)
    }

    /// Partial update; omitted fields keep their current value
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: i32,
        request: UpdateFacility,
    ) -> Result<Facility, ApiError> {
        request.validate()?;
        let existing = self.get_managed(user, id).await?;

        let open_time = request.open_time.unwrap_or(existing.open_time);
        let close_time = request.close_time.unwrap_or(existing.close_time);
        ensure_time_order(open_time, close_time).map_err(|_| {
            ApiError::bad_request("Giờ đóng cửa phải sau giờ mở cửa")
        })?;

        let record = FacilityRecord {
            name: request
                .name
                .map(|n| n.trim().to_string())
                .unwrap_or(existing.name),
            address: request
                .address
                .map(|a| a.trim().to_string())
                .unwrap_or(existing.address),
            description: request.description.or(existing.description),
            phone: request.phone.or(existing.phone),
            open_time,
            close_time,
            images: request.images.unwrap_or(existing.images),
            is_active: request.is_active.unwrap_or(existing.is_active),
        };

        let facility = self.repo.update(id, record).await?;
        tracing::info!("Facility {} updated by user {}", id, user.user_id);
        Ok(facility)
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: i32) -> Result<(), ApiError> {
        self.get_managed(user, id).await?;

        let now = local_now();
        if self.repo.has_upcoming_bookings(id, now.date(), now.time()).await? {
            return Err(ApiError::conflict(
                "Không thể xóa cơ sở đang có lịch đặt sắp tới",
            ));
        }

        if !self.repo.delete(id).await? {
            return Err(ApiError::not_found("cơ sở", id));
        }

        tracing::info!("Facility {} deleted by user {}", id, user.user_id);
        Ok(())
    }
}
