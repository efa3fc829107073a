use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::facilities::FacilityService;
use crate::facility_services::{
    models::{CreateService, ServiceFilter, ServiceItem, UpdateService},
    repository::{ServiceRecord, ServiceRepository},
};
use crate::query::{QueryParams, QueryValidator};

const SORTABLE: &[(&str, &str)] = &[("name", "name"), ("price", "price")];

/// Catalogue of extras a facility sells with bookings
#[derive(Clone)]
pub struct ServiceCatalog {
    repo: ServiceRepository,
    facilities: FacilityService,
}

impl ServiceCatalog {
    pub fn new(repo: ServiceRepository, facilities: FacilityService) -> Self {
        Self { repo, facilities }
    }

    pub async fn list(
        &self,
        facility_id: i32,
        params: QueryParams,
        filter: ServiceFilter,
    ) -> Result<(Vec<ServiceItem>, i64), ApiError> {
        let validated = QueryValidator::validate(params, SORTABLE)?;
        self.facilities.get(facility_id).await?;
        Ok(self
            .repo
            .list_by_facility(facility_id, &validated, &filter)
            .await?)
    }

    pub async fn get(&self, id: i32) -> Result<ServiceItem, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("dịch vụ", id))
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        facility_id: i32,
        request: CreateService,
    ) -> Result<ServiceItem, ApiError> {
        request.validate()?;
        self.facilities.get_managed(user, facility_id).await?;

        let service = self
            .repo
            .create(
                facility_id,
                ServiceRecord {
                    name: request.name.trim().to_string(),
                    price: request.price,
                    unit: request.unit.trim().to_string(),
                    description: request.description,
                    is_active: request.is_active.unwrap_or(true),
                },
            )
            .await?;

        tracing::info!("Service {} created in facility {}", service.id, facility_id);
        Ok(service)
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: i32,
        request: UpdateService,
    ) -> Result<ServiceItem, ApiError> {
        request.validate()?;
        let existing = self.get(id).await?;
        self.facilities.get_managed(user, existing.facility_id).await?;

        let service = self
            .repo
            .update(
                id,
                ServiceRecord {
                    name: request
                        .name
                        .map(|n| n.trim().to_string())
                        .unwrap_or(existing.name),
                    price: request.price.unwrap_or(existing.price),
                    unit: request
                        .unit
                        .map(|u| u.trim().to_string())
                        .unwrap_or(existing.unit),
                    description: request.description.or(existing.description),
                    is_active: request.is_active.unwrap_or(existing.is_active),
                },
            )
            .await?;

        tracing::info!("Service {} updated", id);
        Ok(service)
    }

    /// Order lines keep their name snapshot, so a sold service can still be deleted
    pub async fn delete(&self, user: &AuthenticatedUser, id: i32) -> Result<(), ApiError> {
        let existing = self.get(id).await?;
        self.facilities.get_managed(user, existing.facility_id).await?;
        self.repo.delete(id).await?;

        tracing::info!("Service {} deleted", id);
        Ok(())
    }
}
