use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::bookings::slot::{free_ranges, local_now};
use crate::categories::CategoryRepository;
use crate::error::ApiError;
use crate::facilities::FacilityService;
use crate::fields::{
    models::{CreateField, Field, FieldFilter, FieldSlots, UpdateField},
    repository::{FieldRecord, FieldRepository},
};
use crate::query::{QueryParams, QueryValidator};

const SORTABLE: &[(&str, &str)] = &[
    ("name", "name"),
    ("price_per_hour", "price_per_hour"),
    ("created_at", "created_at"),
];

#[derive(Clone)]
pub struct FieldService {
    repo: FieldRepository,
    facilities: FacilityService,
    categories: CategoryRepository,
}

impl FieldService {
    pub fn new(
        repo: FieldRepository,
        facilities: FacilityService,
        categories: CategoryRepository,
    ) -> Self {
        Self {
            repo,
            facilities,
            categories,
        }
    }

    pub async fn list(
        &self,
        facility_id: i32,
        params: QueryParams,
        filter: FieldFilter,
    ) -> Result<(Vec<Field>, i64), ApiError> {
        let validated = QueryValidator::validate(params, SORTABLE)?;
        self.facilities.get(facility_id).await?;
        Ok(self
            .repo
            .list_by_facility(facility_id, &validated, &filter)
            .await?)
    }

    pub async fn get(&self, id: i32) -> Result<Field, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("sân", id))
    }

    async fn ensure_category(&self, category_id: i32) -> Result<(), ApiError> {
        if self.categories.exists(category_id).await? {
            Ok(())
        } else {
            Err(ApiError::bad_request(format!(
                "Loại sân {} không tồn tại",
                category_id
            )))
        }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        facility_id: i32,
        request: CreateField,
    ) -> Result<Field, ApiError> {
        request.validate()?;
        self.facilities.get_managed(user, facility_id).await?;
        self.ensure_category(request.category_id).await?;

        let name = request.name.trim().to_string();
        if self.repo.name_taken(facility_id, &name, None).await? {
            return Err(ApiError::conflict(format!("Tên sân '{}' đã tồn tại trong cơ sở", name)));
        }

        let field = self
            .repo
            .create(
                facility_id,
                FieldRecord {
                    category_id: request.category_id,
                    name,
                    price_per_hour: request.price_per_hour,
                    description: request.description,
                    status: request.status.unwrap_or_default(),
                },
            )
            .await?;

        tracing::info!("Field {} created in facility {}", field.id, facility_id);
        Ok(field)
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: i32,
        request: UpdateField,
    ) -> Result<Field, ApiError> {
        request.validate()?;
        let existing = self.get(id).await?;
        self.facilities.get_managed(user, existing.facility_id).await?;

        if let Some(category_id) = request.category_id {
            if category_id != existing.category_id {
                self.ensure_category(category_id).await?;
            }
        }

        let name = match request.name {
            Some(name) => {
                let name = name.trim().to_string();
                if self
                    .repo
                    .name_taken(existing.facility_id, &name, Some(id))
                    .await?
                {
                    return Err(ApiError::conflict(format!(
                        "Tên sân '{}' đã tồn tại trong cơ sở",
                        name
                    )));
                }
                name
            }
            None => existing.name,
        };

        let field = self
            .repo
            .update(
                id,
                FieldRecord {
                    category_id: request.category_id.unwrap_or(existing.category_id),
                    name,
                    price_per_hour: request.price_per_hour.unwrap_or(existing.price_per_hour),
                    description: request.description.or(existing.description),
                    status: request.status.unwrap_or(existing.status),
                },
            )
            .await?;

        tracing::info!("Field {} updated", id);
        Ok(field)
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: i32) -> Result<(), ApiError> {
        let existing = self.get(id).await?;
        self.facilities.get_managed(user, existing.facility_id).await?;

        let now = local_now();
        if self.repo.has_upcoming_bookings(id, now.date(), now.time()).await? {
            return Err(ApiError::conflict("Không thể xóa sân đang có lịch đặt sắp tới"));
        }
        self.repo.delete(id).await?;

        tracing::info!("Field {} deleted", id);
        Ok(())
    }

    /// Booked and free ranges of a field on one day
    pub async fn slots(&self, id: i32, date: chrono::NaiveDate) -> Result<FieldSlots, ApiError> {
        let field = self.get(id).await?;
        let facility = self.facilities.get(field.facility_id).await?;
        let booked = self.repo.booked_ranges(id, date).await?;
        let free = free_ranges(facility.open_time, facility.close_time, &booked);

        Ok(FieldSlots {
            field_id: id,
            date,
            open_time: facility.open_time,
            close_time: facility.close_time,
            booked,
            free,
        })
    }
}
