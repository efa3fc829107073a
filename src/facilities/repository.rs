use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;

use crate::facilities::models::{Facility, FacilityFilter, FACILITY_COLUMNS};
use crate::query::{SQLQueryBuilder, SqlParam, ValidatedQuery};

/// Merged column values written by create and update
pub struct FacilityRecord {
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub images: Vec<String>,
    pub is_active: bool,
}

/// Repository for facility rows
#[derive(Clone)]
pub struct FacilityRepository {
    pool: PgPool,
}

impl FacilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Paged listing with search over name and address
    pub async fn list(
        &self,
        query: &ValidatedQuery,
        filter: &FacilityFilter,
    ) -> Result<(Vec<Facility>, i64), sqlx::Error> {
        let mut builder = SQLQueryBuilder::new(FACILITY_COLUMNS, "facilities");
        if let Some(is_active) = filter.is_active {
            builder.add_eq_filter("is_active", SqlParam::Bool(is_active));
        }
        if let Some(owner_id) = filter.owner_id {
            builder.add_eq_filter("owner_id", SqlParam::Int(owner_id));
        }
        query.apply(&mut builder, &["name", "address"], "id");
        builder.fetch_page(&self.pool).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Facility>, sqlx::Error> {
        sqlx::query_as::<_, Facility>(&format!(
            "SELECT {} FROM facilities WHERE id = $1",
            FACILITY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Owner of a facility, used by the access checks of other modules
    pub async fn find_owner(&self, id: i32) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar("SELECT owner_id FROM facilities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Ids of every facility owned by a user
    pub async fn ids_owned_by(&self, owner_id: i32) -> Result<Vec<i32>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM facilities WHERE owner_id = $1 ORDER BY id")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Whether a user may be recorded as a facility owner
    pub async fn is_valid_owner(&self, user_id: i32) -> Result<bool, sqlx::Error> {
        let found: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND role IN ('owner', 'admin') AND is_active)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(found.unwrap_or(false))
    }

    pub async fn create(&self, owner_id: i32, record: FacilityRecord) -> Result<Facility, sqlx::Error> {
        sqlx::query_as::<_, Facility>(&format!(
            r#"
            INSERT INTO facilities
                (owner_id, name, address, description, phone, open_time, close_time, images, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            FACILITY_COLUMNS
        ))
        .bind(owner_id)
        .bind(record.name)
        .bind(record.address)
        .bind(record.description)
        .bind(record.phone)
        .bind(record.open_time)
        .bind(record.close_time)
        .bind(record.images)
        .bind(record.is_active)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, id: i32, record: FacilityRecord) -> Result<Facility, sqlx::Error> {
        sqlx::query_as::<_, Facility>(&format!(
            r#"
            UPDATE facilities
            SET name = $1,
                address = $2,
                description = $3,
                phone = $4,
                open_time = $5,
                close_time = $6,
                images = $7,
                is_active = $8,
                updated_at = NOW()
            WHERE id = $9
            RETURNING {}
            "#,
            FACILITY_COLUMNS
        ))
        .bind(record.name)
        .bind(record.address)
        .bind(record.description)
        .bind(record.phone)
        .bind(record.open_time)
        .bind(record.close_time)
        .bind(record.images)
        .bind(record.is_active)
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

    /// Non-cancelled bookings that have not ended yet as of `today`/`now`
    pub async fn has_upcoming_bookings(
        &self,
        id: i32,
        today: NaiveDate,
        now: NaiveTime,
    ) -> Result<bool, sqlx::Error> {
        let found: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE facility_id = $1
                  AND status <> 'cancelled'
                  AND (booking_date > $2 OR (booking_date = $2 AND end_time > $3))
            )
            "#,
        )
        .bind(id)
        .bind(today)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(found.unwrap_or(false))
    }

    /// Returns false when no row matched
    pub async fn delete(&self, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM facilities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
