use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::bookings::slot::TimeRange;
use crate::fields::models::{Field, FieldFilter, FieldStatus, FIELD_COLUMNS};
use crate::query::{SQLQueryBuilder, SqlParam, ValidatedQuery};

pub struct FieldRecord {
    pub category_id: i32,
    pub name: String,
    pub price_per_hour: Decimal,
    pub description: Option<String>,
    pub status: FieldStatus,
}

#[derive(Clone)]
pub struct FieldRepository {
    pool: PgPool,
}

impl FieldRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_facility(
        &self,
        facility_id: i32,
        query: &ValidatedQuery,
        filter: &FieldFilter,
    ) -> Result<(Vec<Field>, i64), sqlx::Error> {
        let mut builder = SQLQueryBuilder::new(FIELD_COLUMNS, "fields");
        builder.add_eq_filter("facility_id", SqlParam::Int(facility_id));
        if let Some(category_id) = filter.category_id {
            builder.add_eq_filter("category_id", SqlParam::Int(category_id));
        }
        if let Some(status) = filter.status {
            builder.add_eq_filter("status", SqlParam::Text(status.as_str().to_string()));
        }
        query.apply(&mut builder, &["name"], "id");
        builder.fetch_page(&self.pool).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Field>, sqlx::Error> {
        sqlx::query_as::<_, Field>(&format!("SELECT {} FROM fields WHERE id = $1", FIELD_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Case-insensitive name clash inside one facility
    pub async fn name_taken(
        &self,
        facility_id: i32,
        name: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, sqlx::Error> {
        let taken: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM fields
                WHERE facility_id = $1 AND LOWER(name) = LOWER($2) AND id <> $3
            )
            "#,
        )
        .bind(facility_id)
        .bind(name)
        .bind(exclude_id.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;

        Ok(taken.unwrap_or(false))
    }

    pub async fn create(&self, facility_id: i32, record: FieldRecord) -> Result<Field, sqlx::Error> {
        sqlx::query_as::<_, Field>(&format!(
            r#"
            INSERT INTO fields (facility_id, category_id, name, price_per_hour, description, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            FIELD_COLUMNS
        ))
        .bind(facility_id)
        .bind(record.category_id)
        .bind(record.name)
        .bind(record.price_per_hour)
        .bind(record.description)
        .bind(record.status)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, id: i32, record: FieldRecord) -> Result<Field, sqlx::Error> {
        sqlx::query_as::<_, Field>(&format!(
            r#"
            UPDATE fields
            SET category_id = $1,
                name = $2,
                price_per_hour = $3,
                description = $4,
                status = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {}
            "#,
            FIELD_COLUMNS
        ))
        .bind(record.category_id)
        .bind(record.name)
        .bind(record.price_per_hour)
        .bind(record.description)
        .bind(record.status)
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

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
                WHERE field_id = $1
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

    pub async fn delete(&self, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM fields WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Non-cancelled bookings of a field on a date, ordered by start
    pub async fn booked_ranges(&self, id: i32, date: NaiveDate) -> Result<Vec<TimeRange>, sqlx::Error> {
        let rows: Vec<(NaiveTime, NaiveTime)> = sqlx::query_as(
            r#"
            SELECT start_time, end_time FROM bookings
            WHERE field_id = $1 AND booking_date = $2 AND status <> 'cancelled'
            ORDER BY start_time
            "#,
        )
        .bind(id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(start, end)| TimeRange::new(start, end))
            .collect())
    }
}
