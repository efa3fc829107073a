use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::facility_services::models::{ServiceItem, ServiceFilter, SERVICE_COLUMNS};
use crate::query::{SQLQueryBuilder, SqlParam, ValidatedQuery};

pub struct ServiceRecord {
    pub name: String,
    pub price: Decimal,
    pub unit: String,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct ServiceRepository {
    pool: PgPool,
}

impl ServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_facility(
        &self,
        facility_id: i32,
        query: &ValidatedQuery,
        filter: &ServiceFilter,
    ) -> Result<(Vec<ServiceItem>, i64), sqlx::Error> {
        let mut builder = SQLQueryBuilder::new(SERVICE_COLUMNS, "services");
        builder.add_eq_filter("facility_id", SqlParam::Int(facility_id));
        if let Some(is_active) = filter.is_active {
            builder.add_eq_filter("is_active", SqlParam::Bool(is_active));
        }
        query.apply(&mut builder, &["name", "description"], "id");
        builder.fetch_page(&self.pool).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<ServiceItem>, sqlx::Error> {
        sqlx::query_as::<_, ServiceItem>(&format!(
            "SELECT {} FROM services WHERE id = $1",
            SERVICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create(
        &self,
        facility_id: i32,
        record: ServiceRecord,
    ) -> Result<ServiceItem, sqlx::Error> {
        sqlx::query_as::<_, ServiceItem>(&format!(
            r#"
            INSERT INTO services (facility_id, name, price, unit, description, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SERVICE_COLUMNS
        ))
        .bind(facility_id)
        .bind(record.name)
        .bind(record.price)
        .bind(record.unit)
        .bind(record.description)
        .bind(record.is_active)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, id: i32, record: ServiceRecord) -> Result<ServiceItem, sqlx::Error> {
        sqlx::query_as::<_, ServiceItem>(&format!(
            r#"
            UPDATE services
            SET name = $1,
                price = $2,
                unit = $3,
                description = $4,
                is_active = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {}
            "#,
            SERVICE_COLUMNS
        ))
        .bind(record.name)
        .bind(record.price)
        .bind(record.unit)
        .bind(record.description)
        .bind(record.is_active)
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Active services of a facility among `ids`, read inside a booking transaction
    pub async fn find_active_in(
        tx: &mut Transaction<'_, Postgres>,
        facility_id: i32,
        ids: &[i32],
    ) -> Result<Vec<ServiceItem>, sqlx::Error> {
        sqlx::query_as::<_, ServiceItem>(&format!(
            "SELECT {} FROM services WHERE facility_id = $1 AND is_active AND id = ANY($2)",
            SERVICE_COLUMNS
        ))
        .bind(facility_id)
        .bind(ids)
        .fetch_all(&mut **tx)
        .await
    }
}
