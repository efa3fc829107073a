use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::discounts::models::{Discount, DiscountFilter, DISCOUNT_COLUMNS};
use crate::query::{SQLQueryBuilder, SqlParam, ValidatedQuery};

/// Column values written by create and update
pub struct DiscountRecord {
    pub code: String,
    pub description: Option<String>,
    pub percentage: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub quantity: i32,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct DiscountRepository {
    pool: PgPool,
}

impl DiscountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_facility(
        &self,
        facility_id: i32,
        query: &ValidatedQuery,
        filter: &DiscountFilter,
    ) -> Result<(Vec<Discount>, i64), sqlx::Error> {
        let mut builder = SQLQueryBuilder::new(DISCOUNT_COLUMNS, "discounts");
        builder.add_eq_filter("facility_id", SqlParam::Int(facility_id));
        if let Some(is_active) = filter.is_active {
            builder.add_eq_filter("is_active", SqlParam::Bool(is_active));
        }
        query.apply(&mut builder, &["code", "description"], "id");
        builder.fetch_page(&self.pool).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Discount>, sqlx::Error> {
        sqlx::query_as::<_, Discount>(&format!(
            "SELECT {} FROM discounts WHERE id = $1",
            DISCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_by_code(
        &self,
        facility_id: i32,
        code: &str,
    ) -> Result<Option<Discount>, sqlx::Error> {
        sqlx::query_as::<_, Discount>(&format!(
            "SELECT {} FROM discounts WHERE facility_id = $1 AND code = $2",
            DISCOUNT_COLUMNS
        ))
        .bind(facility_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn code_taken(
        &self,
        facility_id: i32,
        code: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, sqlx::Error> {
        let taken: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM discounts WHERE facility_id = $1 AND code = $2 AND id <> $3)",
        )
        .bind(facility_id)
        .bind(code)
        .bind(exclude_id.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;

        Ok(taken.unwrap_or(false))
    }

    pub async fn create(&self, facility_id: i32, record: DiscountRecord) -> Result<Discount, sqlx::Error> {
        sqlx::query_as::<_, Discount>(&format!(
            r#"
            INSERT INTO discounts
                (facility_id, code, description, percentage, start_date, end_date, quantity, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            DISCOUNT_COLUMNS
        ))
        .bind(facility_id)
        .bind(record.code)
        .bind(record.description)
        .bind(record.percentage)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.quantity)
        .bind(record.is_active)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, id: i32, record: DiscountRecord) -> Result<Discount, sqlx::Error> {
        sqlx::query_as::<_, Discount>(&format!(
            r#"
            UPDATE discounts
            SET code = $1,
                description = $2,
                percentage = $3,
                start_date = $4,
                end_date = $5,
                quantity = $6,
                is_active = $7,
                updated_at = NOW()
            WHERE id = $8
            RETURNING {}
            "#,
            DISCOUNT_COLUMNS
        ))
        .bind(record.code)
        .bind(record.description)
        .bind(record.percentage)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.quantity)
        .bind(record.is_active)
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete(&self, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM discounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lock a code row of a facility for the rest of the transaction
    pub async fn lock_by_code(
        tx: &mut Transaction<'_, Postgres>,
        facility_id: i32,
        code: &str,
    ) -> Result<Option<Discount>, sqlx::Error> {
        sqlx::query_as::<_, Discount>(&format!(
            "SELECT {} FROM discounts WHERE facility_id = $1 AND code = $2 FOR UPDATE",
            DISCOUNT_COLUMNS
        ))
        .bind(facility_id)
        .bind(code)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Consume one use; the row must already be locked
    pub async fn consume(tx: &mut Transaction<'_, Postgres>, id: i32) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE discounts SET quantity = quantity - 1, updated_at = NOW() WHERE id = $1 AND quantity > 0",
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Give back one use (booking cancelled)
    pub async fn restore(tx: &mut Transaction<'_, Postgres>, id: i32) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE discounts SET quantity = quantity + 1, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}
