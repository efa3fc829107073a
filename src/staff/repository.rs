use sqlx::{PgPool, Postgres, Transaction};

use crate::query::{SQLQueryBuilder, SqlParam, ValidatedQuery};
use crate::staff::models::{StaffMember, STAFF_COLUMNS, STAFF_FROM};

#[derive(Clone)]
pub struct StaffRepository {
    pool: PgPool,
}

impl StaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_facility(
        &self,
        facility_id: i32,
        query: &ValidatedQuery,
    ) -> Result<(Vec<StaffMember>, i64), sqlx::Error> {
        let mut builder = SQLQueryBuilder::new(STAFF_COLUMNS, STAFF_FROM);
        builder.add_eq_filter("s.facility_id", SqlParam::Int(facility_id));
        query.apply(&mut builder, &["u.full_name", "u.email", "s.position"], "s.id");
        builder.fetch_page(&self.pool).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<StaffMember>, sqlx::Error> {
        sqlx::query_as::<_, StaffMember>(&format!(
            "SELECT {} FROM {} WHERE s.id = $1",
            STAFF_COLUMNS, STAFF_FROM
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i32,
        facility_id: i32,
        position: &str,
    ) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO staff (user_id, facility_id, position) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id)
        .bind(facility_id)
        .bind(position)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn update_position(
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
        position: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE staff SET position = $1, updated_at = NOW() WHERE id = $2")
            .bind(position)
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub async fn update_user(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i32,
        full_name: &str,
        phone: Option<&str>,
        is_active: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET full_name = $1, phone = $2, is_active = $3, updated_at = NOW() WHERE id = $4",
        )
        .bind(full_name)
        .bind(phone)
        .bind(is_active)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Remove the staff row and disable its login; the user row is kept for history
    pub async fn remove(tx: &mut Transaction<'_, Postgres>, id: i32, user_id: i32) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM staff WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        sqlx::query("UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}
