use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::auth::policy::FacilityScope;
use crate::bookings::models::{
    Booking, BookingFilter, BookingStatus, BookingSummary, BOOKING_COLUMNS,
    BOOKING_SUMMARY_COLUMNS, BOOKING_SUMMARY_FROM,
};
use crate::fields::FieldStatus;
use crate::query::{SQLQueryBuilder, SqlParam, ValidatedQuery};

/// Field row locked for the duration of a booking transaction, with its facility
#[derive(Debug, Clone, FromRow)]
pub struct LockedField {
    pub field_id: i32,
    pub field_name: String,
    pub field_status: FieldStatus,
    pub price_per_hour: Decimal,
    pub facility_id: i32,
    pub facility_name: String,
    pub facility_active: bool,
    pub owner_id: i32,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
}

/// Values of a booking row about to be inserted
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub facility_id: i32,
    pub field_id: i32,
    pub customer_id: Option<i32>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub title: Option<String>,
    pub note: Option<String>,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_by: Option<i32>,
}

#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        scope: &FacilityScope,
        query: &ValidatedQuery,
        filter: &BookingFilter,
    ) -> Result<(Vec<BookingSummary>, i64), sqlx::Error> {
        let mut builder = SQLQueryBuilder::new(BOOKING_SUMMARY_COLUMNS, BOOKING_SUMMARY_FROM);
        match scope {
            FacilityScope::All => {}
            FacilityScope::Facilities(ids) => builder.add_in_filter("b.facility_id", ids),
            FacilityScope::Customer(customer_id) => {
                builder.add_eq_filter("b.customer_id", SqlParam::Int(*customer_id))
            }
        }
        if let Some(facility_id) = filter.facility_id {
            builder.add_eq_filter("b.facility_id", SqlParam::Int(facility_id));
        }
        if let Some(field_id) = filter.field_id {
            builder.add_eq_filter("b.field_id", SqlParam::Int(field_id));
        }
        if let Some(date) = filter.date {
            builder.add_eq_filter("b.booking_date", SqlParam::Date(date));
        }
        if let Some(status) = filter.status {
            builder.add_eq_filter("b.status", SqlParam::Text(status.as_str().to_string()));
        }
        query.apply(
            &mut builder,
            &["b.guest_name", "b.guest_phone", "b.title"],
            "b.booking_date DESC, b.start_time",
        );
        builder.fetch_page(&self.pool).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// (field name, facility name) shown next to a booking
    pub async fn names(&self, field_id: i32) -> Result<(String, String), sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT f.name, fa.name
            FROM fields f
            JOIN facilities fa ON fa.id = f.facility_id
            WHERE f.id = $1
            "#,
        )
        .bind(field_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Lock the field row so concurrent bookings of it run one after another
    pub async fn lock_field(
        tx: &mut Transaction<'_, Postgres>,
        field_id: i32,
    ) -> Result<Option<LockedField>, sqlx::Error> {
        sqlx::query_as::<_, LockedField>(
            r#"
            SELECT f.id AS field_id,
                   f.name AS field_name,
                   f.status AS field_status,
                   f.price_per_hour,
                   fa.id AS facility_id,
                   fa.name AS facility_name,
                   fa.is_active AS facility_active,
                   fa.owner_id,
                   fa.open_time,
                   fa.close_time
            FROM fields f
            JOIN facilities fa ON fa.id = f.facility_id
            WHERE f.id = $1
            FOR UPDATE OF f
            "#,
        )
        .bind(field_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Half-open overlap against the non-cancelled bookings of a field on a date
    pub async fn has_overlap(
        tx: &mut Transaction<'_, Postgres>,
        field_id: i32,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<bool, sqlx::Error> {
        let found: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE field_id = $1
                  AND booking_date = $2
                  AND status <> 'cancelled'
                  AND start_time < $4
                  AND end_time > $3
            )
            "#,
        )
        .bind(field_id)
        .bind(date)
        .bind(start)
        .bind(end)
        .fetch_one(&mut **tx)
        .await?;

        Ok(found.unwrap_or(false))
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        booking: NewBooking,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings
                (facility_id, field_id, customer_id, guest_name, guest_phone, title, note,
                 booking_date, start_time, end_time, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending', $11)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking.facility_id)
        .bind(booking.field_id)
        .bind(booking.customer_id)
        .bind(booking.guest_name)
        .bind(booking.guest_phone)
        .bind(booking.title)
        .bind(booking.note)
        .bind(booking.booking_date)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.created_by)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn lock(tx: &mut Transaction<'_, Postgres>, id: i32) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings WHERE id = $1 FOR UPDATE",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn update_status(
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
        status: BookingStatus,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            BOOKING_COLUMNS
        ))
        .bind(status)
        .bind(id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Discount applied to the booking's order, if any
    pub async fn order_discount(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: i32,
    ) -> Result<Option<i32>, sqlx::Error> {
        let discount: Option<Option<i32>> =
            sqlx::query_scalar("SELECT discount_id FROM orders WHERE booking_id = $1")
                .bind(booking_id)
                .fetch_optional(&mut **tx)
                .await?;

        Ok(discount.flatten())
    }
}
