use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::auth::policy::FacilityScope;
use crate::bookings::models::BookingStatus;
use crate::bookings::pricing::PriceBreakdown;
use crate::orders::models::{
    DailyRevenue, Order, OrderFilter, OrderServiceLine, PaymentStatus, ORDER_COLUMNS,
};
use crate::query::{SQLQueryBuilder, SqlParam, ValidatedQuery};

const LINE_COLUMNS: &str = "id, order_id, service_id, service_name, quantity, unit_price, subtotal";

/// Booking fields the payment flow needs, read under the order lock
#[derive(Debug, sqlx::FromRow)]
pub struct OrderBooking {
    pub status: BookingStatus,
    pub customer_id: Option<i32>,
}

/// Repository for orders and their service lines
#[derive(Clone)]
pub struct OrdersRepository {
    pool: PgPool,
}

impl OrdersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        scope: &FacilityScope,
        query: &ValidatedQuery,
        filter: &OrderFilter,
    ) -> Result<(Vec<Order>, i64), sqlx::Error> {
        let mut builder = SQLQueryBuilder::new(ORDER_COLUMNS, "orders");
        match scope {
            FacilityScope::All => {}
            FacilityScope::Facilities(ids) => builder.add_in_filter("facility_id", ids),
            // Orders are never listed per customer
            FacilityScope::Customer(_) => builder.add_in_filter("facility_id", &[]),
        }
        if let Some(facility_id) = filter.facility_id {
            builder.add_eq_filter("facility_id", SqlParam::Int(facility_id));
        }
        if let Some(status) = filter.payment_status {
            builder.add_eq_filter("payment_status", SqlParam::Text(status.as_str().to_string()));
        }
        query.apply(&mut builder, &[], "created_at DESC, id");
        builder.fetch_page(&self.pool).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_booking(&self, booking_id: i32) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE booking_id = $1",
            ORDER_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn lines(&self, order_id: i32) -> Result<Vec<OrderServiceLine>, sqlx::Error> {
        sqlx::query_as::<_, OrderServiceLine>(&format!(
            "SELECT {} FROM order_services WHERE order_id = $1 ORDER BY id",
            LINE_COLUMNS
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Insert the order of a new booking
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: i32,
        facility_id: i32,
        price: &PriceBreakdown,
        discount_id: Option<i32>,
    ) -> Result<Order, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders
                (booking_id, facility_id, field_price, services_total, discount_id,
                 discount_percentage, discount_amount, total_price, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'unpaid')
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(booking_id)
        .bind(facility_id)
        .bind(price.field_price)
        .bind(price.services_total)
        .bind(discount_id)
        .bind(price.discount_percentage)
        .bind(price.discount_amount)
        .bind(price.total_price)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn insert_line(
        tx: &mut Transaction<'_, Postgres>,
        order_id: i32,
        service_id: i32,
        service_name: &str,
        quantity: i32,
        unit_price: Decimal,
        subtotal: Decimal,
    ) -> Result<OrderServiceLine, sqlx::Error> {
        sqlx::query_as::<_, OrderServiceLine>(&format!(
            r#"
            INSERT INTO order_services (order_id, service_id, service_name, quantity, unit_price, subtotal)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            LINE_COLUMNS
        ))
        .bind(order_id)
        .bind(service_id)
        .bind(service_name)
        .bind(quantity)
        .bind(unit_price)
        .bind(subtotal)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn lock(tx: &mut Transaction<'_, Postgres>, id: i32) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = $1 FOR UPDATE",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn booking_of(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: i32,
    ) -> Result<OrderBooking, sqlx::Error> {
        sqlx::query_as::<_, OrderBooking>("SELECT status, customer_id FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Set the payment state; `paid_at` is stamped only when moving to paid
    pub async fn update_payment(
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
        status: PaymentStatus,
        payment_method: Option<&str>,
    ) -> Result<Order, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
            SET payment_status = $1,
                payment_method = COALESCE($2, payment_method),
                paid_at = CASE WHEN $1 = 'paid' THEN NOW() ELSE paid_at END,
                updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(status)
        .bind(payment_method)
        .bind(id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Paid orders grouped by the local day they were paid.
    ///
    /// `utc_offset_secs` shifts `paid_at` to the same wall clock that booking
    /// dates use, independent of the database session time zone.
    pub async fn daily_revenue(
        &self,
        facility_id: i32,
        from: NaiveDate,
        to: NaiveDate,
        utc_offset_secs: i32,
    ) -> Result<Vec<DailyRevenue>, sqlx::Error> {
        sqlx::query_as::<_, DailyRevenue>(
            r#"
            SELECT paid.date AS date,
                   SUM(paid.total_price) AS revenue,
                   COUNT(*) AS orders
            FROM (
                SELECT (paid_at AT TIME ZONE 'UTC' + make_interval(secs => $4))::date AS date,
                       total_price
                FROM orders
                WHERE facility_id = $1
                  AND payment_status = 'paid'
                  AND paid_at IS NOT NULL
            ) paid
            WHERE paid.date BETWEEN $2 AND $3
            GROUP BY paid.date
            ORDER BY paid.date
            "#,
        )
        .bind(facility_id)
        .bind(from)
        .bind(to)
        .bind(f64::from(utc_offset_secs))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_bookings(
        &self,
        facility_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE facility_id = $1
              AND status <> 'cancelled'
              AND booking_date BETWEEN $2 AND $3
            "#,
        )
        .bind(facility_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
    }
}
