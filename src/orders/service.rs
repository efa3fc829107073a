use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use validator::Validate;

use crate::auth::{AuthenticatedUser, Role};
use crate::bookings::models::BookingStatus;
use crate::bookings::slot::local_utc_offset_secs;
use crate::error::ApiError;
use crate::facilities::FacilityService;
use crate::notifications::{NotificationHub, ServerMessage};
use crate::orders::{
    error::OrderError,
    models::{
        Order, OrderDetail, OrderFilter, PaymentStatus, RevenueQuery, RevenueReport,
        UpdatePaymentRequest,
    },
    repository::OrdersRepository,
};
use crate::query::{QueryParams, QueryValidator};

const SORTABLE: &[(&str, &str)] = &[
    ("created_at", "created_at"),
    ("total_price", "total_price"),
    ("paid_at", "paid_at"),
];

/// Service for order business logic
#[derive(Clone)]
pub struct OrderService {
    pool: PgPool,
    repo: OrdersRepository,
    facilities: FacilityService,
    hub: Arc<NotificationHub>,
}

impl OrderService {
    pub fn new(
        pool: PgPool,
        repo: OrdersRepository,
        facilities: FacilityService,
        hub: Arc<NotificationHub>,
    ) -> Self {
        Self {
            pool,
            repo,
            facilities,
            hub,
        }
    }

    /// Orders of the facilities the caller operates
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        params: QueryParams,
        filter: OrderFilter,
    ) -> Result<(Vec<Order>, i64), ApiError> {
        if user.role == Role::Customer {
            return Err(OrderError::Forbidden.into());
        }
        let validated = QueryValidator::validate(params, SORTABLE)?;
        let scope = self.facilities.scope_for(user).await?;
        Ok(self.repo.list(&scope, &validated, &filter).await?)
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: i32) -> Result<OrderDetail, ApiError> {
        let order = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(OrderError::NotFound(id))?;
        self.facilities.get_operated(user, order.facility_id).await?;

        let services = self.repo.lines(order.id).await?;
        Ok(OrderDetail { order, services })
    }

    /// Move an order along unpaid -> paid -> refunded.
    ///
    /// The order row stays locked until commit so two cashiers cannot
    /// both record the payment.
    pub async fn update_payment(
        &self,
        user: &AuthenticatedUser,
        id: i32,
        request: UpdatePaymentRequest,
    ) -> Result<Order, ApiError> {
        request.validate()?;
        if user.role == Role::Customer {
            return Err(OrderError::Forbidden.into());
        }

        let mut tx = self.pool.begin().await.map_err(OrderError::from)?;
        let order = OrdersRepository::lock(&mut tx, id)
            .await
            .map_err(OrderError::from)?
            .ok_or(OrderError::NotFound(id))?;
        self.facilities.get_operated(user, order.facility_id).await?;

        let next = request.payment_status;
        if order.payment_status == next {
            return Ok(order);
        }
        if !order.payment_status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: order.payment_status,
                to: next,
            }
            .into());
        }

        let booking = OrdersRepository::booking_of(&mut tx, order.booking_id)
            .await
            .map_err(OrderError::from)?;
        if booking.status == BookingStatus::Cancelled && next == PaymentStatus::Paid {
            return Err(OrderError::BookingCancelled.into());
        }

        let method = request
            .payment_method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty());
        let updated = OrdersRepository::update_payment(&mut tx, id, next, method)
            .await
            .map_err(OrderError::from)?;
        tx.commit().await.map_err(OrderError::from)?;

        tracing::info!(
            "Order {} payment {} -> {} by user {}",
            id,
            order.payment_status,
            next,
            user.user_id
        );

        self.hub
            .notify(ServerMessage::PaymentStatusChanged {
                order_id: updated.id,
                booking_id: updated.booking_id,
                facility_id: updated.facility_id,
                customer_id: booking.customer_id,
                payment_status: updated.payment_status,
                timestamp: Utc::now(),
            })
            .await;

        Ok(updated)
    }

    /// Revenue of paid orders for one facility, by payment date
    pub async fn revenue(
        &self,
        user: &AuthenticatedUser,
        facility_id: i32,
        query: RevenueQuery,
    ) -> Result<RevenueReport, ApiError> {
        if query.from > query.to {
            return Err(OrderError::InvalidRange.into());
        }
        self.facilities.get_managed(user, facility_id).await?;

        let daily = self
            .repo
            .daily_revenue(facility_id, query.from, query.to, local_utc_offset_secs())
            .await?;
        let bookings = self
            .repo
            .count_bookings(facility_id, query.from, query.to)
            .await?;

        let total_revenue: Decimal = daily.iter().map(|d| d.revenue).sum();
        let paid_orders: i64 = daily.iter().map(|d| d.orders).sum();

        Ok(RevenueReport {
            facility_id,
            from: query.from,
            to: query.to,
            total_revenue,
            paid_orders,
            bookings,
            daily,
        })
    }
}
