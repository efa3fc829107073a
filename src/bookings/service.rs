use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use crate::auth::{policy, AuthenticatedUser, Role};
use crate::bookings::{
    error::BookingError,
    models::{
        Booking, BookingDetail, BookingFilter, BookingStatus, BookingSummary,
        CreateBookingRequest, UpdateBookingStatusRequest,
    },
    pricing::{PriceCalculator, ServiceLine},
    repository::{BookingRepository, LockedField, NewBooking},
    slot::{local_now, starts_before},
    status_machine::StatusMachine,
};
use crate::discounts::DiscountRepository;
use crate::error::ApiError;
use crate::facilities::FacilityService;
use crate::facility_services::ServiceRepository;
use crate::fields::FieldStatus;
use crate::notifications::{NotificationHub, ServerMessage};
use crate::orders::{OrderDetail, OrdersRepository};
use crate::query::{QueryParams, QueryValidator};
use crate::validation::validate_phone;

const SORTABLE: &[(&str, &str)] = &[
    ("booking_date", "b.booking_date"),
    ("start_time", "b.start_time"),
    ("status", "b.status"),
    ("created_at", "b.created_at"),
];

const MAX_GUEST_NAME: usize = 100;

/// Who a booking is for
#[derive(Debug, Clone, PartialEq)]
pub struct BookingParty {
    pub customer_id: Option<i32>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
}

/// A signed-in customer books for themselves; anyone else (guests, staff
/// taking a phone booking, owners) must name the guest and give a phone.
pub fn resolve_party(
    caller: Option<&AuthenticatedUser>,
    request: &CreateBookingRequest,
) -> Result<BookingParty, BookingError> {
    if let Some(user) = caller.filter(|u| u.role == Role::Customer) {
        return Ok(BookingParty {
            customer_id: Some(user.user_id),
            guest_name: None,
            guest_phone: None,
        });
    }

    let name = request
        .guest_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(BookingError::GuestNameRequired)?;
    if name.chars().count() > MAX_GUEST_NAME {
        return Err(BookingError::GuestNameTooLong);
    }

    let phone = request
        .guest_phone
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    validate_phone(phone).map_err(|_| BookingError::GuestPhoneInvalid)?;

    Ok(BookingParty {
        customer_id: None,
        guest_name: Some(name.to_string()),
        guest_phone: Some(phone.to_string()),
    })
}

/// Service for booking business logic
#[derive(Clone)]
pub struct BookingService {
    pool: PgPool,
    repo: BookingRepository,
    orders: OrdersRepository,
    facilities: FacilityService,
    hub: Arc<NotificationHub>,
}

impl BookingService {
    pub fn new(
        pool: PgPool,
        repo: BookingRepository,
        orders: OrdersRepository,
        facilities: FacilityService,
        hub: Arc<NotificationHub>,
    ) -> Self {
        Self {
            pool,
            repo,
            orders,
            facilities,
            hub,
        }
    }

    /// Create a booking with its order in one transaction.
    ///
    /// The field row is locked first, so the overlap check and the insert
    /// of two requests for the same field cannot interleave.
    pub async fn create(
        &self,
        caller: Option<&AuthenticatedUser>,
        request: CreateBookingRequest,
    ) -> Result<BookingDetail, ApiError> {
        request.validate()?;
        let slot = request.slot()?;
        let party = resolve_party(caller, &request)?;

        let mut tx = self.pool.begin().await.map_err(BookingError::from)?;

        let field = BookingRepository::lock_field(&mut tx, request.field_id)
            .await
            .map_err(BookingError::from)?
            .ok_or(BookingError::FieldNotFound(request.field_id))?;
        ensure_bookable(&field)?;

        if let Some(user) = caller.filter(|u| u.role != Role::Customer) {
            if !policy::can_operate_facility(user, field.facility_id, field.owner_id) {
                return Err(BookingError::Forbidden.into());
            }
        }

        if !slot.within(field.open_time, field.close_time) {
            return Err(BookingError::OutsideOpeningHours {
                open: field.open_time,
                close: field.close_time,
            }
            .into());
        }
        if starts_before(request.booking_date, slot.start, local_now()) {
            return Err(BookingError::InPast.into());
        }

        // Services: active, of this facility, priced at today's price
        let requested = request.merged_services()?;
        let ids: Vec<i32> = requested.iter().map(|s| s.service_id).collect();
        let available = if ids.is_empty() {
            Vec::new()
        } else {
            ServiceRepository::find_active_in(&mut tx, field.facility_id, &ids)
                .await
                .map_err(BookingError::from)?
        };
        let by_id: HashMap<i32, _> = available.iter().map(|s| (s.id, s)).collect();
        let mut lines = Vec::with_capacity(requested.len());
        for item in &requested {
            let service = by_id
                .get(&item.service_id)
                .ok_or(BookingError::InvalidService(item.service_id))?;
            lines.push(ServiceLine {
                service_id: service.id,
                unit_price: service.price,
                quantity: item.quantity,
            });
        }

        let discount = match request.discount_code() {
            Some(code) => {
                let discount = DiscountRepository::lock_by_code(&mut tx, field.facility_id, &code)
                    .await
                    .map_err(BookingError::from)?
                    .filter(|d| d.is_usable_on(request.booking_date))
                    .ok_or(BookingError::InvalidDiscount)?;
                DiscountRepository::consume(&mut tx, discount.id)
                    .await
                    .map_err(BookingError::from)?;
                Some(discount)
            }
            None => None,
        };

        let taken = BookingRepository::has_overlap(
            &mut tx,
            field.field_id,
            request.booking_date,
            slot.start,
            slot.end,
        )
        .await
        .map_err(BookingError::from)?;
        if taken {
            return Err(BookingError::SlotTaken.into());
        }

        let booking = BookingRepository::insert(
            &mut tx,
            NewBooking {
                facility_id: field.facility_id,
                field_id: field.field_id,
                customer_id: party.customer_id,
                guest_name: party.guest_name,
                guest_phone: party.guest_phone,
                title: trimmed(request.title),
                note: trimmed(request.note),
                booking_date: request.booking_date,
                start_time: slot.start,
                end_time: slot.end,
                created_by: caller.map(|u| u.user_id),
            },
        )
        .await
        .map_err(BookingError::from)?;

        let price = PriceCalculator::calculate(
            field.price_per_hour,
            slot.minutes(),
            &lines,
            discount.as_ref().map(|d| d.percentage),
        );
        let order = OrdersRepository::insert(
            &mut tx,
            booking.id,
            field.facility_id,
            &price,
            discount.as_ref().map(|d| d.id),
        )
        .await
        .map_err(BookingError::from)?;

        let mut services = Vec::with_capacity(price.lines.len());
        for (service_id, quantity, unit_price, subtotal) in &price.lines {
            let name = by_id
                .get(service_id)
                .map(|s| s.name.as_str())
                .unwrap_or_default();
            let line = OrdersRepository::insert_line(
                &mut tx,
                order.id,
                *service_id,
                name,
                *quantity,
                *unit_price,
                *subtotal,
            )
            .await
            .map_err(BookingError::from)?;
            services.push(line);
        }

        tx.commit().await.map_err(BookingError::from)?;

        tracing::info!(
            "Booking {} created on field {} ({} {}-{}), total {}",
            booking.id,
            booking.field_id,
            booking.booking_date,
            booking.start_time,
            booking.end_time,
            order.total_price
        );

        self.hub
            .notify(ServerMessage::BookingCreated {
                booking_id: booking.id,
                facility_id: booking.facility_id,
                field_id: booking.field_id,
                customer_id: booking.customer_id,
                booking_date: booking.booking_date,
                start_time: booking.start_time,
                end_time: booking.end_time,
                status: booking.status,
                timestamp: Utc::now(),
            })
            .await;

        Ok(BookingDetail {
            booking,
            field_name: field.field_name,
            facility_name: field.facility_name,
            order: Some(OrderDetail { order, services }),
        })
    }

    /// Bookings visible to the caller: own ones for customers, operated facilities otherwise
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        params: QueryParams,
        filter: BookingFilter,
    ) -> Result<(Vec<BookingSummary>, i64), ApiError> {
        let validated = QueryValidator::validate(params, SORTABLE)?;
        let scope = self.facilities.scope_for(user).await?;
        Ok(self.repo.list(&scope, &validated, &filter).await?)
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: i32) -> Result<BookingDetail, ApiError> {
        let booking = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(BookingError::NotFound(id))?;
        self.ensure_can_view(user, &booking).await?;

        let (field_name, facility_name) = self.repo.names(booking.field_id).await?;
        let order = match self.orders.find_by_booking(booking.id).await? {
            Some(order) => {
                let services = self.orders.lines(order.id).await?;
                Some(OrderDetail { order, services })
            }
            None => None,
        };

        Ok(BookingDetail {
            booking,
            field_name,
            facility_name,
            order,
        })
    }

    /// Apply a status transition. Cancelling gives back the discount use.
    pub async fn update_status(
        &self,
        user: &AuthenticatedUser,
        id: i32,
        request: UpdateBookingStatusRequest,
    ) -> Result<Booking, ApiError> {
        let mut tx = self.pool.begin().await.map_err(BookingError::from)?;
        let booking = BookingRepository::lock(&mut tx, id)
            .await
            .map_err(BookingError::from)?
            .ok_or(BookingError::NotFound(id))?;

        let next = request.status;
        if user.role == Role::Customer {
            if booking.customer_id != Some(user.user_id) || next != BookingStatus::Cancelled {
                return Err(BookingError::Forbidden.into());
            }
        } else {
            self.ensure_can_operate(user, booking.facility_id).await?;
        }

        if booking.status == next {
            return Ok(booking);
        }
        StatusMachine::transition(booking.status, next).map_err(BookingError::InvalidTransition)?;

        if next == BookingStatus::Cancelled {
            if let Some(discount_id) = BookingRepository::order_discount(&mut tx, id)
                .await
                .map_err(BookingError::from)?
            {
                DiscountRepository::restore(&mut tx, discount_id)
                    .await
                    .map_err(BookingError::from)?;
            }
        }

        let updated = BookingRepository::update_status(&mut tx, id, next)
            .await
            .map_err(BookingError::from)?;
        tx.commit().await.map_err(BookingError::from)?;

        tracing::info!(
            "Booking {} status {} -> {} by user {}",
            id,
            booking.status,
            next,
            user.user_id
        );

        self.hub
            .notify(ServerMessage::BookingStatusChanged {
                booking_id: updated.id,
                facility_id: updated.facility_id,
                customer_id: updated.customer_id,
                old_status: booking.status,
                new_status: updated.status,
                timestamp: Utc::now(),
            })
            .await;

        Ok(updated)
    }

    async fn ensure_can_operate(&self, user: &AuthenticatedUser, facility_id: i32) -> Result<(), ApiError> {
        let owner_id = self
            .facilities
            .repository()
            .find_owner(facility_id)
            .await?
            .ok_or_else(|| ApiError::not_found("cơ sở", facility_id))?;
        if policy::can_operate_facility(user, facility_id, owner_id) {
            Ok(())
        } else {
            Err(BookingError::Forbidden.into())
        }
    }

    async fn ensure_can_view(&self, user: &AuthenticatedUser, booking: &Booking) -> Result<(), ApiError> {
        if user.role == Role::Customer {
            if booking.customer_id == Some(user.user_id) {
                return Ok(());
            }
            return Err(BookingError::Forbidden.into());
        }
        self.ensure_can_operate(user, booking.facility_id).await
    }
}

fn ensure_bookable(field: &LockedField) -> Result<(), BookingError> {
    if field.field_status != FieldStatus::Active {
        return Err(BookingError::FieldUnavailable);
    }
    if !field.facility_active {
        return Err(BookingError::FacilityInactive);
    }
    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
