// Bookings: reservations of a field for a time slot, each with one order

pub mod error;
pub mod handlers;
pub mod models;
pub mod pricing;
pub mod repository;
pub mod service;
pub mod slot;
pub mod status_machine;

pub use error::BookingError;
pub use handlers::*;
pub use models::{Booking, BookingDetail, BookingStatus, BookingSummary};
pub use repository::BookingRepository;
pub use service::BookingService;
