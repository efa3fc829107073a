// Discount codes: percentage off a booking order, limited by dates and uses

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use handlers::*;
pub use models::{Discount, DiscountCheck};
pub use repository::DiscountRepository;
pub use service::DiscountService;
