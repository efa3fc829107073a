// Extras sold by a facility together with bookings

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use handlers::*;
pub use models::ServiceItem;
pub use repository::ServiceRepository;
pub use service::ServiceCatalog;
