// Staff accounts assigned to a facility

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use handlers::*;
pub use models::StaffMember;
pub use service::StaffService;
