// Facilities: venues owned by an owner account, holding fields and services

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use handlers::*;
pub use models::{CreateFacility, Facility, FacilityFilter, UpdateFacility};
pub use repository::FacilityRepository;
pub use service::FacilityService;
