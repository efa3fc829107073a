// Fields: the bookable courts of a facility

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use handlers::*;
pub use models::{Field, FieldStatus};
pub use repository::FieldRepository;
pub use service::FieldService;
