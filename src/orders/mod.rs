pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use error::OrderError;
pub use handlers::*;
pub use models::{Order, OrderDetail, PaymentStatus};
pub use repository::OrdersRepository;
pub use service::OrderService;
