// Real-time notification hub over WebSocket

pub mod handlers;
pub mod hub;
pub mod models;

pub use handlers::notifications_hub;
pub use hub::NotificationHub;
pub use models::{ClientMessage, ServerMessage};
