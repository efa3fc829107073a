// Authentication module
// JWT-based authentication with registration, login, token rotation and role checks

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{login_handler, logout_handler, me_handler, refresh_handler, register_handler};
pub use middleware::{AuthenticatedUser, OptionalUser, RequireRole};
pub use models::{AuthResponse, Role, User, UserResponse};
pub use service::AuthService;
pub use token::TokenService;
