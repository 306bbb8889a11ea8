//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod register;
pub mod service;
pub mod throttle;

// Re-exports
pub use authenticate::{AuthenticateInput, AuthenticateUseCase};
pub use config::AuthConfig;
pub use register::{RegisterInput, RegisterUseCase};
pub use service::AuthService;
pub use throttle::LoginThrottle;
