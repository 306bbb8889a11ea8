pub mod session_token;
pub mod user;

pub use session_token::{Claims, IssuedToken};
pub use user::User;
