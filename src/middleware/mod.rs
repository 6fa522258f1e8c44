pub mod auth;
pub mod require;

pub use auth::AuthUser;
