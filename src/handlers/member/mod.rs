pub mod profile;
pub mod rides;
pub mod session;
