pub mod broadcast;
pub mod overview;
pub mod payments;
pub mod team;
pub mod users;
