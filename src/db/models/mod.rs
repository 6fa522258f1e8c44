pub mod announcement;
pub mod badge;
pub mod gallery;
pub mod hero_image;
pub mod payment;
pub mod profile;
pub mod registration;
pub mod ride;
pub mod team_member;
