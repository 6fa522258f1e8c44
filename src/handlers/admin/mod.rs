pub mod announcements;
pub mod badges;
pub mod gallery;
pub mod hero;
pub mod registrations;
pub mod rides;
