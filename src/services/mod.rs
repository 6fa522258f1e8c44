pub mod leaderboard;
pub mod ordering;
pub mod registration;
