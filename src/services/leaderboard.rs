use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::profile::Profile;

/// Ranking metric for the public leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Km,
    Rides,
    Badges,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub member_id: Option<String>,
    pub bike_model: Option<String>,
    pub profile_photo_url: Option<String>,
    pub total_km_ridden: f64,
    pub total_rides_completed: i32,
    pub badge_count: i64,
}

/// Merge profiles with per-user badge counts and rank by the chosen metric,
/// highest first. Ties keep the incoming order (profiles arrive sorted by
/// km from the query).
pub fn rank(
    profiles: Vec<Profile>,
    badge_counts: &HashMap<Uuid, i64>,
    metric: Metric,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = profiles
        .into_iter()
        .map(|p| LeaderboardEntry {
            badge_count: badge_counts.get(&p.id).copied().unwrap_or(0),
            user_id: p.id,
            username: p.username,
            full_name: p.full_name,
            member_id: p.member_id,
            bike_model: p.bike_model,
            profile_photo_url: p.profile_photo_url,
            total_km_ridden: p.total_km_ridden,
            total_rides_completed: p.total_rides_completed,
        })
        .collect();

    match metric {
        Metric::Km => entries.sort_by(|a, b| b.total_km_ridden.total_cmp(&a.total_km_ridden)),
        Metric::Rides => {
            entries.sort_by(|a, b| b.total_rides_completed.cmp(&a.total_rides_completed))
        }
        Metric::Badges => entries.sort_by(|a, b| b.badge_count.cmp(&a.badge_count)),
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(name: &str, km: f64, rides: i32) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            username: name.to_lowercase(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: String::new(),
            full_name: name.to_string(),
            mobile: "0000000000".to_string(),
            member_id: None,
            bike_model: None,
            blood_group: None,
            city: None,
            country: None,
            emergency_contact: None,
            license_number: None,
            member_since: None,
            profile_photo_url: None,
            years_driven: None,
            total_km_ridden: km,
            total_rides_completed: rides,
            is_suspended: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn ranks_by_km_by_default() {
        let profiles = vec![
            profile("Asha", 120.0, 5),
            profile("Bala", 900.5, 2),
            profile("Chitra", 450.0, 9),
        ];
        let ranked = rank(profiles, &HashMap::new(), Metric::Km);
        let names: Vec<&str> = ranked.iter().map(|e| e.full_name.as_str()).collect();
        assert_eq!(names, vec!["Bala", "Chitra", "Asha"]);
    }

    #[test]
    fn ranks_by_rides_and_badges() {
        let a = profile("Asha", 120.0, 5);
        let b = profile("Bala", 900.5, 2);
        let a_id = a.id;

        let mut counts = HashMap::new();
        counts.insert(a_id, 3i64);

        let by_rides = rank(vec![a.clone(), b.clone()], &counts, Metric::Rides);
        assert_eq!(by_rides[0].full_name, "Asha");

        let by_badges = rank(vec![b, a], &counts, Metric::Badges);
        assert_eq!(by_badges[0].full_name, "Asha");
        assert_eq!(by_badges[0].badge_count, 3);
        assert_eq!(by_badges[1].badge_count, 0);
    }

    #[test]
    fn missing_badge_counts_default_to_zero() {
        let ranked = rank(vec![profile("Asha", 0.0, 0)], &HashMap::new(), Metric::Badges);
        assert_eq!(ranked[0].badge_count, 0);
    }
}
