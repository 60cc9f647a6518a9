//! Rating and profile statistics.
//!
//! Pure functions over already-fetched collections. The only mutation is
//! [`record_visit`], which advances the in-memory visit history of a
//! [`User`]; persisting the result is the caller's job.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::opinion::{MAX_SCORE, MIN_SCORE, Opinion};
use crate::models::user::{User, VisitRecord};

/// Average reported for a user without opinions.
pub const DEFAULT_RATING: f64 = 0.0;

/// Repeat visits from the same IP inside this window are not counted.
pub const VISIT_DEDUP_WINDOW_SECS: i64 = 24 * 60 * 60;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Mean score rounded to one decimal, or [`DEFAULT_RATING`] when empty.
pub fn average_rating(opinions: &[Opinion]) -> f64 {
    if opinions.is_empty() {
        return DEFAULT_RATING;
    }
    let sum: u64 = opinions.iter().map(|o| u64::from(o.score)).sum();
    round_to(sum as f64 / opinions.len() as f64, 1)
}

/// Count of opinions per score. All five scores are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RatingDistribution(BTreeMap<u8, u64>);

impl RatingDistribution {
    pub fn get(&self, score: u8) -> u64 {
        self.0.get(&score).copied().unwrap_or(0)
    }
}

pub fn rating_distribution(opinions: &[Opinion]) -> RatingDistribution {
    let mut buckets: BTreeMap<u8, u64> = (MIN_SCORE as u8..=MAX_SCORE as u8)
        .map(|score| (score, 0))
        .collect();
    for opinion in opinions {
        if let Some(count) = buckets.get_mut(&opinion.score) {
            *count += 1;
        }
    }
    RatingDistribution(buckets)
}

/// Click-through percentages from profile visits to external links.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConversionRate {
    pub linkedin: f64,
    pub portfolio: f64,
    pub total: f64,
}

/// Percentages rounded to two decimals; all zero when there are no visits.
pub fn conversion_rate(visits: u64, linkedin_clicks: u64, portfolio_clicks: u64) -> ConversionRate {
    if visits == 0 {
        return ConversionRate {
            linkedin: 0.0,
            portfolio: 0.0,
            total: 0.0,
        };
    }
    let pct = |clicks: u64| round_to(clicks as f64 / visits as f64 * 100.0, 2);
    ConversionRate {
        linkedin: pct(linkedin_clicks),
        portfolio: pct(portfolio_clicks),
        total: pct(linkedin_clicks + portfolio_clicks),
    }
}

/// Result of feeding one request into the visit-dedup window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisitOutcome {
    pub counted: bool,
}

/// Advance the visit state of `user` for a request from `source_ip`.
///
/// - unseen IP: a history entry is appended and the visit is counted;
/// - IP seen less than 24h ago: nothing changes;
/// - IP seen 24h or more ago: its timestamp moves to `now` and the visit
///   is counted.
///
/// `visit_count` only ever grows by the number of counted outcomes.
pub fn record_visit(user: &mut User, source_ip: &str, now: DateTime<Utc>) -> VisitOutcome {
    let window = Duration::seconds(VISIT_DEDUP_WINDOW_SECS);

    match user.visit_history.iter_mut().find(|v| v.ip == source_ip) {
        Some(entry) if now - entry.last_visit < window => {
            return VisitOutcome { counted: false };
        }
        Some(entry) => entry.last_visit = now,
        None => user.visit_history.push(VisitRecord {
            ip: source_ip.to_string(),
            last_visit: now,
        }),
    }

    user.visit_count += 1;
    VisitOutcome { counted: true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{Plan, Role};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn opinion(score: u8) -> Opinion {
        Opinion {
            id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            score,
            body: "ok".into(),
            created_at: Utc::now(),
        }
    }

    fn opinions(scores: &[u8]) -> Vec<Opinion> {
        scores.iter().copied().map(opinion).collect()
    }

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            first_name: "Ana".into(),
            last_name: "Paz".into(),
            email: "ana@example.com".into(),
            password_hash: String::new(),
            role: Role::Freelancer,
            plan: Plan::Free,
            linkedin: None,
            portfolio: None,
            description: None,
            rate: None,
            is_available: true,
            skills: vec![],
            visit_count: 0,
            linkedin_access_count: 0,
            portfolio_access_count: 0,
            visit_history: vec![],
            opinion_ids: vec![],
            service_ids: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn average_of_empty_is_default() {
        assert_eq!(average_rating(&[]), DEFAULT_RATING);
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn average_is_rounded_to_one_decimal() {
        assert_eq!(average_rating(&opinions(&[5, 4, 4])), 4.3);
        assert_eq!(average_rating(&opinions(&[5, 5, 3, 1, 5])), 3.8);
        assert_eq!(average_rating(&opinions(&[2])), 2.0);
    }

    #[test]
    fn distribution_has_all_buckets() {
        let dist = rating_distribution(&opinions(&[5, 5, 3, 1, 5]));
        assert_eq!(dist.get(1), 1);
        assert_eq!(dist.get(2), 0);
        assert_eq!(dist.get(3), 1);
        assert_eq!(dist.get(4), 0);
        assert_eq!(dist.get(5), 3);

        let json = serde_json::to_value(&dist).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"1": 1, "2": 0, "3": 1, "4": 0, "5": 3})
        );
    }

    #[test]
    fn distribution_of_empty_is_all_zero() {
        let dist = rating_distribution(&[]);
        for score in 1..=5 {
            assert_eq!(dist.get(score), 0);
        }
    }

    #[test]
    fn conversion_without_visits_is_zero() {
        let rate = conversion_rate(0, 7, 3);
        assert_eq!(
            rate,
            ConversionRate {
                linkedin: 0.0,
                portfolio: 0.0,
                total: 0.0
            }
        );
    }

    #[test]
    fn conversion_percentages() {
        let rate = conversion_rate(100, 10, 5);
        assert_eq!(rate.linkedin, 10.0);
        assert_eq!(rate.portfolio, 5.0);
        assert_eq!(rate.total, 15.0);
    }

    #[test]
    fn conversion_rounds_to_two_decimals() {
        let rate = conversion_rate(3, 1, 0);
        assert_eq!(rate.linkedin, 33.33);
        assert_eq!(rate.total, 33.33);
    }

    #[test]
    fn visit_window_dedups_per_ip() {
        let mut u = user();
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

        assert!(record_visit(&mut u, "1.2.3.4", t0).counted);
        assert_eq!(u.visit_count, 1);
        assert_eq!(u.visit_history.len(), 1);
        assert_eq!(u.visit_history[0].last_visit, t0);

        let t1 = t0 + Duration::hours(1);
        assert!(!record_visit(&mut u, "1.2.3.4", t1).counted);
        assert_eq!(u.visit_count, 1);
        assert_eq!(u.visit_history[0].last_visit, t0);

        let t2 = t0 + Duration::hours(25);
        assert!(record_visit(&mut u, "1.2.3.4", t2).counted);
        assert_eq!(u.visit_count, 2);
        assert_eq!(u.visit_history.len(), 1);
        assert_eq!(u.visit_history[0].last_visit, t2);
    }

    #[test]
    fn visit_exactly_at_window_edge_counts() {
        let mut u = user();
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        record_visit(&mut u, "10.0.0.1", t0);
        assert!(record_visit(&mut u, "10.0.0.1", t0 + Duration::hours(24)).counted);
        assert_eq!(u.visit_count, 2);
    }

    #[test]
    fn distinct_ips_are_counted_separately() {
        let mut u = user();
        let now = Utc::now();
        assert!(record_visit(&mut u, "10.0.0.1", now).counted);
        assert!(record_visit(&mut u, "10.0.0.2", now).counted);
        assert!(!record_visit(&mut u, "10.0.0.1", now).counted);
        assert_eq!(u.visit_count, 2);
        assert_eq!(u.visit_history.len(), 2);
    }
}
