// SPDX-License-Identifier: MIT

//! Day distance computation.
//!
//! Pairs a delivery day's GPS events into driving segments, queries the
//! directions API per segment, and falls back to straight-line distance when
//! no route can be fetched. Segments with missing events are reported, not
//! fatal; the whole day fails only when every segment does.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{Activity, DayDistance};
use crate::services::directions::DirectionsClient;
use chrono::NaiveDate;
use std::collections::HashMap;

/// The three driven segments of a delivery day, as (name, from-event, to-event).
pub const SEGMENTS: [(&str, &str, &str); 3] = [
    ("home_to_depot", "Left Home", "Arrive Depot"),
    ("depot_to_first_drop", "Leave Depot", "First Drop"),
    ("last_drop_to_home", "Last Drop", "Arrive Home"),
];

/// A segment resolved to its endpoint events.
#[derive(Debug)]
pub struct SegmentPair<'a> {
    pub name: &'static str,
    pub from: &'a Activity,
    pub to: &'a Activity,
}

/// Resolve the day's events into segment endpoint pairs.
///
/// When an event type occurs more than once the earliest occurrence wins.
/// Returns the resolved pairs and one error string per unresolvable segment.
pub fn pair_segments(activities: &[Activity]) -> (Vec<SegmentPair<'_>>, Vec<String>) {
    // Earliest event per type; input is newest-first from the DB.
    let mut by_type: HashMap<&str, &Activity> = HashMap::new();
    for activity in activities {
        let entry = by_type
            .entry(activity.activity_type.as_str())
            .or_insert(activity);
        if activity.timestamp < entry.timestamp {
            *entry = activity;
        }
    }

    let mut pairs = Vec::new();
    let mut errors = Vec::new();

    for (name, from_event, to_event) in SEGMENTS {
        match (by_type.get(from_event), by_type.get(to_event)) {
            (Some(from), Some(to)) => pairs.push(SegmentPair { name, from, to }),
            _ => errors.push(format!("Missing activities for segment '{}'", name)),
        }
    }

    (pairs, errors)
}

/// Computes and persists segment distances for delivery days.
pub struct DistanceCalculator<'a> {
    pub db: &'a FirestoreDb,
    pub directions: &'a DirectionsClient,
}

/// Outcome of one day's distance calculation.
#[derive(Debug, Default)]
pub struct DayDistanceOutcome {
    pub distances: Vec<DayDistance>,
    pub errors: Vec<String>,
}

impl<'a> DistanceCalculator<'a> {
    /// Compute distances for every resolvable segment of one day.
    pub async fn calculate_for_date(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<DayDistanceOutcome, AppError> {
        let activities = self.db.list_activities(user_id, Some(date)).await?;
        let (pairs, mut errors) = pair_segments(&activities);

        let mut distances = Vec::new();

        for pair in pairs {
            let from = (pair.from.latitude, pair.from.longitude);
            let to = (pair.to.latitude, pair.to.longitude);

            let (distance_km, estimated) = match self.directions.route_distance(from, to).await {
                Ok(route) => (route.distance_km, route.estimated),
                Err(e) => {
                    // No route: fall back to straight-line and mark it.
                    tracing::warn!(
                        segment = pair.name,
                        %date,
                        error = %e,
                        "Directions lookup failed, using straight-line fallback"
                    );
                    (DirectionsClient::straight_line_km(from, to), true)
                }
            };

            let record = DayDistance {
                date,
                segment: pair.name.to_string(),
                distance_km,
                from_activity_id: pair.from.id,
                to_activity_id: pair.to.id,
                estimated,
            };

            self.db.set_day_distance(&record).await?;
            distances.push(record);
        }

        if distances.is_empty() && !errors.is_empty() {
            return Err(AppError::BadRequest(errors.join("; ")));
        }

        errors.shrink_to_fit();
        Ok(DayDistanceOutcome { distances, errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(id: u64, activity_type: &str, hour: u32) -> Activity {
        Activity {
            id,
            user_id: 1,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 2, hour, 0, 0).unwrap(),
            latitude: 51.5 + id as f64 * 0.001,
            longitude: -0.1,
            activity_type: activity_type.to_string(),
            is_manual: false,
        }
    }

    #[test]
    fn test_pair_segments_full_day() {
        let activities = vec![
            event(1, "Left Home", 6),
            event(2, "Arrive Depot", 7),
            event(3, "Start Loading", 7),
            event(4, "Leave Depot", 8),
            event(5, "First Drop", 9),
            event(6, "Last Drop", 16),
            event(7, "Arrive Home", 17),
        ];

        let (pairs, errors) = pair_segments(&activities);

        assert!(errors.is_empty());
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].name, "home_to_depot");
        assert_eq!(pairs[0].from.id, 1);
        assert_eq!(pairs[0].to.id, 2);
        assert_eq!(pairs[2].name, "last_drop_to_home");
        assert_eq!(pairs[2].to.id, 7);
    }

    #[test]
    fn test_pair_segments_reports_missing_events() {
        let activities = vec![event(1, "Left Home", 6), event(2, "Arrive Depot", 7)];

        let (pairs, errors) = pair_segments(&activities);

        assert_eq!(pairs.len(), 1);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("depot_to_first_drop"));
        assert!(errors[1].contains("last_drop_to_home"));
    }

    #[test]
    fn test_pair_segments_uses_earliest_duplicate() {
        // Two "Left Home" events; the 6am one should win even though the
        // list arrives newest-first.
        let mut late = event(9, "Left Home", 10);
        late.latitude = 99.0;
        let activities = vec![
            late,
            event(1, "Left Home", 6),
            event(2, "Arrive Depot", 7),
        ];

        let (pairs, _) = pair_segments(&activities);
        assert_eq!(pairs[0].from.id, 1);
    }

    #[test]
    fn test_pair_segments_empty_day() {
        let (pairs, errors) = pair_segments(&[]);
        assert!(pairs.is_empty());
        assert_eq!(errors.len(), 3);
    }
}
