// SPDX-License-Identifier: MIT

//! Service profile, locations, delivery settings, and persisted day distances.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stored cost assumptions used to estimate profit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceProfile {
    /// Profile ID (also used as document ID)
    pub id: u64,
    /// Owning operator
    pub user_id: u64,
    /// When set, costs apply to this round only; otherwise to every round
    #[serde(default)]
    pub round_id: Option<u64>,
    /// Fuel cost per distance unit
    pub fuel_cost_per_unit: f64,
    /// "mile" or "km"
    pub distance_unit: String,
    pub distance_home_to_depot: f64,
    pub distance_depot_to_start: f64,
    pub distance_end_to_home: f64,
    /// Time spent loading the van at the depot
    pub loading_time_minutes: u32,
    pub loading_time_cost_per_hour: f64,
}

impl ServiceProfile {
    /// Total distance of the daily out-and-back.
    pub fn total_distance(&self) -> f64 {
        self.distance_home_to_depot + self.distance_depot_to_start + self.distance_end_to_home
    }

    pub fn total_fuel_cost(&self) -> f64 {
        self.total_distance() * self.fuel_cost_per_unit
    }

    pub fn total_loading_cost(&self) -> f64 {
        f64::from(self.loading_time_minutes) / 60.0 * self.loading_time_cost_per_hour
    }

    pub fn total_cost(&self) -> f64 {
        self.total_fuel_cost() + self.total_loading_cost()
    }
}

/// A named point (home, depot) attached to the service profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// Location ID (also used as document ID)
    pub id: u64,
    pub user_id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Keyed numeric setting (manual distance overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverySetting {
    /// Setting key (also used as document ID)
    pub key: String,
    pub value: f64,
}

/// The setting keys the settings endpoint manages.
pub const SETTING_KEYS: [&str; 3] = [
    "home_to_depot_distance",
    "first_drop_distance",
    "last_drop_distance",
];

/// A computed distance for one segment of one delivery day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayDistance {
    pub date: NaiveDate,
    /// Segment name: "home_to_depot", "depot_to_first_drop", "last_drop_to_home"
    pub segment: String,
    pub distance_km: f64,
    pub from_activity_id: u64,
    pub to_activity_id: u64,
    /// True when the directions API failed and the straight-line fallback was used
    #[serde(default)]
    pub estimated: bool,
}
