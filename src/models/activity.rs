// SPDX-License-Identifier: MIT

//! Delivery-day GPS event models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored GPS event record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Activity ID (also used as document ID)
    pub id: u64,
    /// Owning operator
    pub user_id: u64,
    /// When the event happened
    pub timestamp: DateTime<Utc>,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Activity type name (e.g. "Left Home", "Arrive Depot")
    pub activity_type: String,
    /// Whether the event was entered by hand rather than captured live
    #[serde(default)]
    pub is_manual: bool,
}

/// A named category of delivery-day event.
///
/// Keyed by name. The seven canonical events are always accepted even
/// without a stored record; extra types live in this collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityType {
    /// Unique name (also used as document ID)
    pub name: String,
    /// Short display alias
    pub alias: String,
    /// Display color, "#RRGGBB"
    pub color: String,
}

/// Event names the application knows without configuration.
pub const CANONICAL_EVENTS: [&str; 7] = [
    "Left Home",
    "Arrive Depot",
    "Start Loading",
    "Leave Depot",
    "First Drop",
    "Last Drop",
    "Arrive Home",
];
