// SPDX-License-Identifier: MIT

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const ACTIVITIES: &str = "activities";
    /// Activity types keyed by name
    pub const ACTIVITY_TYPES: &str = "activity_types";
    pub const ROUNDS: &str = "rounds";
    pub const PARCEL_TYPES: &str = "parcel_types";
    pub const ROUND_PRICINGS: &str = "round_pricings";
    pub const MANIFESTS: &str = "manifests";
    /// Manifest line items keyed by `{manifest_id}_{parcel_type_id}`
    pub const MANIFEST_SUMMARIES: &str = "manifest_summaries";
    pub const PERIODS: &str = "periods";
    pub const HOLIDAYS: &str = "holidays";
    pub const SERVICE_PROFILES: &str = "service_profiles";
    pub const LOCATIONS: &str = "locations";
    /// Keyed settings documents
    pub const DELIVERY_SETTINGS: &str = "delivery_settings";
    /// Computed day distances keyed by `{date}_{segment}`
    pub const DAY_DISTANCES: &str = "day_distances";
}
