// SPDX-License-Identifier: MIT

//! Manifest models: one delivery day for one round, with per-parcel-type
//! line items.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stored manifest record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest ID (also used as document ID)
    pub id: u64,
    /// Owning operator
    pub user_id: u64,
    /// Round this manifest belongs to
    pub round_id: u64,
    /// Delivery date
    pub delivery_date: NaiveDate,
    /// Manifest number from the paperwork; unique across manifests
    pub reference: String,
}

/// One line of a manifest: counts for a single parcel type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestSummary {
    /// Owning manifest
    pub manifest_id: u64,
    /// Parcel type the counts refer to
    pub parcel_type_id: u64,
    /// Parcels on the day's manifest
    pub manifested: u32,
    /// Parcels re-manifested from an earlier day
    pub re_manifested: u32,
    /// Parcels carried forward to a later day
    pub carried_forward: u32,
}

impl ManifestSummary {
    /// All parcels handled on this line.
    pub fn total_parcels(&self) -> u32 {
        self.manifested + self.re_manifested + self.carried_forward
    }
}
