// SPDX-License-Identifier: MIT

//! Rounds, parcel types, and per-round pricing.

use serde::{Deserialize, Serialize};

/// A contracted delivery route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    /// Round ID (also used as document ID)
    pub id: u64,
    /// Owning operator
    pub user_id: u64,
    /// Display name (e.g. "Round 14 - Hilltop")
    pub name: String,
}

/// A parcel category scoped to a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelType {
    /// Parcel type ID (also used as document ID)
    pub id: u64,
    /// Round this type belongs to
    pub round_id: u64,
    /// Display name (e.g. "Standard", "Heavy", "Next Day")
    pub name: String,
    /// Dashboard column ordering
    #[serde(default)]
    pub sort_order: u32,
}

/// Price for one parcel type on one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundPricing {
    /// Pricing ID (also used as document ID)
    pub id: u64,
    pub round_id: u64,
    pub parcel_type_id: u64,
    /// Price per parcel in the operator's currency
    pub price: f64,
}
