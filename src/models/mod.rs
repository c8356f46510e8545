// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod activity;
pub mod earnings;
pub mod manifest;
pub mod period;
pub mod profile;
pub mod round;

pub use activity::{Activity, ActivityType};
pub use earnings::{CostModel, PricingTable};
pub use manifest::{Manifest, ManifestSummary};
pub use period::{Holiday, Period};
pub use profile::{DayDistance, DeliverySetting, Location, ServiceProfile};
pub use round::{ParcelType, Round, RoundPricing};
