// SPDX-License-Identifier: MIT

//! Services module - external API clients and distance computation.

pub mod conditions;
pub mod directions;
pub mod distance;

pub use conditions::ConditionsService;
pub use directions::DirectionsClient;
pub use distance::DistanceCalculator;
