// SPDX-License-Identifier: MIT

//! Courier-Ledger: earnings and manifest tracking for a delivery round operator.
//!
//! This crate provides the backend API for logging delivery-day GPS events,
//! recording parcel manifests per round, pricing parcel types, and producing
//! earnings dashboards and period reports.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{ConditionsService, DirectionsClient};

/// Document owner id. The ledger serves a single operator.
pub const OPERATOR_ID: u64 = 1;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub directions: DirectionsClient,
    pub conditions: ConditionsService,
}
