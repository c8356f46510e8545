// SPDX-License-Identifier: MIT

//! Dashboard route.
//!
//! Shows recorded manifests grouped by pay period and delivery date, valued
//! at manifested counts only. Re-manifested and carried-forward parcels
//! appear on the report pages instead.

use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::earnings::{self, PeriodGroup, PricingTable};
use crate::models::{ParcelType, Round};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/dashboard", get(get_dashboard))
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub periods: Vec<PeriodGroup>,
    /// Value of all manifested parcels across every period.
    pub total_earnings: f64,
    /// Rounds and parcel types the manifest entry form is populated from.
    pub rounds: Vec<Round>,
    pub parcel_types: Vec<ParcelType>,
}

async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DashboardResponse>> {
    let periods = state.db.list_periods().await?;
    let manifests = state.db.list_manifests(user.user_id).await?;
    let parcel_types = state.db.list_parcel_types().await?;
    let pricings = state.db.list_pricings().await?;
    let table = PricingTable::from_pricings(&pricings);

    let rounds = state.db.list_rounds(user.user_id).await?;
    let round_names: HashMap<u64, String> = rounds
        .iter()
        .map(|r| (r.id, r.name.clone()))
        .collect();

    let mut rows = Vec::with_capacity(manifests.len());
    let mut total_earnings = 0.0;

    for manifest in &manifests {
        let Some(round_name) = round_names.get(&manifest.round_id) else {
            // Orphaned manifest, skip rather than fail the whole page.
            tracing::warn!(
                manifest_id = manifest.id,
                round_id = manifest.round_id,
                "Manifest references a missing round"
            );
            continue;
        };

        let lines = state.db.list_manifest_summaries(manifest.id).await?;
        total_earnings += earnings::dashboard_value(manifest.round_id, &lines, &table);
        rows.push(earnings::manifest_row(
            manifest,
            &lines,
            round_name,
            &parcel_types,
            &table,
        ));
    }

    Ok(Json(DashboardResponse {
        periods: earnings::group_by_period(&periods, &rows),
        total_earnings,
        rounds,
        parcel_types,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_carries_form_population_lists() {
        let response = DashboardResponse {
            periods: vec![],
            total_earnings: 0.0,
            rounds: vec![Round {
                id: 7,
                user_id: 1,
                name: "North Loop".to_string(),
            }],
            parcel_types: vec![ParcelType {
                id: 10,
                round_id: 7,
                name: "Standard".to_string(),
                sort_order: 1,
            }],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["rounds"][0]["name"], "North Loop");
        assert_eq!(json["parcel_types"][0]["name"], "Standard");
    }
}
