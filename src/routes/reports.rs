// SPDX-License-Identifier: MIT

//! Earnings report routes.
//!
//! Reports value every parcel handled (manifested plus re-manifested plus
//! carried forward), unlike the dashboard which pays out manifested counts
//! only. The report covers one pay period, defaulting to the latest one,
//! and can be narrowed to a single round or parcel type.

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::earnings::{
    self, CostModel, ParcelTypeBreakdown, PricingTable, WorkingDaySummary,
};
use crate::models::{Manifest, ManifestSummary, ParcelType, Period, ServiceProfile};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/reports", get(get_report))
}

#[derive(Deserialize)]
struct ReportQuery {
    /// Pay period to report on; the latest period when omitted.
    period_id: Option<u64>,
    /// Narrow to one round.
    round_id: Option<u64>,
    /// Narrow to one parcel type.
    parcel_type_id: Option<u64>,
}

#[derive(Serialize)]
pub struct ReportManifestRow {
    pub id: u64,
    pub delivery_date: NaiveDate,
    pub reference: String,
    pub parcels: u32,
    pub income: f64,
}

#[derive(Serialize)]
pub struct RoundReport {
    pub round_id: u64,
    pub round_name: String,
    pub manifests: Vec<ReportManifestRow>,
    pub parcels: u32,
    pub income: f64,
    pub cost: f64,
    pub profit: f64,
    pub parcel_types: Vec<ParcelTypeBreakdown>,
}

#[derive(Serialize)]
pub struct TotalSummary {
    pub total_parcels: u32,
    pub total_income: f64,
    pub total_costs: f64,
    pub profit: f64,
}

/// One manifest line laid out for the performance table.
#[derive(Serialize)]
pub struct DeliveryPerformanceRow {
    pub date: NaiveDate,
    pub round_name: String,
    pub parcel_type: String,
    pub parcels: u32,
    pub income: f64,
    pub profit: f64,
}

#[derive(Serialize)]
pub struct PeriodIncome {
    pub period_id: u64,
    pub period_name: String,
    pub income: f64,
    pub cost: f64,
    pub profit: f64,
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub period: Period,
    pub total_summary: TotalSummary,
    pub rounds: Vec<RoundReport>,
    pub parcel_types: Vec<ParcelTypeBreakdown>,
    pub delivery_performance: Vec<DeliveryPerformanceRow>,
    pub income_by_period: Vec<PeriodIncome>,
    pub working_day_summary: WorkingDaySummary,
}

async fn get_report(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<ReportResponse>> {
    let periods = state.db.list_periods().await?;
    let period = select_period(&periods, params.period_id)?;

    let manifests = state.db.list_manifests(user.user_id).await?;
    let parcel_types = state.db.list_parcel_types().await?;
    let pricings = state.db.list_pricings().await?;
    let holidays = state.db.list_holidays().await?;
    let profiles = state.db.list_service_profiles(user.user_id).await?;
    let table = PricingTable::from_pricings(&pricings);

    let round_names: HashMap<u64, String> = state
        .db
        .list_rounds(user.user_id)
        .await?
        .into_iter()
        .map(|r| (r.id, r.name))
        .collect();

    // Lines per manifest, with the optional parcel-type filter applied.
    let mut lines_by_manifest: HashMap<u64, Vec<ManifestSummary>> = HashMap::new();
    for manifest in &manifests {
        let mut lines = state.db.list_manifest_summaries(manifest.id).await?;
        if let Some(parcel_type_id) = params.parcel_type_id {
            lines.retain(|l| l.parcel_type_id == parcel_type_id);
        }
        lines_by_manifest.insert(manifest.id, lines);
    }

    let entries = scope_entries(
        &manifests,
        &lines_by_manifest,
        period,
        params.round_id,
        params.parcel_type_id.is_some(),
    );

    let total_parcels = earnings::total_parcels(&entries);
    let total_income = earnings::total_income(&entries, &table);
    let total_costs = costs_for(&entries, &profiles);

    let rounds = round_reports(&entries, &round_names, &parcel_types, &profiles, &table);
    let breakdown = earnings::parcel_type_breakdown(&entries, &parcel_types, &table);
    let delivery_performance =
        performance_rows(&entries, &round_names, &parcel_types, &profiles, &table);
    let income_by_period =
        income_per_period(&periods, &manifests, &lines_by_manifest, &profiles, &table);
    let working_day_summary = earnings::working_day_summary(period, &holidays, total_income);

    Ok(Json(ReportResponse {
        period: period.clone(),
        total_summary: TotalSummary {
            total_parcels,
            total_income,
            total_costs,
            profit: total_income - total_costs,
        },
        rounds,
        parcel_types: breakdown,
        delivery_performance,
        income_by_period,
        working_day_summary,
    }))
}

/// Resolve the requested period, or fall back to the latest one.
fn select_period(periods: &[Period], period_id: Option<u64>) -> Result<&Period> {
    match period_id {
        Some(id) => periods
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Period {} not found", id))),
        None => periods
            .iter()
            .max_by_key(|p| p.start_date)
            .ok_or_else(|| AppError::BadRequest("No pay periods defined yet".to_string())),
    }
}

/// Manifests in scope for the report, paired with their line items.
///
/// When the parcel-type filter stripped every line off a manifest, the
/// manifest drops out entirely so it neither shows up as an empty round
/// entry nor charges a service run.
fn scope_entries<'a>(
    manifests: &'a [Manifest],
    lines_by_manifest: &'a HashMap<u64, Vec<ManifestSummary>>,
    period: &Period,
    round_id: Option<u64>,
    lines_filtered: bool,
) -> Vec<(&'a Manifest, &'a [ManifestSummary])> {
    manifests
        .iter()
        .filter(|m| {
            period.contains(m.delivery_date) && round_id.is_none_or(|id| m.round_id == id)
        })
        .map(|m| (m, lines_by_manifest[&m.id].as_slice()))
        .filter(|(_, lines)| !lines_filtered || !lines.is_empty())
        .collect()
}

/// Cost of one service run for a round. Round-specific profiles win over the
/// generic one; no profile at all means a free run.
fn run_cost(profiles: &[ServiceProfile], round_id: u64) -> f64 {
    profiles
        .iter()
        .find(|p| p.round_id == Some(round_id))
        .or_else(|| {
            profiles
                .iter()
                .find(|p| CostModel::applies_to(p, round_id))
        })
        .map(|p| CostModel::from_profile(p).total())
        .unwrap_or(0.0)
}

/// Per-round sections, ordered by round ID, manifests newest first.
/// Rounds whose manifests carry no parcels are left out.
fn round_reports(
    entries: &[(&Manifest, &[ManifestSummary])],
    round_names: &HashMap<u64, String>,
    parcel_types: &[ParcelType],
    profiles: &[ServiceProfile],
    table: &PricingTable,
) -> Vec<RoundReport> {
    let mut reports: Vec<RoundReport> = Vec::new();

    for (manifest, lines) in entries {
        let parcels: u32 = lines.iter().map(ManifestSummary::total_parcels).sum();
        let income = earnings::report_income(manifest.round_id, lines, table);

        let row = ReportManifestRow {
            id: manifest.id,
            delivery_date: manifest.delivery_date,
            reference: manifest.reference.clone(),
            parcels,
            income,
        };

        match reports.iter_mut().find(|r| r.round_id == manifest.round_id) {
            Some(report) => {
                report.manifests.push(row);
                report.parcels += parcels;
                report.income += income;
            }
            None => reports.push(RoundReport {
                round_id: manifest.round_id,
                round_name: round_names
                    .get(&manifest.round_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                manifests: vec![row],
                parcels,
                income,
                cost: 0.0,
                profit: 0.0,
                parcel_types: Vec::new(),
            }),
        }
    }

    reports.retain(|r| r.parcels > 0);
    reports.sort_by_key(|r| r.round_id);

    for report in &mut reports {
        report
            .manifests
            .sort_by(|a, b| b.delivery_date.cmp(&a.delivery_date));

        let round_entries: Vec<(&Manifest, &[ManifestSummary])> = entries
            .iter()
            .filter(|(m, _)| m.round_id == report.round_id)
            .copied()
            .collect();
        report.cost = costs_for(&round_entries, profiles);
        report.profit = report.income - report.cost;
        report.parcel_types = earnings::parcel_type_breakdown(&round_entries, parcel_types, table);
    }

    reports
}

/// Flat performance rows, one per manifest line, oldest day first.
///
/// Each line's profit is its income minus the service-run cost of the
/// manifest's round.
fn performance_rows(
    entries: &[(&Manifest, &[ManifestSummary])],
    round_names: &HashMap<u64, String>,
    parcel_types: &[ParcelType],
    profiles: &[ServiceProfile],
    table: &PricingTable,
) -> Vec<DeliveryPerformanceRow> {
    let type_names: HashMap<u64, &str> = parcel_types
        .iter()
        .map(|t| (t.id, t.name.as_str()))
        .collect();

    let mut rows: Vec<DeliveryPerformanceRow> = Vec::new();

    for (manifest, lines) in entries {
        let cost = run_cost(profiles, manifest.round_id);
        let round_name = round_names
            .get(&manifest.round_id)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());

        for line in *lines {
            let parcels = line.total_parcels();
            let income = table.price(manifest.round_id, line.parcel_type_id) * f64::from(parcels);
            rows.push(DeliveryPerformanceRow {
                date: manifest.delivery_date,
                round_name: round_name.clone(),
                parcel_type: type_names
                    .get(&line.parcel_type_id)
                    .copied()
                    .unwrap_or("Unknown")
                    .to_string(),
                parcels,
                income,
                profit: income - cost,
            });
        }
    }

    rows.sort_by_key(|r| r.date);
    rows
}

/// Income, cost, and profit for every period, for period-over-period
/// comparison.
fn income_per_period(
    periods: &[Period],
    manifests: &[Manifest],
    lines_by_manifest: &HashMap<u64, Vec<ManifestSummary>>,
    profiles: &[ServiceProfile],
    table: &PricingTable,
) -> Vec<PeriodIncome> {
    periods
        .iter()
        .map(|period| {
            let entries: Vec<(&Manifest, &[ManifestSummary])> = manifests
                .iter()
                .filter(|m| period.contains(m.delivery_date))
                .map(|m| (m, lines_by_manifest[&m.id].as_slice()))
                .collect();
            let income = earnings::total_income(&entries, table);
            let cost = costs_for(&entries, profiles);
            PeriodIncome {
                period_id: period.id,
                period_name: period.name.clone(),
                income,
                cost,
                profit: income - cost,
            }
        })
        .collect()
}

/// Operating costs: each (day, round) with a manifest costs one service run
/// under the round's profile. Round-specific profiles win over the generic one.
fn costs_for(entries: &[(&Manifest, &[ManifestSummary])], profiles: &[ServiceProfile]) -> f64 {
    let mut seen: Vec<(NaiveDate, u64)> = Vec::new();
    let mut total = 0.0;

    for (manifest, _) in entries {
        let key = (manifest.delivery_date, manifest.round_id);
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        total += run_cost(profiles, manifest.round_id);
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn period(id: u64, start: NaiveDate, end: NaiveDate) -> Period {
        Period {
            id,
            name: format!("Period {}", id),
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn test_select_period_defaults_to_latest() {
        let periods = vec![
            period(1, d(2025, 5, 1), d(2025, 5, 28)),
            period(2, d(2025, 6, 1), d(2025, 6, 28)),
        ];
        assert_eq!(select_period(&periods, None).unwrap().id, 2);
        assert_eq!(select_period(&periods, Some(1)).unwrap().id, 1);
        assert!(select_period(&periods, Some(99)).is_err());
    }

    #[test]
    fn test_select_period_empty_is_bad_request() {
        assert!(select_period(&[], None).is_err());
    }

    fn profile(id: u64, round_id: Option<u64>, fuel_per_unit: f64) -> ServiceProfile {
        ServiceProfile {
            id,
            user_id: 1,
            round_id,
            fuel_cost_per_unit: fuel_per_unit,
            distance_unit: "km".to_string(),
            distance_home_to_depot: 10.0,
            distance_depot_to_start: 5.0,
            distance_end_to_home: 15.0,
            loading_time_minutes: 0,
            loading_time_cost_per_hour: 0.0,
        }
    }

    fn manifest(id: u64, round_id: u64, date: NaiveDate) -> Manifest {
        Manifest {
            id,
            user_id: 1,
            round_id,
            delivery_date: date,
            reference: format!("REF-{}", id),
        }
    }

    fn line(manifest_id: u64, parcel_type_id: u64, m: u32, re: u32, cf: u32) -> ManifestSummary {
        ManifestSummary {
            manifest_id,
            parcel_type_id,
            manifested: m,
            re_manifested: re,
            carried_forward: cf,
        }
    }

    fn pricing(round_id: u64, parcel_type_id: u64, price: f64) -> crate::models::RoundPricing {
        crate::models::RoundPricing {
            id: round_id * 100 + parcel_type_id,
            round_id,
            parcel_type_id,
            price,
        }
    }

    fn parcel_type(id: u64, round_id: u64, name: &str) -> ParcelType {
        ParcelType {
            id,
            round_id,
            name: name.to_string(),
            sort_order: 1,
        }
    }

    #[test]
    fn test_costs_count_each_day_round_once() {
        let profiles = vec![profile(1, None, 1.0)]; // 30 distance units/day
        let m1 = manifest(1, 7, d(2025, 6, 2));
        let m2 = manifest(2, 7, d(2025, 6, 2)); // same day+round, no extra run
        let m3 = manifest(3, 7, d(2025, 6, 3));
        let no_lines: &[ManifestSummary] = &[];

        let entries = vec![(&m1, no_lines), (&m2, no_lines), (&m3, no_lines)];
        let total = costs_for(&entries, &profiles);
        assert!((total - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_specific_profile_wins() {
        let profiles = vec![profile(1, None, 1.0), profile(2, Some(7), 2.0)];
        let m1 = manifest(1, 7, d(2025, 6, 2));
        let no_lines: &[ManifestSummary] = &[];

        let entries = vec![(&m1, no_lines)];
        let total = costs_for(&entries, &profiles);
        assert!((total - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_performance_rows_one_per_line_with_profit() {
        let table = PricingTable::from_pricings(&[pricing(7, 10, 1.0), pricing(7, 11, 2.0)]);
        let types = vec![parcel_type(10, 7, "Standard"), parcel_type(11, 7, "Heavy")];
        let profiles = vec![profile(1, None, 1.0)]; // 30.0 per run
        let round_names: HashMap<u64, String> = [(7, "North Loop".to_string())].into();

        let m = manifest(1, 7, d(2025, 6, 2));
        let lines = vec![line(1, 10, 40, 3, 2), line(1, 11, 10, 0, 0)];
        let entries: Vec<(&Manifest, &[ManifestSummary])> = vec![(&m, &lines)];

        let rows = performance_rows(&entries, &round_names, &types, &profiles, &table);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, d(2025, 6, 2));
        assert_eq!(rows[0].round_name, "North Loop");
        assert_eq!(rows[0].parcel_type, "Standard");
        assert_eq!(rows[0].parcels, 45);
        assert!((rows[0].income - 45.0).abs() < 1e-9);
        assert!((rows[0].profit - 15.0).abs() < 1e-9);
        assert_eq!(rows[1].parcel_type, "Heavy");
        assert!((rows[1].profit - (20.0 - 30.0)).abs() < 1e-9);
    }

    #[test]
    fn test_income_by_period_carries_cost_and_profit() {
        let table = PricingTable::from_pricings(&[pricing(7, 10, 1.0)]);
        let profiles = vec![profile(1, None, 1.0)]; // 30.0 per run
        let periods = vec![
            period(1, d(2025, 5, 1), d(2025, 5, 31)),
            period(2, d(2025, 6, 1), d(2025, 6, 30)),
        ];
        let manifests = vec![manifest(1, 7, d(2025, 6, 2))];
        let lines_by_manifest: HashMap<u64, Vec<ManifestSummary>> =
            [(1, vec![line(1, 10, 50, 0, 0)])].into();

        let rows = income_per_period(&periods, &manifests, &lines_by_manifest, &profiles, &table);

        assert_eq!(rows.len(), 2);
        assert!((rows[0].income - 0.0).abs() < 1e-9);
        assert!((rows[0].cost - 0.0).abs() < 1e-9);
        assert!((rows[1].income - 50.0).abs() < 1e-9);
        assert!((rows[1].cost - 30.0).abs() < 1e-9);
        assert!((rows[1].profit - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_reports_carry_cost_profit_and_breakdown() {
        let table = PricingTable::from_pricings(&[pricing(7, 10, 1.0), pricing(8, 10, 2.0)]);
        let types = vec![parcel_type(10, 7, "Standard")];
        let profiles = vec![profile(1, None, 1.0), profile(2, Some(8), 2.0)];
        let round_names: HashMap<u64, String> =
            [(7, "North".to_string()), (8, "South".to_string())].into();

        let m1 = manifest(1, 7, d(2025, 6, 2));
        let m2 = manifest(2, 8, d(2025, 6, 2));
        let l1 = vec![line(1, 10, 50, 0, 0)];
        let l2 = vec![line(2, 10, 20, 0, 0)];
        let entries: Vec<(&Manifest, &[ManifestSummary])> =
            vec![(&m1, l1.as_slice()), (&m2, l2.as_slice())];

        let reports = round_reports(&entries, &round_names, &types, &profiles, &table);

        assert_eq!(reports.len(), 2);
        assert!((reports[0].cost - 30.0).abs() < 1e-9); // generic profile
        assert!((reports[0].profit - 20.0).abs() < 1e-9);
        assert_eq!(reports[0].parcel_types.len(), 1);
        assert_eq!(reports[0].parcel_types[0].total, 50);
        assert!((reports[1].cost - 60.0).abs() < 1e-9); // round-bound profile
        assert!((reports[1].profit - (40.0 - 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_round_reports_skip_zero_parcel_rounds() {
        let table = PricingTable::default();
        let round_names: HashMap<u64, String> = HashMap::new();
        let m = manifest(1, 7, d(2025, 6, 2));
        let no_lines: &[ManifestSummary] = &[];
        let entries = vec![(&m, no_lines)];

        let reports = round_reports(&entries, &round_names, &[], &[], &table);
        assert!(reports.is_empty());
    }

    #[test]
    fn test_scope_entries_drops_filtered_out_manifests() {
        let p = period(1, d(2025, 6, 1), d(2025, 6, 30));
        let manifests = vec![manifest(1, 7, d(2025, 6, 2)), manifest(2, 8, d(2025, 6, 3))];
        // Manifest 2's lines were all removed by a parcel-type filter.
        let lines_by_manifest: HashMap<u64, Vec<ManifestSummary>> =
            [(1, vec![line(1, 10, 5, 0, 0)]), (2, vec![])].into();

        let entries = scope_entries(&manifests, &lines_by_manifest, &p, None, true);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0.id, 1);

        // Without an active filter, the empty manifest stays in scope.
        let entries = scope_entries(&manifests, &lines_by_manifest, &p, None, false);
        assert_eq!(entries.len(), 2);

        // And the service run of the filtered-out manifest is not charged.
        let profiles = vec![profile(1, None, 1.0)];
        let scoped = scope_entries(&manifests, &lines_by_manifest, &p, None, true);
        assert!((costs_for(&scoped, &profiles) - 30.0).abs() < 1e-9);
    }
}
