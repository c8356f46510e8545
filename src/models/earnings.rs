// SPDX-License-Identifier: MIT

//! Earnings aggregation engine.
//!
//! Pure computation over manifests, pricing, periods, and cost assumptions.
//! Routes fetch the rows; everything here works on in-memory collections so
//! the dashboard and report numbers stay testable without a database.
//!
//! Two valuations exist side by side: the dashboard values a manifest by its
//! freshly manifested parcels only, while reports count every parcel handled
//! (manifested + re-manifested + carried forward).

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::{Holiday, Manifest, ManifestSummary, ParcelType, Period, RoundPricing, ServiceProfile};
use crate::time_utils::{days_in_range, is_working_day};

// ─── Pricing ─────────────────────────────────────────────────

/// Price lookup for (round, parcel type) pairs. Missing entries price at 0.
#[derive(Debug, Default, Clone)]
pub struct PricingTable {
    prices: HashMap<(u64, u64), f64>,
}

impl PricingTable {
    pub fn from_pricings(pricings: &[RoundPricing]) -> Self {
        let prices = pricings
            .iter()
            .map(|p| ((p.round_id, p.parcel_type_id), p.price))
            .collect();
        Self { prices }
    }

    /// Price per parcel, or 0 when the pair has no pricing.
    pub fn price(&self, round_id: u64, parcel_type_id: u64) -> f64 {
        match self.prices.get(&(round_id, parcel_type_id)) {
            Some(price) => *price,
            None => {
                tracing::warn!(round_id, parcel_type_id, "No price configured, using 0");
                0.0
            }
        }
    }
}

/// Dashboard valuation: freshly manifested parcels only.
pub fn dashboard_value(round_id: u64, lines: &[ManifestSummary], table: &PricingTable) -> f64 {
    lines
        .iter()
        .map(|line| table.price(round_id, line.parcel_type_id) * f64::from(line.manifested))
        .sum()
}

/// Report income: every parcel handled.
pub fn report_income(round_id: u64, lines: &[ManifestSummary], table: &PricingTable) -> f64 {
    lines
        .iter()
        .map(|line| table.price(round_id, line.parcel_type_id) * f64::from(line.total_parcels()))
        .sum()
}

// ─── Dashboard grouping ──────────────────────────────────────

/// Per-parcel-type quantities of one manifest row.
#[derive(Debug, Clone, Serialize)]
pub struct ParcelQuantity {
    pub parcel_type_id: u64,
    pub name: String,
    pub manifested: u32,
    pub re_manifested: u32,
    pub carried_forward: u32,
    pub total: u32,
    /// manifested × price
    pub value: f64,
}

/// One manifest prepared for display.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestRow {
    pub id: u64,
    pub delivery_date: NaiveDate,
    pub round_id: u64,
    pub round_name: String,
    pub quantities: Vec<ParcelQuantity>,
    pub total_value: f64,
}

/// Manifests of a single delivery date, one row per round.
#[derive(Debug, Clone, Serialize)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub manifests: Vec<ManifestRow>,
}

/// Manifests of a single reporting period, grouped by date.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodGroup {
    pub period_id: u64,
    pub period_name: String,
    pub dates: Vec<DateGroup>,
}

/// Build a display row for one manifest.
///
/// Quantities follow the parcel-type `sort_order` of the manifest's round;
/// types without a line item report zero counts.
pub fn manifest_row(
    manifest: &Manifest,
    lines: &[ManifestSummary],
    round_name: &str,
    parcel_types: &[ParcelType],
    table: &PricingTable,
) -> ManifestRow {
    let mut round_types: Vec<&ParcelType> = parcel_types
        .iter()
        .filter(|t| t.round_id == manifest.round_id)
        .collect();
    round_types.sort_by_key(|t| (t.sort_order, t.id));

    let quantities = round_types
        .iter()
        .map(|parcel_type| {
            let line = lines.iter().find(|l| l.parcel_type_id == parcel_type.id);
            let price = table.price(manifest.round_id, parcel_type.id);
            let manifested = line.map_or(0, |l| l.manifested);
            ParcelQuantity {
                parcel_type_id: parcel_type.id,
                name: parcel_type.name.clone(),
                manifested,
                re_manifested: line.map_or(0, |l| l.re_manifested),
                carried_forward: line.map_or(0, |l| l.carried_forward),
                total: line.map_or(0, ManifestSummary::total_parcels),
                value: price * f64::from(manifested),
            }
        })
        .collect();

    ManifestRow {
        id: manifest.id,
        delivery_date: manifest.delivery_date,
        round_id: manifest.round_id,
        round_name: round_name.to_string(),
        quantities,
        total_value: dashboard_value(manifest.round_id, lines, table),
    }
}

/// Group manifest rows by period → date (descending) → round.
///
/// Periods without manifests are dropped. Within one (date, round) pair only
/// the first row survives, matching the one-manifest-per-round-per-day rule.
pub fn group_by_period(periods: &[Period], rows: &[ManifestRow]) -> Vec<PeriodGroup> {
    periods
        .iter()
        .filter_map(|period| {
            let mut in_period: Vec<&ManifestRow> = rows
                .iter()
                .filter(|row| period.contains(row.delivery_date))
                .collect();
            if in_period.is_empty() {
                return None;
            }

            in_period.sort_by(|a, b| {
                b.delivery_date
                    .cmp(&a.delivery_date)
                    .then(a.round_id.cmp(&b.round_id))
            });

            let mut dates: Vec<DateGroup> = Vec::new();
            for row in in_period {
                match dates.last_mut() {
                    Some(group) if group.date == row.delivery_date => {
                        if !group.manifests.iter().any(|m| m.round_id == row.round_id) {
                            group.manifests.push(row.clone());
                        }
                    }
                    _ => dates.push(DateGroup {
                        date: row.delivery_date,
                        manifests: vec![row.clone()],
                    }),
                }
            }

            Some(PeriodGroup {
                period_id: period.id,
                period_name: period.name.clone(),
                dates,
            })
        })
        .collect()
}

// ─── Report breakdowns ───────────────────────────────────────

/// Aggregated counts and income for one parcel type.
#[derive(Debug, Clone, Serialize)]
pub struct ParcelTypeBreakdown {
    pub parcel_type_id: u64,
    pub name: String,
    pub total: u32,
    pub income: f64,
    /// Share of all parcels, 0..=100
    pub percentage: f64,
}

/// Break manifests down by parcel type across rounds.
///
/// `entries` pairs each manifest with its line items. Unknown parcel types
/// are reported as "Unknown" rather than dropped.
pub fn parcel_type_breakdown(
    entries: &[(&Manifest, &[ManifestSummary])],
    parcel_types: &[ParcelType],
    table: &PricingTable,
) -> Vec<ParcelTypeBreakdown> {
    let names: HashMap<u64, &str> = parcel_types
        .iter()
        .map(|t| (t.id, t.name.as_str()))
        .collect();

    let mut totals: HashMap<u64, (u32, f64)> = HashMap::new();
    let mut order: Vec<u64> = Vec::new();

    for (manifest, lines) in entries {
        for line in *lines {
            let count = line.total_parcels();
            let income = table.price(manifest.round_id, line.parcel_type_id) * f64::from(count);
            let entry = totals.entry(line.parcel_type_id).or_insert_with(|| {
                order.push(line.parcel_type_id);
                (0, 0.0)
            });
            entry.0 += count;
            entry.1 += income;
        }
    }

    let total_parcels: u32 = totals.values().map(|(count, _)| count).sum();

    order
        .into_iter()
        .map(|parcel_type_id| {
            let (total, income) = totals[&parcel_type_id];
            let percentage = if total_parcels > 0 {
                f64::from(total) / f64::from(total_parcels) * 100.0
            } else {
                0.0
            };
            ParcelTypeBreakdown {
                parcel_type_id,
                name: names
                    .get(&parcel_type_id)
                    .copied()
                    .unwrap_or("Unknown")
                    .to_string(),
                total,
                income,
                percentage,
            }
        })
        .collect()
}

/// Total parcels handled across manifests.
pub fn total_parcels(entries: &[(&Manifest, &[ManifestSummary])]) -> u32 {
    entries
        .iter()
        .flat_map(|(_, lines)| lines.iter())
        .map(ManifestSummary::total_parcels)
        .sum()
}

/// Total report income across manifests.
pub fn total_income(entries: &[(&Manifest, &[ManifestSummary])], table: &PricingTable) -> f64 {
    entries
        .iter()
        .map(|(manifest, lines)| report_income(manifest.round_id, lines, table))
        .sum()
}

// ─── Costs ───────────────────────────────────────────────────

/// Daily cost assumptions derived from a service profile.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CostModel {
    pub fuel_cost: f64,
    pub loading_cost: f64,
}

impl CostModel {
    pub fn from_profile(profile: &ServiceProfile) -> Self {
        Self {
            fuel_cost: profile.total_fuel_cost(),
            loading_cost: profile.total_loading_cost(),
        }
    }

    pub fn total(&self) -> f64 {
        self.fuel_cost + self.loading_cost
    }

    pub fn profit(&self, income: f64) -> f64 {
        income - self.total()
    }

    /// Whether the profile behind this model applies to the given round.
    pub fn applies_to(profile: &ServiceProfile, round_id: u64) -> bool {
        profile.round_id.is_none() || profile.round_id == Some(round_id)
    }
}

// ─── Working days ────────────────────────────────────────────

/// Working-day summary for one period with holidays taken out.
#[derive(Debug, Clone, Serialize)]
pub struct WorkingDaySummary {
    pub period_id: u64,
    pub period_name: String,
    pub working_days: u32,
    pub holiday_days: u32,
    /// holiday days × daily rate
    pub holiday_credit: f64,
    /// income / working days; absent when the period has no working days
    pub average_income_per_working_day: Option<f64>,
}

/// Count working days in a period: calendar days minus Sundays minus any day
/// covered by a holiday. A day covered by overlapping holidays is removed once.
pub fn working_days(period: &Period, holidays: &[Holiday]) -> u32 {
    days_in_range(period.start_date, period.end_date)
        .filter(|day| is_working_day(*day))
        .filter(|day| !holidays.iter().any(|h| h.covers(*day)))
        .count() as u32
}

/// Earnings credited for holiday days inside the period.
///
/// Each covered working day is credited at the rate of the first holiday
/// covering it.
pub fn holiday_credit(period: &Period, holidays: &[Holiday]) -> (u32, f64) {
    let mut days = 0u32;
    let mut credit = 0.0;
    for day in days_in_range(period.start_date, period.end_date) {
        if !is_working_day(day) {
            continue;
        }
        if let Some(holiday) = holidays.iter().find(|h| h.covers(day)) {
            days += 1;
            credit += holiday.daily_rate;
        }
    }
    (days, credit)
}

/// Build the working-day summary for one period.
pub fn working_day_summary(period: &Period, holidays: &[Holiday], income: f64) -> WorkingDaySummary {
    let working = working_days(period, holidays);
    let (holiday_days, credit) = holiday_credit(period, holidays);
    WorkingDaySummary {
        period_id: period.id,
        period_name: period.name.clone(),
        working_days: working,
        holiday_days,
        holiday_credit: credit,
        average_income_per_working_day: if working > 0 {
            Some(income / f64::from(working))
        } else {
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn manifest(id: u64, round_id: u64, date: NaiveDate) -> Manifest {
        Manifest {
            id,
            user_id: 1,
            round_id,
            delivery_date: date,
            reference: format!("MAN-{id}"),
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

    fn pricing(round_id: u64, parcel_type_id: u64, price: f64) -> RoundPricing {
        RoundPricing {
            id: round_id * 100 + parcel_type_id,
            round_id,
            parcel_type_id,
            price,
        }
    }

    fn parcel_type(id: u64, round_id: u64, name: &str, sort_order: u32) -> ParcelType {
        ParcelType {
            id,
            round_id,
            name: name.to_string(),
            sort_order,
        }
    }

    #[test]
    fn test_missing_price_values_at_zero() {
        let table = PricingTable::from_pricings(&[pricing(1, 10, 0.85)]);
        assert_eq!(table.price(1, 10), 0.85);
        assert_eq!(table.price(1, 99), 0.0);
        assert_eq!(table.price(2, 10), 0.0);
    }

    #[test]
    fn test_dashboard_value_counts_manifested_only() {
        let table = PricingTable::from_pricings(&[pricing(1, 10, 1.0), pricing(1, 11, 2.0)]);
        let lines = vec![line(1, 10, 40, 5, 5), line(1, 11, 10, 0, 0)];

        // 40×1.0 + 10×2.0; the 10 re-manifested/carried parcels don't count
        assert_eq!(dashboard_value(1, &lines, &table), 60.0);
        // report income counts all 50 + 10 parcels
        assert_eq!(report_income(1, &lines, &table), 70.0);
    }

    #[test]
    fn test_manifest_row_orders_quantities_and_zero_fills() {
        let table = PricingTable::from_pricings(&[pricing(1, 10, 0.5)]);
        let types = vec![
            parcel_type(11, 1, "Heavy", 2),
            parcel_type(10, 1, "Standard", 1),
            parcel_type(20, 2, "Other Round", 1),
        ];
        let m = manifest(1, 1, d(2025, 5, 5));
        let lines = vec![line(1, 10, 30, 0, 0)];

        let row = manifest_row(&m, &lines, "Round 7", &types, &table);

        assert_eq!(row.quantities.len(), 2); // other round's type excluded
        assert_eq!(row.quantities[0].name, "Standard");
        assert_eq!(row.quantities[0].value, 15.0);
        assert_eq!(row.quantities[1].name, "Heavy");
        assert_eq!(row.quantities[1].manifested, 0);
        assert_eq!(row.total_value, 15.0);
    }

    #[test]
    fn test_group_by_period_drops_empty_and_sorts_dates_desc() {
        let periods = vec![
            Period {
                id: 1,
                name: "May".to_string(),
                start_date: d(2025, 5, 1),
                end_date: d(2025, 5, 31),
            },
            Period {
                id: 2,
                name: "June".to_string(),
                start_date: d(2025, 6, 1),
                end_date: d(2025, 6, 30),
            },
        ];
        let table = PricingTable::default();
        let types: Vec<ParcelType> = vec![];
        let rows = vec![
            manifest_row(&manifest(1, 1, d(2025, 5, 5)), &[], "R1", &types, &table),
            manifest_row(&manifest(2, 2, d(2025, 5, 5)), &[], "R2", &types, &table),
            manifest_row(&manifest(3, 1, d(2025, 5, 12)), &[], "R1", &types, &table),
        ];

        let grouped = group_by_period(&periods, &rows);

        assert_eq!(grouped.len(), 1); // June dropped
        assert_eq!(grouped[0].period_name, "May");
        assert_eq!(grouped[0].dates.len(), 2);
        assert_eq!(grouped[0].dates[0].date, d(2025, 5, 12)); // newest first
        assert_eq!(grouped[0].dates[1].manifests.len(), 2); // both rounds on the 5th
    }

    #[test]
    fn test_group_by_period_dedupes_date_round_pairs() {
        let periods = vec![Period {
            id: 1,
            name: "May".to_string(),
            start_date: d(2025, 5, 1),
            end_date: d(2025, 5, 31),
        }];
        let table = PricingTable::default();
        let types: Vec<ParcelType> = vec![];
        let rows = vec![
            manifest_row(&manifest(1, 1, d(2025, 5, 5)), &[], "R1", &types, &table),
            manifest_row(&manifest(2, 1, d(2025, 5, 5)), &[], "R1", &types, &table),
        ];

        let grouped = group_by_period(&periods, &rows);
        assert_eq!(grouped[0].dates[0].manifests.len(), 1);
        assert_eq!(grouped[0].dates[0].manifests[0].id, 1);
    }

    #[test]
    fn test_parcel_type_breakdown_percentages() {
        let table = PricingTable::from_pricings(&[pricing(1, 10, 1.0), pricing(1, 11, 3.0)]);
        let types = vec![
            parcel_type(10, 1, "Standard", 1),
            parcel_type(11, 1, "Heavy", 2),
        ];
        let m = manifest(1, 1, d(2025, 5, 5));
        let lines = vec![line(1, 10, 75, 0, 0), line(1, 11, 25, 0, 0)];
        let entries: Vec<(&Manifest, &[ManifestSummary])> = vec![(&m, &lines)];

        let breakdown = parcel_type_breakdown(&entries, &types, &table);

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].name, "Standard");
        assert_eq!(breakdown[0].total, 75);
        assert_eq!(breakdown[0].income, 75.0);
        assert_eq!(breakdown[0].percentage, 75.0);
        assert_eq!(breakdown[1].percentage, 25.0);
        let pct_sum: f64 = breakdown.iter().map(|b| b.percentage).sum();
        assert!((pct_sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_with_no_parcels_is_all_zero() {
        let table = PricingTable::default();
        let m = manifest(1, 1, d(2025, 5, 5));
        let lines: Vec<ManifestSummary> = vec![];
        let entries: Vec<(&Manifest, &[ManifestSummary])> = vec![(&m, &lines)];

        let breakdown = parcel_type_breakdown(&entries, &[], &table);
        assert!(breakdown.is_empty());
        assert_eq!(total_parcels(&entries), 0);
    }

    #[test]
    fn test_unknown_parcel_type_named_unknown() {
        let table = PricingTable::default();
        let m = manifest(1, 1, d(2025, 5, 5));
        let lines = vec![line(1, 999, 5, 0, 0)];
        let entries: Vec<(&Manifest, &[ManifestSummary])> = vec![(&m, &lines)];

        let breakdown = parcel_type_breakdown(&entries, &[], &table);
        assert_eq!(breakdown[0].name, "Unknown");
        assert_eq!(breakdown[0].total, 5);
        assert_eq!(breakdown[0].income, 0.0);
    }

    #[test]
    fn test_cost_model_profit() {
        let profile = ServiceProfile {
            id: 1,
            user_id: 1,
            round_id: Some(2),
            fuel_cost_per_unit: 0.5,
            distance_unit: "mile".to_string(),
            distance_home_to_depot: 10.0,
            distance_depot_to_start: 5.0,
            distance_end_to_home: 5.0,
            loading_time_minutes: 60,
            loading_time_cost_per_hour: 10.0,
        };
        let model = CostModel::from_profile(&profile);

        assert_eq!(model.fuel_cost, 10.0);
        assert_eq!(model.loading_cost, 10.0);
        assert_eq!(model.profit(100.0), 80.0);
        assert!(CostModel::applies_to(&profile, 2));
        assert!(!CostModel::applies_to(&profile, 3));
    }

    #[test]
    fn test_working_days_excludes_sundays_and_holidays() {
        // 2025-06-01 (Sun) .. 2025-06-14 (Sat): 12 non-Sunday days
        let period = Period {
            id: 1,
            name: "P".to_string(),
            start_date: d(2025, 6, 1),
            end_date: d(2025, 6, 14),
        };
        assert_eq!(working_days(&period, &[]), 12);

        // Holiday Mon 2..Wed 4 removes 3 working days
        let holidays = vec![Holiday {
            id: 1,
            start_date: d(2025, 6, 2),
            end_date: d(2025, 6, 4),
            daily_rate: 120.0,
        }];
        assert_eq!(working_days(&period, &holidays), 9);

        let (days, credit) = holiday_credit(&period, &holidays);
        assert_eq!(days, 3);
        assert_eq!(credit, 360.0);
    }

    #[test]
    fn test_overlapping_holidays_count_each_day_once() {
        let period = Period {
            id: 1,
            name: "P".to_string(),
            start_date: d(2025, 6, 2),
            end_date: d(2025, 6, 6),
        };
        let holidays = vec![
            Holiday {
                id: 1,
                start_date: d(2025, 6, 2),
                end_date: d(2025, 6, 4),
                daily_rate: 100.0,
            },
            Holiday {
                id: 2,
                start_date: d(2025, 6, 3),
                end_date: d(2025, 6, 5),
                daily_rate: 50.0,
            },
        ];

        assert_eq!(working_days(&period, &holidays), 1);
        let (days, _) = holiday_credit(&period, &holidays);
        assert_eq!(days, 4);
    }

    #[test]
    fn test_working_day_summary_average() {
        let period = Period {
            id: 1,
            name: "P".to_string(),
            start_date: d(2025, 6, 2),
            end_date: d(2025, 6, 7),
        };
        let summary = working_day_summary(&period, &[], 600.0);
        assert_eq!(summary.working_days, 6);
        assert_eq!(summary.average_income_per_working_day, Some(100.0));

        // A period of Sundays only has no working days
        let sunday_only = Period {
            id: 2,
            name: "S".to_string(),
            start_date: d(2025, 6, 1),
            end_date: d(2025, 6, 1),
        };
        let summary = working_day_summary(&sunday_only, &[], 600.0);
        assert_eq!(summary.working_days, 0);
        assert_eq!(summary.average_income_per_working_day, None);
    }
}
