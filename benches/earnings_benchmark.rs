// SPDX-License-Identifier: MIT

use chrono::NaiveDate;
use courier_ledger::models::earnings::{self, PricingTable};
use courier_ledger::models::{Manifest, ManifestSummary, ParcelType, Period, RoundPricing};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const ROUNDS: u64 = 4;
const TYPES_PER_ROUND: u64 = 5;
const DAYS: u64 = 365;

fn fixture() -> (
    Vec<Period>,
    Vec<Manifest>,
    Vec<Vec<ManifestSummary>>,
    Vec<ParcelType>,
    PricingTable,
) {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

    // 13 four-week periods covering the year
    let periods: Vec<Period> = (0..13)
        .map(|i| Period {
            id: i + 1,
            name: format!("Period {}", i + 1),
            start_date: start + chrono::Days::new(i * 28),
            end_date: start + chrono::Days::new(i * 28 + 27),
        })
        .collect();

    let mut parcel_types = Vec::new();
    let mut pricings = Vec::new();
    for round_id in 1..=ROUNDS {
        for t in 0..TYPES_PER_ROUND {
            let id = round_id * 100 + t;
            parcel_types.push(ParcelType {
                id,
                round_id,
                name: format!("Type {}", t),
                sort_order: t as u32,
            });
            pricings.push(RoundPricing {
                id,
                round_id,
                parcel_type_id: id,
                price: 0.5 + t as f64 * 0.25,
            });
        }
    }
    let table = PricingTable::from_pricings(&pricings);

    // A year of manifests, one per round per day
    let mut manifests = Vec::new();
    let mut lines = Vec::new();
    for day in 0..DAYS {
        let date = start + chrono::Days::new(day);
        for round_id in 1..=ROUNDS {
            let id = day * 10 + round_id;
            manifests.push(Manifest {
                id,
                user_id: 1,
                round_id,
                delivery_date: date,
                reference: format!("REF-{}", id),
            });
            lines.push(
                (0..TYPES_PER_ROUND)
                    .map(|t| ManifestSummary {
                        manifest_id: id,
                        parcel_type_id: round_id * 100 + t,
                        manifested: 40 + t as u32,
                        re_manifested: 3,
                        carried_forward: 2,
                    })
                    .collect(),
            );
        }
    }

    (periods, manifests, lines, parcel_types, table)
}

fn benchmark_aggregation(c: &mut Criterion) {
    let (periods, manifests, lines, parcel_types, table) = fixture();

    let entries: Vec<(&Manifest, &[ManifestSummary])> = manifests
        .iter()
        .zip(lines.iter())
        .map(|(m, l)| (m, l.as_slice()))
        .collect();

    let rows: Vec<_> = manifests
        .iter()
        .zip(lines.iter())
        .map(|(m, l)| earnings::manifest_row(m, l, "Round", &parcel_types, &table))
        .collect();

    let mut group = c.benchmark_group("earnings_aggregation");

    group.bench_function("group_year_by_period", |b| {
        b.iter(|| earnings::group_by_period(black_box(&periods), black_box(&rows)))
    });

    group.bench_function("parcel_type_breakdown_year", |b| {
        b.iter(|| {
            earnings::parcel_type_breakdown(black_box(&entries), black_box(&parcel_types), &table)
        })
    });

    group.bench_function("total_income_year", |b| {
        b.iter(|| earnings::total_income(black_box(&entries), &table))
    });

    group.finish();
}

criterion_group!(benches, benchmark_aggregation);
criterion_main!(benches);
