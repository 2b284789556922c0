//! Benchmarks for search operations.
//!
//! Every query scans the full record set, so cost grows linearly with the
//! registry size. Benchmark targets on a developer laptop:
//! - 1,000 clients: <5ms per paginated search
//! - 10,000 clients: <50ms per paginated search
//!
//! Covered:
//! - Free-text search through the store (load + filter + paginate)
//! - In-memory filtering alone
//! - Facet option building

// Criterion macros generate items without docs - this is expected for benchmarks
// Benchmarks use expect/unwrap for simplicity - panics are acceptable in benchmarks
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

use gasledger::services::{build_options, matches};
use gasledger::{ClientRecord, ClientRegistry, FacetSelection, SearchCriteria};

// ============================================================================
// Helper Functions
// ============================================================================

const SETTLEMENTS: &[&str] = &["Київ", "Львів", "Бровари", "Ірпінь", "Буча"];
const STREETS: &[&str] = &["Шевченка", "Франка", "Лесі Українки", "Садова", "Миру"];
const BRANDS: &[&str] = &["Metrix", "Elster", "Samgas", "Октава"];
const SURNAMES: &[&str] = &["Іваненко", "Петренко", "Коваленко", "Бондаренко", "Ткаченко"];

/// Builds `count` synthetic clients spread over a few settlements.
fn synthetic_clients(count: usize) -> Vec<ClientRecord> {
    (0..count)
        .map(|i| {
            let mut record = ClientRecord::new(
                format!("{:010}", 1_000_000 + i),
                format!("{} Клієнт {i}", SURNAMES[i % SURNAMES.len()]),
            )
            .with_settlement(SETTLEMENTS[i % SETTLEMENTS.len()])
            .with_street("вул.", STREETS[(i / 7) % STREETS.len()])
            .with_phone(format!("+38050{i:07}"))
            .with_meter(BRANDS[i % BRANDS.len()], "G4", (2000 + i % 25).to_string());
            record.meter_number = format!("M{i:06}");
            record.meter_group = format!("Група {}", i % 3);
            record.building = (i % 120 + 1).to_string();
            record
        })
        .collect()
}

/// Creates an in-memory registry holding `count` synthetic clients.
fn populated_registry(count: usize) -> ClientRegistry {
    let registry = ClientRegistry::in_memory().expect("Failed to open registry");
    for record in synthetic_clients(count) {
        registry.create(&record).expect("Failed to create client");
    }
    registry
}

// ============================================================================
// Search Benchmarks
// ============================================================================

fn bench_search_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_scaling");
    group.measurement_time(Duration::from_secs(10));

    for count in &[100, 1_000, 10_000] {
        let registry = populated_registry(*count);
        let criteria = SearchCriteria::new().with_text("петренко");

        group.bench_with_input(BenchmarkId::new("text_search", count), count, |b, _| {
            b.iter(|| {
                registry
                    .search_paginated(black_box(&criteria), 0, 50)
                    .expect("Search should succeed")
            });
        });
    }

    group.finish();
}

fn bench_filter_only(c: &mut Criterion) {
    let records = synthetic_clients(10_000);
    let mut group = c.benchmark_group("filter_10000_clients");

    let text = SearchCriteria::new().with_text("123");
    group.bench_function("text_term", |b| {
        b.iter(|| records.iter().filter(|r| matches(r, black_box(&text))).count());
    });

    let combined = SearchCriteria::new()
        .with_settlement("Київ")
        .with_meter_brand("Metrix")
        .with_meter_year("2010");
    group.bench_function("combined_filters", |b| {
        b.iter(|| {
            records
                .iter()
                .filter(|r| matches(r, black_box(&combined)))
                .count()
        });
    });

    group.finish();
}

fn bench_facets(c: &mut Criterion) {
    let records = synthetic_clients(10_000);
    let mut group = c.benchmark_group("facets_10000_clients");

    group.bench_function("unscoped", |b| {
        let selection = FacetSelection::new();
        b.iter(|| build_options(black_box(&records), &selection));
    });

    group.bench_function("scoped_to_settlement", |b| {
        let selection = FacetSelection::from(&SearchCriteria::new().with_settlement("Львів"));
        b.iter(|| build_options(black_box(&records), &selection));
    });

    group.finish();
}

criterion_group!(benches, bench_search_scaling, bench_filter_only, bench_facets);
criterion_main!(benches);
