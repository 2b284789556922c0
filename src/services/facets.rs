//! Facet option builder.
//!
//! Option lists are scoped in one direction only: settlements narrow
//! streets, settlements and streets narrow meter attributes, and nothing
//! narrows settlements.

use crate::Result;
use crate::models::{ClientRecord, FacetOptions, FacetSelection};
use crate::storage::ClientStore;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Service computing filter option lists.
pub struct FacetService {
    store: Arc<dyn ClientStore>,
}

impl FacetService {
    /// Creates a new facet service over a store.
    #[must_use]
    pub fn new(store: Arc<dyn ClientStore>) -> Self {
        Self { store }
    }

    /// Builds every option list for the given address selection.
    ///
    /// # Errors
    ///
    /// Propagates storage errors unchanged.
    #[instrument(skip(self, selection), fields(operation = "build_facets"))]
    pub fn build(&self, selection: &FacetSelection) -> Result<FacetOptions> {
        let start = Instant::now();
        let records = self.store.get_all()?;
        let options = build_options(&records, selection);

        metrics::histogram!("facet_build_duration_ms")
            .record(start.elapsed().as_secs_f64() * 1000.0);
        tracing::debug!(
            records = records.len(),
            settlements = options.settlements.len(),
            streets = options.streets.len(),
            "facets built"
        );
        Ok(options)
    }
}

/// Computes option lists over an in-memory record set.
#[must_use]
pub fn build_options(records: &[ClientRecord], selection: &FacetSelection) -> FacetOptions {
    let settlements = distinct(records.iter().map(|r| r.settlement.clone()));

    let in_settlement: Vec<&ClientRecord> = records
        .iter()
        .filter(|r| {
            selection.settlements.is_empty() || selection.settlements.contains(&r.settlement)
        })
        .collect();

    let streets = distinct(in_settlement.iter().map(|r| r.street_name()));

    let in_address: Vec<&ClientRecord> = in_settlement
        .into_iter()
        .filter(|r| selection.streets.is_empty() || selection.streets.contains(&r.street_name()))
        .collect();

    let mut meter_years = distinct(in_address.iter().map(|r| r.meter_year.clone()));
    meter_years.sort_by(|a, b| compare_years_desc(a, b));

    FacetOptions {
        settlements,
        streets,
        meter_brands: distinct(in_address.iter().map(|r| r.meter_brand.clone())),
        meter_sizes: distinct(in_address.iter().map(|r| r.meter_size.clone())),
        meter_years,
        meter_groups: distinct(in_address.iter().map(|r| r.meter_group.clone())),
    }
}

/// Distinct non-blank values in ascending order.
fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
    values
        .filter(|v| !v.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Most recent year first. Numeric years precede anything else; two
/// non-numeric values fall back to reverse lexicographic order.
fn compare_years_desc(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => y.cmp(&x),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => b.cmp(a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchCriteria;

    fn record(settlement: &str, street: &str, brand: &str, year: &str) -> ClientRecord {
        ClientRecord::new("1", "A")
            .with_settlement(settlement)
            .with_street("вул.", street)
            .with_meter(brand, "G4", year)
    }

    fn fixture() -> Vec<ClientRecord> {
        vec![
            record("Київ", "Хрещатик", "Metrix", "2020"),
            record("Київ", "Лесі Українки", "Elster", "2018"),
            record("Львів", "Зелена", "Gallus", "2019"),
            record("", "", "", ""),
        ]
    }

    #[test]
    fn test_no_selection() {
        let options = build_options(&fixture(), &FacetSelection::new());
        assert_eq!(options.settlements, vec!["Київ", "Львів"]);
        assert_eq!(
            options.streets,
            vec!["вул.", "вул. Зелена", "вул. Лесі Українки", "вул. Хрещатик"]
        );
        assert_eq!(options.meter_brands, vec!["Elster", "Gallus", "Metrix"]);
        assert_eq!(options.meter_years, vec!["2020", "2019", "2018"]);
    }

    #[test]
    fn test_settlement_scopes_streets_and_meters() {
        let selection = FacetSelection::from(&SearchCriteria::new().with_settlement("Київ"));
        let options = build_options(&fixture(), &selection);

        assert_eq!(options.settlements, vec!["Київ", "Львів"]);
        assert_eq!(options.streets, vec!["вул. Лесі Українки", "вул. Хрещатик"]);
        assert_eq!(options.meter_brands, vec!["Elster", "Metrix"]);
    }

    #[test]
    fn test_street_scopes_meters_only() {
        let selection = FacetSelection::from(
            &SearchCriteria::new()
                .with_settlement("Київ")
                .with_street("вул. Хрещатик"),
        );
        let options = build_options(&fixture(), &selection);

        assert_eq!(options.streets.len(), 2, "streets depend only on settlements");
        assert_eq!(options.meter_brands, vec!["Metrix"]);
        assert_eq!(options.meter_years, vec!["2020"]);
    }

    #[test]
    fn test_meter_selection_ignored() {
        let criteria = SearchCriteria::new().with_meter_brand("Metrix");
        let options = build_options(&fixture(), &FacetSelection::from(&criteria));
        assert_eq!(options.meter_brands.len(), 3);
    }

    #[test]
    fn test_year_ordering() {
        let mut years = vec!["2015", "н/д", "2021", "1999", "abc"];
        years.sort_by(|a, b| compare_years_desc(a, b));
        assert_eq!(years, vec!["2021", "2015", "1999", "н/д", "abc"]);
    }

    #[test]
    fn test_blank_values_excluded() {
        let records = vec![record("  ", "", " ", "   ")];
        let options = build_options(&records, &FacetSelection::new());
        assert!(options.settlements.is_empty());
        assert!(options.meter_brands.is_empty());
        assert!(options.meter_years.is_empty());
    }
}
