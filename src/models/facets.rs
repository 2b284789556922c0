//! Facet selections and option lists.

use super::SearchCriteria;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The address part of the active filters.
///
/// Only settlement and street selections scope facet options. Meter
/// selections are deliberately not part of this type so they cannot narrow
/// sibling option lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSelection {
    /// Selected settlements.
    pub settlements: BTreeSet<String>,
    /// Selected streets (derived street names).
    pub streets: BTreeSet<String>,
}

impl FacetSelection {
    /// Creates an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            settlements: BTreeSet::new(),
            streets: BTreeSet::new(),
        }
    }

    /// Returns true if option lists computed for `previous` are stale for
    /// this selection.
    #[must_use]
    pub fn differs_from(&self, previous: &Self) -> bool {
        self != previous
    }
}

impl From<&SearchCriteria> for FacetSelection {
    fn from(criteria: &SearchCriteria) -> Self {
        Self {
            settlements: criteria.settlements.clone(),
            streets: criteria.streets.clone(),
        }
    }
}

/// Option lists offered by the filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOptions {
    /// All settlements, ascending.
    pub settlements: Vec<String>,
    /// Street names within the selected settlements, ascending.
    pub streets: Vec<String>,
    /// Meter brands within the selected address, ascending.
    pub meter_brands: Vec<String>,
    /// Meter sizes within the selected address, ascending.
    pub meter_sizes: Vec<String>,
    /// Meter years within the selected address, most recent first.
    pub meter_years: Vec<String>,
    /// Meter groups within the selected address, ascending.
    pub meter_groups: Vec<String>,
}
