//! Search criteria and paginated results.

use super::ClientRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Status flags combined with OR semantics.
///
/// When at least one flag is set a record must satisfy at least one of the
/// set flags. When none is set the dimension passes every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusFlags {
    /// Gas supply disconnected.
    pub disconnected: bool,
    /// Seasonal property.
    pub dacha: bool,
    /// Subscriber temporarily absent.
    pub absent: bool,
}

impl StatusFlags {
    /// Returns true if any flag is active.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.disconnected || self.dacha || self.absent
    }
}

/// Composite filter over client records.
///
/// Multi-value sets are OR within a field and AND across fields; an empty
/// set passes every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    /// Free-text term.
    pub text: Option<String>,
    /// Selected settlements.
    pub settlements: BTreeSet<String>,
    /// Selected streets (derived street names).
    pub streets: BTreeSet<String>,
    /// Selected meter brands.
    pub meter_brands: BTreeSet<String>,
    /// Selected meter sizes.
    pub meter_sizes: BTreeSet<String>,
    /// Selected meter years.
    pub meter_years: BTreeSet<String>,
    /// Selected meter groups.
    pub meter_groups: BTreeSet<String>,
    /// Status flags.
    pub status: StatusFlags,
}

impl SearchCriteria {
    /// Creates empty criteria (matches all).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text: None,
            settlements: BTreeSet::new(),
            streets: BTreeSet::new(),
            meter_brands: BTreeSet::new(),
            meter_sizes: BTreeSet::new(),
            meter_years: BTreeSet::new(),
            meter_groups: BTreeSet::new(),
            status: StatusFlags {
                disconnected: false,
                dacha: false,
                absent: false,
            },
        }
    }

    /// Sets the free-text term. An empty term clears it.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = if text.is_empty() { None } else { Some(text) };
        self
    }

    /// Adds a settlement.
    #[must_use]
    pub fn with_settlement(mut self, settlement: impl Into<String>) -> Self {
        self.settlements.insert(settlement.into());
        self
    }

    /// Adds a street (derived street name).
    #[must_use]
    pub fn with_street(mut self, street: impl Into<String>) -> Self {
        self.streets.insert(street.into());
        self
    }

    /// Adds a meter brand.
    #[must_use]
    pub fn with_meter_brand(mut self, brand: impl Into<String>) -> Self {
        self.meter_brands.insert(brand.into());
        self
    }

    /// Adds a meter size.
    #[must_use]
    pub fn with_meter_size(mut self, size: impl Into<String>) -> Self {
        self.meter_sizes.insert(size.into());
        self
    }

    /// Adds a meter year.
    #[must_use]
    pub fn with_meter_year(mut self, year: impl Into<String>) -> Self {
        self.meter_years.insert(year.into());
        self
    }

    /// Adds a meter group.
    #[must_use]
    pub fn with_meter_group(mut self, group: impl Into<String>) -> Self {
        self.meter_groups.insert(group.into());
        self
    }

    /// Replaces the status flags.
    #[must_use]
    pub const fn with_status(mut self, status: StatusFlags) -> Self {
        self.status = status;
        self
    }

    /// Returns the free-text term if it is set and non-empty.
    #[must_use]
    pub fn term(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Returns true if the criteria match every record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.term().is_none()
            && self.settlements.is_empty()
            && self.streets.is_empty()
            && self.meter_brands.is_empty()
            && self.meter_sizes.is_empty()
            && self.meter_years.is_empty()
            && self.meter_groups.is_empty()
            && !self.status.any()
    }
}

/// One page of an ordered result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Records in this page.
    pub items: Vec<ClientRecord>,
    /// Size of the full (unpaginated) result set.
    pub total: usize,
    /// Whether a following page exists.
    pub has_more: bool,
    /// Zero-based page index.
    pub page_index: usize,
    /// Requested page size.
    pub page_size: usize,
}

impl Page {
    /// Slices `[page_index * page_size, page_index * page_size + page_size)`
    /// out of a complete result set.
    #[must_use]
    pub fn from_full(mut all: Vec<ClientRecord>, page_index: usize, page_size: usize) -> Self {
        let total = all.len();
        let start = page_index.saturating_mul(page_size).min(total);
        let end = start.saturating_add(page_size).min(total);
        let items: Vec<ClientRecord> = all.drain(start..end).collect();
        // A zero-sized page never advances, so it never reports more.
        let has_more =
            page_size > 0 && page_index.saturating_add(1).saturating_mul(page_size) < total;

        Self {
            items,
            total,
            has_more,
            page_index,
            page_size,
        }
    }
}
