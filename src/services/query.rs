//! Client search service.
//!
//! Every query is a full scan over the store: the registry holds thousands,
//! not millions, of records and the predicate needs fields the store does
//! not index.

use crate::Result;
use crate::models::{ClientRecord, Page, SearchCriteria};
use crate::storage::ClientStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::instrument;

/// Identifies one issued query.
///
/// Tickets are ordered by issue time. Only the most recently issued ticket is
/// current; results computed for any other ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryTicket(u64);

impl QueryTicket {
    /// Returns the sequence number.
    #[must_use]
    pub const fn sequence(self) -> u64 {
        self.0
    }
}

/// A prepared free-text term.
struct TextMatcher<'a> {
    term: &'a str,
    lowered: String,
}

impl<'a> TextMatcher<'a> {
    fn new(term: &'a str) -> Self {
        Self {
            term,
            lowered: term.to_lowercase(),
        }
    }

    /// Name and street compare case-insensitively; account number, phone
    /// and meter number compare exactly.
    fn matches(&self, record: &ClientRecord) -> bool {
        record.full_name.to_lowercase().contains(&self.lowered)
            || record.account_number.contains(self.term)
            || record.phone.contains(self.term)
            || record.meter_number.contains(self.term)
            || record.street.to_lowercase().contains(&self.lowered)
    }
}

fn in_set(selected: &BTreeSet<String>, value: &str) -> bool {
    selected.is_empty() || selected.contains(value)
}

/// Returns true if the record satisfies every criterion.
#[must_use]
pub fn matches(record: &ClientRecord, criteria: &SearchCriteria) -> bool {
    let text_ok = criteria
        .term()
        .is_none_or(|term| TextMatcher::new(term).matches(record));
    text_ok && matches_filters(record, criteria)
}

/// Categorical sets and status flags, without the free-text term.
fn matches_filters(record: &ClientRecord, criteria: &SearchCriteria) -> bool {
    if !in_set(&criteria.settlements, &record.settlement)
        || !in_set(&criteria.meter_brands, &record.meter_brand)
        || !in_set(&criteria.meter_sizes, &record.meter_size)
        || !in_set(&criteria.meter_years, &record.meter_year)
        || !in_set(&criteria.meter_groups, &record.meter_group)
    {
        return false;
    }

    if !criteria.streets.is_empty() && !criteria.streets.contains(&record.street_name()) {
        return false;
    }

    let status = criteria.status;
    !status.any()
        || (status.disconnected && record.is_disconnected())
        || (status.dacha && record.dacha)
        || (status.absent && record.temporary_absent)
}

/// Service for filtering client records.
pub struct QueryService {
    store: Arc<dyn ClientStore>,
    sequence: AtomicU64,
}

impl QueryService {
    /// Creates a new query service over a store.
    #[must_use]
    pub fn new(store: Arc<dyn ClientStore>) -> Self {
        Self {
            store,
            sequence: AtomicU64::new(0),
        }
    }

    /// Returns every matching record in store order.
    ///
    /// Empty criteria return all records.
    ///
    /// # Errors
    ///
    /// Propagates storage errors unchanged.
    #[instrument(skip(self, criteria), fields(operation = "search"))]
    pub fn search(&self, criteria: &SearchCriteria) -> Result<Vec<ClientRecord>> {
        let start = Instant::now();
        let all = self.store.get_all()?;
        let scanned = all.len();

        let results: Vec<ClientRecord> = if criteria.is_empty() {
            all
        } else {
            let matcher = criteria.term().map(TextMatcher::new);
            all.into_iter()
                .filter(|record| {
                    matcher.as_ref().is_none_or(|m| m.matches(record))
                        && matches_filters(record, criteria)
                })
                .collect()
        };

        metrics::counter!("query_scans_total").increment(1);
        metrics::histogram!("query_scan_duration_ms")
            .record(start.elapsed().as_secs_f64() * 1000.0);
        tracing::debug!(scanned, matched = results.len(), "search completed");

        Ok(results)
    }

    /// Returns one page of the matching records.
    ///
    /// # Errors
    ///
    /// Propagates storage errors unchanged.
    pub fn search_paginated(
        &self,
        criteria: &SearchCriteria,
        page_index: usize,
        page_size: usize,
    ) -> Result<Page> {
        let results = self.search(criteria)?;
        Ok(Page::from_full(results, page_index, page_size))
    }

    /// Issues a new ticket, superseding every earlier one.
    pub fn begin_query(&self) -> QueryTicket {
        QueryTicket(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns true if no ticket was issued after `ticket`.
    #[must_use]
    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        self.sequence.load(Ordering::SeqCst) == ticket.0
    }

    /// Runs a paginated search for `ticket`.
    ///
    /// Returns `Ok(None)` if a newer query was issued while this one ran;
    /// callers drop such results instead of displaying them.
    ///
    /// # Errors
    ///
    /// Propagates storage errors unchanged.
    pub fn search_guarded(
        &self,
        ticket: QueryTicket,
        criteria: &SearchCriteria,
        page_index: usize,
        page_size: usize,
    ) -> Result<Option<Page>> {
        if !self.is_current(ticket) {
            return Ok(None);
        }
        let page = self.search_paginated(criteria, page_index, page_size)?;
        if self.is_current(ticket) {
            Ok(Some(page))
        } else {
            tracing::debug!(ticket = ticket.0, "discarding superseded query result");
            Ok(None)
        }
    }
}
