//! Infinite-scroll browse session.
//!
//! Loads the filtered result set page by page, snapshots the loaded window
//! after each successful load, and restores it on the next start so the
//! view reappears exactly where it was left.

use super::query::QueryService;
use super::scroll::{ScrollSnapshot, ScrollStateCache};
use crate::models::{ClientRecord, SearchCriteria};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

/// How a session obtained its initial window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The saved snapshot matched the requested criteria and was reused.
    Restored,
    /// The first page was loaded from the store.
    Loaded,
}

/// Browse controller for one view.
pub struct BrowseSession {
    query: Arc<QueryService>,
    cache: Arc<ScrollStateCache>,
    page_size: usize,
    scroll_save_interval: Duration,
    window: ScrollSnapshot,
    loaded: bool,
    last_save: Option<Instant>,
    pending_offset: Option<f64>,
}

impl BrowseSession {
    /// Creates an idle session. Call [`start`](Self::start) before use.
    #[must_use]
    pub fn new(query: Arc<QueryService>, cache: Arc<ScrollStateCache>, page_size: usize) -> Self {
        Self {
            query,
            cache,
            page_size,
            scroll_save_interval: Duration::from_millis(250),
            window: ScrollSnapshot::default(),
            loaded: false,
            last_save: None,
            pending_offset: None,
        }
    }

    /// Sets the minimum time between scroll-triggered saves.
    #[must_use]
    pub const fn with_scroll_save_interval(mut self, interval: Duration) -> Self {
        self.scroll_save_interval = interval;
        self
    }

    /// Opens the view for `criteria`.
    ///
    /// A saved snapshot with equal criteria is reused as is and its scroll
    /// offset becomes pending until [`on_rendered`](Self::on_rendered).
    /// Otherwise the snapshot is dropped and the first page is loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be read or the first page cannot
    /// be loaded. A failed first-page load leaves the session and the saved
    /// snapshot unchanged.
    #[instrument(skip(self, criteria), fields(operation = "browse_start"))]
    pub fn start(&mut self, criteria: SearchCriteria) -> Result<StartOutcome> {
        if let Some(snapshot) = self.cache.restore()?
            && snapshot.criteria == criteria
        {
            tracing::debug!(
                records = snapshot.records.len(),
                page_index = snapshot.page_index,
                "restored browse window"
            );
            self.pending_offset = Some(snapshot.scroll_offset);
            self.window = snapshot;
            self.loaded = true;
            return Ok(StartOutcome::Restored);
        }

        self.reload(criteria)?;
        Ok(StartOutcome::Loaded)
    }

    /// Replaces the criteria, dropping the loaded window and the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the first page cannot be loaded, in which case the
    /// session and the saved snapshot are left unchanged.
    #[instrument(skip(self, criteria), fields(operation = "browse_set_criteria"))]
    pub fn set_criteria(&mut self, criteria: SearchCriteria) -> Result<()> {
        self.reload(criteria)
    }

    /// Appends the next page if there is one. Returns the number of records
    /// appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be loaded or the snapshot cannot
    /// be saved. The loaded window is only extended on success.
    #[instrument(skip(self), fields(operation = "browse_load_more"))]
    pub fn load_more(&mut self) -> Result<usize> {
        if !self.loaded || !self.window.has_more {
            return Ok(0);
        }

        let next = self.window.page_index + 1;
        let ticket = self.query.begin_query();
        let Some(page) =
            self.query
                .search_guarded(ticket, &self.window.criteria, next, self.page_size)?
        else {
            return Ok(0);
        };

        let appended = page.items.len();
        self.window.records.extend(page.items);
        self.window.page_index = next;
        self.window.has_more = page.has_more;
        self.window.total = page.total;
        self.save_now()?;
        Ok(appended)
    }

    /// Records the current scroll offset, saving the snapshot if the save
    /// interval has elapsed since the last save. Returns whether a save
    /// happened.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a non-finite offset, which a
    /// snapshot cannot hold, or an error if the snapshot cannot be saved.
    pub fn record_scroll(&mut self, offset: f64) -> Result<bool> {
        if !offset.is_finite() {
            return Err(Error::InvalidInput(format!(
                "scroll offset must be a finite number, got {offset}"
            )));
        }
        self.window.scroll_offset = offset;
        let due = self
            .last_save
            .is_none_or(|at| at.elapsed() >= self.scroll_save_interval);
        if due {
            self.save_now()?;
        }
        Ok(due)
    }

    /// Releases the restored scroll offset once the restored records have
    /// been rendered. Subsequent calls return `None`.
    pub fn on_rendered(&mut self) -> Option<f64> {
        self.pending_offset.take()
    }

    /// Saves the current window immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    pub fn flush(&mut self) -> Result<()> {
        if self.loaded {
            self.save_now()?;
        }
        Ok(())
    }

    /// Records loaded so far.
    #[must_use]
    pub fn records(&self) -> &[ClientRecord] {
        &self.window.records
    }

    /// Whether another page can be loaded.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.window.has_more
    }

    /// Size of the full result set.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.window.total
    }

    /// Index of the last loaded page.
    #[must_use]
    pub const fn page_index(&self) -> usize {
        self.window.page_index
    }

    /// Active criteria.
    #[must_use]
    pub const fn criteria(&self) -> &SearchCriteria {
        &self.window.criteria
    }

    /// Last recorded scroll offset.
    #[must_use]
    pub const fn scroll_offset(&self) -> f64 {
        self.window.scroll_offset
    }

    fn reload(&mut self, criteria: SearchCriteria) -> Result<()> {
        let ticket = self.query.begin_query();
        let page = self
            .query
            .search_guarded(ticket, &criteria, 0, self.page_size)?;

        // The old snapshot goes only once the new first page is in hand.
        self.cache.clear()?;
        let Some(page) = page else {
            return Ok(());
        };

        self.window = ScrollSnapshot {
            records: page.items,
            page_index: 0,
            has_more: page.has_more,
            criteria,
            total: page.total,
            scroll_offset: 0.0,
        };
        self.loaded = true;
        self.pending_offset = None;
        self.save_now()
    }

    fn save_now(&mut self) -> Result<()> {
        self.cache.save(&self.window)?;
        self.last_save = Some(Instant::now());
        Ok(())
    }
}
