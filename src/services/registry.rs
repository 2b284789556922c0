//! Registry facade.
//!
//! Bundles a store with the services that read it so front ends hold one
//! handle instead of wiring each service themselves.

use super::browse::BrowseSession;
use super::facets::FacetService;
use super::query::QueryService;
use super::scroll::ScrollStateCache;
use crate::Result;
use crate::models::{ClientId, ClientRecord, FacetOptions, FacetSelection, Page, SearchCriteria};
use crate::storage::{ClientStore, SqliteClientStore};
use std::path::PathBuf;
use std::sync::Arc;

/// A client registry over one store.
pub struct ClientRegistry {
    store: Arc<dyn ClientStore>,
    query: Arc<QueryService>,
    facets: FacetService,
}

impl ClientRegistry {
    /// Wraps an existing store.
    #[must_use]
    pub fn new(store: Arc<dyn ClientStore>) -> Self {
        Self {
            query: Arc::new(QueryService::new(Arc::clone(&store))),
            facets: FacetService::new(Arc::clone(&store)),
            store,
        }
    }

    /// Opens a registry backed by a `SQLite` file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StorageUnavailable`] if the store cannot be
    /// opened.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(Arc::new(SqliteClientStore::new(path)?)))
    }

    /// Opens a registry backed by an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StorageUnavailable`] if the store cannot be
    /// created.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Arc::new(SqliteClientStore::in_memory()?)))
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> Arc<dyn ClientStore> {
        Arc::clone(&self.store)
    }

    /// Returns the shared query service.
    #[must_use]
    pub fn query(&self) -> Arc<QueryService> {
        Arc::clone(&self.query)
    }

    /// Creates a record and returns its id.
    ///
    /// # Errors
    ///
    /// See [`ClientStore::create`].
    pub fn create(&self, record: &ClientRecord) -> Result<ClientId> {
        self.store.create(record)
    }

    /// Overwrites the record stored under its id.
    ///
    /// # Errors
    ///
    /// See [`ClientStore::update`].
    pub fn update(&self, record: &ClientRecord) -> Result<ClientId> {
        self.store.update(record)
    }

    /// Deletes a record. Returns whether one was removed.
    ///
    /// # Errors
    ///
    /// See [`ClientStore::delete`].
    pub fn delete(&self, id: ClientId) -> Result<bool> {
        self.store.delete(id)
    }

    /// Retrieves a record by id.
    ///
    /// # Errors
    ///
    /// See [`ClientStore::get`].
    pub fn get(&self, id: ClientId) -> Result<Option<ClientRecord>> {
        self.store.get(id)
    }

    /// Returns one unfiltered page in id order.
    ///
    /// # Errors
    ///
    /// See [`ClientStore::get_page`].
    pub fn page(&self, page_index: usize, page_size: usize) -> Result<Page> {
        let items = self.store.get_page(page_index, page_size)?;
        let total = self.store.count()?;
        Ok(Page {
            items,
            total,
            has_more: page_size > 0 && (page_index + 1).saturating_mul(page_size) < total,
            page_index,
            page_size,
        })
    }

    /// Returns the total record count.
    ///
    /// # Errors
    ///
    /// See [`ClientStore::count`].
    pub fn count(&self) -> Result<usize> {
        self.store.count()
    }

    /// Returns every record matching `criteria`.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn search(&self, criteria: &SearchCriteria) -> Result<Vec<ClientRecord>> {
        self.query.search(criteria)
    }

    /// Returns one page of the records matching `criteria`.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn search_paginated(
        &self,
        criteria: &SearchCriteria,
        page_index: usize,
        page_size: usize,
    ) -> Result<Page> {
        self.query.search_paginated(criteria, page_index, page_size)
    }

    /// Builds the filter option lists for an address selection.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn facets(&self, selection: &FacetSelection) -> Result<FacetOptions> {
        self.facets.build(selection)
    }

    /// Creates a browse session that snapshots into `cache`.
    #[must_use]
    pub fn browse(&self, cache: Arc<ScrollStateCache>, page_size: usize) -> BrowseSession {
        BrowseSession::new(self.query(), cache, page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfiltered_page() {
        let registry = ClientRegistry::in_memory().unwrap();
        for i in 0..5 {
            registry
                .create(&ClientRecord::new(format!("{i}"), "Name"))
                .unwrap();
        }

        let page = registry.page(1, 2).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert!(page.has_more);

        let last = registry.page(2, 2).unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_more);
    }

    #[test]
    fn test_facade_round_trip() {
        let registry = ClientRegistry::in_memory().unwrap();
        let id = registry
            .create(&ClientRecord::new("42", "Іванов").with_settlement("Київ"))
            .unwrap();

        assert_eq!(registry.count().unwrap(), 1);
        assert_eq!(registry.get(id).unwrap().unwrap().full_name, "Іванов");

        let options = registry.facets(&FacetSelection::new()).unwrap();
        assert_eq!(options.settlements, vec!["Київ"]);

        assert!(registry.delete(id).unwrap());
        assert_eq!(registry.count().unwrap(), 0);
    }
}
