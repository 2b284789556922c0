//! Record store trait.

use crate::Result;
use crate::models::{ClientId, ClientRecord};

/// Keyed storage of client records.
///
/// The store is the single owner of the required-field invariant: `create`
/// and `update` reject records with a blank account number or full name
/// before anything is written.
pub trait ClientStore: Send + Sync {
    /// Assigns a new id and persists the record. Any id on the input is
    /// ignored.
    fn create(&self, record: &ClientRecord) -> Result<ClientId>;

    /// Overwrites the record stored under `record.id`.
    ///
    /// Updating an id that does not exist stores the record under that id.
    fn update(&self, record: &ClientRecord) -> Result<ClientId>;

    /// Deletes a record. Returns whether a record was removed; deleting a
    /// missing id is not an error.
    fn delete(&self, id: ClientId) -> Result<bool>;

    /// Retrieves a record by id.
    fn get(&self, id: ClientId) -> Result<Option<ClientRecord>>;

    /// Returns every record in ascending id order.
    fn get_all(&self) -> Result<Vec<ClientRecord>>;

    /// Returns `[page_index * page_size, page_index * page_size + page_size)`
    /// of the [`get_all`](Self::get_all) order.
    fn get_page(&self, page_index: usize, page_size: usize) -> Result<Vec<ClientRecord>>;

    /// Returns the total record count.
    fn count(&self) -> Result<usize> {
        Ok(self.get_all()?.len())
    }
}
