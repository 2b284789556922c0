//! Business logic services.
//!
//! Services read the record store and provide the operations front ends
//! call: filtered search, facet option lists, and the resumable browse
//! window.

mod browse;
mod debounce;
mod facets;
mod query;
mod registry;
mod scroll;
mod session;

pub use browse::{BrowseSession, StartOutcome};
pub use debounce::{DEFAULT_SEARCH_DEBOUNCE, Debouncer};
pub use facets::{FacetService, build_options};
pub use query::{QueryService, QueryTicket, matches};
pub use registry::ClientRegistry;
pub use scroll::{SCROLL_SLOT, ScrollSnapshot, ScrollStateCache};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
