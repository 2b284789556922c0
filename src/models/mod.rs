//! Data models for gasledger.
//!
//! This module contains the record type and the query/facet value types
//! shared by storage, services and I/O.

mod client;
mod facets;
mod search;

pub use client::{ClientId, ClientRecord, NO, YES, parse_yes, yes_no};
pub use facets::{FacetOptions, FacetSelection};
pub use search::{Page, SearchCriteria, StatusFlags};
