//! Storage layer.
//!
//! - **Traits**: the [`ClientStore`] contract every store honours
//! - **Persistence**: the authoritative `SQLite` store
//! - **Sqlite**: connection handling, row conversion and metrics shared by
//!   the `SQLite` store

// Allow significant_drop_tightening - dropping database connections slightly early
// provides no meaningful benefit.
#![allow(clippy::significant_drop_tightening)]

pub mod persistence;
pub mod sqlite;
pub mod traits;

pub use persistence::SqliteClientStore;
pub use traits::ClientStore;
