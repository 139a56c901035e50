//! Persistence module split across logical submodules.
//!
//! The UI and controller depend on the [`EntryStore`] trait only, so the
//! SQLite backend can be swapped for the in-memory one in tests or with
//! `--in-memory`.

mod connection;
mod entries;
mod error;
mod memory;

use std::fmt;
use std::future::Future;

use crate::models::{Entry, EntryFields};

pub(crate) use connection::{data_dir, DB_FILE_NAME};
pub use connection::SqliteEntryStore;
pub use error::{Error, Operation, Result};
pub use memory::MemoryEntryStore;

/// Abstraction over a durable collection of [`Entry`] records keyed by an
/// auto-incrementing id.
///
/// Every method is independently asynchronous: there is no transaction that
/// spans calls, and a failed call never affects later ones.
pub trait EntryStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Insert a new entry and return it with its store-assigned id. Ids are
    /// never reused, even after [`EntryStore::clear`].
    fn add(
        &self,
        fields: EntryFields,
    ) -> impl Future<Output = Result<Entry, Self::Error>> + Send + '_;

    /// Every stored entry, in ascending id order.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Entry>, Self::Error>> + Send + '_;

    /// Remove the entry with `id`. Removing an id that does not exist succeeds.
    fn delete(&self, id: i64) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

    /// Remove every entry.
    fn clear(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Lifecycle of the store handle, walked once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreState {
    #[default]
    Closed,
    Opening,
    Open,
    /// Opening failed. Terminal: the application stays up but ignores every
    /// storage trigger.
    Unavailable(String),
}

impl StoreState {
    pub fn is_open(&self) -> bool {
        matches!(self, StoreState::Open)
    }
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreState::Closed => write!(f, "closed"),
            StoreState::Opening => write!(f, "opening"),
            StoreState::Open => write!(f, "open"),
            StoreState::Unavailable(_) => write!(f, "unavailable"),
        }
    }
}
