//! Core library surface for the data collection TUI.
//!
//! The binary only wires these pieces together; tests and other front-ends can
//! reuse the store, the list renderer and the controller directly.
pub mod config;
pub mod controller;
pub mod db;
pub mod listing;
pub mod logging;
pub mod models;
pub mod ui;

/// Persistence layer: the store abstraction and its two backends.
pub use db::{EntryStore, MemoryEntryStore, SqliteEntryStore, StoreState};

pub use controller::Controller;
pub use listing::{extract_address_number, ListView, Listing, ResultFilter, SortMode};
pub use models::{Entry, EntryFields, Field, FieldSet};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
