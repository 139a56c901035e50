//! Sequencing between the store and the list: every mutation is followed by a
//! full refresh, and every refresh publishes a fresh [`Listing`].
//!
//! Failures are logged and abandoned. Nothing is retried and nothing is
//! returned to the caller, so one failed operation never blocks the next.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

use crate::db::{EntryStore, Operation};
use crate::listing::{ListView, Listing};
use crate::models::{EntryFields, FieldSet};

/// Handle shared by the UI and the tasks it spawns. Cloning is cheap.
pub struct Controller<S> {
    store: Arc<S>,
    field_set: FieldSet,
    listings: UnboundedSender<Listing>,
}

impl<S> Clone for Controller<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            field_set: self.field_set,
            listings: self.listings.clone(),
        }
    }
}

impl<S: EntryStore + 'static> Controller<S> {
    /// Wrap an opened store. The receiver yields one [`Listing`] per completed
    /// refresh.
    pub fn new(store: Arc<S>, field_set: FieldSet) -> (Self, UnboundedReceiver<Listing>) {
        let (listings, rx) = mpsc::unbounded_channel();
        (
            Self {
                store,
                field_set,
                listings,
            },
            rx,
        )
    }

    pub fn field_set(&self) -> FieldSet {
        self.field_set
    }

    /// Read everything, apply `view` and publish the result. A failed read is
    /// logged and published as an empty listing.
    pub async fn refresh(&self, view: ListView) {
        let all = match self.store.get_all().await {
            Ok(all) => all,
            Err(err) => {
                error!(op = %Operation::GetAll, error = %err, "store operation failed");
                Vec::new()
            }
        };
        let listing = Listing::build(all, view, self.field_set);
        // The receiver only goes away when the UI has shut down.
        let _ = self.listings.send(listing);
    }

    /// Insert `fields`, then refresh with the default view.
    pub async fn submit(&self, fields: EntryFields) {
        match self.store.add(fields).await {
            Ok(entry) => {
                info!(id = entry.id, "Entry added successfully");
                self.refresh(ListView::default()).await;
            }
            Err(err) => error!(op = %Operation::Add, error = %err, "store operation failed"),
        }
    }

    /// Delete entry `id`, then refresh with the default view.
    pub async fn delete(&self, id: i64) {
        match self.store.delete(id).await {
            Ok(()) => {
                info!(id, "Entry deleted successfully");
                self.refresh(ListView::default()).await;
            }
            Err(err) => error!(op = %Operation::Delete, id, error = %err, "store operation failed"),
        }
    }

    /// Delete every entry, then refresh with the default view.
    pub async fn clear(&self) {
        match self.store.clear().await {
            Ok(()) => {
                info!("All entries deleted successfully");
                self.refresh(ListView::default()).await;
            }
            Err(err) => error!(op = %Operation::Clear, error = %err, "store operation failed"),
        }
    }

    /// Run `submit` on its own task so the caller can reset the form at once.
    pub fn spawn_submit(&self, fields: EntryFields) {
        let this = self.clone();
        tokio::spawn(async move { this.submit(fields).await });
    }

    pub fn spawn_delete(&self, id: i64) {
        let this = self.clone();
        tokio::spawn(async move { this.delete(id).await });
    }

    pub fn spawn_clear(&self) {
        let this = self.clone();
        tokio::spawn(async move { this.clear().await });
    }

    pub fn spawn_refresh(&self, view: ListView) {
        let this = self.clone();
        tokio::spawn(async move { this.refresh(view).await });
    }
}
