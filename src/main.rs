//! Binary entry point that glues the SQLite-backed store to the TUI: resolve
//! configuration, start logging, open the store, then drive the Ratatui event
//! loop until the user exits.
use std::sync::Arc;

use clap::Parser;
use data_collection::config::{AppConfig, Args};
use data_collection::logging::init_logging;
use data_collection::{
    run_app, App, Controller, EntryStore, MemoryEntryStore, SqliteEntryStore, StoreState,
};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(Args::parse())?;
    init_logging(&config)?;
    info!(fields = %config.field_set, "starting data collection");

    if config.in_memory {
        let store = MemoryEntryStore::new();
        info!("Database opened successfully (in memory)");
        return launch(store, &config);
    }

    let mut state = StoreState::Closed;
    transition(&mut state, StoreState::Opening);
    match SqliteEntryStore::open(&config.database).await {
        Ok(store) => {
            transition(&mut state, StoreState::Open);
            info!(path = %config.database.display(), "Database opened successfully");
            launch(store, &config)
        }
        Err(err) => {
            error!(error = %err, "Error opening database");
            transition(&mut state, StoreState::Unavailable(err.to_string()));
            let mut app = App::<SqliteEntryStore>::unavailable(config.field_set, err.to_string());
            run_app(&mut app)
        }
    }
}

fn transition(state: &mut StoreState, next: StoreState) {
    debug!(from = %state, to = %next, "store state");
    *state = next;
}

fn launch<S: EntryStore + 'static>(store: S, config: &AppConfig) -> anyhow::Result<()> {
    let (controller, listings) = Controller::new(Arc::new(store), config.field_set);
    let mut app = App::new(controller, listings);
    run_app(&mut app)
}
