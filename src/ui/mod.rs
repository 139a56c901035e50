//! Ratatui front-end: the entry list, the entry form and the confirmation
//! dialogs.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
