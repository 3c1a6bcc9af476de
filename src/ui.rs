//! Ratatui front-end for the invitation dashboard. The root [`App`] owns the
//! canonical template and routes every designer intent through itself; the
//! submodules hold the per-view state and drawing code.

mod app;
mod designer_view;
mod forms;
mod helpers;
mod stats;
mod table;
mod terminal;

pub use app::{App, AppEvent};
pub use stats::{stat_cards, StatCard};
pub use table::InvitationTable;
pub use terminal::run_app;
