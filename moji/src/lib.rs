//! Moji Core - incremental search for the asciimoji picker
//!
//! This library implements the search side of the picker: an immutable keyword
//! table, a substring matcher, and a controller that turns a stream of query
//! edits into a totally ordered stream of search states, cancelling searches
//! that a newer edit has superseded.
//!
//! Types are exported via UniFFI proc-macros (#[derive(uniffi::Record/Enum/Object)]).

pub mod config;
pub mod controller;
pub mod dataset;
pub mod interface;
pub mod search;
pub mod selection;

pub use config::SearchConfig;
pub use controller::SearchController;
pub use dataset::Dataset;
pub use interface::*;
pub use selection::{
    perform_selection, select_entry, selection_titles, SelectionAction, SelectionSink,
};

uniffi::setup_scaffolding!("moji");
