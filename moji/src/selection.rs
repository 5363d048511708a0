//! What happens when the user picks a result.
//!
//! The clipboard and paste mechanics belong to the host app; the core only
//! routes the chosen entry's rendered text to its sink.

use crate::interface::{Entry, MojiError};
use std::sync::Arc;

/// Actions offered for every result, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum SelectionAction {
    /// Paste into the frontmost application
    Paste,
    /// Copy to the clipboard
    Copy,
}

impl SelectionAction {
    pub const ALL: [SelectionAction; 2] = [SelectionAction::Paste, SelectionAction::Copy];

    pub fn title(&self) -> &'static str {
        match self {
            SelectionAction::Paste => "Paste",
            SelectionAction::Copy => "Copy",
        }
    }
}

/// Host-side clipboard/paste implementation
#[uniffi::export(with_foreign)]
pub trait SelectionSink: Send + Sync {
    fn paste(&self, text: String) -> Result<(), MojiError>;
    fn copy(&self, text: String) -> Result<(), MojiError>;
}

/// Hand the entry's rendered text to `sink` for `action`
pub fn perform_selection(
    entry: &Entry,
    action: SelectionAction,
    sink: &dyn SelectionSink,
) -> Result<(), MojiError> {
    tracing::info!(keyword = %entry.keyword, action = action.title(), "selection");
    let text = entry.rendered_text.clone();
    match action {
        SelectionAction::Paste => sink.paste(text),
        SelectionAction::Copy => sink.copy(text),
    }
}

/// FFI entry point for a picked result; the host passes its own sink
#[uniffi::export]
pub fn select_entry(
    entry: Entry,
    action: SelectionAction,
    sink: Arc<dyn SelectionSink>,
) -> Result<(), MojiError> {
    perform_selection(&entry, action, sink.as_ref())
}

/// Titles of the actions offered for every result, in display order
#[uniffi::export]
pub fn selection_titles() -> Vec<String> {
    SelectionAction::ALL
        .iter()
        .map(|action| action.title().to_string())
        .collect()
}
