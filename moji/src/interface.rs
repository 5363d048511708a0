//! Moji FFI Interface Definition
//!
//! This file defines the public interface exposed to foreign UIs via UniFFI.
//! It acts as the source of truth for shared types and collaborator traits.

use serde::Serialize;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS (Structs)
// ═══════════════════════════════════════════════════════════════════════════════

/// A single dataset entry: the keyword it is found by and the text it renders to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, uniffi::Record)]
pub struct Entry {
    pub keyword: String,
    pub rendered_text: String,
}

impl Entry {
    pub fn new(keyword: impl Into<String>, rendered_text: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            rendered_text: rendered_text.into(),
        }
    }
}

/// Published snapshot of the search controller.
///
/// Replaced wholesale on every update. Observers only ever see clones, so a
/// snapshot never changes underneath its holder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, uniffi::Record)]
pub struct SearchState {
    /// Matches for the last query that resolved successfully, in dataset order
    pub results: Vec<Entry>,
    /// True from submission until the attempt for that submission resolves
    pub is_loading: bool,
}

impl SearchState {
    /// State before any search has resolved: loading, no results
    pub fn initial() -> Self {
        Self {
            results: Vec::new(),
            is_loading: true,
        }
    }

    /// Same results, flagged as loading (stale-but-visible while a search runs)
    pub(crate) fn loading(&self) -> Self {
        Self {
            results: self.results.clone(),
            is_loading: true,
        }
    }

    /// Same results, no longer loading (failure path)
    pub(crate) fn settled(&self) -> Self {
        Self {
            results: self.results.clone(),
            is_loading: false,
        }
    }
}

/// Error type for Moji operations
#[derive(Debug, Error, uniffi::Error)]
pub enum MojiError {
    #[error("No rendered text for keyword: {0}")]
    LookupFailure(String),
    #[error("Dataset error: {0}")]
    DatasetError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Search controller not initialized")]
    NotInitialized,
    #[error("Search controller already initialized")]
    AlreadyInitialized,
    #[error("Search controller torn down")]
    TornDown,
    #[error("Selection failed: {0}")]
    SelectionFailed(String),
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<std::io::Error> for MojiError {
    fn from(e: std::io::Error) -> Self {
        MojiError::DatasetError(e.to_string())
    }
}

impl From<serde_json::Error> for MojiError {
    fn from(e: serde_json::Error) -> Self {
        MojiError::DatasetError(e.to_string())
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for MojiError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        MojiError::SelectionFailed(e.reason)
    }
}

impl From<config::ConfigError> for MojiError {
    fn from(e: config::ConfigError) -> Self {
        MojiError::InvalidInput(e.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLABORATOR INTERFACES
// ═══════════════════════════════════════════════════════════════════════════════

/// Read-only keyword → rendered text lookup.
///
/// Implementations are shared across search attempts without locking, so they
/// must not mutate after construction.
#[async_trait::async_trait]
pub trait DatasetProvider: Send + Sync {
    /// Every keyword, in insertion order. Never fails.
    fn all_keywords(&self) -> &[String];

    /// Display text for a keyword obtained from [`DatasetProvider::all_keywords`].
    /// Unknown keywords yield [`MojiError::LookupFailure`].
    async fn render(&self, keyword: &str) -> Result<String, MojiError>;
}

/// Receives every published [`SearchState`].
///
/// Called with the controller lock held: implementations may read
/// `current_state` but must not submit, initialize or tear down the same
/// controller synchronously.
#[uniffi::export(with_foreign)]
pub trait SearchObserver: Send + Sync {
    fn on_state_change(&self, state: SearchState);
}

/// Surface for non-blocking failure messages (toast, log line, ...)
#[uniffi::export(with_foreign)]
pub trait FailureNotifier: Send + Sync {
    fn notify_failure(&self, title: String, message: String);
}

/// Default notifier: failures go to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl FailureNotifier for LogNotifier {
    fn notify_failure(&self, title: String, message: String) {
        tracing::error!(%title, %message, "search failure");
    }
}

/// Adapts a Rust closure into a [`SearchObserver`]
pub struct FnObserver<F>(pub F);

impl<F> SearchObserver for FnObserver<F>
where
    F: Fn(SearchState) + Send + Sync,
{
    fn on_state_change(&self, state: SearchState) {
        (self.0)(state)
    }
}
