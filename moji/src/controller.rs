//! SearchController - turns query submissions into published SearchStates
//!
//! Async Cancellation Architecture:
//! Every submission starts a new attempt tagged with a generation number and a
//! CancellationToken. Submitting again cancels the previous token; the attempt's
//! task selects on it, so throttle timers and pending lookups are dropped right
//! away. Cancellation is still only advisory: an attempt that finishes anyway
//! has its result compared against the current generation under the controller
//! lock and is discarded if it has been superseded.
//!
//! All publication happens while that lock is held, so observers see a single,
//! totally ordered stream of states and nothing is published after teardown.

use crate::config::SearchConfig;
use crate::dataset::Dataset;
use crate::interface::{
    DatasetProvider, Entry, FailureNotifier, LogNotifier, MojiError, SearchObserver, SearchState,
};
use crate::search;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Title of the notification raised when an attempt fails
pub const FAILURE_TITLE: &str = "Could not perform search";

/// Global fallback Tokio runtime for when the controller is driven outside any runtime context.
/// This is shared across all SearchController instances and never dropped.
/// Used by UniFFI which doesn't provide a tokio runtime.
static FALLBACK_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("moji-search")
        .enable_all()
        .build()
        .expect("Failed to create fallback tokio runtime")
});

/// RAII guard that cancels a token when dropped.
/// An aborted attempt task drops its future, which drops this guard,
/// which triggers the cancellation token.
struct DropGuard {
    token: CancellationToken,
}

impl DropGuard {
    fn new(token: CancellationToken) -> Self {
        Self { token }
    }
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Active,
    TornDown,
}

/// The search currently allowed to publish
struct Attempt {
    generation: u64,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Attempt {
    fn cancel(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

struct Inner {
    phase: Phase,
    state: SearchState,
    generation: u64,
    in_flight: Option<Attempt>,
    observers: Vec<Arc<dyn SearchObserver>>,
}

/// State shared between the controller and its attempt tasks
struct Shared {
    inner: Mutex<Inner>,
    watch_tx: watch::Sender<SearchState>,
    notifier: Arc<dyn FailureNotifier>,
}

impl Shared {
    /// Replace the live state and fan it out. Caller holds the lock.
    ///
    /// The watch channel is updated before observers run, so an observer that
    /// reads `current_state` sees the state it is being handed.
    fn publish(&self, inner: &mut Inner, state: SearchState) {
        inner.state = state.clone();
        self.watch_tx.send_replace(state.clone());
        for observer in &inner.observers {
            observer.on_state_change(state.clone());
        }
    }

    /// Apply an attempt's outcome if it is still the newest one
    fn resolve(
        &self,
        generation: u64,
        token: &CancellationToken,
        outcome: Result<Vec<Entry>, MojiError>,
    ) {
        let mut inner = self.inner.lock();
        if inner.phase != Phase::Active || inner.generation != generation || token.is_cancelled() {
            tracing::debug!(
                generation,
                current = inner.generation,
                "discarding superseded search result"
            );
            return;
        }
        inner.in_flight = None;

        match outcome {
            Ok(results) => {
                tracing::debug!(generation, matches = results.len(), "search complete");
                self.publish(&mut inner, SearchState { results, is_loading: false });
            }
            // Genuine cancellation was filtered out by the token check above,
            // so even a provider-reported `Cancelled` settles and notifies.
            Err(error) => {
                tracing::error!(generation, %error, "search error");
                let settled = inner.state.settled();
                self.publish(&mut inner, settled);
                self.notifier
                    .notify_failure(FAILURE_TITLE.to_string(), error.to_string());
            }
        }
    }
}

/// Incremental search over a dataset
///
/// Concurrency Model:
/// - At most one attempt may publish: the one for the latest submission
/// - Attempts run as tokio tasks and may suspend inside `render`
/// - Uses global FALLBACK_RUNTIME when called outside any runtime (e.g., from UniFFI)
/// - Observers are invoked under the controller lock, in registration order;
///   they may read `current_state` but must not submit or tear down
#[derive(uniffi::Object)]
pub struct SearchController {
    provider: Arc<dyn DatasetProvider>,
    config: SearchConfig,
    shared: Arc<Shared>,
}

// Internal implementation (not exported via FFI)
impl SearchController {
    /// Create a controller over any provider. Nothing runs until [`Self::initialize`].
    pub fn new(
        provider: Arc<dyn DatasetProvider>,
        notifier: Arc<dyn FailureNotifier>,
        config: SearchConfig,
    ) -> Result<Self, MojiError> {
        config.validate()?;
        let (watch_tx, _) = watch::channel(SearchState::initial());

        Ok(Self {
            provider,
            config,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    phase: Phase::Uninitialized,
                    state: SearchState::initial(),
                    generation: 0,
                    in_flight: None,
                    observers: Vec::new(),
                }),
                watch_tx,
                notifier,
            }),
        })
    }

    /// Controller over `dataset` that reports failures to the log
    pub fn with_dataset(dataset: Dataset, config: SearchConfig) -> Result<Self, MojiError> {
        Self::new(Arc::new(dataset), Arc::new(LogNotifier), config)
    }

    /// Channel view of the published states; always holds the latest one
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.watch_tx.subscribe()
    }

    /// Get a tokio runtime handle - uses current runtime if available, otherwise global fallback
    fn runtime_handle(&self) -> tokio::runtime::Handle {
        tokio::runtime::Handle::try_current()
            .unwrap_or_else(|_| FALLBACK_RUNTIME.handle().clone())
    }

    fn cancel_in_flight(inner: &mut Inner) {
        if let Some(attempt) = inner.in_flight.take() {
            tracing::debug!(generation = attempt.generation, "cancelling superseded search");
            attempt.cancel();
        }
    }

    /// Spawn the attempt for `query` as the new newest generation. Caller holds the lock.
    fn start_attempt(&self, inner: &mut Inner, query: String) {
        inner.generation += 1;
        let generation = inner.generation;
        let token = CancellationToken::new();

        let provider = Arc::clone(&self.provider);
        let shared = Arc::clone(&self.shared);
        let throttle = self.config.throttle();
        let parallel_threshold = self.config.parallel_threshold();
        let token_clone = token.clone();

        let handle = self.runtime_handle().spawn(async move {
            let _guard = DropGuard::new(token_clone.clone());

            let outcome = tokio::select! {
                _ = token_clone.cancelled() => Err(MojiError::Cancelled),
                outcome = async {
                    if !throttle.is_zero() {
                        tokio::time::sleep(throttle).await;
                    }
                    search::run_search(provider.as_ref(), &query, parallel_threshold, &token_clone).await
                } => outcome,
            };

            shared.resolve(generation, &token_clone, outcome);
        });

        inner.in_flight = Some(Attempt {
            generation,
            token,
            handle,
        });
    }
}

// FFI-exported constructors (must be in standalone impl block)
#[uniffi::export]
impl SearchController {
    /// Controller over the bundled asciimoji table, reporting failures to the log
    #[uniffi::constructor]
    pub fn bundled(config: SearchConfig) -> Result<Self, MojiError> {
        Self::with_dataset(Dataset::bundled()?, config)
    }

    /// Controller over the bundled asciimoji table with a host-provided notifier
    #[uniffi::constructor]
    pub fn bundled_with_notifier(
        notifier: Arc<dyn FailureNotifier>,
        config: SearchConfig,
    ) -> Result<Self, MojiError> {
        Self::new(Arc::new(Dataset::bundled()?), notifier, config)
    }
}

#[uniffi::export]
impl SearchController {
    /// Publish the initial state (loading, no results) and start the search for "".
    /// Must be called exactly once.
    pub fn initialize(&self) -> Result<SearchState, MojiError> {
        let mut inner = self.shared.inner.lock();
        match inner.phase {
            Phase::Uninitialized => {}
            Phase::Active => return Err(MojiError::AlreadyInitialized),
            Phase::TornDown => return Err(MojiError::TornDown),
        }
        inner.phase = Phase::Active;

        let state = SearchState::initial();
        self.shared.publish(&mut inner, state.clone());
        self.start_attempt(&mut inner, String::new());
        Ok(state)
    }

    /// Called on every edit of the query text.
    ///
    /// Cancels the previous attempt, publishes the previous results flagged as
    /// loading, then starts searching for `text`. A no-op after teardown.
    pub fn submit_query(&self, text: String) -> Result<(), MojiError> {
        let mut inner = self.shared.inner.lock();
        match inner.phase {
            Phase::Active => {}
            Phase::Uninitialized => return Err(MojiError::NotInitialized),
            Phase::TornDown => {
                tracing::debug!("query submitted after teardown, ignoring");
                return Ok(());
            }
        }
        tracing::debug!(query = %text, generation = inner.generation + 1, "submit query");

        Self::cancel_in_flight(&mut inner);
        let loading = inner.state.loading();
        self.shared.publish(&mut inner, loading);
        self.start_attempt(&mut inner, text);
        Ok(())
    }

    /// Cancel any in-flight search and stop publishing. Safe to call repeatedly.
    pub fn teardown(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.phase == Phase::TornDown {
            return;
        }
        inner.phase = Phase::TornDown;
        Self::cancel_in_flight(&mut inner);
        inner.observers.clear();
        tracing::debug!(generation = inner.generation, "search controller torn down");
    }

    /// Register an observer for every subsequent state change.
    ///
    /// Observers are called in registration order with the controller lock
    /// held. `current_state` is safe to call from inside the callback, but
    /// `submit_query`, `initialize`, `teardown` and `on_state_change` are not:
    /// they wait on the same lock and would deadlock.
    pub fn on_state_change(&self, observer: Arc<dyn SearchObserver>) {
        let mut inner = self.shared.inner.lock();
        if inner.phase == Phase::TornDown {
            return;
        }
        inner.observers.push(observer);
    }

    /// Snapshot of the live state. Does not take the controller lock.
    pub fn current_state(&self) -> SearchState {
        self.shared.watch_tx.borrow().clone()
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.teardown();
    }
}
