//! services/dashboard/src/stores/mod.rs
//!
//! Observable, in-memory state containers over the DocRouter port. Each
//! store owns one entity family and publishes whole snapshots of its state
//! through a `tokio::sync::watch` channel; subscribers re-read on change.
//!
//! Every action follows the same lifecycle: mark loading, invoke the port,
//! merge on success, and on failure record a short human-readable message
//! while re-surfacing the error to the caller. Starting an action cancels a
//! still-running occupant of the same `(action, id)` slot, so shared state
//! always reflects the newest issued call rather than whichever response
//! happened to arrive last.

use grading_assistant_core::domain::RubricValidationError;
use grading_assistant_core::ports::{PortError, PortResult};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

pub mod documents;
pub mod grading;
pub mod rubrics;

pub use documents::DocumentStore;
pub use grading::GradingStore;
pub use rubrics::RubricStore;

//=========================================================================================
// State Snapshot and Error Type
//=========================================================================================

/// One observable snapshot of a store: the known items, an optional
/// currently-focused item, and the shared loading/error surface.
#[derive(Clone, Debug)]
pub struct StoreState<T> {
    pub items: Vec<T>,
    pub current: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current: None,
            loading: false,
            error: None,
        }
    }
}

/// A failure surfaced by a store action. Port failures pass through so the
/// caller can still distinguish, say, a 401 from a decode problem.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Api(#[from] PortError),

    /// The action was superseded by a newer call on the same slot; nothing
    /// was written to shared state.
    #[error("Superseded by a newer request")]
    Superseded,

    /// The draft failed client-side validation; the port was never called.
    #[error("Invalid rubric: {}", join_messages(.0))]
    Validation(Vec<RubricValidationError>),
}

fn join_messages(errors: &[RubricValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

//=========================================================================================
// In-Flight Request Registry
//=========================================================================================

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
struct ActionKey {
    action: &'static str,
    id: Option<String>,
}

struct InflightEntry {
    token: CancellationToken,
    epoch: u64,
}

#[derive(Default)]
struct RegistryInner {
    entries: HashMap<ActionKey, InflightEntry>,
    next_epoch: u64,
}

/// Tracks the newest in-flight call per `(action, id)` slot. Beginning a
/// call cancels the slot's previous occupant; the epoch lets a finished
/// call clean up after itself without evicting a successor.
struct InflightRegistry {
    inner: Mutex<RegistryInner>,
}

impl InflightRegistry {
    fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    fn begin(&self, action: &'static str, id: Option<&str>) -> InflightGuard<'_> {
        let key = ActionKey {
            action,
            id: id.map(str::to_string),
        };
        let token = CancellationToken::new();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.next_epoch += 1;
        let epoch = inner.next_epoch;
        let entry = InflightEntry {
            token: token.clone(),
            epoch,
        };
        if let Some(previous) = inner.entries.insert(key.clone(), entry) {
            previous.token.cancel();
        }
        InflightGuard {
            registry: self,
            key,
            epoch,
            token,
        }
    }

    fn release(&self, key: &ActionKey, epoch: u64) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.entries.get(key).map(|e| e.epoch) == Some(epoch) {
            inner.entries.remove(key);
        }
    }
}

/// Occupancy of one registry slot for the duration of a call. Dropping the
/// guard releases the slot unless a newer call has already claimed it.
struct InflightGuard<'a> {
    registry: &'a InflightRegistry,
    key: ActionKey,
    epoch: u64,
    token: CancellationToken,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.registry.release(&self.key, self.epoch);
    }
}

//=========================================================================================
// Shared Store Machinery
//=========================================================================================

/// The state cell and in-flight registry every store is built around.
pub(crate) struct StoreCore<T> {
    state: watch::Sender<StoreState<T>>,
    inflight: InflightRegistry,
}

impl<T: Clone> StoreCore<T> {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            state,
            inflight: InflightRegistry::new(),
        }
    }

    pub(crate) fn state(&self) -> StoreState<T> {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<StoreState<T>> {
        self.state.subscribe()
    }

    /// Runs one action through the uniform lifecycle.
    ///
    /// The `(action, id)` pair names the supersession slot: a newer call on
    /// the same slot cancels this one, in which case this call writes
    /// nothing and returns `StoreError::Superseded`. On success `apply`
    /// merges the port's value into the snapshot; on failure the snapshot
    /// keeps its items and records `failure_message`.
    pub(crate) async fn run<R, F, A>(
        &self,
        action: &'static str,
        id: Option<&str>,
        failure_message: &'static str,
        operation: F,
        apply: A,
    ) -> Result<R, StoreError>
    where
        F: Future<Output = PortResult<R>>,
        A: FnOnce(&mut StoreState<T>, &R),
    {
        let guard = self.inflight.begin(action, id);
        self.state.send_if_modified(|s| {
            // A superseding call can finish before this write runs; checking
            // under the sender's lock keeps its final snapshot intact.
            if guard.token.is_cancelled() {
                return false;
            }
            s.loading = true;
            s.error = None;
            true
        });

        let outcome = tokio::select! {
            biased;
            _ = guard.token.cancelled() => Err(StoreError::Superseded),
            result = operation => result.map_err(StoreError::from),
        };

        match outcome {
            Ok(value) => {
                let mut stale = false;
                self.state.send_if_modified(|s| {
                    // The newer occupant owns the snapshot now; checking
                    // under the sender's lock closes the race with it.
                    if guard.token.is_cancelled() {
                        stale = true;
                        return false;
                    }
                    apply(s, &value);
                    s.loading = false;
                    true
                });
                if stale {
                    debug!("{} superseded by a newer call", action);
                    return Err(StoreError::Superseded);
                }
                Ok(value)
            }
            Err(StoreError::Superseded) => {
                debug!("{} superseded by a newer call", action);
                Err(StoreError::Superseded)
            }
            Err(e) => {
                error!("{}: {:?}", failure_message, e);
                self.state.send_if_modified(|s| {
                    if guard.token.is_cancelled() {
                        return false;
                    }
                    s.error = Some(failure_message.to_string());
                    s.loading = false;
                    true
                });
                Err(e)
            }
        }
    }
}

//=========================================================================================
// Scriptable Port Stub (test support)
//=========================================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_second_begin_on_the_same_slot_cancels_the_first() {
        let registry = InflightRegistry::new();
        let first = registry.begin("fetch_one", Some("a"));
        let second = registry.begin("fetch_one", Some("a"));
        assert!(first.token.is_cancelled());
        assert!(!second.token.is_cancelled());
    }

    #[test]
    fn distinct_slots_fly_independently() {
        let registry = InflightRegistry::new();
        let by_id = registry.begin("fetch_one", Some("a"));
        let other_id = registry.begin("fetch_one", Some("b"));
        let listing = registry.begin("fetch_all", None);
        assert!(!by_id.token.is_cancelled());
        assert!(!other_id.token.is_cancelled());
        assert!(!listing.token.is_cancelled());
    }

    #[test]
    fn a_finished_call_does_not_evict_its_successor() {
        let registry = InflightRegistry::new();
        let first = registry.begin("fetch_all", None);
        let second = registry.begin("fetch_all", None);
        drop(first);
        // The slot still belongs to the second call, so a third begin must
        // cancel it.
        let third = registry.begin("fetch_all", None);
        assert!(second.token.is_cancelled());
        assert!(!third.token.is_cancelled());
    }

    #[test]
    fn validation_errors_read_as_one_message() {
        let error = StoreError::Validation(vec![
            RubricValidationError::NameRequired,
            RubricValidationError::DescriptionRequired,
        ]);
        let text = error.to_string();
        assert!(text.contains("Rubric name is required"));
        assert!(text.contains("Description is required"));
    }
}
