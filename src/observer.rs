//! # Observer contract for focus transitions.
//!
//! A [`ChannelObserver`] is the sink a client hands to
//! [`FocusManager::acquire_channel`](crate::FocusManager::acquire_channel).
//! For the duration of its tenure it receives every focus transition of the
//! channel it occupies.
//!
//! ## Rules
//! - Callbacks run on the arbiter's single worker task, never concurrently.
//! - Callbacks run with no internal lock held: an observer may call back
//!   into the [`FocusManager`](crate::FocusManager) (acquire, release, stop)
//!   from inside `on_focus_changed` without deadlocking. Re-entrant calls
//!   enqueue further work that runs after the current notification settles.
//! - An observer is never invoked with the same state twice in a row.
//! - A replaced or released observer receives a final [`FocusState::None`].
//!
//! Ownership checks compare handle identity ([`Arc::ptr_eq`]), not value:
//! release with a different `ObserverRef` than the one that acquired fails
//! even if both point at behaviorally identical observers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::focus::FocusState;

/// Shared handle to a channel observer.
///
/// The [`Channel`](crate::Channel) holding an observer keeps the only
/// arbiter-side reference; handing the same `ObserverRef` to a later
/// `release_channel` call is what proves ownership.
pub type ObserverRef = Arc<dyn ChannelObserver>;

/// Sink notified of focus-state transitions for a single channel tenure.
#[async_trait]
pub trait ChannelObserver: Send + Sync + 'static {
    /// Delivers the new focus state.
    ///
    /// Called on the worker task with no lock held; see the module docs for
    /// ordering and re-entrancy guarantees.
    async fn on_focus_changed(&self, state: FocusState);
}
