//! # Channel: a named, priority-ranked arbitration slot.
//!
//! A [`Channel`] holds at most one observer at a time, remembers which
//! activity currently occupies it, and caches the last focus state it
//! delivered. Name and priority are fixed at construction; everything else
//! lives behind a lock that is released before any observer callback runs.
//!
//! ## Per-channel invariants
//! - `focus == None` ⇒ no observer is installed and the activity id is
//!   empty.
//! - `focus ∈ {Foreground, Background}` ⇒ an observer is installed.
//! - Replacing the observer first delivers a terminal `None` to the old one.
//! - Setting the focus to the cached value is a no-op (no callback).
//!
//! Channels are shared as `Arc<Channel>` between the manager's channel map
//! and its active set; identity comparisons use [`Arc::ptr_eq`].

use std::sync::{Arc, Mutex};

use crate::{focus::FocusState, observer::ObserverRef};

/// Mutable slot state; the lock is never held across an await.
struct ChannelState {
    observer: Option<ObserverRef>,
    activity_id: String,
    focus: FocusState,
}

/// A single arbitration slot.
pub struct Channel {
    name: String,
    priority: u32,
    state: Mutex<ChannelState>,
}

impl Channel {
    /// Creates a vacant channel at the given priority.
    #[must_use]
    pub fn new(name: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            priority,
            state: Mutex::new(ChannelState {
                observer: None,
                activity_id: String::new(),
                focus: FocusState::None,
            }),
        }
    }

    /// Returns the channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fixed priority; lower numeric value wins arbitration.
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// True if this channel outranks `other` (would hold `Foreground` over
    /// it when both are active).
    pub fn outranks(&self, other: &Channel) -> bool {
        self.priority < other.priority
    }

    /// Returns the cached focus state.
    pub fn focus(&self) -> FocusState {
        self.state.lock().unwrap().focus
    }

    /// Returns the current activity id; empty when vacant.
    pub fn activity_id(&self) -> String {
        self.state.lock().unwrap().activity_id.clone()
    }

    /// Tags the channel with the activity that occupies it.
    pub(crate) fn set_activity_id(&self, id: impl Into<String>) {
        self.state.lock().unwrap().activity_id = id.into();
    }

    /// True iff `observer` is the channel's current owner (handle identity).
    pub fn does_observer_own_channel(&self, observer: &ObserverRef) -> bool {
        match &self.state.lock().unwrap().observer {
            Some(current) => Arc::ptr_eq(current, observer),
            None => false,
        }
    }

    /// Correlates a stop request against the occupying activity.
    ///
    /// Returns true iff the current activity id equals `expected_id`; the
    /// caller then proceeds to vacate the channel. On mismatch the channel
    /// is left untouched.
    pub(crate) fn stop_activity(&self, expected_id: &str) -> bool {
        self.state.lock().unwrap().activity_id == expected_id
    }

    /// Replaces the current observer.
    ///
    /// The previous observer, if any, is transitioned to `None` first
    /// (single callback, delivered outside the lock). The new observer is
    /// installed at the cached focus state without a callback; the caller's
    /// subsequent `set_focus` corrects it where needed.
    pub(crate) async fn set_observer(&self, observer: ObserverRef) {
        let previous = self.state.lock().unwrap().observer.take();
        if let Some(old) = previous {
            old.on_focus_changed(FocusState::None).await;
        }
        self.state.lock().unwrap().observer = Some(observer);
    }

    /// Transitions the channel to `state` and notifies the current observer.
    ///
    /// No-op when `state` equals the cached focus. A transition to `None`
    /// vacates the slot: the observer is dropped and the activity id cleared
    /// once the terminal callback has been handed its state.
    pub(crate) async fn set_focus(&self, state: FocusState) {
        let to_notify = {
            let mut st = self.state.lock().unwrap();
            if st.focus == state {
                return;
            }
            st.focus = state;
            if state == FocusState::None {
                st.activity_id.clear();
                st.observer.take()
            } else {
                st.observer.clone()
            }
        };
        if let Some(observer) = to_notify {
            observer.on_focus_changed(state).await;
        }
    }
}
