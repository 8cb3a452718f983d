//! # Focus states delivered to channel observers.
//!
//! [`FocusState`] is the three-valued focus tag the arbiter hands to a
//! [`ChannelObserver`](crate::ChannelObserver):
//!
//! | State        | Meaning                                                        |
//! |--------------|----------------------------------------------------------------|
//! | `Foreground` | The channel owns the output resource outright.                 |
//! | `Background` | The channel is active but yields to a higher-priority channel. |
//! | `None`       | The channel is vacant.                                         |
//!
//! At most one channel holds `Foreground` at a time; when any channel is
//! active, the highest-priority active channel is the one holding it.

use std::fmt;

/// Focus level a channel holds at a point in time.
///
/// A channel starts at `None`, moves to `Foreground` or `Background` when an
/// activity acquires it, and returns to `None` when the activity releases or
/// is stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusState {
    /// The channel may render its activity at full prominence.
    Foreground,
    /// The channel stays active but must yield (duck audio, hide overlays).
    Background,
    /// The channel is vacant; a released observer always ends here.
    None,
}

impl FocusState {
    /// Returns a short stable label for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            FocusState::Foreground => "FOREGROUND",
            FocusState::Background => "BACKGROUND",
            FocusState::None => "NONE",
        }
    }
}

impl fmt::Display for FocusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
