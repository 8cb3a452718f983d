//! # Failure reasons raised by the arbiter.
//!
//! [`FocusError`] enumerates every way an operation can be refused. None of
//! these escape through the public API: acquire returns `false`, release
//! fulfills its reply with `false`, construction skips the offending entry.
//! The type exists so each refusal is logged with a typed, stable reason.
//!
//! The labels returned by [`FocusError::as_label`] are part of the
//! observable log contract and must not change:
//! `channelNameExists`, `channelPriorityExists`, `channelNotFound`,
//! `observerDoesNotOwnChannel`, `noForegroundActivity`.

use thiserror::Error;

/// Reasons an arbitration operation is refused.
///
/// Every variant is non-fatal: state is left untouched and the caller is
/// answered through the operation's normal return path.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FocusError {
    /// A configuration entry reuses an already-registered channel name.
    #[error("channel '{name}' already exists")]
    ChannelNameExists {
        /// The duplicate channel name.
        name: String,
    },
    /// A configuration entry reuses an already-registered priority.
    #[error("priority {priority} already exists")]
    ChannelPriorityExists {
        /// The duplicate priority value.
        priority: u32,
    },
    /// Acquire/release named a channel that was never configured.
    #[error("channel '{name}' not found")]
    ChannelNotFound {
        /// The unknown channel name.
        name: String,
    },
    /// The releasing observer is not the channel's current owner.
    #[error("observer does not own channel '{name}'")]
    ObserverDoesNotOwnChannel {
        /// The channel whose ownership check failed.
        name: String,
    },
    /// `stop_foreground_activity` found no active channel.
    #[error("no foreground activity")]
    NoForegroundActivity,
}

impl FocusError {
    /// Returns the stable reason label used in log events.
    pub fn as_label(&self) -> &'static str {
        match self {
            FocusError::ChannelNameExists { .. } => "channelNameExists",
            FocusError::ChannelPriorityExists { .. } => "channelPriorityExists",
            FocusError::ChannelNotFound { .. } => "channelNotFound",
            FocusError::ObserverDoesNotOwnChannel { .. } => "observerDoesNotOwnChannel",
            FocusError::NoForegroundActivity => "noForegroundActivity",
        }
    }
}
