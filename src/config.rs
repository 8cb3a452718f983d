//! # Channel configuration.
//!
//! [`ChannelConfig`] describes one arbitration slot handed to
//! [`FocusManager::new`](crate::FocusManager::new): a unique name plus a
//! unique priority.
//!
//! ## Priority convention
//! **Lower numeric value = higher priority.** A channel with priority 100
//! outranks a channel with priority 300 and will hold `Foreground` whenever
//! both are active.
//!
//! # Example
//! ```
//! use focusvisor::ChannelConfig;
//!
//! let dialog = ChannelConfig::new("Dialog", 100);
//! let content = ChannelConfig::new("Content", 300);
//!
//! assert!(dialog.priority < content.priority);
//! assert_eq!(dialog.to_string(), "name:Dialog, priority:100");
//! ```

use std::fmt;

/// Configuration for a single arbitration channel.
///
/// Entries with a duplicate name or duplicate priority are rejected at
/// construction time (logged as `createChannelFailed`); the remaining
/// entries still produce channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Unique channel name, the key used by acquire/release.
    pub name: String,
    /// Unique channel priority; lower numeric value wins arbitration.
    pub priority: u32,
}

impl ChannelConfig {
    /// Creates a config entry.
    #[must_use]
    pub fn new(name: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            priority,
        }
    }
}

impl fmt::Display for ChannelConfig {
    /// Rendered form used verbatim in rejection log events.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name:{}, priority:{}", self.name, self.priority)
    }
}
