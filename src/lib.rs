//! # focusvisor
//!
//! **Focusvisor** is a focus arbitration library for clients that share a
//! small number of output channels (a speaker, a visual layer) between
//! independent activities: speech output, media playback, alerts, dialog
//! prompts.
//!
//! At any moment at most one activity per channel is in the foreground;
//! lower-priority active channels are driven to the background and everyone
//! else to none. The [`FocusManager`] decides, on every acquire/release, who
//! holds which focus state and notifies observers of their transitions in a
//! strictly serialized order.
//!
//! ## Features
//!
//! | Area              | Description                                                          | Key types / traits                 |
//! |-------------------|----------------------------------------------------------------------|------------------------------------|
//! | **Arbitration**   | Acquire, release, and stop operations over prioritized channels.     | [`FocusManager`]                   |
//! | **Focus states**  | The three-valued focus tag delivered to observers.                   | [`FocusState`]                     |
//! | **Observer API**  | Hook into focus transitions for a channel tenure.                    | [`ChannelObserver`], [`ObserverRef`] |
//! | **Channels**      | Named, priority-ranked arbitration slots.                            | [`Channel`], [`ChannelConfig`]     |
//! | **Serialization** | Single-worker FIFO queue with front insertion for stop intents.      | [`SerialExecutor`]                 |
//! | **Errors**        | Typed refusal reasons surfaced through structured logs.              | [`FocusError`]                     |
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use focusvisor::{ChannelConfig, ChannelObserver, FocusManager, FocusState};
//!
//! struct Speaker(&'static str);
//!
//! #[async_trait]
//! impl ChannelObserver for Speaker {
//!     async fn on_focus_changed(&self, state: FocusState) {
//!         println!("{}: {state}", self.0);
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     // Lower priority number = higher priority.
//!     let manager = FocusManager::new(vec![
//!         ChannelConfig::new("Dialog", 100),
//!         ChannelConfig::new("Alerts", 200),
//!         ChannelConfig::new("Content", 300),
//!     ]);
//!
//!     manager.acquire_channel("Content", Arc::new(Speaker("music")), "music-1");
//!     manager.acquire_channel("Dialog", Arc::new(Speaker("tts")), "tts-1");
//!
//!     // music: FOREGROUND, then music: BACKGROUND before tts: FOREGROUND.
//!     manager.shutdown().await;
//! }
//! ```
//!
//! ---

mod channel;
mod config;
mod error;
mod executor;
mod focus;
mod manager;
mod observer;

// ---- Public re-exports ----

pub use channel::Channel;
pub use config::ChannelConfig;
pub use error::FocusError;
pub use executor::SerialExecutor;
pub use focus::FocusState;
pub use manager::FocusManager;
pub use observer::{ChannelObserver, ObserverRef};
