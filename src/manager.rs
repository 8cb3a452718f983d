//! # FocusManager: priority arbitration across channels.
//!
//! [`FocusManager`] owns the channel map, the priority-ordered active set,
//! and the [`SerialExecutor`] that serializes every state mutation. It is
//! the single source of truth for which observer holds which focus state.
//!
//! ## Architecture
//! ```text
//! caller task                         worker task (SerialExecutor)
//! ───────────                         ────────────────────────────
//! acquire_channel()  ─ validate ─►  [ acquire_channel_helper ]
//! release_channel()  ─ validate ─►  [ release_channel_helper ] ─► reply
//! stop_foreground_activity()
//!     └─ snapshot under lock ─────►  [ stop_helper ] (submitted to front)
//!
//! helper: lock → mutate active set → unlock → observer callbacks
//! ```
//!
//! ## Rules
//! - Public entry points do O(1) validation + enqueue on the caller task;
//!   all arbitration state changes run on the single worker.
//! - The internal lock guards the active set and per-channel activity ids
//!   against the caller-side snapshot in `stop_foreground_activity`; it is
//!   never held across an observer callback.
//! - Whenever any channel is active, exactly one — the highest-priority
//!   active channel — holds `Foreground`; every other active channel holds
//!   `Background`.
//! - When an acquire demotes the previous foreground channel, the loser is
//!   notified `Background` before the winner is notified `Foreground`.
//! - A stop intent is placed at the front of the queue so it runs before
//!   any acquire/release that has not started yet.
//!
//! ## Log events
//! Failures surface as structured `tracing` events whose names and reasons
//! are contractual: `createChannelFailed` (`channelNameExists`,
//! `channelPriorityExists`), `acquireChannelFailed` / `releaseChannelFailed`
//! (`channelNotFound`), `releaseChannelHelperFailed`
//! (`observerDoesNotOwnChannel`), `stopForegroundActivityFailed`
//! (`noForegroundActivity`).

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::{
    channel::Channel,
    config::ChannelConfig,
    error::FocusError,
    executor::SerialExecutor,
    focus::FocusState,
    observer::ObserverRef,
};

/// Arbitrates focus between prioritized channels.
///
/// Cheap to clone; every clone is a handle to the same arbiter, which is
/// how observers re-enter the manager from inside a focus callback.
///
/// Must be created inside a Tokio runtime: construction spawns the worker
/// that executes arbitration jobs.
#[derive(Clone)]
pub struct FocusManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    /// Immutable after construction.
    all_channels: HashMap<String, Arc<Channel>>,
    /// Active channels keyed by priority; the first entry is the foreground.
    active: Mutex<BTreeMap<u32, Arc<Channel>>>,
    executor: SerialExecutor,
}

impl FocusManager {
    /// Builds the arbiter from an ordered list of channel configurations.
    ///
    /// Entries with a duplicate name or duplicate priority are rejected and
    /// logged (`createChannelFailed`); the remaining entries still produce
    /// channels. Construction itself never fails.
    #[must_use]
    pub fn new(configs: Vec<ChannelConfig>) -> Self {
        let mut channels: HashMap<String, Arc<Channel>> = HashMap::new();
        for config in &configs {
            if let Err(err) = Self::register_channel(&mut channels, config) {
                error!(reason = err.as_label(), config = %config, "createChannelFailed");
            }
        }

        Self {
            inner: Arc::new(ManagerInner {
                all_channels: channels,
                active: Mutex::new(BTreeMap::new()),
                executor: SerialExecutor::new(),
            }),
        }
    }

    /// Requests focus on `name` for `observer`, tagged with `activity_id`.
    ///
    /// Returns `true` once the request is enqueued; the focus outcome is
    /// delivered asynchronously through the observer. Returns `false` for
    /// an unknown channel (`acquireChannelFailed`).
    pub fn acquire_channel(&self, name: &str, observer: ObserverRef, activity_id: &str) -> bool {
        let Some(channel) = self.inner.channel(name) else {
            let err = FocusError::ChannelNotFound {
                name: name.to_string(),
            };
            error!(reason = err.as_label(), channel = name, "acquireChannelFailed");
            return false;
        };

        let inner = Arc::clone(&self.inner);
        let activity_id = activity_id.to_string();
        self.inner.executor.submit(async move {
            inner
                .acquire_channel_helper(channel, observer, activity_id)
                .await;
        })
    }

    /// Releases `name`, provided `observer` is its current owner.
    ///
    /// The reply resolves `true` once the release decision is made — before
    /// the resulting focus callbacks have necessarily run — and `false` when
    /// the channel is unknown or owned by a different observer. Dropping the
    /// receiver does not affect arbitration; if the arbiter shuts down
    /// before the request runs, the receiver resolves as closed.
    pub fn release_channel(&self, name: &str, observer: ObserverRef) -> oneshot::Receiver<bool> {
        let (reply, receiver) = oneshot::channel();
        let Some(channel) = self.inner.channel(name) else {
            let err = FocusError::ChannelNotFound {
                name: name.to_string(),
            };
            error!(reason = err.as_label(), channel = name, "releaseChannelFailed");
            let _ = reply.send(false);
            return receiver;
        };

        let inner = Arc::clone(&self.inner);
        self.inner.executor.submit(async move {
            inner.release_channel_helper(channel, observer, reply).await;
        });
        receiver
    }

    /// Stops whatever activity currently holds the foreground.
    ///
    /// The foreground channel and its activity id are snapshotted here, on
    /// the caller task; the stop job is submitted to the *front* of the
    /// queue so a user stop intent takes effect before queued acquires and
    /// releases. If the foreground has moved by the time the job runs, the
    /// job is a no-op.
    pub fn stop_foreground_activity(&self) {
        let snapshot = {
            let active = self.inner.active.lock().unwrap();
            ManagerInner::highest_priority_active_channel_locked(&active).map(|channel| {
                let activity_id = channel.activity_id();
                (channel, activity_id)
            })
        };
        let Some((channel, activity_id)) = snapshot else {
            debug!(
                reason = FocusError::NoForegroundActivity.as_label(),
                "stopForegroundActivityFailed"
            );
            return;
        };

        let inner = Arc::clone(&self.inner);
        self.inner.executor.submit_to_front(async move {
            inner
                .stop_foreground_activity_helper(channel, activity_id)
                .await;
        });
    }

    /// Drains every pending arbitration job, then joins the worker.
    ///
    /// Requests submitted after shutdown begins are rejected.
    pub async fn shutdown(&self) {
        self.inner.executor.shutdown().await;
    }

    fn register_channel(
        channels: &mut HashMap<String, Arc<Channel>>,
        config: &ChannelConfig,
    ) -> Result<(), FocusError> {
        if channels.contains_key(&config.name) {
            return Err(FocusError::ChannelNameExists {
                name: config.name.clone(),
            });
        }
        if channels.values().any(|ch| ch.priority() == config.priority) {
            return Err(FocusError::ChannelPriorityExists {
                priority: config.priority,
            });
        }
        channels.insert(
            config.name.clone(),
            Arc::new(Channel::new(config.name.clone(), config.priority)),
        );
        Ok(())
    }
}

impl ManagerInner {
    fn channel(&self, name: &str) -> Option<Arc<Channel>> {
        self.all_channels.get(name).cloned()
    }

    async fn acquire_channel_helper(
        &self,
        channel: Arc<Channel>,
        observer: ObserverRef,
        activity_id: String,
    ) {
        let prev_foreground = {
            let mut active = self.active.lock().unwrap();
            let prev = Self::highest_priority_active_channel_locked(&active);
            channel.set_activity_id(activity_id);
            active.insert(channel.priority(), Arc::clone(&channel));
            prev
        };

        channel.set_observer(observer).await;

        match prev_foreground {
            None => channel.set_focus(FocusState::Foreground).await,
            Some(prev) if Arc::ptr_eq(&prev, &channel) => {
                channel.set_focus(FocusState::Foreground).await;
            }
            Some(prev) if channel.outranks(&prev) => {
                // The demoted channel hears about it before the winner.
                prev.set_focus(FocusState::Background).await;
                channel.set_focus(FocusState::Foreground).await;
            }
            Some(_) => channel.set_focus(FocusState::Background).await,
        }
    }

    async fn release_channel_helper(
        &self,
        channel: Arc<Channel>,
        observer: ObserverRef,
        reply: oneshot::Sender<bool>,
    ) {
        if !channel.does_observer_own_channel(&observer) {
            let err = FocusError::ObserverDoesNotOwnChannel {
                name: channel.name().to_string(),
            };
            error!(
                reason = err.as_label(),
                channel = channel.name(),
                "releaseChannelHelperFailed"
            );
            let _ = reply.send(false);
            return;
        }

        // Answer the caller as soon as the decision is made; the focus
        // callbacks below may run concurrently with the caller resuming.
        let _ = reply.send(true);

        let was_foregrounded = {
            let mut active = self.active.lock().unwrap();
            let was = Self::is_channel_foregrounded_locked(&active, &channel);
            active.remove(&channel.priority());
            was
        };

        channel.set_focus(FocusState::None).await;
        if was_foregrounded {
            self.foreground_highest_priority_active_channel().await;
        }
    }

    async fn stop_foreground_activity_helper(
        &self,
        channel: Arc<Channel>,
        expected_activity_id: String,
    ) {
        if !channel.stop_activity(&expected_activity_id) {
            // The foreground moved between snapshot and execution.
            return;
        }

        {
            let mut active = self.active.lock().unwrap();
            channel.set_activity_id("");
            active.remove(&channel.priority());
        }

        channel.set_focus(FocusState::None).await;
        self.foreground_highest_priority_active_channel().await;
    }

    async fn foreground_highest_priority_active_channel(&self) {
        let next = {
            let active = self.active.lock().unwrap();
            Self::highest_priority_active_channel_locked(&active)
        };
        if let Some(channel) = next {
            channel.set_focus(FocusState::Foreground).await;
        }
    }

    fn highest_priority_active_channel_locked(
        active: &BTreeMap<u32, Arc<Channel>>,
    ) -> Option<Arc<Channel>> {
        active.first_key_value().map(|(_, channel)| Arc::clone(channel))
    }

    fn is_channel_foregrounded_locked(
        active: &BTreeMap<u32, Arc<Channel>>,
        channel: &Arc<Channel>,
    ) -> bool {
        match active.first_key_value() {
            Some((_, top)) => Arc::ptr_eq(top, channel),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use super::*;
    use crate::observer::ChannelObserver;

    /// Records every transition into a log shared across observers, so
    /// cross-observer ordering can be asserted.
    struct Recorder {
        tag: &'static str,
        log: Arc<StdMutex<Vec<(&'static str, FocusState)>>>,
    }

    impl Recorder {
        fn arc(
            tag: &'static str,
            log: &Arc<StdMutex<Vec<(&'static str, FocusState)>>>,
        ) -> Arc<Recorder> {
            Arc::new(Recorder {
                tag,
                log: Arc::clone(log),
            })
        }

        fn states(&self) -> Vec<FocusState> {
            self.log
                .lock()
                .unwrap()
                .iter()
                .filter(|(tag, _)| *tag == self.tag)
                .map(|(_, state)| *state)
                .collect()
        }
    }

    #[async_trait]
    impl ChannelObserver for Recorder {
        async fn on_focus_changed(&self, state: FocusState) {
            self.log.lock().unwrap().push((self.tag, state));
        }
    }

    /// Releases its own channel as soon as it is pushed to the background.
    struct BackgroundQuitter {
        manager: FocusManager,
        channel: &'static str,
        me: StdMutex<Option<ObserverRef>>,
        states: StdMutex<Vec<FocusState>>,
    }

    #[async_trait]
    impl ChannelObserver for BackgroundQuitter {
        async fn on_focus_changed(&self, state: FocusState) {
            self.states.lock().unwrap().push(state);
            if state == FocusState::Background {
                let me = self.me.lock().unwrap().clone();
                if let Some(me) = me {
                    let _ = self.manager.release_channel(self.channel, me);
                }
            }
        }
    }

    fn shared_log() -> Arc<StdMutex<Vec<(&'static str, FocusState)>>> {
        Arc::new(StdMutex::new(Vec::new()))
    }

    fn manager() -> FocusManager {
        FocusManager::new(vec![
            ChannelConfig::new("Dialog", 100),
            ChannelConfig::new("Alerts", 200),
            ChannelConfig::new("Content", 300),
        ])
    }

    async fn settle(manager: &FocusManager) {
        manager.inner.executor.settle().await;
    }

    fn focus_of(manager: &FocusManager, name: &str) -> FocusState {
        manager.inner.channel(name).unwrap().focus()
    }

    /// At most one channel holds Foreground, and it is the highest-priority
    /// channel whose focus is not None.
    fn assert_unique_foreground(manager: &FocusManager) {
        let mut non_none: Vec<&Arc<Channel>> = manager
            .inner
            .all_channels
            .values()
            .filter(|ch| ch.focus() != FocusState::None)
            .collect();
        non_none.sort_by_key(|ch| ch.priority());

        for (i, ch) in non_none.iter().enumerate() {
            let expected = if i == 0 {
                FocusState::Foreground
            } else {
                FocusState::Background
            };
            assert_eq!(ch.focus(), expected, "channel {}", ch.name());
        }

        let active = manager.inner.active.lock().unwrap();
        assert_eq!(active.len(), non_none.len());
    }

    #[tokio::test]
    async fn single_acquire_takes_foreground() {
        let m = manager();
        let log = shared_log();
        let o1 = Recorder::arc("o1", &log);

        assert!(m.acquire_channel("Content", o1.clone(), "music"));
        settle(&m).await;

        assert_eq!(o1.states(), vec![FocusState::Foreground]);
        assert_eq!(focus_of(&m, "Content"), FocusState::Foreground);
        assert_eq!(focus_of(&m, "Dialog"), FocusState::None);
        assert_eq!(focus_of(&m, "Alerts"), FocusState::None);
        assert_unique_foreground(&m);
    }

    #[tokio::test]
    async fn higher_priority_acquire_preempts() {
        let m = manager();
        let log = shared_log();
        let o1 = Recorder::arc("o1", &log);
        let o2 = Recorder::arc("o2", &log);

        m.acquire_channel("Content", o1.clone(), "music");
        m.acquire_channel("Dialog", o2.clone(), "tts");
        settle(&m).await;

        assert_eq!(focus_of(&m, "Dialog"), FocusState::Foreground);
        assert_eq!(focus_of(&m, "Content"), FocusState::Background);
        // The demoted channel was notified before the winner.
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                ("o1", FocusState::Foreground),
                ("o1", FocusState::Background),
                ("o2", FocusState::Foreground),
            ]
        );
        assert_unique_foreground(&m);
    }

    #[tokio::test]
    async fn lower_priority_acquire_backgrounds_itself() {
        let m = manager();
        let log = shared_log();
        let o1 = Recorder::arc("o1", &log);
        let o3 = Recorder::arc("o3", &log);

        m.acquire_channel("Content", o1.clone(), "music");
        settle(&m).await;
        m.acquire_channel("Alerts", o3.clone(), "alarm");
        settle(&m).await;

        assert_eq!(focus_of(&m, "Content"), FocusState::Foreground);
        assert_eq!(focus_of(&m, "Alerts"), FocusState::Background);
        assert_eq!(o1.states(), vec![FocusState::Foreground]);
        assert_eq!(o3.states(), vec![FocusState::Background]);
        assert_unique_foreground(&m);
    }

    #[tokio::test]
    async fn release_promotes_the_next_active_channel() {
        let m = manager();
        let log = shared_log();
        let o1 = Recorder::arc("o1", &log);
        let o2 = Recorder::arc("o2", &log);

        m.acquire_channel("Content", o1.clone(), "music");
        m.acquire_channel("Dialog", o2.clone(), "tts");
        settle(&m).await;

        let released = m.release_channel("Dialog", o2.clone());
        assert!(released.await.unwrap());
        settle(&m).await;

        assert_eq!(
            o2.states(),
            vec![FocusState::Foreground, FocusState::None]
        );
        assert_eq!(
            o1.states(),
            vec![
                FocusState::Foreground,
                FocusState::Background,
                FocusState::Foreground,
            ]
        );
        assert_eq!(focus_of(&m, "Content"), FocusState::Foreground);
        assert_eq!(focus_of(&m, "Dialog"), FocusState::None);
        assert_unique_foreground(&m);
    }

    #[tokio::test]
    async fn release_by_non_owner_is_refused() {
        let m = manager();
        let log = shared_log();
        let o1 = Recorder::arc("o1", &log);
        let o2 = Recorder::arc("o2", &log);
        let intruder = Recorder::arc("intruder", &log);

        m.acquire_channel("Content", o1.clone(), "music");
        m.acquire_channel("Dialog", o2.clone(), "tts");
        settle(&m).await;

        let released = m.release_channel("Dialog", intruder.clone());
        assert!(!released.await.unwrap());
        settle(&m).await;

        // Nobody was notified and nothing moved.
        assert_eq!(o2.states(), vec![FocusState::Foreground]);
        assert!(intruder.states().is_empty());
        assert_eq!(focus_of(&m, "Dialog"), FocusState::Foreground);
        assert_eq!(focus_of(&m, "Content"), FocusState::Background);
        assert_unique_foreground(&m);
    }

    #[tokio::test]
    async fn release_of_unknown_channel_resolves_false() {
        let m = manager();
        let log = shared_log();
        let o1 = Recorder::arc("o1", &log);

        let released = m.release_channel("Earcons", o1.clone());
        assert!(!released.await.unwrap());
    }

    #[tokio::test]
    async fn acquire_of_unknown_channel_returns_false() {
        let m = manager();
        let log = shared_log();
        let o1 = Recorder::arc("o1", &log);

        assert!(!m.acquire_channel("Earcons", o1.clone(), "beep"));
    }

    #[tokio::test]
    async fn stop_foreground_vacates_and_promotes() {
        let m = manager();
        let log = shared_log();
        let o1 = Recorder::arc("o1", &log);
        let o2 = Recorder::arc("o2", &log);

        m.acquire_channel("Content", o1.clone(), "music");
        m.acquire_channel("Dialog", o2.clone(), "tts");
        settle(&m).await;

        m.stop_foreground_activity();
        settle(&m).await;

        assert_eq!(
            o2.states(),
            vec![FocusState::Foreground, FocusState::None]
        );
        assert_eq!(focus_of(&m, "Dialog"), FocusState::None);
        assert_eq!(m.inner.channel("Dialog").unwrap().activity_id(), "");
        assert_eq!(focus_of(&m, "Content"), FocusState::Foreground);
        assert_unique_foreground(&m);
    }

    #[tokio::test]
    async fn stale_stop_is_a_no_op() {
        let m = manager();
        let log = shared_log();
        let o2 = Recorder::arc("o2", &log);

        m.acquire_channel("Dialog", o2.clone(), "tts");
        settle(&m).await;

        // Drive the helper with an activity id the foreground no longer
        // carries, as happens when the foreground moves between the
        // caller-side snapshot and job execution.
        let dialog = m.inner.channel("Dialog").unwrap();
        m.inner
            .stop_foreground_activity_helper(dialog, "stale".to_string())
            .await;

        assert_eq!(focus_of(&m, "Dialog"), FocusState::Foreground);
        assert_eq!(o2.states(), vec![FocusState::Foreground]);
        assert_unique_foreground(&m);
    }

    #[tokio::test]
    async fn stop_with_nothing_active_is_a_no_op() {
        let m = manager();

        m.stop_foreground_activity();
        m.stop_foreground_activity();
        settle(&m).await;

        assert!(m.inner.active.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_stop_without_an_intervening_acquire_is_a_no_op() {
        let m = manager();
        let log = shared_log();
        let o1 = Recorder::arc("o1", &log);

        m.acquire_channel("Content", o1.clone(), "music");
        settle(&m).await;

        m.stop_foreground_activity();
        settle(&m).await;
        m.stop_foreground_activity();
        settle(&m).await;

        assert_eq!(
            o1.states(),
            vec![FocusState::Foreground, FocusState::None]
        );
        assert!(m.inner.active.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn acquire_then_release_round_trips_to_vacant() {
        let m = manager();
        let log = shared_log();
        let o1 = Recorder::arc("o1", &log);

        m.acquire_channel("Alerts", o1.clone(), "alarm");
        settle(&m).await;
        let released = m.release_channel("Alerts", o1.clone());
        assert!(released.await.unwrap());
        settle(&m).await;

        assert!(m.inner.active.lock().unwrap().is_empty());
        assert_eq!(
            o1.states(),
            vec![FocusState::Foreground, FocusState::None]
        );
        assert_eq!(m.inner.channel("Alerts").unwrap().activity_id(), "");
    }

    #[tokio::test]
    async fn reacquire_replaces_the_observer_silently() {
        let m = manager();
        let log = shared_log();
        let o1 = Recorder::arc("o1", &log);
        let o2 = Recorder::arc("o2", &log);

        m.acquire_channel("Content", o1.clone(), "music");
        settle(&m).await;
        m.acquire_channel("Content", o2.clone(), "radio");
        settle(&m).await;

        // The replaced observer ends its tenure with None; the channel never
        // left Foreground, so the new observer has no transition to hear.
        assert_eq!(
            o1.states(),
            vec![FocusState::Foreground, FocusState::None]
        );
        assert!(o2.states().is_empty());
        assert_eq!(focus_of(&m, "Content"), FocusState::Foreground);
        assert_eq!(m.inner.channel("Content").unwrap().activity_id(), "radio");

        let o2_ref: ObserverRef = o2.clone();
        assert!(m
            .inner
            .channel("Content")
            .unwrap()
            .does_observer_own_channel(&o2_ref));
    }

    #[tokio::test]
    async fn observer_may_release_from_inside_a_callback() {
        let m = manager();
        let log = shared_log();
        let o2 = Recorder::arc("o2", &log);

        let quitter = Arc::new(BackgroundQuitter {
            manager: m.clone(),
            channel: "Content",
            me: StdMutex::new(None),
            states: StdMutex::new(Vec::new()),
        });
        *quitter.me.lock().unwrap() = Some(quitter.clone() as ObserverRef);

        m.acquire_channel("Content", quitter.clone(), "music");
        settle(&m).await;
        m.acquire_channel("Dialog", o2.clone(), "tts");
        // Once for the acquire, once for the re-entrant release it queued.
        settle(&m).await;
        settle(&m).await;

        assert_eq!(
            *quitter.states.lock().unwrap(),
            vec![
                FocusState::Foreground,
                FocusState::Background,
                FocusState::None,
            ]
        );
        assert_eq!(focus_of(&m, "Dialog"), FocusState::Foreground);
        assert_eq!(focus_of(&m, "Content"), FocusState::None);
        assert_unique_foreground(&m);
    }

    #[tokio::test]
    async fn duplicate_configurations_are_skipped() {
        let m = FocusManager::new(vec![
            ChannelConfig::new("A", 100),
            ChannelConfig::new("B", 100),
            ChannelConfig::new("A", 200),
        ]);

        assert_eq!(m.inner.all_channels.len(), 1);
        assert_eq!(m.inner.channel("A").unwrap().priority(), 100);
        assert!(m.inner.channel("B").is_none());

        let log = shared_log();
        let o1 = Recorder::arc("o1", &log);
        assert!(!m.acquire_channel("B", o1.clone(), "x"));
    }

    #[tokio::test]
    async fn shutdown_rejects_later_requests() {
        let m = manager();
        let log = shared_log();
        let o1 = Recorder::arc("o1", &log);

        m.acquire_channel("Content", o1.clone(), "music");
        m.shutdown().await;

        assert_eq!(o1.states(), vec![FocusState::Foreground]);
        assert!(!m.acquire_channel("Dialog", o1.clone(), "tts"));
        let released = m.release_channel("Content", o1.clone());
        assert!(released.await.is_err());
    }
}
