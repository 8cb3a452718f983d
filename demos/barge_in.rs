//! # Barge-In Example
//!
//! Shows re-entrant observers: a chime on the Alerts channel releases
//! itself as soon as it is pushed to the background, so it never lingers
//! behind speech. The observer calls back into the manager from inside its
//! own focus callback.
//!
//! ## Run
//! ```bash
//! cargo run --example barge_in
//! ```

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use focusvisor::{ChannelConfig, ChannelObserver, FocusManager, FocusState, ObserverRef};

struct Chime {
    manager: FocusManager,
    me: Mutex<Option<ObserverRef>>,
}

#[async_trait]
impl ChannelObserver for Chime {
    async fn on_focus_changed(&self, state: FocusState) {
        println!(" ├─► chime  {state}");
        if state == FocusState::Background {
            // Chimes are all-or-nothing: give the channel up instead of
            // playing quietly underneath speech.
            let me = self.me.lock().unwrap().clone();
            if let Some(me) = me {
                println!(" │   chime gives up its channel");
                let _ = self.manager.release_channel("Alerts", me);
            }
        }
    }
}

struct Speech;

#[async_trait]
impl ChannelObserver for Speech {
    async fn on_focus_changed(&self, state: FocusState) {
        println!(" ├─► speech {state}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let manager = FocusManager::new(vec![
        ChannelConfig::new("Dialog", 100),
        ChannelConfig::new("Alerts", 200),
    ]);

    let chime = Arc::new(Chime {
        manager: manager.clone(),
        me: Mutex::new(None),
    });
    *chime.me.lock().unwrap() = Some(chime.clone() as ObserverRef);

    println!("chime starts:");
    manager.acquire_channel("Alerts", chime.clone(), "chime-1");
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("speech barges in:");
    manager.acquire_channel("Dialog", Arc::new(Speech), "tts-1");
    tokio::time::sleep(Duration::from_millis(100)).await;

    manager.shutdown().await;
    println!(" └─► done");
}
