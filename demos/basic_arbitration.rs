//! # Basic Arbitration Example
//!
//! Three channels compete for the speaker: music starts on Content, an
//! alarm fires on Alerts, speech barges in on Dialog, then everything winds
//! back down.
//!
//! ## Run
//! ```bash
//! cargo run --example basic_arbitration
//! ```

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use focusvisor::{ChannelConfig, ChannelObserver, FocusManager, FocusState};

struct PrintObserver {
    name: &'static str,
}

#[async_trait]
impl ChannelObserver for PrintObserver {
    async fn on_focus_changed(&self, state: FocusState) {
        println!(" ├─► {:<6} {}", self.name, state);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let manager = FocusManager::new(vec![
        ChannelConfig::new("Dialog", 100),
        ChannelConfig::new("Alerts", 200),
        ChannelConfig::new("Content", 300),
    ]);

    let music = Arc::new(PrintObserver { name: "music" });
    let alarm = Arc::new(PrintObserver { name: "alarm" });
    let tts = Arc::new(PrintObserver { name: "tts" });

    println!("music starts:");
    manager.acquire_channel("Content", music.clone(), "music-1");
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("alarm fires (Alerts outranks Content, music ducks):");
    manager.acquire_channel("Alerts", alarm.clone(), "alarm-1");
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("speech barges in:");
    manager.acquire_channel("Dialog", tts.clone(), "tts-1");
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("speech finishes:");
    let released = manager.release_channel("Dialog", tts.clone());
    println!(" │   release accepted: {:?}", released.await.unwrap_or(false));
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("user says stop (vacates the alarm, music resumes):");
    manager.stop_foreground_activity();
    tokio::time::sleep(Duration::from_millis(100)).await;

    manager.shutdown().await;
    println!(" └─► done");
}
