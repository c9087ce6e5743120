//! Simulated visit to a blacklisted site on a real clock.
//!
//! Run with `cargo run --example visit -- old.reddit.com`. Settings and
//! counters persist under the platform data directory between runs.

use nudge::overlay::{OverlayView, Phase, Surface};
use nudge::protocol::TabId;
use nudge::runtime::{spawn_sweeper, ChannelHost, TokioScheduler};
use nudge::store::{FileStore, KeyValueStore, Scope, SETTINGS_KEY};
use nudge::worker::{InstallReason, Shell};
use nudge::{BackgroundWorker, Collaborators, NudgeConfig, NudgeError, NudgeManager};
use std::sync::Arc;
use tokio::sync::mpsc;

struct ConsoleSurface;

impl Surface for ConsoleSurface {
    fn present(&self, view: &OverlayView) {
        println!("{}", view.headline());
        println!("  {}", view.prompt);
        println!("  {}", view.unlock_hint());
    }

    fn update_countdown(&self, remaining_seconds: u32) {
        if remaining_seconds > 0 {
            println!("  {}...", remaining_seconds);
        }
    }

    fn enable_continue(&self) {
        println!("  [continue] is now available");
    }

    fn dismiss(&self) {
        println!("overlay dismissed");
    }
}

struct ConsoleShell;

impl Shell for ConsoleShell {
    fn close_tab(&self, tab: TabId) -> Result<(), NudgeError> {
        println!("closing tab {}", tab.0);
        Ok(())
    }

    fn set_badge_text(&self, text: &str) {
        println!("badge: {:?}", text);
    }
}

#[tokio::main]
async fn main() -> Result<(), NudgeError> {
    let hostname = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "www.reddit.com".to_string());

    let config = NudgeConfig::default();
    let store = Arc::new(FileStore::new(config.namespace)?);
    let worker = Arc::new(BackgroundWorker::new(store.clone(), Arc::new(ConsoleShell)));
    let reason = match store.get(Scope::Roaming, SETTINGS_KEY)? {
        Some(_) => InstallReason::Update,
        None => InstallReason::Install,
    };
    worker.on_install(reason)?;
    worker.on_startup();
    let sweeper = spawn_sweeper(worker.clone(), config.sweep_interval);

    let (timer_tx, mut timer_rx) = mpsc::unbounded_channel();
    let (message_tx, mut message_rx) = mpsc::unbounded_channel();

    let mut manager = NudgeManager::new(
        config,
        Collaborators {
            store: store.clone(),
            scheduler: Arc::new(TokioScheduler::new(timer_tx)?),
            surface: Arc::new(ConsoleSurface),
            host: Arc::new(ChannelHost::new(hostname, TabId(1), message_tx)),
        },
    )?;
    let mut changes = manager.subscribe();
    manager.start();

    if manager.phase().is_none() {
        println!("{} is not paused", manager.domain());
        sweeper.abort();
        return Ok(());
    }

    while let Some(event) = timer_rx.recv().await {
        manager.on_timer(event);
        manager.pump_changes(&mut changes);
        if manager.phase() == Some(Phase::Decidable) {
            println!("outcome: {:?}", manager.continue_to_site());
            break;
        }
    }

    while let Ok((message, sender)) = message_rx.try_recv() {
        worker.handle_message(message, sender);
    }
    worker.refresh_badge();
    sweeper.abort();
    Ok(())
}
