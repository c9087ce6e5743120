//! End-to-end pause lifecycle across the page and background contexts.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use nudge::overlay::{ManualScheduler, OverlayView, Phase, Surface};
use nudge::protocol::{RuntimeMessage, TabId};
use nudge::runtime::ChannelHost;
use nudge::store::{self, KeyValueStore, MemoryStore, Scope, SESSIONS_KEY, STATS_KEY};
use nudge::worker::{InstallReason, Shell};
use nudge::{
    ActionOutcome, BackgroundWorker, Clock, Collaborators, Decision, NudgeConfig, NudgeError,
    NudgeManager, SessionState, SettingsEditor, Stats,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

struct TestClock {
    now: Mutex<DateTime<Utc>>,
}

impl TestClock {
    fn new() -> Self {
        let start = DateTime::parse_from_rfc3339("2025-01-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Self {
            now: Mutex::new(start),
        }
    }

    fn advance(&self, by: ChronoDuration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for TestClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Default)]
struct RecordingSurface {
    views: Mutex<Vec<OverlayView>>,
    dismissed: Mutex<usize>,
}

impl Surface for RecordingSurface {
    fn present(&self, view: &OverlayView) {
        self.views.lock().unwrap().push(view.clone());
    }
    fn update_countdown(&self, _remaining_seconds: u32) {}
    fn enable_continue(&self) {}
    fn dismiss(&self) {
        *self.dismissed.lock().unwrap() += 1;
    }
}

#[derive(Default)]
struct RecordingShell {
    closed: Mutex<Vec<TabId>>,
    badge: Mutex<String>,
}

impl Shell for RecordingShell {
    fn close_tab(&self, tab: TabId) -> Result<(), NudgeError> {
        self.closed.lock().unwrap().push(tab);
        Ok(())
    }
    fn set_badge_text(&self, text: &str) {
        *self.badge.lock().unwrap() = text.to_string();
    }
}

struct Browser {
    store: Arc<MemoryStore>,
    clock: Arc<TestClock>,
    shell: Arc<RecordingShell>,
    worker: BackgroundWorker,
    outbox: mpsc::UnboundedSender<(RuntimeMessage, Option<TabId>)>,
    inbox: mpsc::UnboundedReceiver<(RuntimeMessage, Option<TabId>)>,
}

struct Page {
    scheduler: Arc<ManualScheduler>,
    surface: Arc<RecordingSurface>,
    manager: NudgeManager,
}

impl Browser {
    fn install() -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(TestClock::new());
        let shell = Arc::new(RecordingShell::default());
        let worker = BackgroundWorker::with_clock(store.clone(), shell.clone(), clock.clone());
        worker.on_install(InstallReason::Install).unwrap();
        let (outbox, inbox) = mpsc::unbounded_channel();
        Self {
            store,
            clock,
            shell,
            worker,
            outbox,
            inbox,
        }
    }

    fn open(&self, hostname: &str, tab: u64) -> Page {
        let scheduler = Arc::new(ManualScheduler::new());
        let surface = Arc::new(RecordingSurface::default());
        let host = Arc::new(ChannelHost::new(hostname, TabId(tab), self.outbox.clone()));
        let mut manager = NudgeManager::with_clock(
            NudgeConfig::default(),
            Collaborators {
                store: self.store.clone(),
                scheduler: scheduler.clone(),
                surface: surface.clone(),
                host,
            },
            self.clock.clone(),
        )
        .unwrap();
        manager.start();
        Page {
            scheduler,
            surface,
            manager,
        }
    }

    fn wait(&self, page: &mut Page, secs: u64) {
        for _ in 0..secs {
            self.clock.advance(ChronoDuration::seconds(1));
            for event in page.scheduler.advance(Duration::from_secs(1)) {
                page.manager.on_timer(event);
            }
        }
    }

    fn deliver_messages(&mut self) {
        while let Ok((message, sender)) = self.inbox.try_recv() {
            self.worker.handle_message(message, sender);
        }
    }

    fn sessions(&self) -> SessionState {
        store::load(&*self.store, Scope::Local, SESSIONS_KEY).unwrap()
    }

    fn stats(&self) -> Stats {
        store::load(&*self.store, Scope::Roaming, STATS_KEY).unwrap()
    }
}

#[test]
fn continue_grants_exactly_one_unlock() {
    let browser = Browser::install();
    let mut page = browser.open("old.reddit.com", 1);

    assert_eq!(page.manager.phase(), Some(Phase::Counting));
    assert_eq!(page.manager.remaining_seconds(), Some(10));
    let view = page.surface.views.lock().unwrap()[0].clone();
    assert_eq!(view.domain, "old.reddit.com");
    assert_eq!(view.unlock_minutes, 15);

    assert_eq!(page.manager.continue_to_site(), ActionOutcome::Ignored);

    browser.wait(&mut page, 10);
    assert_eq!(page.manager.phase(), Some(Phase::Decidable));
    assert_eq!(
        page.manager.continue_to_site(),
        ActionOutcome::Completed(Decision::Continue)
    );
    assert_eq!(page.manager.phase(), None);

    let now = browser.clock.now_millis();
    let sessions = browser.sessions();
    assert_eq!(sessions.unlocked_domains.len(), 1);
    assert_eq!(sessions.expiry("old.reddit.com"), Some(now + 15 * 60_000));
    assert_eq!(browser.stats().intentional_visits, 1);
    assert_eq!(browser.stats().temptations_resisted, 0);

    let second = browser.open("old.reddit.com", 2);
    assert_eq!(second.manager.phase(), None);
}

#[test]
fn abandon_closes_tab_without_unlocking() {
    let mut browser = Browser::install();
    let mut badge_changes = browser.store.subscribe();
    let mut page = browser.open("www.reddit.com", 9);

    browser.wait(&mut page, 3);
    assert_eq!(
        page.manager.abandon(),
        ActionOutcome::Completed(Decision::Abandon)
    );
    assert_eq!(page.manager.phase(), None);
    assert_eq!(*page.surface.dismissed.lock().unwrap(), 1);

    browser.deliver_messages();
    assert_eq!(*browser.shell.closed.lock().unwrap(), vec![TabId(9)]);
    assert!(browser.sessions().unlocked_domains.is_empty());
    assert_eq!(browser.stats().temptations_resisted, 1);

    while let Ok(change) = badge_changes.try_recv() {
        browser.worker.on_store_change(&change);
    }
    assert_eq!(*browser.shell.badge.lock().unwrap(), "1");
}

#[test]
fn unlock_expires_and_is_swept() {
    let browser = Browser::install();
    let mut page = browser.open("reddit.com", 1);
    browser.wait(&mut page, 10);
    page.manager.continue_to_site();

    browser.clock.advance(ChronoDuration::minutes(15));
    let again = browser.open("reddit.com", 2);
    assert_eq!(again.manager.phase(), Some(Phase::Counting));

    assert_eq!(browser.worker.sweep(), 1);
    assert!(browser.sessions().unlocked_domains.is_empty());
}

#[test]
fn options_edits_reach_open_pages() {
    let browser = Browser::install();
    let mut page = browser.open("news.ycombinator.com", 1);
    let mut changes = page.manager.subscribe();
    assert_eq!(page.manager.phase(), None);

    let mut editor = SettingsEditor::load(browser.store.clone(), browser.clock.clone()).unwrap();
    editor.add_domain("https://news.ycombinator.com/news").unwrap();
    page.manager.pump_changes(&mut changes);
    assert_eq!(page.manager.phase(), Some(Phase::Counting));

    editor.remove_domain("news.ycombinator.com").unwrap();
    page.manager.pump_changes(&mut changes);
    assert_eq!(page.manager.phase(), None);
    assert_eq!(browser.stats(), Stats::default());
}

#[test]
fn rejected_import_changes_nothing() {
    let browser = Browser::install();
    let mut editor = SettingsEditor::load(browser.store.clone(), browser.clock.clone()).unwrap();
    let before = editor.settings().clone();

    let result = editor.import(r#"{"settings": {"blacklist": "reddit.com"}}"#);
    assert!(matches!(result, Err(NudgeError::ImportRejected(_))));
    assert_eq!(editor.settings(), &before);

    let page = browser.open("reddit.com", 1);
    assert_eq!(page.manager.phase(), Some(Phase::Counting));
}
