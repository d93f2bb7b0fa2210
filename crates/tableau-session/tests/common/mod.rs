//! Shared fixtures for session integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tableau_core::slot::SlotId;
use tableau_core::snapshot::SessionSnapshot;
use tableau_core::store::SnapshotStore;
use tableau_core::transition::TransitionMode;
use tableau_narrative::NarrativeLine;
use tableau_persistence::FileSnapshotStore;
use tableau_session::{SessionConfig, SessionCoordinator, WaitResolution};
use tableau_test_support::{
    FixedClock, InMemorySnapshotStore, RecordingBrowserView, RecordingNotifier,
    RecordingPresentation, RecordingTransitionDriver,
};
use tempfile::TempDir;

/// Time every save made through the coordinator is stamped with.
pub fn session_clock() -> FixedClock {
    FixedClock::at(2026, 3, 14, 9, 26, 53)
}

/// An older time for snapshots seeded before the test starts.
pub fn seed_clock() -> FixedClock {
    FixedClock::at(2025, 12, 31, 23, 59, 59)
}

pub fn slot(index: u8) -> SlotId {
    SlotId::new(index).unwrap()
}

pub fn lines(count: usize) -> Vec<NarrativeLine> {
    (0..count)
        .map(|i| NarrativeLine::spoken("Mara", format!("line {i}")))
        .collect()
}

/// A coordinator wired to recording collaborators.
pub struct Fixture<S> {
    pub coordinator: SessionCoordinator,
    pub store: Arc<S>,
    pub driver: RecordingTransitionDriver,
    pub notifier: RecordingNotifier,
}

/// Fixture over a real file store in a temporary directory.
pub async fn file_fixture() -> (Fixture<FileSnapshotStore>, TempDir) {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = FileSnapshotStore::open(temp.path()).await.unwrap();
    (fixture(store, SessionConfig::default()), temp)
}

/// Fixture over an in-memory store.
pub fn memory_fixture(store: InMemorySnapshotStore) -> Fixture<InMemorySnapshotStore> {
    fixture(store, SessionConfig::default())
}

pub fn fixture<S: SnapshotStore + 'static>(store: S, config: SessionConfig) -> Fixture<S> {
    let store = Arc::new(store);
    let driver = RecordingTransitionDriver::new();
    let notifier = RecordingNotifier::new();
    let coordinator = SessionCoordinator::new(
        config,
        store.clone(),
        Arc::new(session_clock()),
        Box::new(notifier.clone()),
        Box::new(driver.clone()),
    );
    Fixture {
        coordinator,
        store,
        driver,
        notifier,
    }
}

/// Fills every slot with an old snapshot of `context`.
pub async fn fill_all_slots(store: &dyn SnapshotStore, context: &str) {
    for slot in SlotId::all() {
        let snapshot = SessionSnapshot::new(context, 9, 600.0, seed_clock().0);
        store.write(slot, &snapshot).await.unwrap();
    }
}

impl<S> Fixture<S> {
    /// Completes every outstanding transition and handles the completions.
    pub async fn pump(&mut self) {
        self.driver.complete_all();
        self.coordinator.process_transitions().await;
    }

    /// Replace-loads `context` and handles its completion.
    pub async fn enter(&mut self, context: &str) {
        self.coordinator
            .request_transition(context, TransitionMode::Replace);
        self.pump().await;
    }

    /// What the context's UI does once it exists: bind sinks and start lines.
    pub fn present(&mut self, count: usize) -> RecordingPresentation {
        let ui = RecordingPresentation::new();
        self.coordinator.provide_handles(ui.handles());
        self.coordinator.begin_narrative(lines(count));
        ui
    }

    /// What the browser context's UI does once it exists.
    pub fn show_browser(&mut self) -> RecordingBrowserView {
        let view = RecordingBrowserView::new();
        self.coordinator.provide_browser_view(Box::new(view.clone()));
        view
    }

    pub fn tick(&mut self) -> Vec<WaitResolution> {
        self.coordinator.tick(Duration::from_millis(16))
    }
}
