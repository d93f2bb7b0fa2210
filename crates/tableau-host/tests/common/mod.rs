//! Shared fixtures for console host tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tableau_core::slot::SlotId;
use tableau_host::console::Console;
use tableau_host::story::Story;
use tableau_host::App;
use tableau_persistence::FileSnapshotStore;
use tableau_session::SessionConfig;
use tableau_test_support::FixedClock;
use tempfile::TempDir;

pub fn slot(index: u8) -> SlotId {
    SlotId::new(index).unwrap()
}

/// An app over the demo story and a file store in a temporary directory.
pub struct Host {
    pub app: App,
    pub console: Console,
    pub store: Arc<FileSnapshotStore>,
    _temp: TempDir,
}

impl Host {
    pub async fn start() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(FileSnapshotStore::open(temp.path()).await.unwrap());
        let console = Console::capture();
        let mut app = App::new(
            SessionConfig::default(),
            store.clone(),
            Arc::new(FixedClock::at(2026, 3, 14, 9, 26, 53)),
            Story::demo(),
            console.clone(),
            Duration::from_millis(16),
        );
        app.start();
        app.pump().await;
        Self {
            app,
            console,
            store,
            _temp: temp,
        }
    }

    /// Runs each command followed by one frame.
    pub async fn run(&mut self, commands: &[&str]) {
        for command in commands {
            self.app.handle_line(command).await;
            self.app.pump().await;
        }
    }

    pub fn output(&self) -> Vec<String> {
        self.console.captured()
    }

    pub fn printed(&self, line: &str) -> bool {
        self.output().iter().any(|l| l == line)
    }
}
