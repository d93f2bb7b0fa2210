//! Shared test mocks and utilities for the Tableau scene coordinator.

mod clock;
mod presentation;
mod store;
mod transition;

pub use clock::FixedClock;
pub use presentation::{
    RecordingBrowserView, RecordingChoiceSink, RecordingNotifier, RecordingPortraitSink,
    RecordingPresentation, RecordingTextSink,
};
pub use store::{FailingSnapshotStore, InMemorySnapshotStore};
pub use transition::{RecordingTransitionDriver, TransitionRequest};
