//! In-process transition driver.
//!
//! Contexts here are only names; "loading" one means remembering it. Each
//! request completes on the next [`LocalTransitionDriver::pump`], never
//! inside the call that made it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tableau_core::transition::{
    CompletionKind, TransitionCompleted, TransitionDriver, TransitionMode,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct Inner {
    queued: VecDeque<TransitionCompleted>,
    loaded: Vec<String>,
    subscriber: Option<UnboundedSender<TransitionCompleted>>,
}

/// Completes transitions when pumped. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct LocalTransitionDriver(Arc<Mutex<Inner>>);

impl LocalTransitionDriver {
    /// A driver with nothing loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Contexts currently loaded, oldest first.
    #[must_use]
    pub fn loaded(&self) -> Vec<String> {
        self.inner().loaded.clone()
    }

    /// Finishes every queued request and notifies the subscriber.
    /// Returns what completed, in request order.
    pub fn pump(&self) -> Vec<TransitionCompleted> {
        let mut inner = self.inner();
        let completed: Vec<_> = inner.queued.drain(..).collect();
        for notice in &completed {
            match notice.kind {
                CompletionKind::Loaded(TransitionMode::Replace) => {
                    inner.loaded = vec![notice.context.clone()];
                }
                CompletionKind::Loaded(TransitionMode::Additive) => {
                    inner.loaded.push(notice.context.clone());
                }
                CompletionKind::Unloaded => {
                    inner.loaded.retain(|name| name != &notice.context);
                }
            }
            match &inner.subscriber {
                Some(subscriber) => {
                    if subscriber.send(notice.clone()).is_err() {
                        warn!(context = %notice.context, "completion subscriber went away");
                    }
                }
                None => debug!(context = %notice.context, "completion with no subscriber"),
            }
        }
        completed
    }
}

impl TransitionDriver for LocalTransitionDriver {
    fn transition_to(&mut self, context: &str, mode: TransitionMode) {
        self.inner()
            .queued
            .push_back(TransitionCompleted::loaded(context, mode));
    }

    fn unload(&mut self, context: &str) {
        self.inner()
            .queued
            .push_back(TransitionCompleted::unloaded(context));
    }

    fn subscribe(&mut self) -> UnboundedReceiver<TransitionCompleted> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.inner().subscriber = Some(sender);
        receiver
    }

    fn unsubscribe(&mut self) {
        self.inner().subscriber = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_complete_only_when_pumped() {
        let mut driver = LocalTransitionDriver::new();
        let mut completions = driver.subscribe();

        driver.transition_to("ChapterOne", TransitionMode::Replace);
        let before = completions.try_recv();
        driver.pump();

        assert!(before.is_err());
        assert_eq!(
            completions.try_recv().unwrap(),
            TransitionCompleted::loaded("ChapterOne", TransitionMode::Replace)
        );
    }

    #[test]
    fn test_tracks_loaded_contexts() {
        let mut driver = LocalTransitionDriver::new();

        driver.transition_to("ChapterOne", TransitionMode::Replace);
        driver.transition_to("SaveLoadScene", TransitionMode::Additive);
        driver.pump();
        let both = driver.loaded();
        driver.unload("SaveLoadScene");
        driver.pump();

        assert_eq!(both, vec!["ChapterOne".to_owned(), "SaveLoadScene".to_owned()]);
        assert_eq!(driver.loaded(), vec!["ChapterOne".to_owned()]);
    }

    #[test]
    fn test_unsubscribed_driver_still_completes() {
        let mut driver = LocalTransitionDriver::new();
        let _ = driver.subscribe();
        driver.unsubscribe();

        driver.transition_to("MainMenuScene", TransitionMode::Replace);

        assert_eq!(driver.pump().len(), 1);
        assert_eq!(driver.loaded(), vec!["MainMenuScene".to_owned()]);
    }
}
