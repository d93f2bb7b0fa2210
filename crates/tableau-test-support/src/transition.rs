//! Test transition driver that records requests and completes them on demand.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tableau_core::transition::{TransitionCompleted, TransitionDriver, TransitionMode};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A request the core made of the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionRequest {
    /// `transition_to(context, mode)`.
    Load {
        /// Requested context.
        context: String,
        /// Requested mode.
        mode: TransitionMode,
    },
    /// `unload(context)`.
    Unload {
        /// Requested context.
        context: String,
    },
}

impl TransitionRequest {
    fn completion(&self) -> TransitionCompleted {
        match self {
            Self::Load { context, mode } => TransitionCompleted::loaded(context.clone(), *mode),
            Self::Unload { context } => TransitionCompleted::unloaded(context.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct DriverState {
    requests: Vec<TransitionRequest>,
    in_flight: VecDeque<TransitionRequest>,
    subscriber: Option<UnboundedSender<TransitionCompleted>>,
}

/// A driver that never completes anything until the test says so.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransitionDriver(Arc<Mutex<DriverState>>);

impl RecordingTransitionDriver {
    /// Create a driver with no subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request made so far, in order.
    pub fn requests(&self) -> Vec<TransitionRequest> {
        self.0.lock().unwrap().requests.clone()
    }

    /// Whether a completion subscriber is registered.
    pub fn is_subscribed(&self) -> bool {
        self.0.lock().unwrap().subscriber.is_some()
    }

    /// Completes the oldest in-flight request. Returns `false` if there was none.
    pub fn complete_next(&self) -> bool {
        let mut state = self.0.lock().unwrap();
        let Some(request) = state.in_flight.pop_front() else {
            return false;
        };
        if let Some(subscriber) = &state.subscriber {
            let _ = subscriber.send(request.completion());
        }
        true
    }

    /// Completes every in-flight request in order; returns how many.
    pub fn complete_all(&self) -> usize {
        let mut completed = 0;
        while self.complete_next() {
            completed += 1;
        }
        completed
    }
}

impl TransitionDriver for RecordingTransitionDriver {
    fn transition_to(&mut self, context: &str, mode: TransitionMode) {
        let request = TransitionRequest::Load {
            context: context.to_owned(),
            mode,
        };
        let mut state = self.0.lock().unwrap();
        state.requests.push(request.clone());
        state.in_flight.push_back(request);
    }

    fn unload(&mut self, context: &str) {
        let request = TransitionRequest::Unload {
            context: context.to_owned(),
        };
        let mut state = self.0.lock().unwrap();
        state.requests.push(request.clone());
        state.in_flight.push_back(request);
    }

    fn subscribe(&mut self) -> UnboundedReceiver<TransitionCompleted> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.0.lock().unwrap().subscriber = Some(sender);
        receiver
    }

    fn unsubscribe(&mut self) {
        self.0.lock().unwrap().subscriber = None;
    }
}
