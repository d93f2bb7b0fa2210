//! Readiness barrier: suspended continuations resumed by the tick source.
//!
//! A wait never blocks the thread. It sits in the queue until a later
//! [`ReadinessBarrier::tick`] finds its predicate true, its cycle superseded
//! or its timeout exhausted.

use std::fmt;

use tableau_core::error::{BarrierError, StateError};
use tableau_core::transition::CycleId;
use tracing::{debug, warn};

/// Polling cadence and optional timeout of one wait, both in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// The predicate is evaluated every `poll_interval` ticks. Zero is treated as one.
    pub poll_interval: u32,
    /// Give up after this many ticks. `None` waits for as long as the cycle lives.
    pub timeout: Option<u32>,
}

impl WaitOptions {
    /// Poll every tick with the given timeout.
    #[must_use]
    pub fn every_tick(timeout: Option<u32>) -> Self {
        Self {
            poll_interval: 1,
            timeout,
        }
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::every_tick(Some(600))
    }
}

/// Handle of a registered wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WaitId(u64);

impl fmt::Display for WaitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wait-{}", self.0)
    }
}

/// How a wait left the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitResolution {
    /// The predicate held and the continuation ran.
    Ready {
        /// The wait.
        id: WaitId,
        /// Label given at registration.
        label: &'static str,
    },
    /// The wait's cycle was superseded; the continuation was dropped.
    Stale {
        /// The wait.
        id: WaitId,
        /// Label given at registration.
        label: &'static str,
        /// Registered and active cycles.
        error: StateError,
    },
    /// The timeout elapsed first; the continuation was dropped.
    TimedOut {
        /// The wait.
        id: WaitId,
        /// Label given at registration.
        label: &'static str,
        /// Ticks waited.
        error: BarrierError,
    },
}

impl WaitResolution {
    /// The wait this resolution belongs to.
    #[must_use]
    pub fn id(&self) -> WaitId {
        match self {
            Self::Ready { id, .. } | Self::Stale { id, .. } | Self::TimedOut { id, .. } => *id,
        }
    }
}

type Predicate<C> = Box<dyn Fn(&C) -> bool>;
type Continuation<C> = Box<dyn FnOnce(&mut C)>;

struct PendingWait<C> {
    id: WaitId,
    label: &'static str,
    cycle: CycleId,
    options: WaitOptions,
    ticks: u32,
    predicate: Predicate<C>,
    on_ready: Continuation<C>,
}

/// Queue of continuations waiting for a predicate over `C`.
pub struct ReadinessBarrier<C> {
    next_id: u64,
    waits: Vec<PendingWait<C>>,
}

impl<C> Default for ReadinessBarrier<C> {
    fn default() -> Self {
        Self {
            next_id: 0,
            waits: Vec::new(),
        }
    }
}

impl<C> fmt::Debug for ReadinessBarrier<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadinessBarrier")
            .field("pending", &self.waits.len())
            .finish_non_exhaustive()
    }
}

impl<C> ReadinessBarrier<C> {
    /// An empty barrier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspends `on_ready` until `predicate` holds on a tick of `cycle`.
    ///
    /// The predicate is not evaluated here; the earliest it can resume is
    /// the next tick.
    pub fn await_ready<P, F>(
        &mut self,
        label: &'static str,
        cycle: CycleId,
        options: WaitOptions,
        predicate: P,
        on_ready: F,
    ) -> WaitId
    where
        P: Fn(&C) -> bool + 'static,
        F: FnOnce(&mut C) + 'static,
    {
        let id = WaitId(self.next_id);
        self.next_id += 1;
        debug!(%id, label, %cycle, "readiness wait registered");
        self.waits.push(PendingWait {
            id,
            label,
            cycle,
            options,
            ticks: 0,
            predicate: Box::new(predicate),
            on_ready: Box::new(on_ready),
        });
        id
    }

    /// Number of waits still queued.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.waits.len()
    }

    /// Advances every wait by one tick and resolves the ones that are done.
    ///
    /// Waits resolve in registration order. A wait registered under a cycle
    /// other than `active` is dropped without evaluating its predicate.
    pub fn tick(&mut self, context: &mut C, active: CycleId) -> Vec<WaitResolution> {
        let mut resolutions = Vec::new();
        let mut retained = Vec::with_capacity(self.waits.len());

        for mut wait in std::mem::take(&mut self.waits) {
            wait.ticks = wait.ticks.saturating_add(1);

            if wait.cycle != active {
                debug!(id = %wait.id, label = wait.label, stale = %wait.cycle, %active, "readiness wait superseded");
                resolutions.push(WaitResolution::Stale {
                    id: wait.id,
                    label: wait.label,
                    error: StateError::StaleCycle {
                        stale: wait.cycle,
                        active,
                    },
                });
                continue;
            }

            let due = wait.ticks % wait.options.poll_interval.max(1) == 0;
            if due && (wait.predicate)(context) {
                debug!(id = %wait.id, label = wait.label, ticks = wait.ticks, "readiness wait resumed");
                (wait.on_ready)(context);
                resolutions.push(WaitResolution::Ready {
                    id: wait.id,
                    label: wait.label,
                });
                continue;
            }

            if wait.options.timeout.is_some_and(|limit| wait.ticks >= limit) {
                warn!(id = %wait.id, label = wait.label, ticks = wait.ticks, "readiness wait timed out");
                resolutions.push(WaitResolution::TimedOut {
                    id: wait.id,
                    label: wait.label,
                    error: BarrierError::Timeout { ticks: wait.ticks },
                });
                continue;
            }

            retained.push(wait);
        }

        self.waits = retained;
        resolutions
    }
}
