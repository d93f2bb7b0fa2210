//! Error taxonomy shared by every Tableau crate.

use thiserror::Error;

use crate::slot::SlotId;
use crate::transition::CycleId;

/// Failures of the durable snapshot store.
///
/// These never escape the session coordinator: it converts them into user
/// notifications plus a boolean/optional result.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The slot holds no snapshot.
    #[error("{0} is empty")]
    NotFound(SlotId),

    /// The slot file exists but cannot be turned into a snapshot.
    #[error("{slot} is corrupt: {reason}")]
    Corrupt {
        /// The slot that was read.
        slot: SlotId,
        /// What went wrong while reading or decoding.
        reason: String,
    },

    /// Serializing, writing, renaming or deleting the slot file failed.
    #[error("writing {slot} failed: {source}")]
    WriteFailed {
        /// The slot being written.
        slot: SlotId,
        /// Underlying I/O or serialization error.
        #[source]
        source: std::io::Error,
    },
}

/// Invalid operations against in-memory session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// A narrative position or choice index outside the valid range.
    #[error("position {requested} is outside 0..{length}")]
    InvalidPosition {
        /// The requested index.
        requested: usize,
        /// Number of valid entries at the time of the request.
        length: usize,
    },

    /// Presentation sinks have not been supplied for the current context.
    #[error("presentation handles are not bound")]
    UnboundPresentation,

    /// A suspended continuation resolved after its transition cycle was superseded.
    #[error("transition cycle {stale} was superseded by cycle {active}")]
    StaleCycle {
        /// The cycle the continuation was registered under.
        stale: CycleId,
        /// The cycle that is active now.
        active: CycleId,
    },
}

/// Failures of a readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BarrierError {
    /// The predicate never became true within the configured number of ticks.
    #[error("readiness wait timed out after {ticks} ticks")]
    Timeout {
        /// Ticks waited before giving up.
        ticks: u32,
    },
}
