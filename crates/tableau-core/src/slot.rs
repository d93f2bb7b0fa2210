//! Save slot identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of save slots available to the player.
pub const SLOT_COUNT: u8 = 3;

/// A fixed-identity persistence bucket holding at most one snapshot.
///
/// Internally zero-based; user-facing text uses the one-based number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotId(u8);

/// Returned when a slot index is outside `0..SLOT_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("slot index {0} is outside 0..{SLOT_COUNT}")]
pub struct SlotOutOfRange(pub u8);

impl SlotId {
    /// Creates a slot identifier from a zero-based index.
    ///
    /// # Errors
    ///
    /// Returns `SlotOutOfRange` if `index >= SLOT_COUNT`.
    pub fn new(index: u8) -> Result<Self, SlotOutOfRange> {
        if index < SLOT_COUNT {
            Ok(Self(index))
        } else {
            Err(SlotOutOfRange(index))
        }
    }

    /// Zero-based index, suitable for file names and arrays.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// One-based number shown to the player.
    #[must_use]
    pub fn number(self) -> u8 {
        self.0 + 1
    }

    /// Every slot in ascending order.
    pub fn all() -> impl Iterator<Item = SlotId> {
        (0..SLOT_COUNT).map(SlotId)
    }
}

impl TryFrom<u8> for SlotId {
    type Error = SlotOutOfRange;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

impl From<SlotId> for u8 {
    fn from(slot: SlotId) -> Self {
        slot.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.number())
    }
}
