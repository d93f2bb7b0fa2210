//! The persisted session snapshot.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::slot::SlotId;

/// `strftime` pattern for [`SessionSnapshot::saved_at`] (`yyyy-MM-dd HH:mm:ss`).
pub const SAVED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything needed to resume a session from a save slot.
///
/// Field order and the serialized key names are part of the on-disk format;
/// re-serializing an unmodified snapshot yields identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Context to resume into.
    #[serde(rename = "sceneName")]
    pub context_name: String,
    /// Index into the context's line sequence. Validated at restore time.
    #[serde(rename = "dialogueIndex")]
    pub narrative_position: u32,
    /// Accumulated play time.
    #[serde(rename = "playTimeSeconds")]
    pub elapsed_seconds: f64,
    /// Local wall-clock time of the save, formatted with [`SAVED_AT_FORMAT`].
    #[serde(rename = "savedAt")]
    pub saved_at: String,
}

impl SessionSnapshot {
    /// Builds a snapshot stamped with `saved_at`.
    #[must_use]
    pub fn new(
        context_name: impl Into<String>,
        narrative_position: u32,
        elapsed_seconds: f64,
        saved_at: NaiveDateTime,
    ) -> Self {
        Self {
            context_name: context_name.into(),
            narrative_position,
            elapsed_seconds,
            saved_at: saved_at.format(SAVED_AT_FORMAT).to_string(),
        }
    }

    /// Serializes to the pretty JSON file format, newline-terminated.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; cannot happen for finite play times.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut buf = serde_json::to_string_pretty(self)?;
        buf.push('\n');
        Ok(buf)
    }

    /// Parses and validates the file format.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the JSON does not match the
    /// schema or the play time is negative.
    pub fn from_json(contents: &str) -> Result<Self, String> {
        let snapshot: Self = serde_json::from_str(contents).map_err(|e| e.to_string())?;
        if !snapshot.elapsed_seconds.is_finite() || snapshot.elapsed_seconds < 0.0 {
            return Err(format!(
                "playTimeSeconds must be a non-negative number, found {}",
                snapshot.elapsed_seconds
            ));
        }
        Ok(snapshot)
    }

    /// Human-readable slot label for this snapshot.
    #[must_use]
    pub fn label(&self, slot: SlotId) -> String {
        format!(
            "Slot {} - {} ({})",
            slot.number(),
            self.context_name,
            self.saved_at
        )
    }
}

/// Label for a slot that holds nothing (or nothing readable).
#[must_use]
pub fn empty_slot_label(slot: SlotId) -> String {
    format!("Slot {} - Empty", slot.number())
}
