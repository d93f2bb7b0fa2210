//! Narrative lines.

use serde::{Deserialize, Serialize};
use tableau_core::presentation::PortraitRef;

/// One line of dialogue or narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeLine {
    /// Who is speaking; empty for narration.
    #[serde(default)]
    pub speaker: String,
    /// The text shown in the dialogue box.
    pub body: String,
    /// Portrait shown next to the box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portrait: Option<String>,
}

impl NarrativeLine {
    /// A line spoken by `speaker`.
    #[must_use]
    pub fn spoken(speaker: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            body: body.into(),
            portrait: None,
        }
    }

    /// A narration line with no speaker.
    #[must_use]
    pub fn narration(body: impl Into<String>) -> Self {
        Self::spoken(String::new(), body)
    }

    /// Attaches a portrait.
    #[must_use]
    pub fn with_portrait(mut self, portrait: impl Into<String>) -> Self {
        self.portrait = Some(portrait.into());
        self
    }

    /// Whether this line has no speaker.
    #[must_use]
    pub fn is_narration(&self) -> bool {
        self.speaker.is_empty()
    }

    /// The portrait as an opaque presentation reference.
    #[must_use]
    pub fn portrait_ref(&self) -> Option<PortraitRef> {
        self.portrait.clone().map(PortraitRef)
    }
}
