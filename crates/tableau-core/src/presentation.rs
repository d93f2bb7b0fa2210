//! Presentation-layer seams.
//!
//! Sinks are context-local: they are destroyed on every replacing transition
//! and must be supplied again by the UI layer of the new context.

use std::fmt;

use crate::slot::SlotId;

/// Opaque reference to a portrait image owned by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortraitRef(pub String);

/// A text element that can be shown, hidden and filled.
pub trait TextSink {
    /// Replaces the displayed text.
    fn set_text(&mut self, text: &str);

    /// Shows or hides the element.
    fn set_visible(&mut self, visible: bool);
}

/// The speaker portrait element.
pub trait PortraitSink {
    /// Shows `portrait`, or clears the element for `None`.
    fn set_portrait(&mut self, portrait: Option<&PortraitRef>);
}

/// The branch-choice buttons.
pub trait ChoiceSink {
    /// Shows one button per option; an empty slice hides them all.
    fn show_choices(&mut self, options: &[String]);
}

/// The set of sinks a narrative needs in one context instance.
pub struct PresentationHandles {
    /// Dialogue body; its visibility doubles as the dialogue box.
    pub text: Box<dyn TextSink>,
    /// Speaker label, hidden for narration.
    pub speaker: Box<dyn TextSink>,
    /// Speaker portrait.
    pub portrait: Box<dyn PortraitSink>,
    /// Choice buttons, if the context has any.
    pub choices: Option<Box<dyn ChoiceSink>>,
}

impl PresentationHandles {
    /// Bundles the required sinks.
    #[must_use]
    pub fn new(
        text: Box<dyn TextSink>,
        speaker: Box<dyn TextSink>,
        portrait: Box<dyn PortraitSink>,
    ) -> Self {
        Self {
            text,
            speaker,
            portrait,
            choices: None,
        }
    }

    /// Adds choice buttons.
    #[must_use]
    pub fn with_choices(mut self, choices: Box<dyn ChoiceSink>) -> Self {
        self.choices = Some(choices);
        self
    }
}

impl fmt::Debug for PresentationHandles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentationHandles")
            .field("choices", &self.choices.is_some())
            .finish_non_exhaustive()
    }
}

/// How one slot row of the save/load browser should look.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotButtonState {
    /// Text on the slot button.
    pub label: String,
    /// Whether clicking the slot button does anything.
    pub slot_enabled: bool,
    /// Whether the reset button is shown.
    pub reset_enabled: bool,
    /// Suggested overwrite target.
    pub highlighted: bool,
}

/// The slot rows of the save/load browser context.
pub trait SlotBrowserView {
    /// Redraws the row for `slot`.
    fn render_slot(&mut self, slot: SlotId, state: &SlotButtonState);
}

/// Fire-and-forget channel for user-visible status messages.
pub trait Notifier {
    /// Shows `message` to the player.
    fn notify(&self, message: &str);
}
