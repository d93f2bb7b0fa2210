//! Recording presentation sinks for observing what the core pushes to the UI.
//!
//! Every recorder is a cheap `Clone` around shared state, so a test can hand
//! one copy to the code under test and keep another to inspect.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tableau_core::presentation::{
    ChoiceSink, Notifier, PortraitRef, PortraitSink, PresentationHandles, SlotBrowserView,
    SlotButtonState, TextSink,
};
use tableau_core::slot::SlotId;

#[derive(Debug, Default)]
struct TextState {
    text: String,
    visible: bool,
}

/// Records the latest text and visibility.
#[derive(Debug, Clone, Default)]
pub struct RecordingTextSink(Arc<Mutex<TextState>>);

impl RecordingTextSink {
    /// The last text set.
    pub fn text(&self) -> String {
        self.0.lock().unwrap().text.clone()
    }

    /// The last visibility set.
    pub fn visible(&self) -> bool {
        self.0.lock().unwrap().visible
    }
}

impl TextSink for RecordingTextSink {
    fn set_text(&mut self, text: &str) {
        text.clone_into(&mut self.0.lock().unwrap().text);
    }

    fn set_visible(&mut self, visible: bool) {
        self.0.lock().unwrap().visible = visible;
    }
}

/// Records the latest portrait.
#[derive(Debug, Clone, Default)]
pub struct RecordingPortraitSink(Arc<Mutex<Option<PortraitRef>>>);

impl RecordingPortraitSink {
    /// The portrait currently shown.
    pub fn portrait(&self) -> Option<PortraitRef> {
        self.0.lock().unwrap().clone()
    }
}

impl PortraitSink for RecordingPortraitSink {
    fn set_portrait(&mut self, portrait: Option<&PortraitRef>) {
        *self.0.lock().unwrap() = portrait.cloned();
    }
}

/// Records the options currently shown.
#[derive(Debug, Clone, Default)]
pub struct RecordingChoiceSink(Arc<Mutex<Vec<String>>>);

impl RecordingChoiceSink {
    /// The options currently shown; empty when hidden.
    pub fn options(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl ChoiceSink for RecordingChoiceSink {
    fn show_choices(&mut self, options: &[String]) {
        *self.0.lock().unwrap() = options.to_vec();
    }
}

/// A full set of recording sinks for one context instance.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresentation {
    /// Dialogue body.
    pub text: RecordingTextSink,
    /// Speaker label.
    pub speaker: RecordingTextSink,
    /// Portrait.
    pub portrait: RecordingPortraitSink,
    /// Choice buttons.
    pub choices: RecordingChoiceSink,
}

impl RecordingPresentation {
    /// Fresh, empty sinks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles wired to these recorders.
    #[must_use]
    pub fn handles(&self) -> PresentationHandles {
        PresentationHandles::new(
            Box::new(self.text.clone()),
            Box::new(self.speaker.clone()),
            Box::new(self.portrait.clone()),
        )
        .with_choices(Box::new(self.choices.clone()))
    }
}

/// Records every rendered slot row.
#[derive(Debug, Clone, Default)]
pub struct RecordingBrowserView(Arc<Mutex<BTreeMap<SlotId, SlotButtonState>>>);

impl RecordingBrowserView {
    /// Fresh view with no rows rendered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last state rendered for `slot`.
    pub fn row(&self, slot: SlotId) -> Option<SlotButtonState> {
        self.0.lock().unwrap().get(&slot).cloned()
    }
}

impl SlotBrowserView for RecordingBrowserView {
    fn render_slot(&mut self, slot: SlotId, state: &SlotButtonState) {
        self.0.lock().unwrap().insert(slot, state.clone());
    }
}

/// Records every notification.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier(Arc<Mutex<Vec<String>>>);

impl RecordingNotifier {
    /// Fresh notifier with no messages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message in order.
    pub fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// The most recent message.
    pub fn last(&self) -> Option<String> {
        self.0.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_owned());
    }
}
