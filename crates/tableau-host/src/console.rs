//! Terminal presentation: sinks, browser rows and notifications as text.

use std::sync::{Arc, Mutex, PoisonError};

use tableau_core::presentation::{
    ChoiceSink, Notifier, PortraitRef, PortraitSink, PresentationHandles, SlotBrowserView,
    SlotButtonState, TextSink,
};
use tableau_core::slot::SlotId;

/// Where console output goes: stdout, or a buffer for tests.
#[derive(Debug, Clone, Default)]
pub struct Console {
    capture: Option<Arc<Mutex<Vec<String>>>>,
}

impl Console {
    /// Writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::default()
    }

    /// Keeps every line in memory.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            capture: Some(Arc::default()),
        }
    }

    /// Emits one line.
    pub fn line(&self, text: &str) {
        match &self.capture {
            Some(buffer) => buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(text.to_owned()),
            None => println!("{text}"),
        }
    }

    /// Lines captured so far; always empty for stdout.
    #[must_use]
    pub fn captured(&self) -> Vec<String> {
        self.capture.as_ref().map_or_else(Vec::new, |buffer| {
            buffer.lock().unwrap_or_else(PoisonError::into_inner).clone()
        })
    }

    /// A fresh set of presentation sinks for one context instance.
    #[must_use]
    pub fn handles(&self) -> PresentationHandles {
        PresentationHandles::new(
            Box::new(ConsoleText {
                console: self.clone(),
                format: |text| format!("  {text}"),
                visible: false,
            }),
            Box::new(ConsoleText {
                console: self.clone(),
                format: |name| format!("    ({name})"),
                visible: false,
            }),
            Box::new(ConsolePortrait(self.clone())),
        )
        .with_choices(Box::new(ConsoleChoices(self.clone())))
    }
}

struct ConsoleText {
    console: Console,
    format: fn(&str) -> String,
    visible: bool,
}

impl TextSink for ConsoleText {
    fn set_text(&mut self, text: &str) {
        if self.visible {
            self.console.line(&(self.format)(text));
        }
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

struct ConsolePortrait(Console);

impl PortraitSink for ConsolePortrait {
    fn set_portrait(&mut self, portrait: Option<&PortraitRef>) {
        if let Some(PortraitRef(name)) = portrait {
            self.0.line(&format!("    <{name}>"));
        }
    }
}

struct ConsoleChoices(Console);

impl ChoiceSink for ConsoleChoices {
    fn show_choices(&mut self, options: &[String]) {
        for (index, option) in options.iter().enumerate() {
            self.0.line(&format!("  {}) {option}", index + 1));
        }
    }
}

/// Slot rows printed one per line.
#[derive(Debug, Clone)]
pub struct ConsoleBrowserView(pub Console);

impl SlotBrowserView for ConsoleBrowserView {
    fn render_slot(&mut self, slot: SlotId, state: &SlotButtonState) {
        let marker = if state.highlighted { "*" } else { " " };
        let open = if state.slot_enabled { "slot" } else { "----" };
        let reset = if state.reset_enabled { "reset" } else { "-----" };
        self.0.line(&format!(
            "{marker} [{}] {open} {reset}  {}",
            slot.number(),
            state.label
        ));
    }
}

/// Notifications printed with a prefix.
#[derive(Debug, Clone)]
pub struct ConsoleNotifier(pub Console);

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        self.0.line(&format!("! {message}"));
    }
}
