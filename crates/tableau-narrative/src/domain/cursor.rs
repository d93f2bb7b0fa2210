//! The narrative position cursor.

use tableau_core::error::StateError;
use tableau_core::presentation::PresentationHandles;
use tracing::debug;

use super::choice::ChoicePrompt;
use super::line::NarrativeLine;

/// Cursor state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// No sequence installed; position reads as 0.
    Inactive,
    /// Showing the line at `position`.
    Active {
        /// Index into the installed sequence.
        position: usize,
    },
}

/// Owns the current line sequence, the position within it and any pending
/// branch choice, and pushes the current line to whatever presentation sinks
/// are bound.
///
/// Sinks are context-local. After every replacing transition the cursor is
/// unbound until the new context's UI calls [`NarrativeCursor::rebind`];
/// rendering while unbound is a silent no-op.
#[derive(Debug)]
pub struct NarrativeCursor {
    lines: Vec<NarrativeLine>,
    state: CursorState,
    choices: Option<ChoicePrompt>,
    handles: Option<PresentationHandles>,
}

impl Default for NarrativeCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl NarrativeCursor {
    /// Creates an inactive, unbound cursor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            state: CursorState::Inactive,
            choices: None,
            handles: None,
        }
    }

    /// Installs `lines` and shows the first one. An empty sequence leaves the
    /// cursor inactive.
    pub fn begin(&mut self, lines: Vec<NarrativeLine>) {
        self.choices = None;
        if lines.is_empty() {
            self.end();
            return;
        }
        debug!(lines = lines.len(), "narrative sequence started");
        self.lines = lines;
        self.state = CursorState::Active { position: 0 };
        self.render();
    }

    /// Installs narration-only lines.
    pub fn begin_narration<I, S>(&mut self, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.begin(texts.into_iter().map(NarrativeLine::narration).collect());
    }

    /// Moves to the next line; running off the end deactivates the cursor.
    ///
    /// Ignored while inactive or while a choice is pending.
    pub fn advance(&mut self) -> CursorState {
        let CursorState::Active { position } = self.state else {
            return self.state;
        };
        if self.choices.is_some() {
            debug!("advance ignored while a choice is pending");
            return self.state;
        }

        let next = position + 1;
        if next >= self.lines.len() {
            self.end();
        } else {
            self.state = CursorState::Active { position: next };
            self.render();
        }
        self.state
    }

    /// Moves directly to `position`.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidPosition` and leaves the cursor untouched
    /// if `position` is outside the installed sequence. Restored save data
    /// can legitimately point past a sequence that has since changed, so
    /// callers usually just log this.
    pub fn jump_to(&mut self, position: usize) -> Result<(), StateError> {
        if position >= self.lines.len() {
            return Err(StateError::InvalidPosition {
                requested: position,
                length: self.lines.len(),
            });
        }
        self.state = CursorState::Active { position };
        self.render();
        Ok(())
    }

    /// Current position, or 0 when inactive.
    #[must_use]
    pub fn current_position(&self) -> usize {
        match self.state {
            CursorState::Inactive => 0,
            CursorState::Active { position } => position,
        }
    }

    #[must_use]
    pub fn state(&self) -> CursorState {
        self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, CursorState::Active { .. })
    }

    /// Number of lines installed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line being shown.
    #[must_use]
    pub fn current_line(&self) -> Option<&NarrativeLine> {
        match self.state {
            CursorState::Inactive => None,
            CursorState::Active { position } => self.lines.get(position),
        }
    }

    /// Replaces the output sinks without touching sequence or position, then
    /// redraws the current line onto them.
    pub fn rebind(&mut self, handles: PresentationHandles) {
        self.handles = Some(handles);
        debug!("presentation handles bound");
        self.render();
        self.render_choices();
    }

    /// Drops the sinks of a context that is going away.
    pub fn unbind(&mut self) {
        if self.handles.take().is_some() {
            debug!("presentation handles released");
        }
    }

    /// Whether every required sink has been supplied since the last unbind.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.handles.is_some()
    }

    /// Shows branch options and blocks `advance` until one is picked.
    pub fn present_choices(&mut self, options: Vec<String>) {
        self.choices = ChoicePrompt::new(options);
        self.render_choices();
    }

    /// The pending choice, if any.
    #[must_use]
    pub fn pending_choices(&self) -> Option<&ChoicePrompt> {
        self.choices.as_ref()
    }

    /// Resolves the pending choice.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidPosition` if no choice is pending or
    /// `index` names no option; the prompt stays up in the latter case.
    pub fn select_choice(&mut self, index: usize) -> Result<usize, StateError> {
        let Some(prompt) = &self.choices else {
            return Err(StateError::InvalidPosition {
                requested: index,
                length: 0,
            });
        };
        let chosen = prompt.resolve(index)?;
        self.choices = None;
        self.render_choices();
        debug!(choice = chosen, "choice selected");
        Ok(chosen)
    }

    fn end(&mut self) {
        self.lines.clear();
        self.state = CursorState::Inactive;
        self.choices = None;
        if let Some(handles) = &mut self.handles {
            handles.text.set_visible(false);
            handles.speaker.set_visible(false);
            handles.portrait.set_portrait(None);
        }
        debug!("narrative sequence ended");
    }

    fn render(&mut self) {
        let CursorState::Active { position } = self.state else {
            return;
        };
        let (Some(handles), Some(line)) = (&mut self.handles, self.lines.get(position)) else {
            return;
        };

        handles.text.set_visible(true);
        handles.text.set_text(&line.body);
        if line.is_narration() {
            handles.speaker.set_visible(false);
        } else {
            handles.speaker.set_visible(true);
            handles.speaker.set_text(&line.speaker);
        }
        handles.portrait.set_portrait(line.portrait_ref().as_ref());
    }

    fn render_choices(&mut self) {
        let Some(sink) = self.handles.as_mut().and_then(|h| h.choices.as_mut()) else {
            return;
        };
        match &self.choices {
            Some(prompt) => sink.show_choices(prompt.options()),
            None => sink.show_choices(&[]),
        }
    }
}
