//! Single-flight confirmation gate.

use tracing::debug;

/// What the prompt asks of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationKind {
    /// Informational; the only answer is acknowledgement.
    Message,
    /// Yes / no question.
    YesNo,
}

/// The prompt currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest<A> {
    /// Prompt text.
    pub message: String,
    /// Message or question.
    pub kind: ConfirmationKind,
    on_confirm: Option<A>,
    on_cancel: Option<A>,
}

/// Holds at most one outstanding prompt and hands back the chosen outcome.
///
/// A new request replaces the outstanding one, whose outcomes are dropped
/// unused. [`resolve`](Self::resolve) clears the gate before returning the
/// outcome, so nothing the caller does with it can leave the gate occupied.
#[derive(Debug)]
pub struct ConfirmationGate<A> {
    current: Option<ConfirmationRequest<A>>,
}

impl<A> Default for ConfirmationGate<A> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<A> ConfirmationGate<A> {
    /// An idle gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks a yes/no question.
    pub fn request(&mut self, message: impl Into<String>, on_confirm: A, on_cancel: Option<A>) {
        self.replace(ConfirmationRequest {
            message: message.into(),
            kind: ConfirmationKind::YesNo,
            on_confirm: Some(on_confirm),
            on_cancel,
        });
    }

    /// Shows an informational message with no outcome.
    pub fn show_message(&mut self, message: impl Into<String>) {
        self.replace(ConfirmationRequest {
            message: message.into(),
            kind: ConfirmationKind::Message,
            on_confirm: None,
            on_cancel: None,
        });
    }

    fn replace(&mut self, request: ConfirmationRequest<A>) {
        if let Some(previous) = self.current.take() {
            debug!(previous = %previous.message, "confirmation superseded");
        }
        self.current = Some(request);
    }

    /// Answers the outstanding prompt and returns the matching outcome.
    ///
    /// The gate is idle when this returns, whatever the result.
    pub fn resolve(&mut self, accepted: bool) -> Option<A> {
        let request = self.current.take()?;
        debug!(message = %request.message, accepted, "confirmation resolved");
        if accepted {
            request.on_confirm
        } else {
            request.on_cancel
        }
    }

    /// Discards the outstanding prompt without producing an outcome.
    /// Returns whether one was outstanding.
    pub fn force_close(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// Whether a prompt is outstanding.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// The outstanding prompt.
    #[must_use]
    pub fn outstanding(&self) -> Option<&ConfirmationRequest<A>> {
        self.current.as_ref()
    }
}
