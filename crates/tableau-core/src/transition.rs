//! The external context-transition primitive.
//!
//! The core never loads contexts itself. It asks a [`TransitionDriver`] to do
//! so and learns about completion asynchronously through the channel returned
//! by [`TransitionDriver::subscribe`].

use std::fmt;

use tokio::sync::mpsc::UnboundedReceiver;

/// How a context is loaded relative to the ones already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionMode {
    /// Unload everything, then load the context.
    Replace,
    /// Load the context alongside the current ones.
    Additive,
}

/// Monotonic identifier of a transition cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleId(pub u64);

impl CycleId {
    /// The identifier following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a completion notice reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// The context finished loading in the given mode.
    Loaded(TransitionMode),
    /// The context finished unloading.
    Unloaded,
}

/// Notice sent by the driver once a requested transition has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionCompleted {
    /// The context that was loaded or unloaded.
    pub context: String,
    /// Load or unload.
    pub kind: CompletionKind,
}

impl TransitionCompleted {
    /// A completed load.
    #[must_use]
    pub fn loaded(context: impl Into<String>, mode: TransitionMode) -> Self {
        Self {
            context: context.into(),
            kind: CompletionKind::Loaded(mode),
        }
    }

    /// A completed unload.
    #[must_use]
    pub fn unloaded(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            kind: CompletionKind::Unloaded,
        }
    }
}

/// Loads and unloads contexts by name. Completion is never synchronous from
/// the caller's point of view.
pub trait TransitionDriver {
    /// Starts loading `context`.
    fn transition_to(&mut self, context: &str, mode: TransitionMode);

    /// Starts unloading `context`.
    fn unload(&mut self, context: &str);

    /// Registers the single completion subscriber.
    fn subscribe(&mut self) -> UnboundedReceiver<TransitionCompleted>;

    /// Drops the completion subscriber registered by `subscribe`.
    fn unsubscribe(&mut self);
}
