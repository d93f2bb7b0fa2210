//! Tableau: Narrative position tracking.
//!
//! Responsible for the linear line cursor, branch choice resolution and
//! rebinding the cursor to fresh presentation sinks after each transition.

pub mod domain;

pub use domain::choice::ChoicePrompt;
pub use domain::cursor::{CursorState, NarrativeCursor};
pub use domain::line::NarrativeLine;
