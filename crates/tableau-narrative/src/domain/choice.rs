//! Branch choices.

use tableau_core::error::StateError;

/// A set of options awaiting the player's pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoicePrompt {
    options: Vec<String>,
}

impl ChoicePrompt {
    /// Creates a prompt. Returns `None` when there is nothing to choose.
    #[must_use]
    pub fn new(options: Vec<String>) -> Option<Self> {
        if options.is_empty() {
            None
        } else {
            Some(Self { options })
        }
    }

    /// The option texts in display order.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Validates `index` against the options.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidPosition` if `index` names no option.
    pub fn resolve(&self, index: usize) -> Result<usize, StateError> {
        if index < self.options.len() {
            Ok(index)
        } else {
            Err(StateError::InvalidPosition {
                requested: index,
                length: self.options.len(),
            })
        }
    }
}
