//! Session configuration.

use crate::barrier::WaitOptions;

/// Names of the well-known contexts and readiness-wait tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Title screen. Play time does not accumulate here.
    pub main_menu_context: String,
    /// First context of a new session; target of the deferred auto-save.
    pub new_session_context: String,
    /// Save/load browser, always loaded additively.
    pub browser_context: String,
    /// Wait for the narrative cursor to rebind before restoring a position.
    pub restore_wait: WaitOptions,
    /// Wait for the browser view after the browser context loads.
    pub browser_wait: WaitOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            main_menu_context: "MainMenuScene".to_owned(),
            new_session_context: "CharacterSelectionScene".to_owned(),
            browser_context: "SaveLoadScene".to_owned(),
            restore_wait: WaitOptions::default(),
            browser_wait: WaitOptions::default(),
        }
    }
}

impl SessionConfig {
    /// Sets the same timeout on every readiness wait.
    #[must_use]
    pub fn with_wait_timeout(mut self, ticks: Option<u32>) -> Self {
        self.restore_wait.timeout = ticks;
        self.browser_wait.timeout = ticks;
        self
    }

    /// Whether saving is allowed while `context` is active.
    #[must_use]
    pub fn is_saveable(&self, context: &str) -> bool {
        context != self.main_menu_context
            && context != self.new_session_context
            && context != self.browser_context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_contexts_are_not_saveable() {
        // Arrange
        let config = SessionConfig::default();

        // Act / Assert
        assert!(!config.is_saveable("MainMenuScene"));
        assert!(!config.is_saveable("CharacterSelectionScene"));
        assert!(!config.is_saveable("SaveLoadScene"));
        assert!(config.is_saveable("ChapterOne"));
    }

    #[test]
    fn test_with_wait_timeout_applies_to_both_waits() {
        // Arrange / Act
        let config = SessionConfig::default().with_wait_timeout(None);

        // Assert
        assert_eq!(config.restore_wait.timeout, None);
        assert_eq!(config.browser_wait.timeout, None);
    }
}
