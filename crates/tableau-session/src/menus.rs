//! Title-screen and pause-menu flows.

use tableau_core::store::first_empty_slot;
use tracing::info;

use crate::coordinator::{SessionAction, SessionCoordinator};
use crate::slot_browser::{BrowserRequest, MenuOrigin};

/// Formats play time as whole hours and minutes, e.g. `"1h 5m"`.
#[must_use]
pub fn format_playtime(elapsed_seconds: f64) -> String {
    let total_minutes = (elapsed_seconds.max(0.0) / 60.0).floor();
    let hours = (total_minutes / 60.0).floor();
    let minutes = total_minutes - hours * 60.0;
    format!("{hours}h {minutes}m")
}

impl SessionCoordinator {
    /// Title screen "new game".
    ///
    /// Starts a new session in the first empty slot. With every slot full
    /// the player is told to free one and the browser opens in new-session
    /// mode once they accept.
    pub async fn new_game(&mut self) {
        match first_empty_slot(self.store()).await {
            Some(slot) => {
                info!(%slot, "new game");
                self.perform(SessionAction::BeginNewSession(slot)).await;
            }
            None => self.ask(
                "All slots are full! You must reset a slot to continue.".to_owned(),
                SessionAction::OpenBrowser(BrowserRequest::new_session()),
            ),
        }
    }

    /// Opens the browser in load mode.
    pub fn open_load_browser(&mut self, origin: MenuOrigin) {
        self.open_browser(BrowserRequest::load(origin));
    }

    /// Opens the browser in save mode, if saving is allowed here.
    pub fn open_save_browser(&mut self) {
        if !self.can_save_here() {
            self.notify("You can't save here");
            return;
        }
        self.open_browser(BrowserRequest::save());
    }

    /// The browser's back button: unload it and show the menu that opened it.
    pub fn back_from_browser(&mut self) {
        self.close_browser(true);
    }

    /// Asks before leaving for the title screen.
    pub fn return_to_main_menu(&mut self) {
        self.ask(
            "Return to Main Menu? Unsaved progress will be lost.".to_owned(),
            SessionAction::ReturnToMainMenu,
        );
    }

    /// Asks before exiting.
    pub fn quit(&mut self) {
        self.ask(
            "Are you sure you want to quit?".to_owned(),
            SessionAction::Quit,
        );
    }

    /// Opens or closes the pause menu directly.
    pub fn set_pause(&mut self, paused: bool) {
        self.set_paused(paused);
    }

    /// Whether the active context may be saved.
    #[must_use]
    pub fn can_save_here(&self) -> bool {
        self.state()
            .active_context
            .as_deref()
            .is_some_and(|context| self.config().is_saveable(context))
    }

    /// Play time for the pause menu.
    #[must_use]
    pub fn formatted_playtime(&self) -> String {
        format_playtime(self.state().elapsed_seconds)
    }
}
