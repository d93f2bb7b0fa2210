//! The console application: commands in, session events out.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tableau_core::clock::Clock;
use tableau_core::slot::SlotId;
use tableau_core::store::SnapshotStore;
use tableau_core::transition::{CompletionKind, TransitionMode};
use tableau_session::{
    ConfirmationKind, MenuOrigin, SessionAction, SessionConfig, SessionCoordinator, SessionEvent,
};
use tracing::{debug, info};

use crate::console::{Console, ConsoleBrowserView, ConsoleNotifier};
use crate::driver::LocalTransitionDriver;
use crate::story::Story;

const MAIN_MENU: &str = "new | load | quit";
const PAUSE_MENU: &str = "save [N] | load [N] | menu | pause";
const HELP: &str = "advance | choice N | pause | save [N] | load [N] | slot N | reset N | back | yes | no | new | menu | status | quit";

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Next line.
    Advance,
    /// Pick branch N (zero-based).
    Choice(usize),
    /// Toggle the pause menu.
    Pause,
    /// Quick-save into a slot, or open the save browser.
    Save(Option<SlotId>),
    /// Quick-load a slot, or open the load browser.
    Load(Option<SlotId>),
    /// Click a slot button in the browser.
    Slot(SlotId),
    /// Click a reset button in the browser.
    Reset(SlotId),
    /// Leave the browser.
    Back,
    /// Accept the prompt.
    Yes,
    /// Decline the prompt.
    No,
    /// Start a new game.
    New,
    /// Return to the title screen.
    Menu,
    /// Print session status.
    Status,
    /// Print the command list.
    Help,
    /// Exit.
    Quit,
}

fn parse_slot(raw: &str) -> Result<SlotId, String> {
    let number: u8 = raw
        .parse()
        .map_err(|_| format!("not a slot number: {raw}"))?;
    number
        .checked_sub(1)
        .and_then(|index| SlotId::new(index).ok())
        .ok_or_else(|| format!("no slot {number}"))
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default();
        let arg = words.next();
        let command = match (verb, arg) {
            ("advance" | "a" | "", None) => Self::Advance,
            ("choice" | "c", Some(raw)) => {
                let number: usize = raw
                    .parse()
                    .map_err(|_| format!("not a choice number: {raw}"))?;
                Self::Choice(number.checked_sub(1).ok_or("choices start at 1")?)
            }
            ("pause" | "p", None) => Self::Pause,
            ("save", raw) => Self::Save(raw.map(parse_slot).transpose()?),
            ("load", raw) => Self::Load(raw.map(parse_slot).transpose()?),
            ("slot", Some(raw)) => Self::Slot(parse_slot(raw)?),
            ("reset", Some(raw)) => Self::Reset(parse_slot(raw)?),
            ("back", None) => Self::Back,
            ("yes" | "y", None) => Self::Yes,
            ("no" | "n", None) => Self::No,
            ("new", None) => Self::New,
            ("menu", None) => Self::Menu,
            ("status", None) => Self::Status,
            ("help" | "?", None) => Self::Help,
            ("quit" | "q", None) => Self::Quit,
            _ => return Err(format!("unknown command: {}", line.trim())),
        };
        Ok(command)
    }
}

/// A session driven from text commands.
#[derive(Debug)]
pub struct App {
    coordinator: SessionCoordinator,
    driver: LocalTransitionDriver,
    console: Console,
    story: Story,
    tick: Duration,
    quit: bool,
}

impl App {
    /// Wires a coordinator to the console and a local driver.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        store: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
        story: Story,
        console: Console,
        tick: Duration,
    ) -> Self {
        let driver = LocalTransitionDriver::new();
        let coordinator = SessionCoordinator::new(
            config,
            store,
            clock,
            Box::new(ConsoleNotifier(console.clone())),
            Box::new(driver.clone()),
        );
        Self {
            coordinator,
            driver,
            console,
            story,
            tick,
            quit: false,
        }
    }

    /// The coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &SessionCoordinator {
        &self.coordinator
    }

    /// Contexts the driver has loaded.
    #[must_use]
    pub fn loaded_contexts(&self) -> Vec<String> {
        self.driver.loaded()
    }

    /// Whether quitting was confirmed.
    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Loads the title screen.
    pub fn start(&mut self) {
        let main_menu = self.coordinator.config().main_menu_context.clone();
        self.coordinator
            .request_transition(&main_menu, TransitionMode::Replace);
    }

    /// One frame: finish transitions, mount the new contexts' UI, tick.
    pub async fn pump(&mut self) {
        let completed = self.driver.pump();
        self.coordinator.process_transitions().await;
        for notice in completed {
            if let CompletionKind::Loaded(mode) = notice.kind {
                self.mount(&notice.context, mode);
            }
        }
        self.coordinator.tick(self.tick);
        self.drain_events();
    }

    fn mount(&mut self, context: &str, mode: TransitionMode) {
        let config = self.coordinator.config();
        if context == config.browser_context {
            self.console.line("-- save / load --  slot N | reset N | back");
            self.coordinator
                .provide_browser_view(Box::new(ConsoleBrowserView(self.console.clone())));
            return;
        }
        if mode != TransitionMode::Replace {
            return;
        }
        let is_main_menu = context == config.main_menu_context;
        self.console.line(&format!("== {context} =="));
        self.coordinator.provide_handles(self.console.handles());
        let lines = self
            .story
            .scene(context)
            .map(|scene| scene.lines.clone())
            .unwrap_or_default();
        self.coordinator.begin_narrative(lines);
        if is_main_menu {
            self.console.line(MAIN_MENU);
        }
    }

    fn menu_origin(&self) -> MenuOrigin {
        let state = self.coordinator.state();
        if state.active_context.as_deref() == Some(self.coordinator.config().main_menu_context.as_str()) {
            MenuOrigin::MainMenu
        } else {
            MenuOrigin::PauseMenu
        }
    }

    fn drain_events(&mut self) {
        for event in self.coordinator.take_events() {
            debug!(?event, "session event");
            match event {
                SessionEvent::Prompt { message, kind } => {
                    let answers = match kind {
                        ConfirmationKind::YesNo => "yes | no",
                        ConfirmationKind::Message => "yes",
                    };
                    self.console.line(&format!("? {message}  [{answers}]"));
                }
                SessionEvent::PauseChanged(true) => {
                    self.console.line(&format!(
                        "-- paused  {} --  {PAUSE_MENU}",
                        self.coordinator.formatted_playtime()
                    ));
                }
                SessionEvent::PauseChanged(false) => self.console.line("-- resumed --"),
                SessionEvent::ChoiceMade(index) => self.follow_choice(index),
                SessionEvent::NarrativeEnded => self.scene_finished(),
                SessionEvent::BrowserClosed {
                    reopen: Some(MenuOrigin::MainMenu),
                } => self.console.line(MAIN_MENU),
                SessionEvent::BrowserClosed {
                    reopen: Some(MenuOrigin::PauseMenu),
                } => self.console.line(PAUSE_MENU),
                SessionEvent::QuitRequested => {
                    info!("quit confirmed");
                    self.quit = true;
                }
                SessionEvent::PromptClosed
                | SessionEvent::BrowserOpened(_)
                | SessionEvent::BrowserClosed { reopen: None } => {}
            }
        }
    }

    fn active_scene(&self) -> Option<&crate::story::Scene> {
        self.coordinator
            .state()
            .active_context
            .as_deref()
            .and_then(|context| self.story.scene(context))
    }

    fn scene_finished(&mut self) {
        let Some(scene) = self.active_scene() else {
            return;
        };
        if !scene.choices.is_empty() {
            let labels = scene.choice_labels();
            self.coordinator.present_choices(labels);
        } else if let Some(next) = scene.next.clone() {
            self.coordinator
                .request_transition(&next, TransitionMode::Replace);
        }
    }

    fn follow_choice(&mut self, index: usize) {
        let target = self
            .active_scene()
            .and_then(|scene| scene.choices.get(index))
            .map(|choice| choice.target.clone());
        if let Some(target) = target {
            self.coordinator
                .request_transition(&target, TransitionMode::Replace);
        }
    }

    /// Applies one command.
    pub async fn handle(&mut self, command: Command) {
        debug!(?command, "command");
        match command {
            Command::Advance => {
                self.coordinator.advance_requested();
            }
            Command::Choice(index) => {
                self.coordinator.choice_selected(index);
            }
            Command::Pause => self.coordinator.pause_toggled(),
            Command::Save(Some(slot)) => {
                if self.coordinator.can_save_here() {
                    self.coordinator
                        .perform(SessionAction::SaveToSlot(slot))
                        .await;
                } else {
                    self.console.line("! You can't save here");
                }
            }
            Command::Save(None) => self.coordinator.open_save_browser(),
            Command::Load(Some(slot)) => {
                self.coordinator
                    .perform(SessionAction::LoadFromSlot(slot))
                    .await;
            }
            Command::Load(None) => {
                let origin = self.menu_origin();
                self.coordinator.open_load_browser(origin);
            }
            Command::Slot(slot) => self.coordinator.slot_clicked(slot).await,
            Command::Reset(slot) => self.coordinator.reset_clicked(slot).await,
            Command::Back => self.coordinator.back_from_browser(),
            Command::Yes => self.coordinator.confirm(true).await,
            Command::No => self.coordinator.confirm(false).await,
            Command::New => {
                if self.menu_origin() == MenuOrigin::MainMenu {
                    self.coordinator.new_game().await;
                } else {
                    self.console.line("! New games start from the main menu");
                }
            }
            Command::Menu => self.coordinator.return_to_main_menu(),
            Command::Status => self.print_status(),
            Command::Help => self.console.line(HELP),
            Command::Quit => self.coordinator.quit(),
        }
        self.drain_events();
    }

    /// Parses and applies one line of input.
    pub async fn handle_line(&mut self, line: &str) {
        match line.parse::<Command>() {
            Ok(command) => self.handle(command).await,
            Err(message) => self.console.line(&format!("! {message}  (try: help)")),
        }
    }

    fn print_status(&self) {
        let state = self.coordinator.state();
        let last_used = state
            .last_used_slot
            .map_or_else(|| "none".to_owned(), |slot| slot.number().to_string());
        self.console.line(&format!(
            "context: {}  line: {}  playtime: {}  last slot: {last_used}",
            state.active_context.as_deref().unwrap_or("-"),
            self.coordinator.cursor().current_position() + 1,
            self.coordinator.formatted_playtime(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(index: u8) -> SlotId {
        SlotId::new(index).unwrap()
    }

    #[test]
    fn test_parses_commands() {
        assert_eq!("advance".parse(), Ok(Command::Advance));
        assert_eq!("".parse(), Ok(Command::Advance));
        assert_eq!("choice 2".parse(), Ok(Command::Choice(1)));
        assert_eq!("save".parse(), Ok(Command::Save(None)));
        assert_eq!("save 3".parse(), Ok(Command::Save(Some(slot(2)))));
        assert_eq!("load 1".parse(), Ok(Command::Load(Some(slot(0)))));
        assert_eq!("reset 2".parse(), Ok(Command::Reset(slot(1))));
        assert_eq!("  yes ".parse(), Ok(Command::Yes));
    }

    #[test]
    fn test_rejects_bad_slots_and_unknown_words() {
        assert!("save 0".parse::<Command>().is_err());
        assert!("save 4".parse::<Command>().is_err());
        assert!("slot x".parse::<Command>().is_err());
        assert!("choice 0".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }
}
