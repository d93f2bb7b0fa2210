//! The session coordinator.
//!
//! Owns all mutable session state and sequences transition cycles. A cycle
//! starts with [`SessionCoordinator::request_transition`] and ends once the
//! destination context's dependents have rebound, which may be several ticks
//! after [`SessionCoordinator::on_transition_completed`] ran.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tableau_core::clock::Clock;
use tableau_core::error::PersistenceError;
use tableau_core::presentation::{Notifier, PresentationHandles, SlotBrowserView};
use tableau_core::slot::SlotId;
use tableau_core::snapshot::SessionSnapshot;
use tableau_core::store::SnapshotStore;
use tableau_core::transition::{
    CompletionKind, CycleId, TransitionCompleted, TransitionDriver, TransitionMode,
};
use tableau_narrative::{CursorState, NarrativeCursor, NarrativeLine};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, instrument, warn};

use crate::barrier::{ReadinessBarrier, WaitResolution};
use crate::config::SessionConfig;
use crate::gate::{ConfirmationGate, ConfirmationKind};
use crate::slot_browser::{
    BrowserRequest, FlowDecision, MenuOrigin, SlotBrowserFlow, SlotOccupancy,
};

/// A deferred auto-save, performed once `context` finishes loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAutoSave {
    /// Slot to write.
    pub slot: SlotId,
    /// Context whose load triggers the save.
    pub context: String,
}

/// Session-wide state that survives every transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Accumulated play time.
    pub elapsed_seconds: f64,
    /// Whether the pause menu is up.
    pub paused: bool,
    /// Slot most recently saved to or loaded from.
    pub last_used_slot: Option<SlotId>,
    /// Set by `start_new_session`; cleared by the first auto-save or a load.
    pub new_session: bool,
    /// Snapshot whose position is restored when its context next loads.
    pub current_save: Option<SessionSnapshot>,
    /// Context most recently loaded with `Replace`.
    pub active_context: Option<String>,
    /// Why the browser is open, while it is.
    pub browser_request: Option<BrowserRequest>,
    /// Auto-save armed for a later cycle.
    pub pending_auto_save: Option<PendingAutoSave>,
}

/// Deferred work the coordinator can be asked to carry out, directly or
/// after a confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Save the current position into the slot, then redraw the browser.
    SaveToSlot(SlotId),
    /// Load the slot and transition into its context.
    LoadFromSlot(SlotId),
    /// Empty the slot, then redraw the browser.
    ResetSlot(SlotId),
    /// Start a new session that auto-saves into the slot.
    BeginNewSession(SlotId),
    /// Open the save/load browser.
    OpenBrowser(BrowserRequest),
    /// Leave the session for the title screen.
    ReturnToMainMenu,
    /// Ask the host to exit.
    Quit,
}

/// Things the host should react to, drained with
/// [`SessionCoordinator::take_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Show a prompt.
    Prompt {
        /// Prompt text.
        message: String,
        /// Message or yes/no.
        kind: ConfirmationKind,
    },
    /// Hide the prompt.
    PromptClosed,
    /// The pause menu opened or closed.
    PauseChanged(bool),
    /// The player picked a branch.
    ChoiceMade(usize),
    /// The line sequence ran out.
    NarrativeEnded,
    /// The browser is loading.
    BrowserOpened(BrowserRequest),
    /// The browser went away; show `reopen` again if set.
    BrowserClosed {
        /// Menu to bring back.
        reopen: Option<MenuOrigin>,
    },
    /// Exit was confirmed.
    QuitRequested,
}

/// Context-local objects that readiness waits inspect and mutate.
pub struct Stage {
    /// Narrative position within the active context.
    pub cursor: NarrativeCursor,
    browser: Option<SlotBrowserFlow>,
    browser_view: Option<Box<dyn SlotBrowserView>>,
}

impl Stage {
    fn new() -> Self {
        Self {
            cursor: NarrativeCursor::new(),
            browser: None,
            browser_view: None,
        }
    }

    fn clear_browser(&mut self) {
        self.browser = None;
        self.browser_view = None;
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("cursor", &self.cursor)
            .field("browser", &self.browser)
            .field("browser_view", &self.browser_view.is_some())
            .finish()
    }
}

/// Sequences transition cycles and owns every piece of session state.
///
/// Subscribes to the driver's completion notices on construction and
/// unsubscribes when dropped.
pub struct SessionCoordinator {
    config: SessionConfig,
    state: SessionState,
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    notifier: Box<dyn Notifier>,
    driver: Box<dyn TransitionDriver>,
    completions: UnboundedReceiver<TransitionCompleted>,
    cycle: CycleId,
    in_flight: VecDeque<(String, CycleId)>,
    pub(crate) gate: ConfirmationGate<SessionAction>,
    barrier: ReadinessBarrier<Stage>,
    stage: Stage,
    events: Vec<SessionEvent>,
}

impl fmt::Debug for SessionCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("state", &self.state)
            .field("cycle", &self.cycle)
            .field("gate", &self.gate)
            .field("barrier", &self.barrier)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

impl SessionCoordinator {
    /// Wires the coordinator to its collaborators and subscribes to
    /// transition completions.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        store: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
        notifier: Box<dyn Notifier>,
        mut driver: Box<dyn TransitionDriver>,
    ) -> Self {
        let completions = driver.subscribe();
        debug!("subscribed to transition completions");
        Self {
            config,
            state: SessionState::default(),
            store,
            clock,
            notifier,
            driver,
            completions,
            cycle: CycleId::default(),
            in_flight: VecDeque::new(),
            gate: ConfirmationGate::new(),
            barrier: ReadinessBarrier::new(),
            stage: Stage::new(),
            events: Vec::new(),
        }
    }

    /// Session state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The active transition cycle.
    #[must_use]
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// The narrative cursor of the active context.
    #[must_use]
    pub fn cursor(&self) -> &NarrativeCursor {
        &self.stage.cursor
    }

    /// The browser flow, once the browser context is ready.
    #[must_use]
    pub fn browser(&self) -> Option<&SlotBrowserFlow> {
        self.stage.browser.as_ref()
    }

    /// The confirmation gate.
    #[must_use]
    pub fn gate(&self) -> &ConfirmationGate<SessionAction> {
        &self.gate
    }

    /// Readiness waits not yet resolved.
    #[must_use]
    pub fn pending_waits(&self) -> usize {
        self.barrier.pending()
    }

    /// Drains the outbound event queue.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    pub(crate) fn notify(&self, message: &str) {
        self.notifier.notify(message);
    }

    pub(crate) fn store(&self) -> &dyn SnapshotStore {
        self.store.as_ref()
    }

    // --- session operations ---

    /// Forgets any loaded save and marks the session as new. Does not touch disk.
    pub fn start_new_session(&mut self) {
        info!("starting new session");
        self.state.current_save = None;
        self.state.elapsed_seconds = 0.0;
        self.state.new_session = true;
    }

    /// Saves the active context at `position`.
    ///
    /// Failures are reported through the notifier and as `false`.
    #[instrument(skip(self))]
    pub async fn save_to_slot(&mut self, slot: SlotId, position: usize) -> bool {
        let Some(context) = self.state.active_context.clone() else {
            warn!("no active context to save");
            self.notify("Save failed: no active context");
            return false;
        };
        let Ok(position) = u32::try_from(position) else {
            warn!(position, "narrative position does not fit the save format");
            self.notify("Save failed: narrative position out of range");
            return false;
        };

        let snapshot = SessionSnapshot::new(
            context,
            position,
            self.state.elapsed_seconds,
            self.clock.now(),
        );
        match self.store.write(slot, &snapshot).await {
            Ok(()) => {
                info!(context = %snapshot.context_name, position, "saved");
                self.state.last_used_slot = Some(slot);
                self.state.current_save = Some(snapshot);
                self.notify(&format!("Saved to slot {}", slot.number()));
                true
            }
            Err(e) => {
                error!(error = %e, "save failed");
                self.notify(&format!("Save failed: {e}"));
                false
            }
        }
    }

    /// Reads a slot and makes it the save to restore.
    #[instrument(skip(self))]
    pub async fn load_from_slot(&mut self, slot: SlotId) -> Option<SessionSnapshot> {
        match self.store.read(slot).await {
            Ok(snapshot) => {
                info!(context = %snapshot.context_name, position = snapshot.narrative_position, "loaded");
                self.state.current_save = Some(snapshot.clone());
                self.state.elapsed_seconds = snapshot.elapsed_seconds;
                self.state.last_used_slot = Some(slot);
                self.state.new_session = false;
                Some(snapshot)
            }
            Err(PersistenceError::NotFound(_)) => {
                self.notify("This slot is empty");
                None
            }
            Err(e) => {
                warn!(error = %e, "load failed");
                self.notify(&format!("Load failed: {e}"));
                None
            }
        }
    }

    /// Empties a slot. Emptying an empty slot succeeds.
    #[instrument(skip(self))]
    pub async fn reset_slot(&mut self, slot: SlotId) -> bool {
        match self.store.delete(slot).await {
            Ok(()) => {
                info!("slot reset");
                self.notify(&format!("Slot {} reset", slot.number()));
                true
            }
            Err(e) => {
                error!(error = %e, "reset failed");
                self.notify(&format!("Reset failed: {e}"));
                false
            }
        }
    }

    /// Arms a one-shot save into `slot` for when the new-session context loads.
    /// Re-arming replaces the previous target.
    pub fn arm_deferred_auto_save(&mut self, slot: SlotId) {
        debug!(%slot, "deferred auto-save armed");
        self.state.pending_auto_save = Some(PendingAutoSave {
            slot,
            context: self.config.new_session_context.clone(),
        });
    }

    /// Takes the armed auto-save, leaving none.
    pub fn consume_deferred_auto_save(&mut self) -> Option<SlotId> {
        self.state.pending_auto_save.take().map(|pending| pending.slot)
    }

    // --- transition cycles ---

    /// Starts a new transition cycle.
    ///
    /// A replacing transition destroys every context-local object, so the
    /// cursor's sinks and the browser go away immediately.
    pub fn request_transition(&mut self, context: &str, mode: TransitionMode) -> CycleId {
        self.cycle = self.cycle.next();
        info!(context, ?mode, cycle = %self.cycle, "transition requested");
        if mode == TransitionMode::Replace {
            self.stage.cursor.unbind();
            self.stage.clear_browser();
            if self.state.browser_request.take().is_some() {
                self.emit(SessionEvent::BrowserClosed { reopen: None });
            }
        }
        self.in_flight.push_back((context.to_owned(), self.cycle));
        self.driver.transition_to(context, mode);
        self.cycle
    }

    /// Loads the browser context on top of the current one.
    pub fn open_browser(&mut self, request: BrowserRequest) {
        if self.state.browser_request.is_some() {
            debug!(?request, "browser already open");
            return;
        }
        self.state.browser_request = Some(request);
        self.emit(SessionEvent::BrowserOpened(request));
        let context = self.config.browser_context.clone();
        self.request_transition(&context, TransitionMode::Additive);
    }

    /// Unloads the browser context. With `restore_origin` the menu that
    /// opened it is shown again.
    pub fn close_browser(&mut self, restore_origin: bool) {
        let Some(request) = self.state.browser_request.take() else {
            return;
        };
        self.stage.clear_browser();
        let context = self.config.browser_context.clone();
        self.driver.unload(&context);
        self.emit(SessionEvent::BrowserClosed {
            reopen: restore_origin.then_some(request.origin),
        });
    }

    /// Cycle-boundary hook, run once per completed transition.
    ///
    /// Steps run in this order: schedule position restore, fire the
    /// deferred auto-save, close any stale prompt, set up the browser.
    pub async fn on_transition_completed(&mut self, completed: &TransitionCompleted) {
        let CompletionKind::Loaded(mode) = completed.kind else {
            debug!(context = %completed.context, "context unloaded");
            return;
        };
        let context = completed.context.as_str();
        let cycle = self.completed_cycle(context);
        info!(context, ?mode, %cycle, "transition completed");
        if mode == TransitionMode::Replace {
            self.state.active_context = Some(context.to_owned());
        }

        self.schedule_restore(context, cycle);

        if self
            .state
            .pending_auto_save
            .as_ref()
            .is_some_and(|pending| pending.context == context)
        {
            if let Some(slot) = self.consume_deferred_auto_save() {
                self.state.new_session = false;
                self.save_to_slot(slot, 0).await;
            }
        }

        if self.gate.force_close() {
            debug!("stale confirmation closed");
            self.emit(SessionEvent::PromptClosed);
        }

        if context == self.config.browser_context && mode == TransitionMode::Additive {
            match self.state.browser_request {
                Some(request) => self.schedule_browser(request, cycle).await,
                None => warn!(context, "browser loaded without an open request"),
            }
        }
    }

    fn completed_cycle(&mut self, context: &str) -> CycleId {
        match self.in_flight.iter().position(|(name, _)| name == context) {
            Some(index) => self
                .in_flight
                .remove(index)
                .map_or(self.cycle, |(_, cycle)| cycle),
            None => {
                warn!(context, "completion for a transition that was never requested");
                self.cycle
            }
        }
    }

    fn schedule_restore(&mut self, context: &str, cycle: CycleId) {
        if self.state.new_session || context == self.config.main_menu_context {
            return;
        }
        if !self
            .state
            .current_save
            .as_ref()
            .is_some_and(|save| save.context_name == context)
        {
            return;
        }
        let Some(save) = self.state.current_save.take() else {
            return;
        };
        let position = usize::try_from(save.narrative_position).unwrap_or(usize::MAX);
        self.barrier.await_ready(
            "restore-position",
            cycle,
            self.config.restore_wait,
            |stage: &Stage| stage.cursor.is_bound() && stage.cursor.is_active(),
            move |stage: &mut Stage| {
                if let Err(e) = stage.cursor.jump_to(position) {
                    debug!(error = %e, "saved position ignored");
                }
            },
        );
    }

    async fn schedule_browser(&mut self, request: BrowserRequest, cycle: CycleId) {
        let occupancy = SlotOccupancy::probe(self.store.as_ref()).await;
        let last_used = self.state.last_used_slot;
        self.barrier.await_ready(
            "browser-view",
            cycle,
            self.config.browser_wait,
            |stage: &Stage| stage.browser_view.is_some(),
            move |stage: &mut Stage| {
                let flow = SlotBrowserFlow::initialize(request, occupancy, last_used);
                if let Some(view) = stage.browser_view.as_deref_mut() {
                    flow.render(view);
                }
                stage.browser = Some(flow);
            },
        );
    }

    /// Handles every completion the driver has delivered so far.
    pub async fn process_transitions(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(completed) = self.completions.try_recv() {
            self.on_transition_completed(&completed).await;
            handled += 1;
        }
        handled
    }

    /// Advances the clock and the readiness barrier by one tick.
    pub fn tick(&mut self, dt: Duration) -> Vec<WaitResolution> {
        let in_main_menu =
            self.state.active_context.as_deref() == Some(self.config.main_menu_context.as_str());
        if !self.state.paused && !in_main_menu {
            self.state.elapsed_seconds += dt.as_secs_f64();
        }

        let resolutions = self.barrier.tick(&mut self.stage, self.cycle);
        for resolution in &resolutions {
            if let WaitResolution::TimedOut { label, error, .. } = resolution {
                error!(label, error = %error, "dependent never became ready; continuing degraded");
            }
        }
        resolutions
    }

    /// Drains completions, then ticks.
    pub async fn update(&mut self, dt: Duration) -> Vec<WaitResolution> {
        self.process_transitions().await;
        self.tick(dt)
    }

    // --- host input ---

    /// Supplies the active context's presentation sinks.
    pub fn provide_handles(&mut self, handles: PresentationHandles) {
        self.stage.cursor.rebind(handles);
    }

    /// Supplies the browser context's slot rows.
    pub fn provide_browser_view(&mut self, mut view: Box<dyn SlotBrowserView>) {
        if let Some(flow) = &self.stage.browser {
            flow.render(view.as_mut());
        }
        self.stage.browser_view = Some(view);
    }

    /// Starts the active context's line sequence.
    pub fn begin_narrative(&mut self, lines: Vec<NarrativeLine>) {
        self.stage.cursor.begin(lines);
    }

    /// Shows branch options; advancing is blocked until one is picked.
    pub fn present_choices(&mut self, options: Vec<String>) {
        self.stage.cursor.present_choices(options);
    }

    fn input_blocked(&self) -> bool {
        self.state.paused || self.gate.is_active()
    }

    /// The player asked for the next line.
    pub fn advance_requested(&mut self) -> CursorState {
        if self.input_blocked() {
            return self.stage.cursor.state();
        }
        let was_active = self.stage.cursor.is_active();
        let state = self.stage.cursor.advance();
        if was_active && state == CursorState::Inactive {
            self.emit(SessionEvent::NarrativeEnded);
        }
        state
    }

    /// The player picked branch `index`.
    pub fn choice_selected(&mut self, index: usize) -> Option<usize> {
        if self.input_blocked() {
            return None;
        }
        match self.stage.cursor.select_choice(index) {
            Ok(chosen) => {
                self.emit(SessionEvent::ChoiceMade(chosen));
                Some(chosen)
            }
            Err(e) => {
                debug!(error = %e, "choice ignored");
                None
            }
        }
    }

    /// The pause key. Ignored on the title screen, in the browser and
    /// while a prompt is up.
    pub fn pause_toggled(&mut self) {
        let in_main_menu =
            self.state.active_context.as_deref() == Some(self.config.main_menu_context.as_str());
        if in_main_menu || self.gate.is_active() || self.state.browser_request.is_some() {
            return;
        }
        self.set_paused(!self.state.paused);
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        if self.state.paused != paused {
            self.state.paused = paused;
            self.emit(SessionEvent::PauseChanged(paused));
        }
    }

    /// A slot button in the browser was clicked.
    pub async fn slot_clicked(&mut self, slot: SlotId) {
        let Some(decision) = self.stage.browser.as_ref().map(|b| b.on_slot_clicked(slot)) else {
            debug!(%slot, "slot click with no browser");
            return;
        };
        self.route(decision).await;
    }

    /// A reset button in the browser was clicked.
    pub async fn reset_clicked(&mut self, slot: SlotId) {
        let Some(decision) = self.stage.browser.as_ref().map(|b| b.on_reset_clicked(slot)) else {
            debug!(%slot, "reset click with no browser");
            return;
        };
        self.route(decision).await;
    }

    /// Answers the outstanding prompt.
    pub async fn confirm(&mut self, accepted: bool) {
        if !self.gate.is_active() {
            return;
        }
        let outcome = self.gate.resolve(accepted);
        self.emit(SessionEvent::PromptClosed);
        if let Some(action) = outcome {
            self.perform(action).await;
        }
    }

    async fn route(&mut self, decision: FlowDecision) {
        match decision {
            FlowDecision::Perform(action) => self.perform(action).await,
            FlowDecision::Confirm { message, action } => self.ask(message, action),
            FlowDecision::Message(message) => self.tell(message),
            FlowDecision::Ignore => debug!("click ignored"),
        }
    }

    pub(crate) fn ask(&mut self, message: String, action: SessionAction) {
        self.gate.request(message.clone(), action, None);
        self.emit(SessionEvent::Prompt {
            message,
            kind: ConfirmationKind::YesNo,
        });
    }

    pub(crate) fn tell(&mut self, message: String) {
        self.gate.show_message(message.clone());
        self.emit(SessionEvent::Prompt {
            message,
            kind: ConfirmationKind::Message,
        });
    }

    /// Carries out `action` now.
    pub async fn perform(&mut self, action: SessionAction) {
        debug!(?action, "performing");
        match action {
            SessionAction::SaveToSlot(slot) => {
                let position = self.stage.cursor.current_position();
                self.save_to_slot(slot, position).await;
                self.refresh_browser().await;
            }
            SessionAction::LoadFromSlot(slot) => {
                if let Some(snapshot) = self.load_from_slot(slot).await {
                    self.gate.force_close();
                    self.set_paused(false);
                    self.request_transition(&snapshot.context_name, TransitionMode::Replace);
                }
            }
            SessionAction::ResetSlot(slot) => {
                self.reset_slot(slot).await;
                self.refresh_browser().await;
            }
            SessionAction::BeginNewSession(slot) => {
                self.start_new_session();
                self.state.last_used_slot = Some(slot);
                self.arm_deferred_auto_save(slot);
                self.set_paused(false);
                let context = self.config.new_session_context.clone();
                self.request_transition(&context, TransitionMode::Replace);
            }
            SessionAction::OpenBrowser(request) => self.open_browser(request),
            SessionAction::ReturnToMainMenu => {
                self.set_paused(false);
                let context = self.config.main_menu_context.clone();
                self.request_transition(&context, TransitionMode::Replace);
            }
            SessionAction::Quit => self.emit(SessionEvent::QuitRequested),
        }
    }

    async fn refresh_browser(&mut self) {
        let Some(request) = self.stage.browser.as_ref().map(SlotBrowserFlow::request) else {
            return;
        };
        let occupancy = SlotOccupancy::probe(self.store.as_ref()).await;
        let flow = SlotBrowserFlow::initialize(request, occupancy, self.state.last_used_slot);
        if let Some(view) = self.stage.browser_view.as_deref_mut() {
            flow.render(view);
        }
        self.stage.browser = Some(flow);
    }
}

impl Drop for SessionCoordinator {
    fn drop(&mut self) {
        self.driver.unsubscribe();
        debug!("unsubscribed from transition completions");
    }
}

#[cfg(test)]
mod tests {
    use tableau_test_support::{
        FailingSnapshotStore, FixedClock, InMemorySnapshotStore, RecordingNotifier,
        RecordingPresentation, RecordingTransitionDriver, TransitionRequest,
    };

    use super::*;

    struct Harness {
        coordinator: SessionCoordinator,
        store: Arc<InMemorySnapshotStore>,
        driver: RecordingTransitionDriver,
        notifier: RecordingNotifier,
    }

    fn clock() -> FixedClock {
        FixedClock::at(2026, 3, 14, 9, 26, 53)
    }

    fn slot(index: u8) -> SlotId {
        SlotId::new(index).unwrap()
    }

    fn snapshot(context: &str, position: u32) -> SessionSnapshot {
        SessionSnapshot::new(context, position, 60.0, clock().0)
    }

    fn harness_with(store: InMemorySnapshotStore) -> Harness {
        let store = Arc::new(store);
        let driver = RecordingTransitionDriver::new();
        let notifier = RecordingNotifier::new();
        let coordinator = SessionCoordinator::new(
            SessionConfig::default(),
            store.clone(),
            Arc::new(clock()),
            Box::new(notifier.clone()),
            Box::new(driver.clone()),
        );
        Harness {
            coordinator,
            store,
            driver,
            notifier,
        }
    }

    fn harness() -> Harness {
        harness_with(InMemorySnapshotStore::new())
    }

    impl Harness {
        async fn enter(&mut self, context: &str) {
            self.coordinator
                .request_transition(context, TransitionMode::Replace);
            self.driver.complete_all();
            self.coordinator.process_transitions().await;
        }
    }

    fn lines(count: usize) -> Vec<NarrativeLine> {
        (0..count)
            .map(|i| NarrativeLine::spoken("Mara", format!("line {i}")))
            .collect()
    }

    #[test]
    fn test_new_subscribes_and_drop_unsubscribes() {
        // Arrange
        let h = harness();
        let driver = h.driver.clone();

        // Act
        let subscribed = driver.is_subscribed();
        drop(h);

        // Assert
        assert!(subscribed);
        assert!(!driver.is_subscribed());
    }

    #[test]
    fn test_start_new_session_clears_save_without_touching_disk() {
        // Arrange
        let mut h = harness();
        h.coordinator.state.current_save = Some(snapshot("ChapterOne", 3));
        h.coordinator.state.elapsed_seconds = 42.0;

        // Act
        h.coordinator.start_new_session();

        // Assert
        let state = h.coordinator.state();
        assert!(state.new_session);
        assert!(state.current_save.is_none());
        assert!(state.elapsed_seconds.abs() < f64::EPSILON);
        assert!(h.store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_save_to_slot_writes_snapshot_and_notifies() {
        // Arrange
        let mut h = harness();
        h.enter("ChapterOne").await;
        h.coordinator.tick(Duration::from_secs_f64(12.5));

        // Act
        let saved = h.coordinator.save_to_slot(slot(1), 4).await;

        // Assert
        assert!(saved);
        let written = h.store.snapshot(slot(1)).unwrap();
        assert_eq!(written.context_name, "ChapterOne");
        assert_eq!(written.narrative_position, 4);
        assert!((written.elapsed_seconds - 12.5).abs() < f64::EPSILON);
        assert_eq!(written.saved_at, "2026-03-14 09:26:53");
        assert_eq!(h.coordinator.state().last_used_slot, Some(slot(1)));
        assert_eq!(h.coordinator.state().current_save, Some(written));
        assert_eq!(h.notifier.last().as_deref(), Some("Saved to slot 2"));
    }

    #[tokio::test]
    async fn test_save_failure_is_reported_not_raised() {
        // Arrange
        let driver = RecordingTransitionDriver::new();
        let notifier = RecordingNotifier::new();
        let mut coordinator = SessionCoordinator::new(
            SessionConfig::default(),
            Arc::new(FailingSnapshotStore),
            Arc::new(clock()),
            Box::new(notifier.clone()),
            Box::new(driver.clone()),
        );
        coordinator.request_transition("ChapterOne", TransitionMode::Replace);
        driver.complete_all();
        coordinator.process_transitions().await;

        // Act
        let saved = coordinator.save_to_slot(slot(0), 2).await;

        // Assert
        assert!(!saved);
        assert!(notifier.last().unwrap().starts_with("Save failed: "));
        assert!(coordinator.state().last_used_slot.is_none());
    }

    #[tokio::test]
    async fn test_save_without_active_context_fails() {
        // Arrange
        let mut h = harness();

        // Act
        let saved = h.coordinator.save_to_slot(slot(0), 0).await;

        // Assert
        assert!(!saved);
        assert!(h.store.writes().is_empty());
        assert_eq!(
            h.notifier.last().as_deref(),
            Some("Save failed: no active context")
        );
    }

    #[tokio::test]
    async fn test_load_empty_slot_notifies_and_returns_none() {
        // Arrange
        let mut h = harness();

        // Act
        let loaded = h.coordinator.load_from_slot(slot(2)).await;

        // Assert
        assert!(loaded.is_none());
        assert_eq!(h.notifier.last().as_deref(), Some("This slot is empty"));
    }

    #[tokio::test]
    async fn test_load_restores_play_time_and_last_used() {
        // Arrange
        let mut h =
            harness_with(InMemorySnapshotStore::new().with_snapshot(slot(2), snapshot("ChapterTwo", 5)));

        // Act
        let loaded = h.coordinator.load_from_slot(slot(2)).await;

        // Assert
        assert_eq!(loaded.map(|s| s.narrative_position), Some(5));
        let state = h.coordinator.state();
        assert!((state.elapsed_seconds - 60.0).abs() < f64::EPSILON);
        assert_eq!(state.last_used_slot, Some(slot(2)));
        assert!(state.current_save.is_some());
    }

    #[tokio::test]
    async fn test_corrupt_load_reports_error() {
        // Arrange
        let driver = RecordingTransitionDriver::new();
        let notifier = RecordingNotifier::new();
        let mut coordinator = SessionCoordinator::new(
            SessionConfig::default(),
            Arc::new(FailingSnapshotStore),
            Arc::new(clock()),
            Box::new(notifier.clone()),
            Box::new(driver),
        );

        // Act
        let loaded = coordinator.load_from_slot(slot(0)).await;

        // Assert
        assert!(loaded.is_none());
        assert!(notifier.last().unwrap().starts_with("Load failed: "));
    }

    #[tokio::test]
    async fn test_reset_empty_slot_succeeds() {
        // Arrange
        let mut h = harness();

        // Act
        let reset = h.coordinator.reset_slot(slot(0)).await;

        // Assert
        assert!(reset);
        assert!(!h.store.exists(slot(0)).await);
        assert_eq!(h.notifier.last().as_deref(), Some("Slot 1 reset"));
    }

    #[test]
    fn test_deferred_auto_save_is_taken_once() {
        // Arrange
        let mut h = harness();
        h.coordinator.arm_deferred_auto_save(slot(1));

        // Act
        let first = h.coordinator.consume_deferred_auto_save();
        let second = h.coordinator.consume_deferred_auto_save();

        // Assert
        assert_eq!(first, Some(slot(1)));
        assert_eq!(second, None);
    }

    #[tokio::test]
    async fn test_replace_transition_unbinds_cursor() {
        // Arrange
        let mut h = harness();
        let ui = RecordingPresentation::new();
        h.coordinator.provide_handles(ui.handles());

        // Act
        let before = h.coordinator.cycle();
        let cycle = h
            .coordinator
            .request_transition("ChapterOne", TransitionMode::Replace);

        // Assert
        assert!(cycle > before);
        assert!(!h.coordinator.cursor().is_bound());
        assert_eq!(
            h.driver.requests(),
            vec![TransitionRequest::Load {
                context: "ChapterOne".into(),
                mode: TransitionMode::Replace,
            }]
        );
    }

    #[tokio::test]
    async fn test_restore_waits_for_rebind_then_jumps() {
        // Arrange
        let mut h =
            harness_with(InMemorySnapshotStore::new().with_snapshot(slot(0), snapshot("ChapterOne", 3)));
        h.coordinator.load_from_slot(slot(0)).await;
        h.enter("ChapterOne").await;

        // Act
        h.coordinator.tick(Duration::ZERO);
        let waiting = h.coordinator.pending_waits();
        let ui = RecordingPresentation::new();
        h.coordinator.provide_handles(ui.handles());
        h.coordinator.begin_narrative(lines(6));
        h.coordinator.tick(Duration::ZERO);

        // Assert
        assert_eq!(waiting, 1);
        assert_eq!(h.coordinator.cursor().current_position(), 3);
        assert_eq!(ui.text.text(), "line 3");
        assert!(h.coordinator.state().current_save.is_none());
    }

    #[tokio::test]
    async fn test_restore_out_of_range_is_ignored() {
        // Arrange
        let mut h =
            harness_with(InMemorySnapshotStore::new().with_snapshot(slot(0), snapshot("ChapterOne", 40)));
        h.coordinator.load_from_slot(slot(0)).await;
        h.enter("ChapterOne").await;
        let ui = RecordingPresentation::new();
        h.coordinator.provide_handles(ui.handles());
        h.coordinator.begin_narrative(lines(2));

        // Act
        let resolutions = h.coordinator.tick(Duration::ZERO);

        // Assert
        assert!(matches!(resolutions[..], [WaitResolution::Ready { .. }]));
        assert_eq!(h.coordinator.cursor().current_position(), 0);
    }

    #[tokio::test]
    async fn test_superseded_restore_never_applies() {
        // Arrange
        let mut h =
            harness_with(InMemorySnapshotStore::new().with_snapshot(slot(0), snapshot("ChapterOne", 3)));
        h.coordinator.load_from_slot(slot(0)).await;
        h.enter("ChapterOne").await;

        // Act
        h.coordinator
            .request_transition("ChapterTwo", TransitionMode::Replace);
        let ui = RecordingPresentation::new();
        h.coordinator.provide_handles(ui.handles());
        h.coordinator.begin_narrative(lines(6));
        let resolutions = h.coordinator.tick(Duration::ZERO);

        // Assert
        assert!(matches!(resolutions[..], [WaitResolution::Stale { .. }]));
        assert_eq!(h.coordinator.cursor().current_position(), 0);
    }

    #[tokio::test]
    async fn test_new_session_skips_restore() {
        // Arrange
        let mut h = harness();
        h.coordinator.state.current_save = Some(snapshot("ChapterOne", 3));
        h.coordinator.state.new_session = true;

        // Act
        h.enter("ChapterOne").await;

        // Assert
        assert_eq!(h.coordinator.pending_waits(), 0);
    }

    #[tokio::test]
    async fn test_transition_completion_closes_stale_prompt() {
        // Arrange
        let mut h = harness();
        h.coordinator.ask("Quit?".into(), SessionAction::Quit);

        // Act
        h.enter("ChapterOne").await;

        // Assert
        assert!(!h.coordinator.gate().is_active());
        assert!(h.coordinator.take_events().contains(&SessionEvent::PromptClosed));
    }

    #[tokio::test]
    async fn test_play_time_stops_while_paused_and_in_main_menu() {
        // Arrange
        let mut h = harness();
        h.enter("MainMenuScene").await;

        // Act
        h.coordinator.tick(Duration::from_secs(5));
        h.enter("ChapterOne").await;
        h.coordinator.tick(Duration::from_secs(2));
        h.coordinator.pause_toggled();
        h.coordinator.tick(Duration::from_secs(30));

        // Assert
        assert!(h.coordinator.state().paused);
        assert!((h.coordinator.state().elapsed_seconds - 2.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_input_ignored_while_paused() {
        // Arrange
        let mut h = harness();
        h.enter("ChapterOne").await;
        h.coordinator.provide_handles(RecordingPresentation::new().handles());
        h.coordinator.begin_narrative(lines(3));
        h.coordinator.pause_toggled();

        // Act
        h.coordinator.advance_requested();

        // Assert
        assert_eq!(h.coordinator.cursor().current_position(), 0);
    }

    #[tokio::test]
    async fn test_advancing_past_last_line_emits_narrative_ended() {
        // Arrange
        let mut h = harness();
        h.enter("ChapterOne").await;
        h.coordinator.begin_narrative(lines(2));
        h.coordinator.take_events();

        // Act
        h.coordinator.advance_requested();
        let end = h.coordinator.advance_requested();

        // Assert
        assert_eq!(end, CursorState::Inactive);
        assert_eq!(h.coordinator.take_events(), vec![SessionEvent::NarrativeEnded]);
    }

    #[tokio::test]
    async fn test_choice_selected_reports_choice() {
        // Arrange
        let mut h = harness();
        h.enter("ChapterOne").await;
        h.coordinator.begin_narrative(lines(2));
        h.coordinator
            .present_choices(vec!["Stay".into(), "Run".into()]);

        // Act
        let blocked = h.coordinator.advance_requested();
        let chosen = h.coordinator.choice_selected(1);

        // Assert
        assert_eq!(blocked, CursorState::Active { position: 0 });
        assert_eq!(chosen, Some(1));
        assert!(h.coordinator.take_events().contains(&SessionEvent::ChoiceMade(1)));
    }
}
