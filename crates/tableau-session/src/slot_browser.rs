//! Save/load slot browser.
//!
//! A [`SlotBrowserFlow`] lives for exactly one instance of the browser
//! context. It turns slot occupancy into per-row button state and decides
//! what a click on a row means; the coordinator carries the decision out.

use tableau_core::presentation::{SlotBrowserView, SlotButtonState};
use tableau_core::slot::{SLOT_COUNT, SlotId};
use tableau_core::snapshot::empty_slot_label;
use tableau_core::store::SnapshotStore;
use tracing::debug;

use crate::coordinator::SessionAction;

/// Which menu opened the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOrigin {
    /// Title screen.
    MainMenu,
    /// In-game pause menu.
    PauseMenu,
}

/// Whether the browser saves or loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserMode {
    /// Write the current session into a slot.
    Save,
    /// Restore a session from a slot.
    Load,
}

/// Why the browser was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserPurpose {
    /// Regular save or load.
    Normal,
    /// Picking the slot a new session will occupy.
    NewSession,
}

/// Everything the browser needs to know about why it is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserRequest {
    /// Menu to return to when the browser is dismissed.
    pub origin: MenuOrigin,
    /// Save or load.
    pub mode: BrowserMode,
    /// Normal or new-session.
    pub purpose: BrowserPurpose,
}

impl BrowserRequest {
    /// Load from the given menu.
    #[must_use]
    pub fn load(origin: MenuOrigin) -> Self {
        Self {
            origin,
            mode: BrowserMode::Load,
            purpose: BrowserPurpose::Normal,
        }
    }

    /// Save from the pause menu.
    #[must_use]
    pub fn save() -> Self {
        Self {
            origin: MenuOrigin::PauseMenu,
            mode: BrowserMode::Save,
            purpose: BrowserPurpose::Normal,
        }
    }

    /// Choose a slot for a new session, from the title screen.
    #[must_use]
    pub fn new_session() -> Self {
        Self {
            origin: MenuOrigin::MainMenu,
            mode: BrowserMode::Save,
            purpose: BrowserPurpose::NewSession,
        }
    }
}

/// What the coordinator should do about a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowDecision {
    /// Act immediately.
    Perform(SessionAction),
    /// Ask first; act only if the player accepts.
    Confirm {
        /// Prompt text.
        message: String,
        /// Action on acceptance.
        action: SessionAction,
    },
    /// Tell the player something; nothing happens.
    Message(String),
    /// The click means nothing in this state.
    Ignore,
}

/// Fill state and label of every slot at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOccupancy {
    slots: Vec<(bool, String)>,
}

impl SlotOccupancy {
    /// Builds occupancy from `(full, label)` pairs in slot order.
    #[must_use]
    pub fn from_slots(slots: Vec<(bool, String)>) -> Self {
        Self { slots }
    }

    /// Queries the store for every slot.
    pub async fn probe(store: &dyn SnapshotStore) -> Self {
        let mut slots = Vec::with_capacity(usize::from(SLOT_COUNT));
        for slot in SlotId::all() {
            let full = store.exists(slot).await;
            let label = if full {
                store.label(slot).await
            } else {
                empty_slot_label(slot)
            };
            slots.push((full, label));
        }
        Self { slots }
    }

    /// Whether `slot` holds a snapshot.
    #[must_use]
    pub fn is_full(&self, slot: SlotId) -> bool {
        self.slots.get(slot.index()).is_some_and(|(full, _)| *full)
    }

    /// Whether every slot holds a snapshot.
    #[must_use]
    pub fn all_full(&self) -> bool {
        SlotId::all().all(|slot| self.is_full(slot))
    }

    /// Lowest-numbered empty slot.
    #[must_use]
    pub fn first_empty(&self) -> Option<SlotId> {
        SlotId::all().find(|slot| !self.is_full(*slot))
    }

    /// Display label of `slot`.
    #[must_use]
    pub fn label(&self, slot: SlotId) -> String {
        self.slots
            .get(slot.index())
            .map_or_else(|| empty_slot_label(slot), |(_, label)| label.clone())
    }
}

/// Per-instance state of the browser context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotBrowserFlow {
    request: BrowserRequest,
    occupancy: SlotOccupancy,
    suggested: Option<SlotId>,
}

impl SlotBrowserFlow {
    /// Prepares the browser for `request`.
    ///
    /// When a new session must overwrite a full slot, `last_used` (or the
    /// first slot if there is none) is highlighted as the suggestion.
    #[must_use]
    pub fn initialize(
        request: BrowserRequest,
        occupancy: SlotOccupancy,
        last_used: Option<SlotId>,
    ) -> Self {
        let overwrite_needed =
            request.purpose == BrowserPurpose::NewSession && occupancy.all_full();
        let suggested = overwrite_needed
            .then(|| last_used.or_else(|| SlotId::all().next()))
            .flatten();
        debug!(?request, ?suggested, "slot browser initialized");
        Self {
            request,
            occupancy,
            suggested,
        }
    }

    /// The request this browser was opened for.
    #[must_use]
    pub fn request(&self) -> BrowserRequest {
        self.request
    }

    /// The occupancy the browser was initialized with.
    #[must_use]
    pub fn occupancy(&self) -> &SlotOccupancy {
        &self.occupancy
    }

    fn new_session_overwrite(&self) -> bool {
        self.request.purpose == BrowserPurpose::NewSession && self.occupancy.all_full()
    }

    /// Button state of one row.
    #[must_use]
    pub fn slot_state(&self, slot: SlotId) -> SlotButtonState {
        let full = self.occupancy.is_full(slot);
        let slot_enabled = match (self.request.mode, self.request.purpose) {
            (BrowserMode::Load, _) => full,
            (BrowserMode::Save, BrowserPurpose::Normal) => true,
            (BrowserMode::Save, BrowserPurpose::NewSession) => !full,
        };
        SlotButtonState {
            label: self.occupancy.label(slot),
            slot_enabled,
            reset_enabled: full,
            highlighted: self.suggested == Some(slot),
        }
    }

    /// Draws every row onto `view`.
    pub fn render(&self, view: &mut dyn SlotBrowserView) {
        for slot in SlotId::all() {
            view.render_slot(slot, &self.slot_state(slot));
        }
    }

    /// Decides what a click on the slot button means.
    #[must_use]
    pub fn on_slot_clicked(&self, slot: SlotId) -> FlowDecision {
        let full = self.occupancy.is_full(slot);
        let number = slot.number();
        match self.request.mode {
            BrowserMode::Load if full => FlowDecision::Confirm {
                message: format!("Load from slot {number}? Current progress will be lost."),
                action: SessionAction::LoadFromSlot(slot),
            },
            BrowserMode::Load => FlowDecision::Message(format!("Slot {number} is empty.")),
            BrowserMode::Save if self.new_session_overwrite() => FlowDecision::Confirm {
                message: format!("Overwrite Slot {number}?"),
                action: SessionAction::BeginNewSession(slot),
            },
            BrowserMode::Save if self.request.purpose == BrowserPurpose::NewSession => {
                match self.occupancy.first_empty() {
                    Some(target) => FlowDecision::Perform(SessionAction::BeginNewSession(target)),
                    None => FlowDecision::Ignore,
                }
            }
            BrowserMode::Save if full => FlowDecision::Confirm {
                message: format!("Save to slot {number}?"),
                action: SessionAction::SaveToSlot(slot),
            },
            BrowserMode::Save => FlowDecision::Perform(SessionAction::SaveToSlot(slot)),
        }
    }

    /// Decides what a click on the reset button means.
    #[must_use]
    pub fn on_reset_clicked(&self, slot: SlotId) -> FlowDecision {
        if !self.occupancy.is_full(slot) {
            return FlowDecision::Ignore;
        }
        FlowDecision::Confirm {
            message: format!("Reset slot {}? This cannot be undone.", slot.number()),
            action: SessionAction::ResetSlot(slot),
        }
    }
}
