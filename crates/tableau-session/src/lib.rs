//! Tableau: Session coordination.
//!
//! Responsible for transition cycles, deferred auto-saves, position restore,
//! the single-flight confirmation gate and the save/load slot browser.

pub mod barrier;
pub mod config;
pub mod coordinator;
pub mod gate;
pub mod menus;
pub mod slot_browser;

pub use barrier::{ReadinessBarrier, WaitId, WaitOptions, WaitResolution};
pub use config::SessionConfig;
pub use coordinator::{
    PendingAutoSave, SessionAction, SessionCoordinator, SessionEvent, SessionState, Stage,
};
pub use gate::{ConfirmationGate, ConfirmationKind, ConfirmationRequest};
pub use menus::format_playtime;
pub use slot_browser::{
    BrowserMode, BrowserPurpose, BrowserRequest, FlowDecision, MenuOrigin, SlotBrowserFlow,
    SlotOccupancy,
};
