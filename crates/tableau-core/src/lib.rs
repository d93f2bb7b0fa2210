//! Tableau Core: shared session abstractions.
//!
//! This crate defines the vocabulary every other Tableau crate depends on:
//! slots, snapshots, the error taxonomy and the traits behind which storage,
//! context transitions and presentation live. It contains no I/O.

pub mod clock;
pub mod error;
pub mod presentation;
pub mod slot;
pub mod snapshot;
pub mod store;
pub mod transition;
