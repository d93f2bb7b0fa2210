//! Narrative domain model.

pub mod choice;
pub mod cursor;
pub mod line;
