//! Tableau: Headless console host.
//!
//! Drives a [`tableau_session::SessionCoordinator`] from stdin commands, with
//! an in-process transition driver and a story file supplying each
//! context's lines.

pub mod app;
pub mod config;
pub mod console;
pub mod driver;
pub mod error;
pub mod story;

pub use app::{App, Command};
pub use config::HostConfig;
pub use error::HostError;
