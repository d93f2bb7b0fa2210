//! Host configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::HostError;

/// Save directory when `TABLEAU_SAVE_DIR` is unset.
pub const DEFAULT_SAVE_DIR: &str = "saves";
/// Tick length when `TABLEAU_TICK_MS` is unset.
pub const DEFAULT_TICK_MS: u64 = 16;
/// Readiness timeout when `TABLEAU_WAIT_TIMEOUT_TICKS` is unset.
pub const DEFAULT_WAIT_TIMEOUT_TICKS: u32 = 600;

/// Everything the host needs before it can build a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Directory holding the slot files.
    pub save_dir: PathBuf,
    /// Story JSON; the built-in demo story when `None`.
    pub story: Option<PathBuf>,
    /// Wall-clock length of one tick.
    pub tick: Duration,
    /// Readiness timeout in ticks; `None` waits forever.
    pub wait_timeout_ticks: Option<u32>,
}

impl HostConfig {
    /// Reads `TABLEAU_SAVE_DIR`, `TABLEAU_STORY`, `TABLEAU_TICK_MS` and
    /// `TABLEAU_WAIT_TIMEOUT_TICKS`.
    ///
    /// # Errors
    ///
    /// Returns `HostError::Config` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, HostError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    ///
    /// # Errors
    ///
    /// Returns `HostError::Config` if a numeric variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HostError> {
        let save_dir = lookup("TABLEAU_SAVE_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_SAVE_DIR), PathBuf::from);
        let story = lookup("TABLEAU_STORY").map(PathBuf::from);

        let tick_ms = match lookup("TABLEAU_TICK_MS") {
            None => DEFAULT_TICK_MS,
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| {
                    HostError::Config(format!(
                        "TABLEAU_TICK_MS must be a positive integer, got {raw:?}"
                    ))
                })?,
        };

        let wait_timeout_ticks = match lookup("TABLEAU_WAIT_TIMEOUT_TICKS").as_deref() {
            None => Some(DEFAULT_WAIT_TIMEOUT_TICKS),
            Some("none") => None,
            Some(raw) => Some(raw.parse::<u32>().map_err(|e| {
                HostError::Config(format!(
                    "TABLEAU_WAIT_TIMEOUT_TICKS must be a tick count or \"none\": {e}"
                ))
            })?),
        };

        Ok(Self {
            save_dir,
            story,
            tick: Duration::from_millis(tick_ms),
            wait_timeout_ticks,
        })
    }
}
