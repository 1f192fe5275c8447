//! Session configuration
//!
//! Loaded from TOML (every field has a default) and then overridden from the
//! environment, so an operator can pin a seed for a replayable game without
//! editing the file.

use crate::constants::env;
use crate::error::{BingoError, BingoResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// What happens to calling once a win is verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinPolicy {
    /// The first verified win moves the game to won and stops further calls.
    /// Other claims are still verified against the frozen called set.
    #[default]
    FreezeOnFirstWin,
    /// Wins are recorded but calling continues until the operator ends the game
    KeepCalling,
}

impl FromStr for WinPolicy {
    type Err = BingoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "freeze_on_first_win" | "freeze" => Ok(WinPolicy::FreezeOnFirstWin),
            "keep_calling" | "continue" => Ok(WinPolicy::KeepCalling),
            other => Err(BingoError::configuration(
                "win_policy",
                format!("unknown policy '{other}' (expected freeze_on_first_win or keep_calling)"),
            )),
        }
    }
}

impl fmt::Display for WinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinPolicy::FreezeOnFirstWin => write!(f, "freeze_on_first_win"),
            WinPolicy::KeepCalling => write!(f, "keep_calling"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Fixed draw seed; operating-system entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub win_policy: WinPolicy,
    /// List every satisfied shape in a win, not only the canonical one
    #[serde(default = "default_true")]
    pub report_all_satisfied: bool,
    /// Honour call-count phase triggers declared by moving patterns
    #[serde(default = "default_true")]
    pub auto_advance_phase: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            win_policy: WinPolicy::default(),
            report_all_satisfied: true,
            auto_advance_phase: true,
        }
    }
}

impl SessionConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_win_policy(mut self, win_policy: WinPolicy) -> Self {
        self.win_policy = win_policy;
        self
    }

    pub fn from_toml_str(source: &str) -> BingoResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read a TOML file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> BingoResult<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(source) => {
                info!(path = %path.display(), "Loaded session configuration");
                Self::from_toml_str(&source)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Configuration file not found, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(BingoError::configuration("path", err.to_string())),
        }
    }

    /// Apply `BINGO_SEED` and `BINGO_WIN_POLICY` when set
    pub fn apply_env_overrides(self) -> BingoResult<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> BingoResult<Self> {
        if let Some(seed) = var(env::SEED) {
            let seed = seed.trim().parse::<u64>().map_err(|err| {
                BingoError::configuration(env::SEED, format!("'{seed}' is not a u64: {err}"))
            })?;
            info!(seed, "Draw seed set from environment");
            self.seed = Some(seed);
        }
        if let Some(policy) = var(env::WIN_POLICY) {
            self.win_policy = policy.parse()?;
            info!(win_policy = %self.win_policy, "Win policy set from environment");
        }
        Ok(self)
    }
}
