//! Core system constants used throughout the Bingo engine
//!
//! This module centralizes the names shared across the pattern library,
//! configuration loading and the command line.

/// Pattern library constants
pub mod patterns {
    /// Category assigned when a definition leaves it blank
    pub const DEFAULT_CATEGORY: &str = "custom";

    /// Category names used by the built-in patterns
    pub const CATEGORY_LINE: &str = "line";
    pub const CATEGORY_SHAPE: &str = "shape";
    pub const CATEGORY_COVERALL: &str = "coverall";
    pub const CATEGORY_MOVING: &str = "moving";
}

/// Environment variable names read by [`crate::config::SessionConfig`]
pub mod env {
    /// Fixed draw seed
    pub const SEED: &str = "BINGO_SEED";

    /// Win policy (`freeze_on_first_win` or `keep_calling`)
    pub const WIN_POLICY: &str = "BINGO_WIN_POLICY";

    /// Path of the session configuration file
    pub const CONFIG_PATH: &str = "BINGO_CONFIG_PATH";
}
