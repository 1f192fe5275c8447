//! Session file: engine settings, pattern selection and the card source
//!
//! ```toml
//! pattern = "traveling_diagonal"
//!
//! [session]
//! seed = 7
//! win_policy = "freeze_on_first_win"
//!
//! [cards]
//! file = "cards.json"        # or: generate = 40
//!
//! [[patterns]]               # optional custom patterns, added to the built-ins
//! name = "bowtie"
//! shapes = [[[0, 0], [1, 1], [3, 3], [4, 4], [0, 4], [4, 0]]]
//! ```

use anyhow::{Context, Result};
use bingo_core::cards::generate_deck;
use bingo_core::constants::env;
use bingo_core::library::{PatternLibrary, names};
use bingo_core::serialization::cards_from_json;
use bingo_core::{PatternDefinition, SessionConfig};
use bingo_types::Card;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default session file name when neither `--config` nor `BINGO_CONFIG_PATH` is given
pub const DEFAULT_CONFIG_FILE: &str = "bingo.toml";

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CardSource {
    /// JSON array of cards
    pub file: Option<PathBuf>,
    /// Number of random cards to generate when no file is given
    pub generate: Option<usize>,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    "CARD".to_string()
}

fn default_pattern() -> String {
    names::ANY_LINE.to_string()
}

fn default_card_count() -> usize {
    20
}

#[derive(Deserialize, Debug, Clone)]
pub struct SessionFile {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default = "default_pattern")]
    pub pattern: String,
    #[serde(default)]
    pub patterns: Vec<PatternDefinition>,
    #[serde(default)]
    pub cards: CardSource,
}

impl Default for SessionFile {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            pattern: default_pattern(),
            patterns: Vec::new(),
            cards: CardSource::default(),
        }
    }
}

impl SessionFile {
    /// Resolve the path from the flag, then `BINGO_CONFIG_PATH`, then the default name
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(env::CONFIG_PATH).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load a session file, falling back to defaults when it does not exist.
    ///
    /// Environment overrides are applied to the `[session]` table afterwards.
    pub fn load(path: &Path) -> Result<Self> {
        let file = match fs::read_to_string(path) {
            Ok(source) => {
                info!(path = %path.display(), "Loaded session file");
                Self::from_toml_str(&source)
                    .with_context(|| format!("invalid session file {}", path.display()))?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Session file not found, using defaults");
                Self::default()
            }
            Err(err) => {
                return Err(err).with_context(|| format!("cannot read {}", path.display()));
            }
        };
        file.with_env_overrides()
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        self.session = self.session.apply_env_overrides()?;
        Ok(self)
    }

    /// Built-ins plus any custom patterns declared in the file
    pub fn library(&self) -> Result<PatternLibrary> {
        let mut library = PatternLibrary::with_builtins()?;
        let added = library
            .load_definitions(self.patterns.clone())
            .context("invalid custom pattern in session file")?;
        if added > 0 {
            info!(added, "Custom patterns loaded");
        }
        Ok(library)
    }

    /// Cards from the configured file, or a generated deck
    pub fn load_cards(&self, base_dir: &Path) -> Result<Vec<Card>> {
        if let Some(file) = &self.cards.file {
            let path = base_dir.join(file);
            let json = fs::read_to_string(&path)
                .with_context(|| format!("cannot read cards from {}", path.display()))?;
            let cards = cards_from_json(&json)
                .with_context(|| format!("invalid cards in {}", path.display()))?;
            info!(count = cards.len(), path = %path.display(), "Cards loaded");
            return Ok(cards);
        }

        let count = self.cards.generate.unwrap_or_else(default_card_count);
        let mut rng = match self.session.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let cards = generate_deck(&self.cards.prefix, count, &mut rng)?;
        info!(count, prefix = %self.cards.prefix, "Cards generated");
        Ok(cards)
    }
}
