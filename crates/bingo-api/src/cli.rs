//! Operator command line
//!
//! Thin driver over `bingo-core`: every rule lives in the engine, this module
//! only loads inputs, calls the session controller and formats results.

use crate::config::SessionFile;
use crate::tracing_setup::TracingConfig;
use anyhow::{Context, Result, bail};
use bingo_core::audit::audit_summary;
use bingo_core::cards::generate_deck;
use bingo_core::serialization::{cards_to_json, summary_from_json, summary_to_json};
use bingo_core::{
    CalledSet, GameSummary, MatchEngine, Pattern, SessionController, Verdict, WinDetail, WinPolicy,
};
use bingo_types::CardId;
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Output format for results written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// 75-ball bingo session runner and win verifier
#[derive(Parser, Debug)]
#[command(name = "bingo")]
#[command(about = "Run 75-ball bingo games and verify winning cards")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Session file (defaults to $BINGO_CONFIG_PATH, then bingo.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t, global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available patterns
    Patterns {
        /// Only patterns in this category
        #[arg(long)]
        category: Option<String>,

        /// Only moving patterns
        #[arg(long, conflicts_with = "fixed")]
        moving: bool,

        /// Only static patterns
        #[arg(long)]
        fixed: bool,
    },

    /// Show a pattern's shapes at a phase
    Show {
        name: String,

        #[arg(long, default_value_t = 0)]
        phase: u64,
    },

    /// Generate random cards as JSON
    Cards {
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        #[arg(long, default_value = "CARD")]
        prefix: String,

        #[arg(long)]
        seed: Option<u64>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Play a game to its first verified win (or exhaustion)
    Play {
        /// Pattern name, overriding the session file
        #[arg(short, long)]
        pattern: Option<String>,

        /// Draw seed, overriding the session file
        #[arg(long)]
        seed: Option<u64>,

        /// Advance a moving pattern's phase every N calls
        #[arg(long)]
        advance_every: Option<usize>,

        /// Write the game summary JSON here
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Verify a card against a list of called numbers
    Verify {
        card: String,

        /// Called numbers in call order, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        calls: Vec<u8>,

        #[arg(short, long)]
        pattern: Option<String>,

        #[arg(long, default_value_t = 0)]
        phase: u64,
    },

    /// Replay every win recorded in a game summary
    Audit { summary: PathBuf },
}

impl Cli {
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig { json: self.json_logs, verbose: self.verbose }
    }

    /// Run the command, writing results to `out`
    pub fn execute(&self, out: &mut impl Write) -> Result<()> {
        let path = SessionFile::resolve_path(self.config.as_deref());
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        match &self.command {
            Command::Patterns { category, moving, fixed } => {
                let file = SessionFile::load(&path)?;
                let motion = match (*moving, *fixed) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                };
                self.list_patterns(&file, category.as_deref(), motion, out)
            }
            Command::Show { name, phase } => {
                let file = SessionFile::load(&path)?;
                let pattern = file.library()?.get(name)?;
                self.show_pattern(&pattern, *phase, out)
            }
            Command::Cards { count, prefix, seed, output } => {
                self.generate_cards(*count, prefix, *seed, output.as_deref(), out)
            }
            Command::Play { pattern, seed, advance_every, summary } => {
                let mut file = SessionFile::load(&path)?;
                if let Some(pattern) = pattern {
                    file.pattern = pattern.clone();
                }
                if let Some(seed) = seed {
                    file.session.seed = Some(*seed);
                }
                let summary_out = self.play(&file, &base_dir, *advance_every, out)?;
                if let Some(summary_path) = summary {
                    fs::write(summary_path, summary_to_json(&summary_out)?)
                        .with_context(|| format!("cannot write {}", summary_path.display()))?;
                    info!(path = %summary_path.display(), "Game summary written");
                }
                Ok(())
            }
            Command::Verify { card, calls, pattern, phase } => {
                let file = SessionFile::load(&path)?;
                self.verify_offline(&file, &base_dir, card, calls, pattern.as_deref(), *phase, out)
            }
            Command::Audit { summary } => {
                let file = SessionFile::load(&path)?;
                self.audit(&file, &base_dir, summary, out)
            }
        }
    }

    fn list_patterns(
        &self,
        file: &SessionFile,
        category: Option<&str>,
        moving: Option<bool>,
        out: &mut impl Write,
    ) -> Result<()> {
        let library = file.library()?;
        let patterns = library.search(category, moving);

        if self.format == OutputFormat::Json {
            let definitions: Vec<_> = patterns.iter().map(|p| p.definition()).collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&definitions)?)?;
            return Ok(());
        }

        writeln!(out, "{:<20} {:<10} {:>6} {:>7}", "NAME", "CATEGORY", "SHAPES", "PERIOD")?;
        for pattern in patterns {
            let period =
                if pattern.is_moving() { pattern.period().to_string() } else { "-".to_string() };
            writeln!(
                out,
                "{:<20} {:<10} {:>6} {:>7}",
                pattern.name(),
                pattern.category(),
                pattern.base().len(),
                period
            )?;
        }
        Ok(())
    }

    fn show_pattern(&self, pattern: &Pattern, phase: u64, out: &mut impl Write) -> Result<()> {
        let shapes = pattern.shapes_at(phase);
        if self.format == OutputFormat::Json {
            writeln!(out, "{}", serde_json::to_string_pretty(shapes)?)?;
            return Ok(());
        }

        write!(out, "{pattern}")?;
        if pattern.is_moving() {
            writeln!(out, "\nphase {phase} (period {}):", pattern.period())?;
            for (index, shape) in shapes.iter().enumerate() {
                writeln!(out, "#{index}")?;
                write!(out, "{shape}")?;
            }
        }
        Ok(())
    }

    fn generate_cards(
        &self,
        count: usize,
        prefix: &str,
        seed: Option<u64>,
        output: Option<&Path>,
        out: &mut impl Write,
    ) -> Result<()> {
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let cards = generate_deck(prefix, count, &mut rng)?;
        let json = cards_to_json(&cards)?;

        match output {
            Some(path) => {
                fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
                info!(count, path = %path.display(), "Cards written");
            }
            None if self.format == OutputFormat::Json => writeln!(out, "{json}")?,
            None => {
                for card in &cards {
                    writeln!(out, "{}\n{card}", card.id())?;
                }
            }
        }
        Ok(())
    }

    fn play(
        &self,
        file: &SessionFile,
        base_dir: &Path,
        advance_every: Option<usize>,
        out: &mut impl Write,
    ) -> Result<GameSummary> {
        let pattern = file.library()?.get(&file.pattern)?;
        if advance_every.is_some() && !pattern.is_moving() {
            bail!("--advance-every needs a moving pattern, '{}' is static", pattern.name());
        }

        let session = SessionController::new(file.session.clone(), Arc::clone(&pattern));
        session.register_cards(file.load_cards(base_dir)?)?;
        let game_id = session.start_game()?;
        let text = self.format == OutputFormat::Text;
        if text {
            writeln!(out, "game {game_id}: pattern {} with {} cards", pattern.name(), session.card_count())?;
        }

        loop {
            let record = match session.call_next() {
                Ok(record) => record,
                Err(err) => {
                    warn!(%err, "Calling stopped");
                    break;
                }
            };
            if text {
                writeln!(out, "{:>2}. {}", record.index, record.label())?;
            }
            let advance = advance_every.is_some_and(|every| every > 0 && record.index as usize % every == 0);
            if advance {
                let phase = session.advance_pattern_phase()?;
                if text {
                    writeln!(out, "    phase -> {phase}")?;
                }
            }

            let candidates = session.scan_winners()?;
            if candidates.is_empty() {
                continue;
            }
            self.claim_all(&session, &candidates, out)?;
            if session.config().win_policy != WinPolicy::KeepCalling {
                break;
            }
        }

        let summary = session.end_game()?;
        if text {
            writeln!(out, "outcome: {:?} after {} calls", summary.outcome, summary.calls.len())?;
            write!(out, "{}", session.stats())?;
        } else {
            writeln!(out, "{}", summary_to_json(&summary)?)?;
        }
        Ok(summary)
    }

    /// Put every candidate through the session's verification, as an operator would
    fn claim_all(
        &self,
        session: &SessionController,
        candidates: &[WinDetail],
        out: &mut impl Write,
    ) -> Result<()> {
        let already: Vec<CardId> = session.winners().into_iter().map(|w| w.card_id).collect();
        for candidate in candidates.iter().filter(|c| !already.contains(&c.card_id)) {
            let verdict = session.verify(&candidate.card_id)?;
            if self.format == OutputFormat::Text {
                writeln!(out, "    {verdict}")?;
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn verify_offline(
        &self,
        file: &SessionFile,
        base_dir: &Path,
        card_id: &str,
        calls: &[u8],
        pattern: Option<&str>,
        phase: u64,
        out: &mut impl Write,
    ) -> Result<()> {
        let pattern = file.library()?.get(pattern.unwrap_or(&file.pattern))?;
        let cards = file.load_cards(base_dir)?;
        let called = CalledSet::from_sequence(calls.iter().copied())?;
        let engine = MatchEngine::new(file.session.report_all_satisfied);

        let verdict =
            engine.evaluate_claim(cards.as_slice(), &CardId::from(card_id), &called, &pattern, phase);
        match self.format {
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&verdict)?)?,
            OutputFormat::Text => {
                writeln!(out, "{verdict}")?;
                if let Verdict::Win(detail) = &verdict {
                    write!(out, "{}", detail.matched.shape)?;
                }
            }
        }
        Ok(())
    }

    fn audit(
        &self,
        file: &SessionFile,
        base_dir: &Path,
        summary_path: &Path,
        out: &mut impl Write,
    ) -> Result<()> {
        let json = fs::read_to_string(summary_path)
            .with_context(|| format!("cannot read {}", summary_path.display()))?;
        let summary = summary_from_json(&json)?;
        let pattern = file.library()?.get(&summary.pattern)?;
        let cards = if summary.carries_winning_cards() {
            summary.winning_cards.clone()
        } else {
            warn!("Summary does not carry the winning grids, replaying against the session deck");
            file.load_cards(base_dir)?
        };

        let failed =
            audit_summary(&MatchEngine::default(), cards.as_slice(), &pattern, &summary)?;
        match self.format {
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&failed)?)?,
            OutputFormat::Text => {
                writeln!(
                    out,
                    "game {}: {} winners, {} confirmed",
                    summary.game_id,
                    summary.winners.len(),
                    summary.winners.len() - failed.len()
                )?;
                for card_id in &failed {
                    writeln!(out, "  NOT CONFIRMED: {card_id}")?;
                }
            }
        }
        if !failed.is_empty() {
            bail!("{} recorded wins did not replay", failed.len());
        }
        Ok(())
    }
}
