use std::io::{Read, Write};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::boundary::GameBoundaryTracker;
use crate::chain;
use crate::dedup::{fingerprint, DedupIndex};
use crate::errors::{CurateError, Result};
use crate::filter::{Candidate, DropReason, FilterCascade, FilterConfig};
use crate::oracle::START_PLACEMENT;
use crate::record::{parse_record, ParsedLine, PositionRecord};
use crate::stats::PipelineStats;
use crate::writer::PlainWriter;

/// Run-level configuration: the filter policy plus the pipeline's own knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub filter: FilterConfig,
    /// Reject positions whose placement was already seen during the run
    pub dedup: bool,
    /// Buffer rejected positions, sentinel-scored, so game chains stay
    /// connected for the downstream encoder. With this off, rejected
    /// positions vanish and the encoder restarts a chain at every gap.
    pub retain_for_chain: bool,
    /// Flush the game buffer every this many processed records, bounding
    /// memory when a malformed stream never yields a boundary; 0 disables
    pub flush_interval: u64,
    /// Show a progress spinner while processing
    pub progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            dedup: true,
            retain_for_chain: true,
            flush_interval: 100_000,
            progress: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_dedup(mut self, enabled: bool) -> Self {
        self.dedup = enabled;
        self
    }

    pub fn with_retention(mut self, enabled: bool) -> Self {
        self.retain_for_chain = enabled;
        self
    }

    pub fn with_flush_interval(mut self, records: u64) -> Self {
        self.flush_interval = records;
        self
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }
}

/// Owns the cascade, the dedup index, and the statistics for one run, and
/// drives one strictly ordered pass per input stream.
///
/// The dedup index and the statistics persist across `process` calls, so
/// feeding files most-recent-first makes later-dated data win duplicate
/// conflicts. Boundary detection and the game buffer reset per stream.
pub struct PipelineDriver {
    config: PipelineConfig,
    cascade: FilterCascade,
    dedup: DedupIndex,
    stats: PipelineStats,
}

impl PipelineDriver {
    pub fn new(config: PipelineConfig) -> Self {
        let cascade = FilterCascade::new(config.filter.clone());
        Self {
            config,
            cascade,
            dedup: DedupIndex::new(),
            stats: PipelineStats::default(),
        }
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn dedup_index(&self) -> &DedupIndex {
        &self.dedup
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one pass over a decoded record stream, writing block text for
    /// every game as it completes. Per-record failures are counted and
    /// skipped; only I/O failures abort the pass.
    pub fn process<R: Read, W: Write>(&mut self, input: R, output: W) -> Result<()> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input);
        let mut writer = PlainWriter::new(output);
        let mut tracker = GameBoundaryTracker::new();
        let mut buffer: Vec<Candidate> = Vec::new();

        let progress = self.spinner()?;

        for row in reader.records() {
            self.stats.positions += 1;
            if let Some(pb) = &progress {
                pb.inc(1);
            }

            match row {
                Ok(record) => match parse_record(&record) {
                    Ok(ParsedLine::SingleLegalMove) => {
                        self.stats.record_drop(DropReason::OnlyOneLegalMove);
                    }
                    Ok(ParsedLine::Position(position)) => {
                        self.step(position, &mut tracker, &mut buffer, &mut writer)?;
                    }
                    Err(error) => self.note_parse_error(&error),
                },
                Err(error) => self.note_parse_error(&CurateError::from(error)),
            }

            if self.config.flush_interval > 0
                && self.stats.positions % self.config.flush_interval == 0
            {
                // Mid-game memory bound; not a game boundary for statistics
                self.flush(&mut buffer, &mut writer)?;
                if let Some(pb) = &progress {
                    pb.set_message(self.progress_message());
                }
            }
        }

        self.flush(&mut buffer, &mut writer)?;
        writer.flush()?;
        if let Some(pb) = &progress {
            pb.finish_with_message(self.progress_message());
        }
        Ok(())
    }

    /// Boundary handling and cascade evaluation for one decoded record.
    fn step<W: Write>(
        &mut self,
        position: PositionRecord,
        tracker: &mut GameBoundaryTracker,
        buffer: &mut Vec<Candidate>,
        writer: &mut PlainWriter<W>,
    ) -> Result<()> {
        let is_game_start = tracker.observe(position.ply);
        if is_game_start {
            // The previous game is complete; emit it before touching state
            self.flush(buffer, writer)?;
            self.stats.games += 1;
            if fingerprint(&position.fen) == START_PLACEMENT {
                self.stats.standard_games += 1;
            } else {
                self.stats.non_standard_games += 1;
            }
        }

        let dedup = if self.config.dedup {
            Some(&mut self.dedup)
        } else {
            None
        };

        match self.cascade.evaluate(position, is_game_start, dedup) {
            Ok(candidate) => {
                if let Some(reason) = candidate.drop_reason {
                    self.stats.record_drop(reason);
                    if self.config.retain_for_chain && reason.retainable() {
                        buffer.push(candidate);
                    }
                } else {
                    self.stats.kept += 1;
                    buffer.push(candidate);
                }
            }
            Err(error) => {
                self.stats.oracle_errors += 1;
                eprintln!("skipping record: {}", error);
            }
        }

        Ok(())
    }

    /// Repairs and writes whatever the buffer holds, then clears it. A
    /// chain fault costs this game's output, never the run.
    fn flush<W: Write>(
        &mut self,
        buffer: &mut Vec<Candidate>,
        writer: &mut PlainWriter<W>,
    ) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }

        match chain::repair_game(buffer) {
            Ok(outcome) => {
                self.stats.moves_rederived += outcome.moves_rederived;
                self.stats.sentinel_scores += outcome.sentinel_scores;
                self.stats.chain_breaks += outcome.chain_breaks;
                writer.write_game(buffer)?;
            }
            Err(error) => {
                self.stats.chain_faults += 1;
                eprintln!("dropping output of game {}: {}", self.stats.games, error);
            }
        }

        buffer.clear();
        Ok(())
    }

    fn note_parse_error(&mut self, error: &CurateError) {
        self.stats.parse_errors += 1;
        eprintln!("skipping malformed record: {}", error);
    }

    fn spinner(&self) -> Result<Option<ProgressBar>> {
        if !self.config.progress {
            return Ok(None);
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner().template("{spinner:.green} {pos} records {msg}")?,
        );
        Ok(Some(pb))
    }

    fn progress_message(&self) -> String {
        format!(
            "| {} kept, {} games, {} unique placements",
            self.stats.kept,
            self.stats.games,
            self.dedup.len()
        )
    }
}
