//! # Chess Corpus Filter
//!
//! A streaming pipeline that turns raw chess-engine self-play search logs
//! into curated `.plain` training corpora for evaluation networks.
//!
//! Each input line describes one position reached during self-play together
//! with the engine's two ranked continuations and their scores. In a single
//! strictly ordered pass the pipeline:
//!
//! - reconstructs game boundaries from the ply sequence alone,
//! - rejects uninformative positions through an ordered, configurable
//!   filter cascade (opening phase, tactically forced, promotions,
//!   captures, checks),
//! - deduplicates piece placements across every file of the run,
//! - repairs move chains so consecutive emitted positions stay connected by
//!   a single legal move, sentinel-scoring positions retained only for
//!   chain continuity, and
//! - emits the survivors in the block text format consumed by the external
//!   binpack encoder.
//!
//! ## Quick Start
//!
//! ```rust
//! use chess_corpus_filter::{PipelineConfig, PipelineDriver};
//!
//! let input = "\
//! 0,rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1,g1f3,15,1/2-1/2,d9,g1f3,15,d2d4,11\n\
//! 1,rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R b KQkq - 1 1,g8f6,-12,1/2-1/2,d9,g8f6,-12,d7d5,-18\n";
//!
//! let mut driver = PipelineDriver::new(PipelineConfig::default());
//! let mut corpus = Vec::new();
//! driver.process(input.as_bytes(), &mut corpus).unwrap();
//!
//! assert_eq!(driver.stats().games, 1);
//! assert_eq!(driver.stats().standard_games, 1);
//! assert_eq!(driver.stats().positions, 2);
//! // Both records fall inside the opening phase, so nothing is emitted
//! assert!(corpus.is_empty());
//! ```
//!
//! The `curate` binary wraps the library with glob-based input discovery
//! (most-recent-first, so the shared dedup index favors newer data),
//! completed-output detection, transparent zstd decompression, and optional
//! invocation of the external encoder.

// Core modules
pub mod errors;

pub mod boundary;
pub mod chain;
pub mod dedup;
pub mod discovery;
pub mod filter;
pub mod oracle;
pub mod pipeline;
pub mod record;
pub mod stats;
pub mod writer;

// Re-export commonly used types
pub use boundary::GameBoundaryTracker;
pub use chain::{repair_game, RepairOutcome, SENTINEL_SCORE};
pub use dedup::{fingerprint, DedupIndex};
pub use discovery::{discover_inputs, open_input, InputFile};
pub use errors::{CurateError, Result};
pub use filter::{
    Candidate, DropReason, FilterCascade, FilterConfig, LopsidedBranch, LopsidedThresholds,
    StrictThresholds,
};
pub use oracle::START_PLACEMENT;
pub use pipeline::{PipelineConfig, PipelineDriver};
pub use record::{parse_record, ParsedLine, PositionRecord, SearchChoice};
pub use stats::{LopsidedCounters, PipelineStats};
pub use writer::PlainWriter;
