use std::io::{self, Write};

use crate::filter::Candidate;

/// Serializes chain-repaired game buffers into the block text format
/// consumed by the external encoder: five `key value` lines per position,
/// terminated by an `e` line, blocks concatenated without separators.
pub struct PlainWriter<W: Write> {
    out: W,
}

impl<W: Write> PlainWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_game(&mut self, positions: &[Candidate]) -> io::Result<()> {
        for candidate in positions {
            let record = &candidate.record;
            writeln!(self.out, "fen {}", record.fen)?;
            writeln!(self.out, "score {}", record.best_score)?;
            writeln!(self.out, "move {}", record.best_move)?;
            writeln!(self.out, "ply {}", record.ply)?;
            writeln!(self.out, "result {}", record.game_result)?;
            writeln!(self.out, "e")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
