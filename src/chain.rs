use crate::errors::{CurateError, Result};
use crate::filter::Candidate;
use crate::oracle;

/// Score written for positions that are kept only to preserve a game's move
/// chain. The downstream encoder treats it as "no training target" and
/// excludes the position from loss computation.
pub const SENTINEL_SCORE: i32 = 32002;

/// What one repair pass did to a game buffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RepairOutcome {
    /// Moves replaced because the recorded move did not reach the next position
    pub moves_rederived: u64,
    /// Retained positions whose score became the sentinel
    pub sentinel_scores: u64,
    /// Pairs left unlinked because filtering removed the plies between them
    pub chain_breaks: u64,
}

/// Ensures adjacent positions in a flushed game buffer are linked by a
/// single legal move.
///
/// The downstream encoder reconstructs positions incrementally from a
/// starting FEN plus a move sequence, so each block's move must reach the
/// next block's position exactly. When the recorded move does not, the
/// linking move is re-derived by scanning the legal moves in generation
/// order. A pair of consecutive plies with no linking move at all means the
/// stream was not a contiguous game; that fault is fatal for this game's
/// output only.
pub fn repair_game(positions: &mut [Candidate]) -> Result<RepairOutcome> {
    let mut outcome = RepairOutcome::default();

    for i in 0..positions.len().saturating_sub(1) {
        let current = oracle::board_from_fen(&positions[i].record.fen)?;
        let next = oracle::board_from_fen(&positions[i + 1].record.fen)?;

        let reached = oracle::parse_uci_move(&positions[i].record.best_move)
            .ok()
            .and_then(|mv| oracle::apply_move(&current, mv));
        if reached.as_ref() == Some(&next) {
            continue;
        }

        if let Some(link) = oracle::find_linking_move(&current, &next) {
            positions[i].record.best_move = link.to_string();
            outcome.moves_rederived += 1;
            continue;
        }

        // A removed position between the two leaves a ply gap no single
        // move can span; the encoder starts a new chain there
        if positions[i + 1].record.ply != positions[i].record.ply + 1 {
            outcome.chain_breaks += 1;
            continue;
        }

        return Err(CurateError::ChainRepair {
            ply_from: positions[i].record.ply,
            ply_to: positions[i + 1].record.ply,
            fen_from: positions[i].record.fen.clone(),
            fen_to: positions[i + 1].record.fen.clone(),
        });
    }

    // A retained position is never a training target, wherever it sits
    for candidate in positions.iter_mut().filter(|c| !c.keep) {
        candidate.record.best_score = SENTINEL_SCORE;
        outcome.sentinel_scores += 1;
    }

    Ok(outcome)
}
