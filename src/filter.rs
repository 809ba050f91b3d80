use serde::{Deserialize, Serialize};

use crate::dedup::{fingerprint, DedupIndex};
use crate::errors::Result;
use crate::oracle;
use crate::record::PositionRecord;

/// Score thresholds for the lopsided-evaluation stage, in centipawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LopsidedThresholds {
    /// A score whose magnitude stays below this is "roughly equal"
    pub near: i32,
    /// A score whose magnitude exceeds this is "decisive"
    pub far: i32,
    /// Largest score gap tolerated when the two choices favor opposite sides
    pub opposite_score_gap: i32,
}

/// Tighter second pass applied inside the opposite-sides branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrictThresholds {
    pub far: i32,
    pub opposite_score_gap: i32,
}

/// Which branch of the lopsided-evaluation stage matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LopsidedBranch {
    /// Best move roughly equal, second choice loses
    BalancedVsLosing,
    /// Best move already winning, second choice equalizes
    WinningVsEqualizing,
    /// Choices favor opposite sides and both scores are decisive
    OppositeBothFar,
    /// Choices favor opposite sides with a large score gap
    OppositeScoreGap,
    OppositeBothFarStrict,
    OppositeScoreGapStrict,
}

/// Why the cascade rejected a record. Reasons are mutually exclusive: the
/// first matching stage wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    OnlyOneLegalMove,
    GameStart,
    OpeningPhase,
    /// One good move: the position is tactically forced, hence
    /// uninformative for a positional evaluator
    OneGoodMove(LopsidedBranch),
    BestMovePromotion,
    Duplicate,
    InCheck,
    BestMoveCapture,
    BestMoveEnPassant,
    FirstChoiceTactical,
    SecondChoiceTactical,
}

impl DropReason {
    /// Whether a position rejected for this reason may still be buffered
    /// for chain continuity. Boundary and opening records never are: a
    /// game's output chain begins after the opening phase.
    pub fn retainable(&self) -> bool {
        !matches!(
            self,
            DropReason::OnlyOneLegalMove | DropReason::GameStart | DropReason::OpeningPhase
        )
    }
}

/// Cascade configuration. A filter policy is one value of this struct;
/// policies differ in data, never in code paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Plies at or below this are opening phase and rejected
    pub early_ply_skip: u32,
    pub loose: LopsidedThresholds,
    /// Tighter opposite-sides pass; `None` disables the stage
    pub strict: Option<StrictThresholds>,
    /// Track en-passant best-move captures under their own reason
    pub distinguish_en_passant: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            early_ply_skip: 28,
            loose: LopsidedThresholds {
                near: 100,
                far: 150,
                opposite_score_gap: 200,
            },
            strict: Some(StrictThresholds {
                far: 100,
                opposite_score_gap: 150,
            }),
            distinguish_en_passant: true,
        }
    }
}

impl FilterConfig {
    pub fn with_early_ply_skip(mut self, plies: u32) -> Self {
        self.early_ply_skip = plies;
        self
    }

    pub fn with_loose_thresholds(mut self, thresholds: LopsidedThresholds) -> Self {
        self.loose = thresholds;
        self
    }

    pub fn with_strict_thresholds(mut self, thresholds: Option<StrictThresholds>) -> Self {
        self.strict = thresholds;
        self
    }

    pub fn with_en_passant_tracking(mut self, enabled: bool) -> Self {
        self.distinguish_en_passant = enabled;
        self
    }
}

/// A record annotated with the cascade's verdict.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub record: PositionRecord,
    pub keep: bool,
    pub drop_reason: Option<DropReason>,
}

impl Candidate {
    pub fn kept(record: PositionRecord) -> Self {
        Self {
            record,
            keep: true,
            drop_reason: None,
        }
    }

    pub fn dropped(record: PositionRecord, reason: DropReason) -> Self {
        Self {
            record,
            keep: false,
            drop_reason: Some(reason),
        }
    }
}

/// Ordered predicate chain producing one keep/drop verdict per record.
pub struct FilterCascade {
    config: FilterConfig,
}

impl FilterCascade {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Runs the cascade over a decoded record. The single-legal-move stage
    /// already fired at parse time; the remaining stages run in fixed order
    /// and the first match wins. The fingerprint is registered with the
    /// index up front, before any stage can short-circuit, so the index
    /// sees every well-formed record exactly once.
    pub fn evaluate(
        &self,
        record: PositionRecord,
        is_game_start: bool,
        dedup: Option<&mut DedupIndex>,
    ) -> Result<Candidate> {
        let seen_before = match dedup {
            Some(index) => index.check_and_insert(fingerprint(&record.fen)),
            None => false,
        };

        if is_game_start {
            return Ok(Candidate::dropped(record, DropReason::GameStart));
        }
        if record.ply <= self.config.early_ply_skip {
            return Ok(Candidate::dropped(record, DropReason::OpeningPhase));
        }
        if let Some(branch) =
            self.lopsided_branch(record.first_choice.score, record.second_choice.score)
        {
            return Ok(Candidate::dropped(record, DropReason::OneGoodMove(branch)));
        }
        if oracle::uci_is_promotion(&record.best_move) {
            return Ok(Candidate::dropped(record, DropReason::BestMovePromotion));
        }
        if seen_before {
            return Ok(Candidate::dropped(record, DropReason::Duplicate));
        }

        // The remaining stages need the position itself
        let board = oracle::board_from_fen(&record.fen)?;
        if oracle::in_check(&board) {
            return Ok(Candidate::dropped(record, DropReason::InCheck));
        }

        let best = oracle::parse_uci_move(&record.best_move)?;
        if self.config.distinguish_en_passant && oracle::is_en_passant_capture(&board, best) {
            return Ok(Candidate::dropped(record, DropReason::BestMoveEnPassant));
        }
        if oracle::is_capture(&board, best) {
            return Ok(Candidate::dropped(record, DropReason::BestMoveCapture));
        }

        let first = oracle::parse_uci_move(&record.first_choice.uci)?;
        if oracle::is_capture(&board, first) || oracle::uci_is_promotion(&record.first_choice.uci) {
            return Ok(Candidate::dropped(record, DropReason::FirstChoiceTactical));
        }
        let second = oracle::parse_uci_move(&record.second_choice.uci)?;
        if oracle::is_capture(&board, second) || oracle::uci_is_promotion(&record.second_choice.uci)
        {
            return Ok(Candidate::dropped(record, DropReason::SecondChoiceTactical));
        }

        Ok(Candidate::kept(record))
    }

    /// Lopsided-evaluation decision over the two ranked continuation scores.
    fn lopsided_branch(&self, s1: i32, s2: i32) -> Option<LopsidedBranch> {
        let loose = self.config.loose;

        if s1.abs() < loose.near && s2.abs() > loose.far {
            return Some(LopsidedBranch::BalancedVsLosing);
        }
        if s1.abs() > loose.far && s2.abs() < loose.near {
            return Some(LopsidedBranch::WinningVsEqualizing);
        }

        // The two choices favor opposite sides
        if (s1 > 0) != (s2 > 0) {
            if s1.abs() > loose.far && s2.abs() > loose.far {
                return Some(LopsidedBranch::OppositeBothFar);
            }
            if (s1 - s2).abs() > loose.opposite_score_gap {
                return Some(LopsidedBranch::OppositeScoreGap);
            }
            if let Some(strict) = self.config.strict {
                if s1.abs() > strict.far && s2.abs() > strict.far {
                    return Some(LopsidedBranch::OppositeBothFarStrict);
                }
                if (s1 - s2).abs() > strict.opposite_score_gap {
                    return Some(LopsidedBranch::OppositeScoreGapStrict);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A quiet middlegame position: white knight f3 vs black knight f6,
    // nobody in check, no captures available to the listed moves
    const QUIET_FEN: &str = "rnbqkb1r/pppppppp/5n2/8/8/5N2/PPPPPPPP/RNBQKB1R w KQkq - 2 2";

    fn quiet_record(ply: u32, s1: i32, s2: i32) -> PositionRecord {
        PositionRecord {
            ply,
            fen: QUIET_FEN.to_string(),
            best_move: "b1c3".to_string(),
            best_score: s1,
            game_result: "1/2-1/2".to_string(),
            search_method: "d9".to_string(),
            first_choice: crate::record::SearchChoice {
                uci: "b1c3".to_string(),
                score: s1,
            },
            second_choice: crate::record::SearchChoice {
                uci: "d2d4".to_string(),
                score: s2,
            },
        }
    }

    fn cascade() -> FilterCascade {
        FilterCascade::new(FilterConfig::default())
    }

    fn reason(candidate: &Candidate) -> Option<DropReason> {
        candidate.drop_reason
    }

    #[test]
    fn test_quiet_record_is_kept() {
        let candidate = cascade()
            .evaluate(quiet_record(40, 30, 20), false, None)
            .unwrap();
        assert!(candidate.keep);
        assert_eq!(candidate.drop_reason, None);
    }

    #[test]
    fn test_game_start_beats_every_other_stage() {
        // Scores that would otherwise match the lopsided stage
        let candidate = cascade()
            .evaluate(quiet_record(40, 0, 500), true, None)
            .unwrap();
        assert_eq!(reason(&candidate), Some(DropReason::GameStart));
    }

    #[test]
    fn test_opening_phase() {
        let candidate = cascade()
            .evaluate(quiet_record(28, 30, 20), false, None)
            .unwrap();
        assert_eq!(reason(&candidate), Some(DropReason::OpeningPhase));

        let candidate = cascade()
            .evaluate(quiet_record(29, 30, 20), false, None)
            .unwrap();
        assert!(candidate.keep);
    }

    #[test]
    fn test_threshold_boundaries_are_strict_inequalities() {
        // (99, 151): best roughly equal, second loses
        let candidate = cascade()
            .evaluate(quiet_record(40, 99, 151), false, None)
            .unwrap();
        assert_eq!(
            reason(&candidate),
            Some(DropReason::OneGoodMove(LopsidedBranch::BalancedVsLosing))
        );

        // (100, 150): neither magnitude clears its threshold
        let candidate = cascade()
            .evaluate(quiet_record(40, 100, 150), false, None)
            .unwrap();
        assert!(candidate.keep);
    }

    #[test]
    fn test_winning_vs_equalizing_branch() {
        let candidate = cascade()
            .evaluate(quiet_record(40, 200, 50), false, None)
            .unwrap();
        assert_eq!(
            reason(&candidate),
            Some(DropReason::OneGoodMove(LopsidedBranch::WinningVsEqualizing))
        );
    }

    #[test]
    fn test_opposite_side_branches() {
        let candidate = cascade()
            .evaluate(quiet_record(40, 160, -160), false, None)
            .unwrap();
        assert_eq!(
            reason(&candidate),
            Some(DropReason::OneGoodMove(LopsidedBranch::OppositeBothFar))
        );

        let candidate = cascade()
            .evaluate(quiet_record(40, 130, -110), false, None)
            .unwrap();
        assert_eq!(
            reason(&candidate),
            Some(DropReason::OneGoodMove(LopsidedBranch::OppositeScoreGap))
        );

        // Within the loose gap but past the strict thresholds
        let candidate = cascade()
            .evaluate(quiet_record(40, 110, -85), false, None)
            .unwrap();
        assert_eq!(
            reason(&candidate),
            Some(DropReason::OneGoodMove(
                LopsidedBranch::OppositeScoreGapStrict
            ))
        );

        // With the default 200 gap, opposite signs and both magnitudes over
        // 100 always exceed the loose gap first; widen it to reach the
        // strict both-far branch
        let cascade = FilterCascade::new(FilterConfig::default().with_loose_thresholds(
            LopsidedThresholds {
                near: 100,
                far: 150,
                opposite_score_gap: 300,
            },
        ));
        let candidate = cascade
            .evaluate(quiet_record(40, 110, -110), false, None)
            .unwrap();
        assert_eq!(
            reason(&candidate),
            Some(DropReason::OneGoodMove(LopsidedBranch::OppositeBothFarStrict))
        );
    }

    #[test]
    fn test_strict_stage_can_be_disabled() {
        let cascade =
            FilterCascade::new(FilterConfig::default().with_strict_thresholds(None));
        let candidate = cascade
            .evaluate(quiet_record(40, 110, -85), false, None)
            .unwrap();
        assert!(candidate.keep);
    }

    #[test]
    fn test_best_move_promotion() {
        let mut record = quiet_record(40, 30, 20);
        record.best_move = "e7e8q".to_string();
        let candidate = cascade().evaluate(record, false, None).unwrap();
        assert_eq!(reason(&candidate), Some(DropReason::BestMovePromotion));
    }

    #[test]
    fn test_duplicate_fingerprint() {
        let mut index = DedupIndex::new();
        let cascade = cascade();

        let first = cascade
            .evaluate(quiet_record(40, 30, 20), false, Some(&mut index))
            .unwrap();
        assert!(first.keep);

        let second = cascade
            .evaluate(quiet_record(41, 30, 20), false, Some(&mut index))
            .unwrap();
        assert_eq!(reason(&second), Some(DropReason::Duplicate));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_fingerprint_registered_even_when_dropped_early() {
        let mut index = DedupIndex::new();
        let cascade = cascade();

        // Opening-phase rejection still registers the placement
        let dropped = cascade
            .evaluate(quiet_record(5, 30, 20), false, Some(&mut index))
            .unwrap();
        assert_eq!(reason(&dropped), Some(DropReason::OpeningPhase));
        assert_eq!(index.len(), 1);

        let later = cascade
            .evaluate(quiet_record(40, 30, 20), false, Some(&mut index))
            .unwrap();
        assert_eq!(reason(&later), Some(DropReason::Duplicate));
    }

    #[test]
    fn test_in_check_positions_are_rejected() {
        let mut record = quiet_record(40, 30, 20);
        // Scholar's-mate style check against black
        record.fen = "rnbqkbnr/ppppp1pp/8/5p1Q/4P3/8/PPPP1PPP/RNB1KBNR b KQkq - 1 2".to_string();
        record.best_move = "g7g6".to_string();
        let candidate = cascade().evaluate(record, false, None).unwrap();
        assert_eq!(reason(&candidate), Some(DropReason::InCheck));
    }

    #[test]
    fn test_best_move_capture_and_en_passant() {
        let mut record = quiet_record(40, 30, 20);
        record.fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2".to_string();
        record.best_move = "e4d5".to_string();
        let candidate = cascade().evaluate(record, false, None).unwrap();
        assert_eq!(reason(&candidate), Some(DropReason::BestMoveCapture));

        let mut record = quiet_record(40, 30, 20);
        record.fen =
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3".to_string();
        record.best_move = "e5f6".to_string();
        let candidate = cascade().evaluate(record, false, None).unwrap();
        assert_eq!(reason(&candidate), Some(DropReason::BestMoveEnPassant));

        // With the distinction disabled it counts as an ordinary capture
        let cascade = FilterCascade::new(FilterConfig::default().with_en_passant_tracking(false));
        let mut record = quiet_record(40, 30, 20);
        record.fen =
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3".to_string();
        record.best_move = "e5f6".to_string();
        let candidate = cascade.evaluate(record, false, None).unwrap();
        assert_eq!(reason(&candidate), Some(DropReason::BestMoveCapture));
    }

    #[test]
    fn test_tactical_search_choices_are_rejected() {
        let mut record = quiet_record(40, 30, 20);
        record.fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2".to_string();
        record.best_move = "b1c3".to_string();
        record.first_choice.uci = "e4d5".to_string();
        let candidate = cascade().evaluate(record, false, None).unwrap();
        assert_eq!(reason(&candidate), Some(DropReason::FirstChoiceTactical));

        let mut record = quiet_record(40, 30, 20);
        record.fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2".to_string();
        record.best_move = "b1c3".to_string();
        record.first_choice.uci = "g1f3".to_string();
        record.second_choice.uci = "e4d5".to_string();
        let candidate = cascade().evaluate(record, false, None).unwrap();
        assert_eq!(reason(&candidate), Some(DropReason::SecondChoiceTactical));
    }
}
