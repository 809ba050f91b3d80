use crate::filter::{DropReason, LopsidedBranch};

/// Per-branch counters for the lopsided-evaluation stage. All six share the
/// one-good-move reason family.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LopsidedCounters {
    pub balanced_vs_losing: u64,
    pub winning_vs_equalizing: u64,
    pub opposite_both_far: u64,
    pub opposite_score_gap: u64,
    pub opposite_both_far_strict: u64,
    pub opposite_score_gap_strict: u64,
}

impl LopsidedCounters {
    fn count(&mut self, branch: LopsidedBranch) {
        match branch {
            LopsidedBranch::BalancedVsLosing => self.balanced_vs_losing += 1,
            LopsidedBranch::WinningVsEqualizing => self.winning_vs_equalizing += 1,
            LopsidedBranch::OppositeBothFar => self.opposite_both_far += 1,
            LopsidedBranch::OppositeScoreGap => self.opposite_score_gap += 1,
            LopsidedBranch::OppositeBothFarStrict => self.opposite_both_far_strict += 1,
            LopsidedBranch::OppositeScoreGapStrict => self.opposite_score_gap_strict += 1,
        }
    }

    pub fn loose_total(&self) -> u64 {
        self.balanced_vs_losing
            + self.winning_vs_equalizing
            + self.opposite_both_far
            + self.opposite_score_gap
    }

    pub fn strict_total(&self) -> u64 {
        self.opposite_both_far_strict + self.opposite_score_gap_strict
    }

    pub fn total(&self) -> u64 {
        self.loose_total() + self.strict_total()
    }
}

/// Counters for one run. Observability only: nothing here feeds back into
/// filtering decisions or output content.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineStats {
    pub games: u64,
    pub standard_games: u64,
    pub non_standard_games: u64,

    pub positions: u64,
    pub kept: u64,

    // filtering based on record data alone
    pub start_positions: u64,
    pub early_plies: u64,
    pub only_one_move: u64,
    pub lopsided: LopsidedCounters,

    // filtering based on placements seen
    pub seen_before: u64,

    // filtering based on move types
    pub in_check: u64,
    pub bestmove_promotions: u64,
    pub bestmove_captures: u64,
    pub bestmove_en_passant: u64,
    pub first_choice_tactical: u64,
    pub second_choice_tactical: u64,

    // per-record failures
    pub parse_errors: u64,
    pub oracle_errors: u64,

    // chain repair
    pub chain_faults: u64,
    pub chain_breaks: u64,
    pub moves_rederived: u64,
    pub sentinel_scores: u64,
}

impl PipelineStats {
    pub fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::OnlyOneLegalMove => self.only_one_move += 1,
            DropReason::GameStart => self.start_positions += 1,
            DropReason::OpeningPhase => self.early_plies += 1,
            DropReason::OneGoodMove(branch) => self.lopsided.count(branch),
            DropReason::BestMovePromotion => self.bestmove_promotions += 1,
            DropReason::Duplicate => self.seen_before += 1,
            DropReason::InCheck => self.in_check += 1,
            DropReason::BestMoveCapture => self.bestmove_captures += 1,
            DropReason::BestMoveEnPassant => self.bestmove_en_passant += 1,
            DropReason::FirstChoiceTactical => self.first_choice_tactical += 1,
            DropReason::SecondChoiceTactical => self.second_choice_tactical += 1,
        }
    }

    /// Records rejected by the cascade, summed over every reason.
    pub fn dropped_total(&self) -> u64 {
        self.start_positions
            + self.early_plies
            + self.only_one_move
            + self.lopsided.total()
            + self.seen_before
            + self.in_check
            + self.bestmove_promotions
            + self.bestmove_captures
            + self.bestmove_en_passant
            + self.first_choice_tactical
            + self.second_choice_tactical
    }

    pub fn kept_percent(&self) -> f64 {
        if self.positions == 0 {
            0.0
        } else {
            self.kept as f64 / self.positions as f64 * 100.0
        }
    }

    /// Renders the aligned statistics block.
    pub fn report(&self) -> String {
        let lines = [
            format!("Processed {} positions", self.positions),
            format!("  # games:                       {:8}", self.games),
            format!("    # standard games:            {:8}", self.standard_games),
            format!("    # non-standard games:        {:8}", self.non_standard_games),
            format!("  # positions:                   {:8}", self.positions),
            format!("    # startpos:                  {:8}", self.start_positions),
            format!("    # early plies:               {:8}", self.early_plies),
            format!("    # only one move:             {:8}", self.only_one_move),
            format!("    # one good move:             {:8}", self.lopsided.loose_total()),
            format!("    # one good move (strict):    {:8}", self.lopsided.strict_total()),
            format!("    # seen before:               {:8}", self.seen_before),
            format!("    # in check:                  {:8}", self.in_check),
            format!("    # bestmove promos:           {:8}", self.bestmove_promotions),
            format!("    # bestmove captures:         {:8}", self.bestmove_captures),
            format!("    # bestmove en passant:       {:8}", self.bestmove_en_passant),
            format!("    # 1st choice cap/promos:     {:8}", self.first_choice_tactical),
            format!("    # 2nd choice cap/promos:     {:8}", self.second_choice_tactical),
            format!("    # parse errors:              {:8}", self.parse_errors),
            format!("    # oracle errors:             {:8}", self.oracle_errors),
            format!("    # moves re-derived:          {:8}", self.moves_rederived),
            format!("    # sentinel scores:           {:8}", self.sentinel_scores),
            format!("    # chain breaks:              {:8}", self.chain_breaks),
            format!("    # faulted games:             {:8}", self.chain_faults),
            format!("  # positions kept:              {:8}", self.kept),
            format!("    % positions kept:            {:8.1}", self.kept_percent()),
        ];
        lines.join("\n")
    }
}
