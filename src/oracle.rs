//! Thin wrapper around the `chess` crate: every question the pipeline asks
//! about positions and moves goes through here.

use chess::{Board, ChessMove, MoveGen, Piece};
use std::str::FromStr;

use crate::errors::{CurateError, Result};

/// Piece placement of the standard starting position.
pub const START_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

pub fn board_from_fen(fen: &str) -> Result<Board> {
    Board::from_str(fen).map_err(|error| CurateError::Oracle {
        context: format!("invalid fen '{}': {}", fen, error),
    })
}

pub fn parse_uci_move(uci: &str) -> Result<ChessMove> {
    ChessMove::from_str(uci).map_err(|error| CurateError::Oracle {
        context: format!("invalid move '{}': {}", uci, error),
    })
}

/// A five-character coordinate move ending in a piece letter is a promotion.
pub fn uci_is_promotion(uci: &str) -> bool {
    uci.len() == 5 && matches!(uci.as_bytes()[4], b'n' | b'b' | b'r' | b'q')
}

pub fn in_check(board: &Board) -> bool {
    board.checkers().popcnt() > 0
}

/// A pawn moving diagonally onto an empty square is capturing en passant.
pub fn is_en_passant_capture(board: &Board, mv: ChessMove) -> bool {
    board.piece_on(mv.get_source()) == Some(Piece::Pawn)
        && mv.get_source().get_file() != mv.get_dest().get_file()
        && board.piece_on(mv.get_dest()).is_none()
}

/// Captures include en passant, where the destination square is empty.
pub fn is_capture(board: &Board, mv: ChessMove) -> bool {
    board.piece_on(mv.get_dest()).is_some() || is_en_passant_capture(board, mv)
}

/// Applies a move if it is legal in the position.
pub fn apply_move(board: &Board, mv: ChessMove) -> Option<Board> {
    if board.legal(mv) {
        Some(board.make_move_new(mv))
    } else {
        None
    }
}

/// First legal move, in generation order, whose application transforms
/// `from` into `to`. Generation order is fixed, so repair is reproducible.
pub fn find_linking_move(from: &Board, to: &Board) -> Option<ChessMove> {
    MoveGen::new_legal(from).find(|mv| from.make_move_new(*mv) == *to)
}
