use crate::errors::{CurateError, Result};

/// One of the engine's ranked search continuations for a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchChoice {
    pub uci: String,
    pub score: i32,
}

/// A fully decoded search record for one self-play position.
///
/// `best_move`/`best_score` are the move actually played and its evaluation;
/// they are what the output blocks carry. `first_choice` and `second_choice`
/// are the engine's two ranked continuations, used only for filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRecord {
    pub ply: u32,
    pub fen: String,
    pub best_move: String,
    pub best_score: i32,
    pub game_result: String,
    pub search_method: String,
    pub first_choice: SearchChoice,
    pub second_choice: SearchChoice,
}

/// Outcome of decoding one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// A ten-field record carrying both ranked continuations
    Position(PositionRecord),
    /// An eight-field record: the position had only one legal move
    SingleLegalMove,
}

/// Decodes one CSV record into a typed position record or the
/// single-legal-move sentinel. Field counts outside {8, 10} and
/// non-numeric score/ply fields are parse errors for that line only.
pub fn parse_record(record: &csv::StringRecord) -> Result<ParsedLine> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);

    match record.len() {
        8 => Ok(ParsedLine::SingleLegalMove),
        10 => {
            let ply = parse_ply(field(record, 0), line)?;
            Ok(ParsedLine::Position(PositionRecord {
                ply,
                fen: field(record, 1).to_string(),
                best_move: field(record, 2).to_string(),
                best_score: parse_score(field(record, 3), "bestmove score", line)?,
                game_result: field(record, 4).to_string(),
                search_method: field(record, 5).to_string(),
                first_choice: SearchChoice {
                    uci: field(record, 6).to_string(),
                    score: parse_score(field(record, 7), "first choice score", line)?,
                },
                second_choice: SearchChoice {
                    uci: field(record, 8).to_string(),
                    score: parse_score(field(record, 9), "second choice score", line)?,
                },
            }))
        }
        count => Err(CurateError::Parse {
            line,
            message: format!("expected 8 or 10 fields, found {}", count),
        }),
    }
}

// Length is validated before any field access
fn field<'a>(record: &'a csv::StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("")
}

fn parse_ply(raw: &str, line: u64) -> Result<u32> {
    raw.parse::<u32>().map_err(|_| CurateError::Parse {
        line,
        message: format!("ply is not a non-negative integer: '{}'", raw),
    })
}

fn parse_score(raw: &str, name: &str, line: u64) -> Result<i32> {
    raw.parse::<i32>().map_err(|_| CurateError::Parse {
        line,
        message: format!("{} is not an integer: '{}'", name, raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_ten_field_record() {
        let record = row(&[
            "42",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "e2e4",
            "35",
            "1-0",
            "d9",
            "e2e4",
            "35",
            "d2d4",
            "28",
        ]);

        match parse_record(&record).unwrap() {
            ParsedLine::Position(position) => {
                assert_eq!(position.ply, 42);
                assert_eq!(position.best_move, "e2e4");
                assert_eq!(position.best_score, 35);
                assert_eq!(position.game_result, "1-0");
                assert_eq!(position.first_choice.score, 35);
                assert_eq!(position.second_choice.uci, "d2d4");
                assert_eq!(position.second_choice.score, 28);
            }
            other => panic!("expected a position, got {:?}", other),
        }
    }

    #[test]
    fn test_eight_field_record_is_single_move_sentinel() {
        let record = row(&[
            "7",
            "8/8/8/8/8/1k6/2q5/K7 w - - 0 1",
            "a1b1",
            "-3000",
            "0-1",
            "d9",
            "a1b1",
            "-3000",
        ]);
        assert_eq!(parse_record(&record).unwrap(), ParsedLine::SingleLegalMove);
    }

    #[test]
    fn test_bad_field_count_is_parse_error() {
        let record = row(&["1", "2", "3"]);
        assert!(matches!(
            parse_record(&record),
            Err(CurateError::Parse { .. })
        ));
    }

    #[test]
    fn test_non_numeric_score_is_parse_error() {
        let record = row(&[
            "42", "fen", "e2e4", "not-a-score", "1-0", "d9", "e2e4", "35", "d2d4", "28",
        ]);
        assert!(matches!(
            parse_record(&record),
            Err(CurateError::Parse { .. })
        ));
    }

    #[test]
    fn test_negative_ply_is_parse_error() {
        let record = row(&[
            "-1", "fen", "e2e4", "35", "1-0", "d9", "e2e4", "35", "d2d4", "28",
        ]);
        assert!(matches!(
            parse_record(&record),
            Err(CurateError::Parse { .. })
        ));
    }
}
