use std::fmt;

/// Errors surfaced by the curation pipeline and its outer layers.
#[derive(Debug, Clone)]
pub enum CurateError {
    /// A record line had a bad field count or a non-numeric field
    Parse { line: u64, message: String },
    /// The move/position oracle rejected a FEN or a move as structurally invalid
    Oracle { context: String },
    /// No legal move links two consecutive-ply positions of one game
    ChainRepair {
        ply_from: u32,
        ply_to: u32,
        fen_from: String,
        fen_to: String,
    },
    /// File I/O operation failed
    Io(String),
    /// Configuration or policy-file error
    Config(String),
}

impl fmt::Display for CurateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurateError::Parse { line, message } => {
                write!(f, "Parse error at line {}: {}", line, message)
            }
            CurateError::Oracle { context } => write!(f, "Oracle error: {}", context),
            CurateError::ChainRepair {
                ply_from,
                ply_to,
                fen_from,
                fen_to,
            } => {
                write!(
                    f,
                    "Chain repair fault between ply {} and ply {}: no legal move links '{}' to '{}'",
                    ply_from, ply_to, fen_from, fen_to
                )
            }
            CurateError::Io(message) => write!(f, "I/O error: {}", message),
            CurateError::Config(message) => write!(f, "Configuration error: {}", message),
        }
    }
}

impl std::error::Error for CurateError {}

// Convenience type alias
pub type Result<T> = std::result::Result<T, CurateError>;

// Convert from common error types
impl From<std::io::Error> for CurateError {
    fn from(error: std::io::Error) -> Self {
        CurateError::Io(error.to_string())
    }
}

impl From<csv::Error> for CurateError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|p| p.line()).unwrap_or(0);
        CurateError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for CurateError {
    fn from(error: serde_json::Error) -> Self {
        CurateError::Config(format!("JSON policy error: {}", error))
    }
}

impl From<glob::PatternError> for CurateError {
    fn from(error: glob::PatternError) -> Self {
        CurateError::Config(format!("bad glob pattern: {}", error))
    }
}

impl From<indicatif::style::TemplateError> for CurateError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        CurateError::Config(format!("progress template error: {}", error))
    }
}
