use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use crate::errors::{CurateError, Result};

/// One input scheduled for processing, with its derived output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub plain_path: PathBuf,
    pub binpack_path: PathBuf,
    pub compressed: bool,
}

impl InputFile {
    /// Builds the schedule entry for a `.csv` / `.csv.zst` path; anything
    /// else is not an input. The suffix labels the filter policy in the
    /// derived names: `<input>.<suffix>.plain`.
    pub fn for_path(path: PathBuf, suffix: &str) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_string();
        let compressed = if name.ends_with(".csv.zst") {
            true
        } else if name.ends_with(".csv") {
            false
        } else {
            return None;
        };

        let plain_path = path.with_file_name(format!("{}.{}.plain", name, suffix));
        let binpack_path = path.with_file_name(format!("{}.{}.binpack", name, suffix));
        Some(Self {
            path,
            plain_path,
            binpack_path,
            compressed,
        })
    }

    /// A completed output (plain, binpack, or minimized binpack) means this
    /// input does not need reprocessing.
    pub fn is_complete(&self) -> bool {
        if self.plain_path.is_file() || self.binpack_path.is_file() {
            return true;
        }
        match self.binpack_path.file_name().and_then(|n| n.to_str()) {
            Some(name) => self
                .binpack_path
                .with_file_name(format!("{}.min.binpack", name))
                .is_file(),
            None => false,
        }
    }
}

/// Expands a glob and schedules the matches most-recent-first (reverse
/// lexicographic order over date-stamped names), so that placements from
/// later-dated files win dedup conflicts.
pub fn discover_inputs(pattern: &str, suffix: &str) -> Result<Vec<InputFile>> {
    let mut paths: Vec<PathBuf> = glob::glob(pattern)?
        .filter_map(|entry| entry.ok())
        .collect();
    paths.sort();
    paths.reverse();

    Ok(paths
        .into_iter()
        .filter_map(|path| InputFile::for_path(path, suffix))
        .collect())
}

/// Opens an input for reading, decoding zstd transparently. The pipeline
/// always consumes an already-decoded text stream.
pub fn open_input(input: &InputFile) -> Result<Box<dyn Read>> {
    let file = File::open(&input.path).map_err(|error| {
        CurateError::Io(format!("cannot open {}: {}", input.path.display(), error))
    })?;

    if input.compressed {
        let decoder = zstd::stream::read::Decoder::new(file)?;
        Ok(Box::new(decoder))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_output_path_derivation() {
        let input =
            InputFile::for_path(PathBuf::from("data/games_2024-03.csv.zst"), "filtered").unwrap();
        assert!(input.compressed);
        assert_eq!(
            input.plain_path,
            PathBuf::from("data/games_2024-03.csv.zst.filtered.plain")
        );
        assert_eq!(
            input.binpack_path,
            PathBuf::from("data/games_2024-03.csv.zst.filtered.binpack")
        );

        let input = InputFile::for_path(PathBuf::from("games.csv"), "filtered").unwrap();
        assert!(!input.compressed);
        assert_eq!(input.plain_path, PathBuf::from("games.csv.filtered.plain"));

        assert!(InputFile::for_path(PathBuf::from("games.pgn"), "filtered").is_none());
    }

    #[test]
    fn test_discovery_is_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["games_2024-01.csv", "games_2024-03.csv", "games_2024-02.csv"] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let pattern = format!("{}/*.csv", dir.path().display());
        let inputs = discover_inputs(&pattern, "filtered").unwrap();
        let names: Vec<_> = inputs
            .iter()
            .map(|input| input.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "games_2024-03.csv",
                "games_2024-02.csv",
                "games_2024-01.csv"
            ]
        );
    }

    #[test]
    fn test_completed_outputs_are_detected() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("games.csv");
        fs::write(&csv, "").unwrap();

        let input = InputFile::for_path(csv, "filtered").unwrap();
        assert!(!input.is_complete());

        fs::write(&input.binpack_path, "").unwrap();
        assert!(input.is_complete());

        fs::remove_file(&input.binpack_path).unwrap();
        let min = dir.path().join("games.csv.filtered.binpack.min.binpack");
        fs::write(&min, "").unwrap();
        assert!(input.is_complete());
    }
}
