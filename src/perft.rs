//! Perft test suite parsing and execution.
//!
//! Suite lines follow the EPD-style format
//! `<FEN> ; D1 <nodes> ; D2 <nodes> ; ...` where each `D<i>` entry is
//! the expected number of leaf positions at that depth.

use std::fmt;

use crate::board::{Board, FenError};

/// Depth limit applied by [`PerftPosition::run`] callers by convention.
pub const DEFAULT_DEPTH_CAP: u32 = 4;

/// A test-suite line did not match the expected grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PerftError {
    /// The FEN part of a line failed to parse
    InvalidFen { line: usize, source: FenError },
    /// A depth entry was not of the form `D<depth> <nodes>`
    InvalidDepthEntry { line: usize, entry: String },
    /// A line had no depth entries at all
    NoDepthEntries { line: usize },
}

impl fmt::Display for PerftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerftError::InvalidFen { line, source } => {
                write!(f, "line {line}: bad FEN: {source}")
            }
            PerftError::InvalidDepthEntry { line, entry } => {
                write!(f, "line {line}: bad depth entry '{entry}'")
            }
            PerftError::NoDepthEntries { line } => {
                write!(f, "line {line}: no depth entries")
            }
        }
    }
}

impl std::error::Error for PerftError {}

/// One suite position: a FEN and its expected node counts by depth.
#[derive(Debug, Clone)]
pub struct PerftPosition {
    pub fen: String,
    pub expected: Vec<(u32, u64)>,
    /// 1-based suite line this position came from (0 for hand-built ones)
    pub line: usize,
}

/// Outcome of one depth of one suite position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerftResult {
    pub depth: u32,
    pub expected: u64,
    pub actual: u64,
}

impl PerftResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

impl PerftPosition {
    fn parse(line_no: usize, line: &str) -> Result<Self, PerftError> {
        let mut parts = line.split(';');
        let fen = parts
            .next()
            .expect("split yields at least one part")
            .trim()
            .to_string();

        let mut expected = Vec::new();
        for raw in parts {
            let entry = raw.trim();
            if entry.is_empty() {
                continue;
            }
            let parsed = entry
                .strip_prefix('D')
                .and_then(|rest| {
                    let mut fields = rest.split_whitespace();
                    let depth = fields.next()?.parse::<u32>().ok()?;
                    let nodes = fields.next()?.parse::<u64>().ok()?;
                    if fields.next().is_some() {
                        return None;
                    }
                    Some((depth, nodes))
                })
                .ok_or_else(|| PerftError::InvalidDepthEntry {
                    line: line_no,
                    entry: entry.to_string(),
                })?;
            expected.push(parsed);
        }

        if expected.is_empty() {
            return Err(PerftError::NoDepthEntries { line: line_no });
        }

        Ok(PerftPosition {
            fen,
            expected,
            line: line_no,
        })
    }

    /// Run every expected depth up to `depth_cap` and report the counts.
    pub fn run(&self, depth_cap: u32) -> Result<Vec<PerftResult>, PerftError> {
        let mut board = Board::try_from_fen(&self.fen).map_err(|source| PerftError::InvalidFen {
            line: self.line,
            source,
        })?;

        let mut results = Vec::new();
        for &(depth, expected) in &self.expected {
            if depth > depth_cap {
                continue;
            }
            let actual = board.perft(depth);
            log::info!(
                "perft {} depth {depth}: expected {expected}, got {actual}",
                self.fen
            );
            results.push(PerftResult {
                depth,
                expected,
                actual,
            });
        }
        Ok(results)
    }
}

/// Parse a whole suite. Blank lines and `#` comment lines are skipped.
pub fn parse_suite(text: &str) -> Result<Vec<PerftPosition>, PerftError> {
    let mut positions = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        positions.push(PerftPosition::parse(idx + 1, line)?);
    }
    Ok(positions)
}
