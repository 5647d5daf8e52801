//! Activity filter: every selected board, or a single one

use super::board::BoardId;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Sentinel persisted for [`ActivityFilter::All`]
pub const ALL_BOARDS: &str = "all";

/// Ids equal to the sentinel (any case) can never name a board
pub fn is_reserved_board_id(id: &str) -> bool {
    id.trim().eq_ignore_ascii_case(ALL_BOARDS)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActivityFilter {
    #[default]
    All,
    Board(BoardId),
}

impl ActivityFilter {
    pub fn is_all(&self) -> bool {
        matches!(self, ActivityFilter::All)
    }

    pub fn board(&self) -> Option<&BoardId> {
        match self {
            ActivityFilter::All => None,
            ActivityFilter::Board(id) => Some(id),
        }
    }

    /// Textual form used for persistence
    pub fn as_str(&self) -> &str {
        match self {
            ActivityFilter::All => ALL_BOARDS,
            ActivityFilter::Board(id) => id.as_str(),
        }
    }
}

impl FromStr for ActivityFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == ALL_BOARDS {
            Ok(ActivityFilter::All)
        } else {
            Ok(ActivityFilter::Board(BoardId::from(s)))
        }
    }
}

impl fmt::Display for ActivityFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<BoardId> for ActivityFilter {
    fn from(id: BoardId) -> Self {
        ActivityFilter::Board(id)
    }
}
