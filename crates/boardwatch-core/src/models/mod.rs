//! Data models for boardwatch

pub mod activity;
pub mod board;
pub mod cache;
pub mod filter;
pub mod response;

pub use activity::{ActionKind, ActivityRecord, Member};
pub use board::{BoardId, BoardList, BoardOwner, BoardStats, BoardSummary, Card, Label};
pub use cache::{CacheEntryInfo, CacheInfoMap};
pub use filter::{is_reserved_board_id, ActivityFilter, ALL_BOARDS};
pub use response::{ActivityResponse, BoardsResponse};
