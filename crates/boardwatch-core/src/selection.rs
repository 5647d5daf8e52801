//! Board selection: the ordered, de-duplicated set of tracked boards
//!
//! Also turns raw user input (bare ids or pasted board URLs) into
//! [`BoardId`]s.

use crate::error::CoreError;
use crate::models::{is_reserved_board_id, BoardId};
use once_cell::sync::Lazy;
use regex::Regex;

static BARE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("valid regex"));

static TRELLO_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"trello\.com/b/([a-zA-Z0-9]+)").expect("valid regex"));

static PATH_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/([a-zA-Z0-9]{8,})/").expect("valid regex"));

/// Extract a board identifier from raw input
///
/// Accepts, in priority order:
/// 1. a bare alphanumeric token
/// 2. a `trello.com/b/<id>` URL
/// 3. any URL with a `/<8+ alphanumerics>/` path segment (first match)
///
/// # Examples
///
/// ```
/// use boardwatch_core::selection::extract_identifier;
///
/// assert_eq!(extract_identifier("  abc123  ").unwrap(), "abc123");
/// assert_eq!(
///     extract_identifier("https://trello.com/b/Xy12AbCd/my-board").unwrap(),
///     "Xy12AbCd"
/// );
/// assert!(extract_identifier("not a board").is_none());
/// ```
pub fn extract_identifier(raw: &str) -> Option<BoardId> {
    let trimmed = raw.trim();

    if BARE_ID.is_match(trimmed) {
        return Some(BoardId::from(trimmed));
    }

    TRELLO_URL
        .captures(trimmed)
        .or_else(|| PATH_SEGMENT.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .map(|m| BoardId::from(m.as_str()))
}

/// [`extract_identifier`] with a validation error for rejected input.
///
/// The filter sentinel `all` is reserved and never a board id.
pub fn parse_identifier(raw: &str) -> Result<BoardId, CoreError> {
    let id = extract_identifier(raw).ok_or_else(|| {
        CoreError::validation(raw.trim(), "expected a board id or a board URL")
    })?;

    if is_reserved_board_id(&id) {
        return Err(CoreError::validation(
            raw.trim(),
            "'all' is reserved for the activity filter",
        ));
    }

    Ok(id)
}

/// Ordered set of tracked boards (insertion order, no duplicates)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSelection {
    ids: Vec<BoardId>,
}

impl BoardSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any sequence, keeping the first occurrence of each id
    pub fn from_ids(ids: impl IntoIterator<Item = BoardId>) -> Self {
        let mut selection = Self::new();
        for id in ids {
            selection.add(id);
        }
        selection
    }

    /// Append if absent. Returns true when the selection changed.
    pub fn add(&mut self, id: BoardId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove if present. Returns true when the selection changed.
    pub fn remove(&mut self, id: &BoardId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn replace(&mut self, ids: impl IntoIterator<Item = BoardId>) {
        *self = Self::from_ids(ids);
    }

    pub fn contains(&self, id: &BoardId) -> bool {
        self.ids.contains(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoardId> {
        self.ids.iter()
    }

    pub fn as_slice(&self) -> &[BoardId] {
        &self.ids
    }

    pub fn to_vec(&self) -> Vec<BoardId> {
        self.ids.clone()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<'a> IntoIterator for &'a BoardSelection {
    type Item = &'a BoardId;
    type IntoIter = std::slice::Iter<'a, BoardId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}
