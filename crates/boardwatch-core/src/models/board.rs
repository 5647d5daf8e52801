//! Board models as projected by the backend

use super::activity::ActivityRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Newtype for Board ID - zero-cost type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardId(String);

impl BoardId {
    /// Create a new BoardId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get reference to inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract inner String, consuming self
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for BoardId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BoardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for BoardId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for BoardId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Deref for BoardId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq<str> for BoardId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BoardId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Board owner as reported by the board API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardOwner {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardList {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub date_last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub id_list: String,
    /// Denormalized list name ("Unknown" when the list was not found)
    #[serde(default)]
    pub list_name: String,
}

/// Derived counters computed by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardStats {
    #[serde(default)]
    pub total_cards: usize,
    #[serde(default)]
    pub total_lists: usize,
    #[serde(default)]
    pub recent_actions: usize,
}

/// One external board's projected data.
///
/// Replaced wholesale on every successful fetch, never merged field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub id: BoardId,
    pub name: String,
    #[serde(default)]
    pub personalized_name: String,
    #[serde(default)]
    pub owner: Option<BoardOwner>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lists: Vec<BoardList>,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub actions: Vec<ActivityRecord>,
    #[serde(default)]
    pub stats: BoardStats,
}

impl BoardSummary {
    /// Name shown to the user: the owner-personalized name when present
    pub fn display_name(&self) -> &str {
        if self.personalized_name.trim().is_empty() {
            &self.name
        } else {
            &self.personalized_name
        }
    }

    pub fn card_count(&self) -> usize {
        self.stats.total_cards
    }

    pub fn list_count(&self) -> usize {
        self.stats.total_lists
    }

    pub fn recent_action_count(&self) -> usize {
        self.stats.recent_actions
    }

    /// Cards grouped by list, in list order. Cards on unknown lists are skipped.
    pub fn cards_by_list(&self) -> Vec<(&BoardList, Vec<&Card>)> {
        self.lists
            .iter()
            .map(|list| {
                let cards = self.cards.iter().filter(|c| c.id_list == list.id).collect();
                (list, cards)
            })
            .collect()
    }
}
