//! Activity records (board actions) as returned by the activity feed

use super::board::BoardId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Actor that created an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
}

/// Known action kinds. Anything else is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    CommentCard,
    UpdateCard,
    CreateCard,
    MoveCardFromList,
    Other(String),
}

impl ActionKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "commentCard" => ActionKind::CommentCard,
            "updateCard" => ActionKind::UpdateCard,
            "createCard" => ActionKind::CreateCard,
            "moveCardFromList" => ActionKind::MoveCardFromList,
            other => ActionKind::Other(other.to_string()),
        }
    }
}

/// One timestamped event tied to a board.
///
/// Identity is `id`; records are immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub member_creator: Option<Member>,
    /// Denormalized board name for presentation without a join
    #[serde(default)]
    pub board_name: Option<String>,
    #[serde(default)]
    pub board_id: Option<BoardId>,
}

impl ActivityRecord {
    pub fn action_kind(&self) -> ActionKind {
        ActionKind::parse(&self.kind)
    }

    pub fn belongs_to(&self, board: &BoardId) -> bool {
        self.board_id.as_ref() == Some(board)
    }

    /// Actor display name: full name, then username, then "Unknown user"
    pub fn actor_name(&self) -> &str {
        self.member_creator
            .as_ref()
            .and_then(|m| {
                [m.full_name.as_str(), m.username.as_str()]
                    .into_iter()
                    .find(|s| !s.is_empty())
            })
            .unwrap_or("Unknown user")
    }

    fn data_name(&self, field: &str) -> Option<&str> {
        self.data
            .get(field)
            .and_then(|v| v.get("name"))
            .and_then(Value::as_str)
    }

    /// One-line human description of the action
    pub fn describe(&self) -> String {
        let member = self.actor_name();
        let card = self.data_name("card").unwrap_or("a card");

        match self.action_kind() {
            ActionKind::CommentCard => format!("{} commented on \"{}\"", member, card),
            ActionKind::UpdateCard => format!("{} updated \"{}\"", member, card),
            ActionKind::CreateCard => format!("{} created \"{}\"", member, card),
            ActionKind::MoveCardFromList => format!(
                "{} moved \"{}\" from \"{}\" to \"{}\"",
                member,
                card,
                self.data_name("listBefore").unwrap_or("unknown"),
                self.data_name("listAfter").unwrap_or("unknown"),
            ),
            ActionKind::Other(kind) => format!("{} performed {}", member, kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(kind: &str, data: Value, member: Option<Member>) -> ActivityRecord {
        ActivityRecord {
            id: "a1".to_string(),
            kind: kind.to_string(),
            date: "2024-05-01T12:00:00Z".parse().unwrap(),
            data,
            member_creator: member,
            board_name: Some("Roadmap".to_string()),
            board_id: Some(BoardId::from("b1")),
        }
    }

    fn alice() -> Option<Member> {
        Some(Member {
            id: "m1".to_string(),
            username: "alice".to_string(),
            full_name: "Alice Martin".to_string(),
        })
    }

    #[test]
    fn test_wire_format_uses_type_field() {
        let json = r#"{
            "id": "act1",
            "type": "commentCard",
            "date": "2024-05-01T12:00:00.000Z",
            "data": {"card": {"name": "Fix login"}},
            "memberCreator": {"id": "m1", "username": "alice", "fullName": "Alice Martin"},
            "boardName": "Roadmap",
            "boardId": "b1"
        }"#;
        let rec: ActivityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.action_kind(), ActionKind::CommentCard);
        assert!(rec.belongs_to(&BoardId::from("b1")));
        assert_eq!(rec.describe(), "Alice Martin commented on \"Fix login\"");
    }

    #[test]
    fn test_describe_move() {
        let rec = record(
            "moveCardFromList",
            json!({"card": {"name": "Ship"}, "listBefore": {"name": "Doing"}, "listAfter": {"name": "Done"}}),
            alice(),
        );
        assert_eq!(
            rec.describe(),
            "Alice Martin moved \"Ship\" from \"Doing\" to \"Done\""
        );
    }

    #[test]
    fn test_describe_fallbacks() {
        let rec = record("createCard", json!({}), None);
        assert_eq!(rec.describe(), "Unknown user created \"a card\"");

        let rec = record("addMemberToBoard", Value::Null, alice());
        assert_eq!(rec.describe(), "Alice Martin performed addMemberToBoard");

        let username_only = Some(Member {
            id: "m2".to_string(),
            username: "bob".to_string(),
            full_name: String::new(),
        });
        let rec = record("updateCard", json!({"card": {"name": "Docs"}}), username_only);
        assert_eq!(rec.describe(), "bob updated \"Docs\"");
    }
}
