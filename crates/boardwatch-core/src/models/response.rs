//! Payloads returned through the fetch port

use super::{ActivityRecord, BoardSummary, CacheInfoMap};
use serde::{Deserialize, Serialize};

/// Result of a boards fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardsResponse {
    pub boards: Vec<BoardSummary>,
    #[serde(default)]
    pub cache_info: Option<CacheInfoMap>,
    #[serde(default)]
    pub from_cache: Option<bool>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Result of an activity feed fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub activities: Vec<ActivityRecord>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boards_response_optional_cache_fields() {
        let bare: BoardsResponse =
            serde_json::from_str(r#"{"boards": [], "timestamp": "2024-01-01T00:00:00"}"#).unwrap();
        assert!(bare.cache_info.is_none());
        assert!(bare.from_cache.is_none());

        let cached: BoardsResponse = serde_json::from_str(
            r#"{
                "boards": [],
                "cache_info": {"b1": {"age_seconds": 30.0, "expires_in_seconds": 270.0, "is_expired": false}},
                "from_cache": true
            }"#,
        )
        .unwrap();
        assert_eq!(cached.from_cache, Some(true));
        let info = cached.cache_info.unwrap();
        assert!(!info["b1"].is_expired);
    }
}
