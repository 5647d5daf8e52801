//! Cache metadata reported by the backend alongside fetched boards

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-entry cache metadata. Supplied by the fetch result, never recomputed
/// from the local clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheEntryInfo {
    pub age_seconds: f64,
    pub expires_in_seconds: f64,
    pub is_expired: bool,
}

/// Cache-entry key to metadata, ordered by key for stable rendering
pub type CacheInfoMap = BTreeMap<String, CacheEntryInfo>;
