//! Interpretation of backend cache metadata
//!
//! The backend owns the cache and its TTLs. This module only classifies what
//! it reports; nothing here reads the local clock.

use crate::models::{CacheEntryInfo, CacheInfoMap};
use crate::state::DashboardState;

/// Freshness of a single cache entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Freshness {
    /// Still valid, with the backend-reported seconds left
    Fresh { ttl_remaining: f64 },
    Expired,
}

impl Freshness {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Freshness::Fresh { .. })
    }
}

/// Classify one entry from its reported flags
pub fn classify(entry: &CacheEntryInfo) -> Freshness {
    if entry.is_expired {
        Freshness::Expired
    } else {
        Freshness::Fresh {
            ttl_remaining: entry.expires_in_seconds.max(0.0),
        }
    }
}

/// Aggregate counts over all reported entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheSummary {
    pub total_tracked: usize,
    pub fresh_count: usize,
    pub expired_count: usize,
}

/// Partition entries by their expired flag. Absent info summarizes to zeros.
pub fn summarize(info: Option<&CacheInfoMap>) -> CacheSummary {
    let Some(info) = info else {
        return CacheSummary::default();
    };

    let expired_count = info.values().filter(|e| e.is_expired).count();
    CacheSummary {
        total_tracked: info.len(),
        fresh_count: info.len() - expired_count,
        expired_count,
    }
}

/// Format a duration in seconds the way the cache badge shows it
///
/// # Examples
///
/// ```
/// use boardwatch_core::cache::format_age;
///
/// assert_eq!(format_age(42.0), "42s");
/// assert_eq!(format_age(150.0), "3m");
/// assert_eq!(format_age(7200.0), "2h");
/// ```
pub fn format_age(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{}s", seconds.round() as i64)
    } else if seconds < 3600.0 {
        format!("{}m", (seconds / 60.0).round() as i64)
    } else {
        format!("{}h", (seconds / 3600.0).round() as i64)
    }
}

/// Cache badge data derived from a state snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatus {
    pub from_cache: bool,
    pub summary: CacheSummary,
    /// Per-entry freshness in key order
    pub entries: Vec<(String, Freshness)>,
}

impl CacheStatus {
    /// `None` when no cache info is known: render no cache UI rather than
    /// stale info.
    pub fn from_state(state: &DashboardState) -> Option<Self> {
        let info = state.cache_info.as_ref().filter(|info| !info.is_empty())?;

        Some(Self {
            from_cache: state.from_cache,
            summary: summarize(Some(info)),
            entries: info
                .iter()
                .map(|(key, entry)| (key.clone(), classify(entry)))
                .collect(),
        })
    }

    pub fn headline(&self) -> &'static str {
        if self.from_cache {
            "Using cached data"
        } else {
            "Fresh data loaded"
        }
    }
}
