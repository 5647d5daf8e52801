//! Activity aggregation: merge, filter, paginate
//!
//! Everything here is a pure function of its inputs, so the timeline the
//! user sees is fully determined by the current [`DashboardState`].

use crate::models::{ActivityFilter, ActivityRecord, BoardId, BoardSummary};
use crate::state::DashboardState;
use std::collections::HashSet;
use std::fmt;

/// Default number of page buttons before the window is compressed
pub const DEFAULT_MAX_VISIBLE_PAGES: usize = 5;

/// Merge activity streams into one newest-first collection
///
/// Records are de-duplicated by event id (first seen wins, records are
/// immutable). The sort is stable, so equal timestamps keep arrival order.
pub fn merge(existing: Vec<ActivityRecord>, incoming: Vec<ActivityRecord>) -> Vec<ActivityRecord> {
    let mut seen = HashSet::new();
    let mut merged: Vec<ActivityRecord> = existing
        .into_iter()
        .chain(incoming)
        .filter(|record| seen.insert(record.id.clone()))
        .collect();

    merged.sort_by(|a, b| b.date.cmp(&a.date));
    merged
}

/// Keep the records matching `filter`, preserving order
pub fn filter<'a>(activities: &'a [ActivityRecord], filter: &ActivityFilter) -> Vec<&'a ActivityRecord> {
    match filter {
        ActivityFilter::All => activities.iter().collect(),
        ActivityFilter::Board(board) => activities.iter().filter(|a| a.belongs_to(board)).collect(),
    }
}

/// Number of pages needed for `total` items
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Slice `[(page-1)*page_size, page*page_size)` of `items`, clipped
///
/// Pages are 1-based. A page past the end (or page 0) yields an empty slice.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }

    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// 1-based inclusive bounds of the items shown on `page`
pub fn page_range(total: usize, page: usize, page_size: usize) -> Option<(usize, usize)> {
    if page == 0 || page_size == 0 {
        return None;
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= total {
        return None;
    }
    Some((start + 1, (start + page_size).min(total)))
}

/// One entry of the page navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    Page(usize),
    Ellipsis,
}

impl fmt::Display for PageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSlot::Page(n) => write!(f, "{}", n),
            PageSlot::Ellipsis => f.write_str("..."),
        }
    }
}

/// Compressed page navigation for `total_items` split in pages of `page_size`
pub fn page_window(
    total_items: usize,
    current_page: usize,
    page_size: usize,
    max_visible: usize,
) -> Vec<PageSlot> {
    page_window_for_pages(page_count(total_items, page_size), current_page, max_visible)
}

/// Compressed page navigation for a known page count
///
/// - `total_pages <= max_visible`: every page
/// - near the start (`current <= 3`): `1 2 3 4 5 ... last`
/// - near the end (`current >= last - 2`): `1 ... last-4 .. last`
/// - otherwise: `1 ... current-1 current current+1 ... last`
pub fn page_window_for_pages(
    total_pages: usize,
    current_page: usize,
    max_visible: usize,
) -> Vec<PageSlot> {
    if total_pages <= max_visible {
        return (1..=total_pages).map(PageSlot::Page).collect();
    }

    let mut slots = Vec::with_capacity(7);

    if current_page <= 3 {
        slots.extend((1..=total_pages.min(5)).map(PageSlot::Page));
        if total_pages > 5 {
            slots.push(PageSlot::Ellipsis);
            slots.push(PageSlot::Page(total_pages));
        }
    } else if current_page >= total_pages.saturating_sub(2) {
        slots.push(PageSlot::Page(1));
        slots.push(PageSlot::Ellipsis);
        slots.extend((total_pages.saturating_sub(4).max(2)..=total_pages).map(PageSlot::Page));
    } else {
        slots.push(PageSlot::Page(1));
        slots.push(PageSlot::Ellipsis);
        slots.extend((current_page - 1..=current_page + 1).map(PageSlot::Page));
        slots.push(PageSlot::Ellipsis);
        slots.push(PageSlot::Page(total_pages));
    }

    slots
}

/// Activity count per board, in board order
pub fn activity_counts<'a>(
    activities: &[ActivityRecord],
    boards: &'a [BoardSummary],
) -> Vec<(&'a BoardSummary, usize)> {
    boards
        .iter()
        .map(|board| {
            let count = activities.iter().filter(|a| a.belongs_to(&board.id)).count();
            (board, count)
        })
        .collect()
}

/// Boards whose name or personalized name contains `term` (case-insensitive)
pub fn search_boards<'a>(boards: &'a [BoardSummary], term: &str) -> Vec<&'a BoardSummary> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return boards.iter().collect();
    }

    boards
        .iter()
        .filter(|b| {
            b.name.to_lowercase().contains(&needle)
                || b.personalized_name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Presentation data for the activity timeline
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityView<'a> {
    /// Records on the current page
    pub items: Vec<&'a ActivityRecord>,
    pub total_filtered: usize,
    pub page: usize,
    pub total_pages: usize,
    pub window: Vec<PageSlot>,
    /// "Showing X to Y" bounds, absent beyond the last page
    pub range: Option<(usize, usize)>,
    /// Board named by the filter, for the empty-state message
    pub filter_board_name: Option<&'a str>,
}

impl<'a> ActivityView<'a> {
    pub fn derive(state: &'a DashboardState, max_visible: usize) -> Self {
        let filtered = filter(&state.activities, &state.activity_filter);
        let page_size = state.activities_per_page;
        let page = state.activity_page;
        let total_filtered = filtered.len();

        Self {
            items: paginate(&filtered, page, page_size).to_vec(),
            total_filtered,
            page,
            total_pages: page_count(total_filtered, page_size),
            window: page_window(total_filtered, page, page_size, max_visible),
            range: page_range(total_filtered, page, page_size),
            filter_board_name: state
                .activity_filter
                .board()
                .map(|id| board_display_name(&state.boards, id)),
        }
    }

    /// True when there is nothing to show on the current page
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pagination controls are hidden for a single page
    pub fn shows_pagination(&self) -> bool {
        self.total_pages > 1
    }
}

fn board_display_name<'a>(boards: &'a [BoardSummary], id: &BoardId) -> &'a str {
    boards
        .iter()
        .find(|b| &b.id == id)
        .map(|b| b.display_name())
        .unwrap_or("selected board")
}
