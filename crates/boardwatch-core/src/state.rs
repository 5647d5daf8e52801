//! Dashboard state and its reducer
//!
//! [`reduce`] is a pure, total function over `(state, event)`. The
//! [`DashboardStateMachine`] owns the current snapshot, runs the reducer and
//! writes the persisted fields (selection, filter) in the same transition
//! that changes them.

use crate::activity;
use crate::config::DashboardConfig;
use crate::models::{
    is_reserved_board_id, ActivityFilter, ActivityRecord, BoardId, BoardSummary, CacheInfoMap,
};
use crate::persistence::PersistenceAdapter;
use crate::selection::BoardSelection;
use std::sync::Arc;
use tracing::{debug, warn};

/// Single aggregate the dashboard renders from
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub boards: Vec<BoardSummary>,
    /// Newest first
    pub activities: Vec<ActivityRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected_board_ids: BoardSelection,
    pub activity_filter: ActivityFilter,
    /// 1-based, may point past the last page
    pub activity_page: usize,
    pub activities_per_page: usize,
    pub show_board_summaries: bool,
    pub board_search_term: String,
    pub show_activity_timeline: bool,
    /// `None` means unknown: no cache UI is shown
    pub cache_info: Option<CacheInfoMap>,
    pub from_cache: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            boards: Vec::new(),
            activities: Vec::new(),
            loading: false,
            error: None,
            selected_board_ids: BoardSelection::new(),
            activity_filter: ActivityFilter::All,
            activity_page: 1,
            activities_per_page: crate::config::DEFAULT_ACTIVITIES_PER_PAGE,
            show_board_summaries: true,
            board_search_term: String::new(),
            show_activity_timeline: true,
            cache_info: None,
            from_cache: false,
        }
    }
}

impl DashboardState {
    /// Defaults with the given page size
    pub fn with_page_size(activities_per_page: usize) -> Self {
        Self {
            activities_per_page: activities_per_page.max(1),
            ..Self::default()
        }
    }

    pub fn selection(&self) -> &[BoardId] {
        self.selected_board_ids.as_slice()
    }

    /// Boards matching the current search term
    pub fn visible_boards(&self) -> Vec<&BoardSummary> {
        activity::search_boards(&self.boards, &self.board_search_term)
    }

    /// Number of activities left after the current filter
    pub fn filtered_activity_count(&self) -> usize {
        activity::filter(&self.activities, &self.activity_filter).len()
    }
}

/// Everything that can change the dashboard state
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    // ===================
    // Fetch lifecycle
    // ===================
    /// Boards fetch issued: loading on, previous error cleared
    LoadingStarted,
    LoadingFinished,
    ErrorSet(Option<String>),
    BoardsReplaced {
        boards: Vec<BoardSummary>,
        cache_info: Option<CacheInfoMap>,
        from_cache: bool,
    },
    ActivitiesReplaced(Vec<ActivityRecord>),
    /// Incremental feed: merged into the existing records by event id
    ActivitiesAppended(Vec<ActivityRecord>),
    CacheInfoUpdated(CacheInfoMap),
    CacheInfoCleared,

    // ===================
    // Selection
    // ===================
    BoardAdded(BoardId),
    BoardRemoved(BoardId),
    SelectionCleared,
    SelectionReplaced(Vec<BoardId>),

    // ===================
    // Activity navigation
    // ===================
    FilterChanged(ActivityFilter),
    PageSet(usize),
    PageNext,
    PagePrevious,

    // ===================
    // View toggles
    // ===================
    BoardSummariesToggled,
    ActivityTimelineToggled,
    SearchTermChanged(String),
}

impl StateEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StateEvent::LoadingStarted => "loading_started",
            StateEvent::LoadingFinished => "loading_finished",
            StateEvent::ErrorSet(_) => "error_set",
            StateEvent::BoardsReplaced { .. } => "boards_replaced",
            StateEvent::ActivitiesReplaced(_) => "activities_replaced",
            StateEvent::ActivitiesAppended(_) => "activities_appended",
            StateEvent::CacheInfoUpdated(_) => "cache_info_updated",
            StateEvent::CacheInfoCleared => "cache_info_cleared",
            StateEvent::BoardAdded(_) => "board_added",
            StateEvent::BoardRemoved(_) => "board_removed",
            StateEvent::SelectionCleared => "selection_cleared",
            StateEvent::SelectionReplaced(_) => "selection_replaced",
            StateEvent::FilterChanged(_) => "filter_changed",
            StateEvent::PageSet(_) => "page_set",
            StateEvent::PageNext => "page_next",
            StateEvent::PagePrevious => "page_previous",
            StateEvent::BoardSummariesToggled => "board_summaries_toggled",
            StateEvent::ActivityTimelineToggled => "activity_timeline_toggled",
            StateEvent::SearchTermChanged(_) => "search_term_changed",
        }
    }
}

/// Reset a filter that no longer names a selected board
fn reset_dangling_filter(state: &mut DashboardState) {
    if let ActivityFilter::Board(id) = &state.activity_filter {
        if !state.selected_board_ids.contains(id) {
            state.activity_filter = ActivityFilter::All;
            state.activity_page = 1;
        }
    }
}

/// Pure transition function
pub fn reduce(state: &DashboardState, event: &StateEvent) -> DashboardState {
    let mut next = state.clone();

    match event {
        StateEvent::LoadingStarted => {
            next.loading = true;
            next.error = None;
        }
        StateEvent::LoadingFinished => next.loading = false,
        StateEvent::ErrorSet(error) => next.error = error.clone(),
        StateEvent::BoardsReplaced {
            boards,
            cache_info,
            from_cache,
        } => {
            next.boards = boards.clone();
            next.cache_info = cache_info.clone();
            next.from_cache = *from_cache;
        }
        StateEvent::ActivitiesReplaced(records) => {
            next.activities = activity::merge(Vec::new(), records.clone());
        }
        StateEvent::ActivitiesAppended(records) => {
            next.activities = activity::merge(std::mem::take(&mut next.activities), records.clone());
        }
        StateEvent::CacheInfoUpdated(info) => next.cache_info = Some(info.clone()),
        StateEvent::CacheInfoCleared => {
            next.cache_info = None;
            next.from_cache = false;
        }
        StateEvent::BoardAdded(id) => {
            if is_reserved_board_id(id) {
                warn!(board = %id, "Ignoring reserved board id");
            } else {
                next.selected_board_ids.add(id.clone());
            }
        }
        StateEvent::BoardRemoved(id) => {
            next.selected_board_ids.remove(id);
            reset_dangling_filter(&mut next);
        }
        StateEvent::SelectionCleared => {
            next.selected_board_ids.clear();
            next.activity_filter = ActivityFilter::All;
            next.activity_page = 1;
        }
        StateEvent::SelectionReplaced(ids) => {
            let (reserved, kept): (Vec<&BoardId>, Vec<&BoardId>) =
                ids.iter().partition(|id| is_reserved_board_id(id));
            if !reserved.is_empty() {
                warn!(count = reserved.len(), "Dropping reserved ids from selection");
            }
            next.selected_board_ids.replace(kept.into_iter().cloned());
            reset_dangling_filter(&mut next);
        }
        StateEvent::FilterChanged(filter) => {
            let known = filter
                .board()
                .map_or(true, |id| next.selected_board_ids.contains(id));
            if known {
                next.activity_filter = filter.clone();
                next.activity_page = 1;
            } else {
                warn!(filter = %filter, "Ignoring filter for a board outside the selection");
            }
        }
        StateEvent::PageSet(page) => next.activity_page = (*page).max(1),
        StateEvent::PageNext => next.activity_page = next.activity_page.saturating_add(1),
        StateEvent::PagePrevious => next.activity_page = next.activity_page.saturating_sub(1).max(1),
        StateEvent::BoardSummariesToggled => next.show_board_summaries = !next.show_board_summaries,
        StateEvent::ActivityTimelineToggled => {
            next.show_activity_timeline = !next.show_activity_timeline
        }
        StateEvent::SearchTermChanged(term) => next.board_search_term = term.clone(),
    }

    next
}

/// Owner of the current dashboard snapshot
#[derive(Debug)]
pub struct DashboardStateMachine {
    state: Arc<DashboardState>,
    persistence: PersistenceAdapter,
}

impl DashboardStateMachine {
    /// Start from defaults without reading storage
    pub fn new(persistence: PersistenceAdapter, config: &DashboardConfig) -> Self {
        Self {
            state: Arc::new(DashboardState::with_page_size(config.activities_per_page)),
            persistence,
        }
    }

    /// Rehydrate selection and filter from storage; everything else default
    pub fn rehydrate(persistence: PersistenceAdapter, config: &DashboardConfig) -> Self {
        let mut state = DashboardState::with_page_size(config.activities_per_page);
        state.selected_board_ids = BoardSelection::from_ids(persistence.load_selection());
        state.activity_filter = persistence.load_filter();
        reset_dangling_filter(&mut state);

        debug!(
            boards = state.selected_board_ids.len(),
            filter = %state.activity_filter,
            "Dashboard state rehydrated"
        );

        Self {
            state: Arc::new(state),
            persistence,
        }
    }

    /// Current immutable snapshot
    pub fn state(&self) -> Arc<DashboardState> {
        Arc::clone(&self.state)
    }

    pub fn persistence(&self) -> &PersistenceAdapter {
        &self.persistence
    }

    /// Run one transition and return the new snapshot
    pub fn apply(&mut self, event: StateEvent) -> Arc<DashboardState> {
        let next = reduce(&self.state, &event);

        if next.selected_board_ids != self.state.selected_board_ids {
            self.persistence.save_selection(next.selected_board_ids.as_slice());
        }
        if next.activity_filter != self.state.activity_filter {
            self.persistence.save_filter(&next.activity_filter);
        }

        debug!(
            event = event.name(),
            boards = next.selected_board_ids.len(),
            page = next.activity_page,
            loading = next.loading,
            "Dashboard transition"
        );

        self.state = Arc::new(next);
        self.state()
    }
}
