//! Integration tests for rehydration, persistence writes and derived views

use boardwatch_core::activity::{ActivityView, PageSlot};
use boardwatch_core::models::{ActivityFilter, ActivityRecord, BoardId};
use boardwatch_core::persistence::{ACTIVITY_FILTER_KEY, SELECTED_BOARDS_KEY};
use boardwatch_core::{DashboardConfig, DashboardStateMachine, PersistenceAdapter, StateEvent};
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use tempfile::tempdir;

fn ids(raw: &[&str]) -> Vec<BoardId> {
    raw.iter().map(|s| BoardId::from(*s)).collect()
}

fn activities(board: &str, count: usize) -> Vec<ActivityRecord> {
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| ActivityRecord {
            id: format!("{board}-{i}"),
            kind: "updateCard".to_string(),
            date: base + Duration::minutes(i as i64),
            data: json!({}),
            member_creator: None,
            board_name: Some(board.to_uppercase()),
            board_id: Some(BoardId::from(board)),
        })
        .collect()
}

#[test]
fn test_rehydrate_from_file_store() {
    let dir = tempdir().unwrap();
    let config = DashboardConfig::default();

    {
        let mut machine = DashboardStateMachine::rehydrate(PersistenceAdapter::file(dir.path()), &config);
        machine.apply(StateEvent::SelectionReplaced(ids(&["b1", "b2"])));
        machine.apply(StateEvent::FilterChanged(ActivityFilter::Board("b2".into())));
        machine.apply(StateEvent::PageSet(3));
        machine.apply(StateEvent::SearchTermChanged("ops".into()));
    }

    let machine = DashboardStateMachine::rehydrate(PersistenceAdapter::file(dir.path()), &config);
    let state = machine.state();
    assert_eq!(state.selection(), ids(&["b1", "b2"]).as_slice());
    assert_eq!(state.activity_filter, ActivityFilter::Board("b2".into()));

    // Only selection and filter survive a restart
    assert_eq!(state.activity_page, 1);
    assert!(state.board_search_term.is_empty());
}

#[test]
fn test_rehydrate_corrupt_selection_defaults() {
    let persistence = PersistenceAdapter::in_memory();
    persistence.write(SELECTED_BOARDS_KEY, "{not json");

    let machine = DashboardStateMachine::rehydrate(persistence, &DashboardConfig::default());
    assert!(machine.state().selected_board_ids.is_empty());
}

#[test]
fn test_rehydrate_dangling_filter_falls_back_to_all() {
    let persistence = PersistenceAdapter::in_memory();
    persistence.write(SELECTED_BOARDS_KEY, r#"["b1"]"#);
    persistence.write(ACTIVITY_FILTER_KEY, "gone");

    let machine = DashboardStateMachine::rehydrate(persistence, &DashboardConfig::default());
    assert_eq!(machine.state().activity_filter, ActivityFilter::All);
}

#[test]
fn test_persisted_values_track_mutations() {
    let persistence = PersistenceAdapter::in_memory();
    let mut machine = DashboardStateMachine::new(persistence.clone(), &DashboardConfig::default());

    machine.apply(StateEvent::BoardAdded("b1".into()));
    machine.apply(StateEvent::BoardAdded("b2".into()));
    assert_eq!(persistence.read(SELECTED_BOARDS_KEY).as_deref(), Some(r#"["b1","b2"]"#));

    machine.apply(StateEvent::FilterChanged(ActivityFilter::Board("b1".into())));
    assert_eq!(persistence.read(ACTIVITY_FILTER_KEY).as_deref(), Some("b1"));

    // Removing the filtered board persists both the selection and the reset filter
    machine.apply(StateEvent::BoardRemoved("b1".into()));
    assert_eq!(persistence.read(SELECTED_BOARDS_KEY).as_deref(), Some(r#"["b2"]"#));
    assert_eq!(persistence.read(ACTIVITY_FILTER_KEY).as_deref(), Some("all"));

    machine.apply(StateEvent::SelectionCleared);
    assert_eq!(persistence.read(SELECTED_BOARDS_KEY).as_deref(), Some("[]"));
}

#[test]
fn test_view_follows_filter_and_page() {
    let mut machine =
        DashboardStateMachine::new(PersistenceAdapter::in_memory(), &DashboardConfig::default());
    machine.apply(StateEvent::SelectionReplaced(ids(&["a", "b"])));

    let mut records = activities("a", 120);
    records.extend(activities("b", 30));
    machine.apply(StateEvent::ActivitiesReplaced(records));

    let state = machine.apply(StateEvent::PageSet(2));
    let view = ActivityView::derive(&state, 5);
    assert_eq!(view.total_filtered, 150);
    assert_eq!(view.total_pages, 3);
    assert_eq!(view.items.len(), 50);
    assert_eq!(view.range, Some((51, 100)));
    assert_eq!(
        view.window,
        vec![PageSlot::Page(1), PageSlot::Page(2), PageSlot::Page(3)]
    );

    let state = machine.apply(StateEvent::FilterChanged(ActivityFilter::Board("b".into())));
    let view = ActivityView::derive(&state, 5);
    assert_eq!(view.page, 1);
    assert_eq!(view.total_filtered, 30);
    assert!(!view.shows_pagination());
    assert!(view.items.iter().all(|a| a.board_id.as_deref() == Some("b")));

    // Newest first across the merged stream
    let dates: Vec<_> = view.items.iter().map(|a| a.date).collect();
    assert!(dates.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_page_past_the_end_is_empty() {
    let mut machine =
        DashboardStateMachine::new(PersistenceAdapter::in_memory(), &DashboardConfig::default());
    machine.apply(StateEvent::SelectionReplaced(ids(&["a"])));
    machine.apply(StateEvent::ActivitiesReplaced(activities("a", 10)));

    let state = machine.apply(StateEvent::PageSet(4));
    let view = ActivityView::derive(&state, 5);
    assert!(view.is_empty());
    assert_eq!(view.range, None);
    assert_eq!(view.total_pages, 1);
}

#[test]
fn test_configured_page_size() {
    let config = DashboardConfig {
        activities_per_page: 20,
        ..DashboardConfig::default()
    };
    let mut machine = DashboardStateMachine::new(PersistenceAdapter::in_memory(), &config);
    machine.apply(StateEvent::SelectionReplaced(ids(&["a"])));
    let state = machine.apply(StateEvent::ActivitiesReplaced(activities("a", 45)));

    let view = ActivityView::derive(&state, 5);
    assert_eq!(view.total_pages, 3);
    assert_eq!(view.items.len(), 20);
}
