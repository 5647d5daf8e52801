//! Terminal rendering of dashboard snapshots
//!
//! Pure formatting: every function takes core data and returns a string.

use boardwatch_core::activity::{activity_counts, ActivityView, PageSlot};
use boardwatch_core::cache::{format_age, Freshness};
use boardwatch_core::models::{BoardSummary, ALL_BOARDS};
use boardwatch_core::{CacheStatus, DashboardState};
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

// ============================================================================
// Formatters
// ============================================================================

/// Tracked board ids, one per line
pub fn format_selection(state: &DashboardState) -> String {
    if state.selected_board_ids.is_empty() {
        return "No boards tracked.".to_string();
    }

    let mut lines = vec![format!("Tracked boards ({}):", state.selected_board_ids.len())];
    lines.extend(state.selected_board_ids.iter().map(|id| format!("  {}", id)));
    lines.push(format!("Activity filter: {}", state.activity_filter));
    lines.join("\n")
}

fn header(table: &mut Table, names: &[&str], no_color: bool) {
    if no_color {
        table.set_header(names.to_vec());
    } else {
        table.set_header(
            names
                .iter()
                .map(|name| Cell::new(name).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
}

/// Board summaries as a table
pub fn format_boards(boards: &[&BoardSummary], no_color: bool) -> String {
    if boards.is_empty() {
        return "No boards found.".to_string();
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(
        &mut table,
        &["ID", "Name", "Lists", "Cards", "Recent", "Last activity"],
        no_color,
    );

    for board in boards {
        let last_activity = board
            .last_activity
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(Row::from(vec![
            board.id.to_string(),
            truncate(board.display_name(), 40),
            board.list_count().to_string(),
            board.card_count().to_string(),
            board.recent_action_count().to_string(),
            last_activity,
        ]));
    }

    table.to_string()
}

/// Lists of each board with the first `per_list` card names
pub fn format_card_preview(boards: &[&BoardSummary], per_list: usize) -> String {
    let mut lines = Vec::new();
    for board in boards {
        lines.push(format!("{} ({})", board.display_name(), board.id));
        for (list, cards) in board.cards_by_list() {
            let mut names: Vec<String> = cards
                .iter()
                .take(per_list)
                .map(|card| truncate(&card.name, 30))
                .collect();
            if cards.len() > per_list {
                names.push(format!("+{} more", cards.len() - per_list));
            }
            let shown = if names.is_empty() {
                "-".to_string()
            } else {
                names.join(", ")
            };
            lines.push(format!("  {} [{}]: {}", list.name, cards.len(), shown));
        }
    }
    lines.join("\n")
}

/// Filter choices with loaded activity counts; the active one is starred
pub fn format_filter_counts(state: &DashboardState) -> String {
    let mark = |active: bool| if active { "*" } else { "" };

    let mut parts = vec![format!(
        "{}{} ({})",
        mark(state.activity_filter.is_all()),
        ALL_BOARDS,
        state.activities.len()
    )];
    parts.extend(
        activity_counts(&state.activities, &state.boards)
            .into_iter()
            .map(|(board, count)| {
                let active = state.activity_filter.board() == Some(&board.id);
                format!("{}{} ({})", mark(active), truncate(board.display_name(), 24), count)
            }),
    );
    format!("Filter: {}", parts.join(" | "))
}

/// "Cache Status: ... (N fresh, M expired)"
pub fn format_cache_headline(status: &CacheStatus) -> String {
    format!(
        "Cache Status: {} ({} fresh, {} expired)",
        status.headline(),
        status.summary.fresh_count,
        status.summary.expired_count
    )
}

/// Per-board cache freshness table with the headline on top
pub fn format_cache_status(status: &CacheStatus, no_color: bool) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(&mut table, &["Board", "State", "Expires in"], no_color);

    for (board, freshness) in &status.entries {
        let (label, expires) = match freshness {
            Freshness::Fresh { ttl_remaining } => ("fresh", format_age(*ttl_remaining)),
            Freshness::Expired => ("expired", "-".to_string()),
        };

        let state_cell = if no_color {
            Cell::new(label)
        } else if freshness.is_fresh() {
            Cell::new(label).fg(Color::Green)
        } else {
            Cell::new(label).fg(Color::Yellow)
        };

        table.add_row(Row::from(vec![
            Cell::new(board),
            state_cell,
            Cell::new(expires),
        ]));
    }

    format!("{}\n{}", format_cache_headline(status), table)
}

/// Page navigation line, e.g. `1 ... 4 [5] 6 ... 12`
pub fn format_page_window(view: &ActivityView<'_>) -> String {
    view.window
        .iter()
        .map(|slot| match slot {
            PageSlot::Page(n) if *n == view.page => format!("[{}]", n),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Activity timeline page (human or JSON)
pub fn format_activity(view: &ActivityView<'_>, json: bool, no_color: bool) -> String {
    if json {
        let payload = serde_json::json!({
            "page": view.page,
            "total_pages": view.total_pages,
            "total": view.total_filtered,
            "activities": view.items,
        });
        return serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string());
    }

    if view.is_empty() {
        return match view.filter_board_name {
            Some(name) => format!("No recent activity found for {}.", name),
            None if view.total_filtered > 0 => {
                format!("Page {} is past the last page ({}).", view.page, view.total_pages)
            }
            None => "No recent activity found.".to_string(),
        };
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(&mut table, &["When", "Board", "Activity"], no_color);

    for record in &view.items {
        table.add_row(Row::from(vec![
            record.date.format("%Y-%m-%d %H:%M").to_string(),
            truncate(record.board_name.as_deref().unwrap_or("-"), 24),
            truncate(&record.describe(), 80),
        ]));
    }

    let mut out = table.to_string();
    if let Some((from, to)) = view.range {
        out.push_str(&format!(
            "\nShowing {} to {} of {} activities",
            from, to, view.total_filtered
        ));
    }
    if view.shows_pagination() {
        out.push_str(&format!("\nPages: {}", format_page_window(view)));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        s.chars().take(max - 1).collect::<String>() + "…"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardwatch_core::models::{ActivityFilter, ActivityRecord, BoardId, CacheEntryInfo, CacheInfoMap};
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    fn records(count: usize) -> Vec<ActivityRecord> {
        let base = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        (0..count)
            .rev()
            .map(|i| ActivityRecord {
                id: format!("a{}", i),
                kind: "commentCard".to_string(),
                date: base + Duration::minutes(i as i64),
                data: json!({"card": {"name": "Launch"}}),
                member_creator: None,
                board_name: Some("Roadmap".to_string()),
                board_id: Some(BoardId::from("b1")),
            })
            .collect()
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 3), "éé…");
    }

    #[test]
    fn test_format_selection() {
        let mut state = DashboardState::default();
        assert_eq!(format_selection(&state), "No boards tracked.");

        state.selected_board_ids.add("b1".into());
        let out = format_selection(&state);
        assert!(out.contains("Tracked boards (1):"));
        assert!(out.contains("Activity filter: all"));
    }

    #[test]
    fn test_format_cache_status() {
        let mut info = CacheInfoMap::new();
        info.insert(
            "b1".to_string(),
            CacheEntryInfo {
                age_seconds: 30.0,
                expires_in_seconds: 150.0,
                is_expired: false,
            },
        );
        info.insert(
            "b2".to_string(),
            CacheEntryInfo {
                age_seconds: 400.0,
                expires_in_seconds: 0.0,
                is_expired: true,
            },
        );
        let state = DashboardState {
            cache_info: Some(info),
            from_cache: true,
            ..DashboardState::default()
        };

        let status = CacheStatus::from_state(&state).unwrap();
        assert_eq!(
            format_cache_headline(&status),
            "Cache Status: Using cached data (1 fresh, 1 expired)"
        );
        let out = format_cache_status(&status, true);
        assert!(out.contains("3m"));
        assert!(out.contains("expired"));
    }

    #[test]
    fn test_format_activity_pages() {
        let state = DashboardState {
            activities: records(120),
            activity_page: 2,
            ..DashboardState::default()
        };
        let view = ActivityView::derive(&state, 5);

        let out = format_activity(&view, false, true);
        assert!(out.contains("Showing 51 to 100 of 120 activities"));
        assert!(out.contains("Pages: 1 [2] 3"));
        assert!(out.contains("commented on \"Launch\""));
    }

    #[test]
    fn test_format_activity_empty_filter() {
        let state = DashboardState {
            activity_filter: ActivityFilter::Board("b9".into()),
            ..DashboardState::default()
        };
        let view = ActivityView::derive(&state, 5);
        assert_eq!(
            format_activity(&view, false, true),
            "No recent activity found for selected board."
        );
    }

    fn board(id: &str, name: &str) -> BoardSummary {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "lists": [{"id": "l1", "name": "To Do"}, {"id": "l2", "name": "Done"}],
            "cards": [
                {"id": "c1", "name": "Write notes", "idList": "l1"},
                {"id": "c2", "name": "Ship it", "idList": "l1"},
                {"id": "c3", "name": "Review", "idList": "l1"},
            ],
        }))
        .unwrap()
    }

    #[test]
    fn test_format_card_preview() {
        let roadmap = board("b1", "Roadmap");
        let out = format_card_preview(&[&roadmap], 2);

        assert!(out.starts_with("Roadmap (b1)"));
        assert!(out.contains("  To Do [3]: Write notes, Ship it, +1 more"));
        assert!(out.contains("  Done [0]: -"));
    }

    #[test]
    fn test_format_filter_counts() {
        let mut state = DashboardState {
            boards: vec![board("b1", "Roadmap"), board("b2", "Bugs")],
            activities: records(3),
            ..DashboardState::default()
        };
        assert_eq!(
            format_filter_counts(&state),
            "Filter: *all (3) | Roadmap (3) | Bugs (0)"
        );

        state.activity_filter = ActivityFilter::Board("b2".into());
        assert_eq!(
            format_filter_counts(&state),
            "Filter: all (3) | Roadmap (3) | *Bugs (0)"
        );
    }

    #[test]
    fn test_format_activity_json() {
        let state = DashboardState {
            activities: records(3),
            ..DashboardState::default()
        };
        let view = ActivityView::derive(&state, 5);
        let value: serde_json::Value =
            serde_json::from_str(&format_activity(&view, true, true)).unwrap();
        assert_eq!(value["total"], 3);
        assert_eq!(value["activities"].as_array().unwrap().len(), 3);
        assert_eq!(value["activities"][0]["type"], "commentCard");
    }
}
