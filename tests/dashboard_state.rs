//! Integration tests for the dashboard state machine: key dispatch through
//! `App::update`, sort toggling, filter changes, reload supersession, and
//! the selection-bounds invariant.

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

use swarmboard::data::{
    AnalyticsSnapshot, GlobalAgentStats, Panel, SortColumn, SortDirection, ZoomLevel,
    TIME_RANGES,
};
use swarmboard::error::LoadError;
use swarmboard::tui::app::TimelineView;
use swarmboard::tui::input::dispatch;
use swarmboard::tui::projector;
use swarmboard::tui::{App, AppOptions, Command, DataLoaded};

// ============================================================================
// Helpers
// ============================================================================

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::empty(),
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

/// Route a key through dispatch and update, like the event loop does.
fn press(app: &mut App, code: KeyCode) -> Option<Command> {
    let msg = dispatch(app, key(code));
    app.update(msg)
}

fn agent_stats(entries: &[(&str, u64, u64)]) -> BTreeMap<String, GlobalAgentStats> {
    entries
        .iter()
        .map(|(name, count, success)| {
            (
                name.to_string(),
                GlobalAgentStats {
                    count: *count,
                    success_count: *success,
                    failure_count: count - success,
                    total_duration_ms: 0,
                    min_ms: None,
                    max_ms: None,
                    duration_known: false,
                },
            )
        })
        .collect()
}

fn load_stats(app: &mut App, entries: &[(&str, u64, u64)]) {
    let snapshot = AnalyticsSnapshot {
        agent_stats: agent_stats(entries),
        ..Default::default()
    };
    app.handle_data_loaded(DataLoaded {
        generation: app.generation(),
        result: Ok(snapshot),
    });
}

fn stats_order(app: &App) -> Vec<String> {
    projector::project_stats(
        &app.snapshot.agent_stats,
        app.effective_sort_column(),
        app.sort_direction,
        app.stats_selected,
    )
    .rows
    .into_iter()
    .map(|r| r.name)
    .collect()
}

// ============================================================================
// Sort toggle behavior
// ============================================================================

#[test]
fn test_sort_toggle_sequence() {
    let mut app = App::new(AppOptions::default());
    load_stats(&mut app, &[("A", 10, 10), ("B", 5, 2)]);
    app.focused_panel = Panel::Stats;

    press(&mut app, KeyCode::Char('c'));
    assert_eq!(app.sort_direction, SortDirection::Descending);
    assert_eq!(stats_order(&app), vec!["A", "B"]);

    press(&mut app, KeyCode::Char('c'));
    assert_eq!(app.sort_direction, SortDirection::Ascending);
    assert_eq!(stats_order(&app), vec!["B", "A"]);

    // A distinct sort key always yields descending and resets selection.
    app.stats_selected = 1;
    press(&mut app, KeyCode::Char('s'));
    assert_eq!(app.sort_column, Some(SortColumn::SuccessRate));
    assert_eq!(app.sort_direction, SortDirection::Descending);
    assert_eq!(app.stats_selected, 0);
    // A has 100% success, B 40%.
    assert_eq!(stats_order(&app), vec!["A", "B"]);
}

#[test]
fn test_sort_key_twice_round_trips_ordering() {
    let mut app = App::new(AppOptions::default());
    load_stats(&mut app, &[("A", 10, 10), ("B", 5, 2), ("C", 7, 7)]);
    app.focused_panel = Panel::Stats;

    // Make count the current sort key, then toggle twice.
    press(&mut app, KeyCode::Char('c'));
    let original = stats_order(&app);
    press(&mut app, KeyCode::Char('c'));
    assert_ne!(stats_order(&app), original);
    press(&mut app, KeyCode::Char('c'));
    assert_eq!(stats_order(&app), original);
}

// ============================================================================
// Quick filter
// ============================================================================

#[test]
fn test_quick_filter_issues_reload_and_advances_load_time() {
    let mut app = App::new(AppOptions::default());
    assert_eq!(TIME_RANGES[app.range_index].filter, "30d");

    let command = press(&mut app, KeyCode::Char('3'));
    assert_eq!(command, Some(Command::Reload));
    assert_eq!(TIME_RANGES[app.range_index].filter, "90d");
    assert_eq!(app.active_filter().as_deref(), Some("90d"));
    assert!(app.is_loading);
    assert!(app.last_load_time.is_none());

    app.handle_data_loaded(DataLoaded {
        generation: app.generation(),
        result: Ok(AnalyticsSnapshot::default()),
    });
    assert!(!app.is_loading);
    assert!(app.last_load_time.is_some());
}

// ============================================================================
// Reload supersession
// ============================================================================

#[test]
fn test_stale_reload_result_is_discarded() {
    let mut app = App::new(AppOptions::default());

    press(&mut app, KeyCode::Char('1')); // 7d
    let stale_generation = app.generation();
    press(&mut app, KeyCode::Char('5')); // 1y supersedes

    assert_eq!(app.active_filter().as_deref(), Some("365d"));

    // The 7d result arrives late and must not replace anything.
    app.handle_data_loaded(DataLoaded {
        generation: stale_generation,
        result: Ok(AnalyticsSnapshot {
            agent_stats: agent_stats(&[("stale", 1, 1)]),
            ..Default::default()
        }),
    });
    assert!(app.is_loading);
    assert!(app.snapshot.agent_stats.is_empty());

    app.handle_data_loaded(DataLoaded {
        generation: app.generation(),
        result: Ok(AnalyticsSnapshot {
            agent_stats: agent_stats(&[("fresh", 2, 2)]),
            ..Default::default()
        }),
    });
    assert!(!app.is_loading);
    assert!(app.snapshot.agent_stats.contains_key("fresh"));
}

#[test]
fn test_failed_reload_keeps_previous_snapshot_visible() {
    let mut app = App::new(AppOptions::default());
    load_stats(&mut app, &[("A", 3, 3)]);

    press(&mut app, KeyCode::Char('2'));
    app.handle_data_loaded(DataLoaded {
        generation: app.generation(),
        result: Err(LoadError::NoEntriesMatch),
    });

    assert_eq!(app.last_error, Some(LoadError::NoEntriesMatch));
    assert!(app.snapshot.agent_stats.contains_key("A"));
}

// ============================================================================
// Focus and overlays
// ============================================================================

#[test]
fn test_tab_four_times_returns_to_original_panel() {
    let mut app = App::new(AppOptions::default());
    let start = app.focused_panel;

    let mut visited = vec![start];
    for _ in 0..4 {
        press(&mut app, KeyCode::Tab);
        visited.push(app.focused_panel);
    }

    assert_eq!(app.focused_panel, start);
    // All four panels are reachable in one cycle.
    assert!(visited.contains(&Panel::Timeline));
    assert!(visited.contains(&Panel::CoOccurrence));
    assert!(visited.contains(&Panel::Stats));
    assert!(visited.contains(&Panel::Delegation));
}

#[test]
fn test_help_gates_all_navigation() {
    let mut app = App::new(AppOptions::default());
    press(&mut app, KeyCode::Char('?'));
    assert!(app.show_help);

    let panel = app.focused_panel;
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Char('2'));
    assert_eq!(app.focused_panel, panel);
    assert!(!app.is_loading);

    press(&mut app, KeyCode::Esc);
    assert!(!app.show_help);
}

#[test]
fn test_filter_menu_digit_moves_selection_enter_applies() {
    let mut app = App::new(AppOptions::default());
    press(&mut app, KeyCode::Char('f'));
    assert!(app.filter_menu_open);

    press(&mut app, KeyCode::Char('5'));
    assert!(app.filter_menu_open, "digits move the selection, not apply");
    assert_eq!(app.filter_menu_index, 4);
    assert!(!app.is_loading);

    let command = press(&mut app, KeyCode::Enter);
    assert_eq!(command, Some(Command::Reload));
    assert!(!app.filter_menu_open);
    assert_eq!(app.active_filter().as_deref(), Some("365d"));
}

#[test]
fn test_filter_menu_escape_cancels() {
    let mut app = App::new(AppOptions::default());
    let before = app.range_index;

    press(&mut app, KeyCode::Char('f'));
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Esc);

    assert!(!app.filter_menu_open);
    assert_eq!(app.range_index, before);
    assert!(!app.is_loading);
}

// ============================================================================
// Timeline view
// ============================================================================

#[test]
fn test_timeline_zoom_steps() {
    let mut app = App::new(AppOptions::default());
    assert_eq!(app.timeline.zoom, ZoomLevel::Day);

    press(&mut app, KeyCode::Up);
    assert_eq!(app.timeline.zoom, ZoomLevel::Hour);
    assert_eq!(app.timeline.zoom.graph_width(), 120);

    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Down);
    assert_eq!(app.timeline.zoom, ZoomLevel::Week);
    assert_eq!(app.timeline.zoom.graph_width(), 60);
}

#[test]
fn test_timeline_reset_equals_initial_state() {
    let mut app = App::new(AppOptions::default());
    let initial = app.timeline.clone();

    press(&mut app, KeyCode::Up);
    press(&mut app, KeyCode::Left);
    press(&mut app, KeyCode::Left);
    press(&mut app, KeyCode::Char('r'));

    assert_eq!(app.timeline, initial);
    assert_eq!(app.timeline, TimelineView::default());
}

// ============================================================================
// Selection bounds invariant
// ============================================================================

#[test]
fn test_selection_stays_in_bounds_after_any_key_sequence() {
    let mut app = App::new(AppOptions::default());
    load_stats(&mut app, &[("A", 10, 9), ("B", 5, 5), ("C", 2, 1)]);

    let sequence = [
        KeyCode::Tab,
        KeyCode::Down,
        KeyCode::Down,
        KeyCode::Down,
        KeyCode::Down,
        KeyCode::Tab,
        KeyCode::Down,
        KeyCode::Down,
        KeyCode::Down,
        KeyCode::Down,
        KeyCode::Down,
        KeyCode::Up,
        KeyCode::Tab,
        KeyCode::Down,
        KeyCode::Down,
        KeyCode::Up,
        KeyCode::Up,
        KeyCode::Up,
        KeyCode::Char('j'),
        KeyCode::Char('k'),
    ];
    for code in sequence {
        press(&mut app, code);
    }

    let stats_len = app.snapshot.agent_stats.len();
    assert!(app.stats_selected <= stats_len.saturating_sub(1));
    assert_eq!(app.delegation_selected, 0);
    assert_eq!(app.relationship_selected, 0);
    assert!(app.matrix_cursor.0 < 6 && app.matrix_cursor.1 < 6);
}

#[test]
fn test_empty_lists_make_navigation_noops() {
    let mut app = App::new(AppOptions::default());
    app.focused_panel = Panel::Stats;

    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Up);
    assert_eq!(app.stats_selected, 0);

    app.focused_panel = Panel::Delegation;
    press(&mut app, KeyCode::Down);
    assert_eq!(app.delegation_selected, 0);
}

// ============================================================================
// Reload resets selections but preserves focus, sort, zoom, theme
// ============================================================================

#[test]
fn test_reload_preserves_view_state_but_resets_selections() {
    let mut app = App::new(AppOptions::default());
    load_stats(&mut app, &[("A", 10, 9), ("B", 5, 5), ("C", 2, 1)]);

    app.focused_panel = Panel::Stats;
    press(&mut app, KeyCode::Char('d'));
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Char('t'));
    let theme = app.theme_index;
    press(&mut app, KeyCode::Char('r'));

    app.handle_data_loaded(DataLoaded {
        generation: app.generation(),
        result: Ok(AnalyticsSnapshot {
            agent_stats: agent_stats(&[("A", 11, 10), ("B", 5, 5)]),
            ..Default::default()
        }),
    });

    assert_eq!(app.focused_panel, Panel::Stats);
    assert_eq!(app.sort_column, Some(SortColumn::Duration));
    assert_eq!(app.theme_index, theme);
    assert_eq!(app.stats_selected, 0);
    assert_eq!(app.matrix_cursor, (0, 0));
}

// ============================================================================
// Theme cycling
// ============================================================================

#[test]
fn test_theme_cycles_and_wraps() {
    let mut app = App::new(AppOptions::default());
    let start = app.theme_index;
    for _ in 0..swarmboard::tui::theme::THEMES.len() {
        press(&mut app, KeyCode::Char('t'));
    }
    assert_eq!(app.theme_index, start);
}

// ============================================================================
// Stats invariants against projected data
// ============================================================================

#[test]
fn test_projected_stats_uphold_invariants() {
    let mut app = App::new(AppOptions::default());
    load_stats(&mut app, &[("A", 10, 9), ("B", 5, 5)]);

    for stats in app.snapshot.agent_stats.values() {
        assert_eq!(stats.success_count + stats.failure_count, stats.count);
        assert!(stats.mean_ms() >= 0.0);
        if let Some(max) = stats.max_ms {
            assert!(stats.mean_ms() <= max as f64);
        }
    }

    let vm = projector::project_stats(
        &app.snapshot.agent_stats,
        app.effective_sort_column(),
        app.sort_direction,
        0,
    );
    for (i, row) in vm.rows.iter().enumerate() {
        assert_eq!(row.rank, i + 1);
        assert!((0.0..=100.0).contains(&row.success_rate));
    }
}

#[test]
fn test_last_load_time_is_recent() {
    let mut app = App::new(AppOptions::default());
    load_stats(&mut app, &[("A", 1, 1)]);
    let loaded = app.last_load_time.unwrap();
    assert!(Utc::now().signed_duration_since(loaded).num_seconds() < 5);
}
