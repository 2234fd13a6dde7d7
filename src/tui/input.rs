//! Key dispatch: maps key events to messages based on the current mode.
//!
//! Pure functions over (&App, KeyEvent) so every binding is testable
//! without a terminal.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::App;
use super::message::Message;
use crate::data::{MatrixMode, Panel, SortColumn};

pub fn dispatch(app: &App, key: KeyEvent) -> Message {
    // Ctrl-C quits from anywhere.
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Message::Quit;
    }

    if app.show_help {
        return dispatch_help(key);
    }
    if app.filter_menu_open {
        return dispatch_filter_menu(key);
    }
    dispatch_normal(app, key)
}

/// While help is shown only quit keys and the toggle act.
fn dispatch_help(key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Char('q') => Message::Quit,
        KeyCode::Char('?') | KeyCode::Esc => Message::CloseOverlay,
        _ => Message::None,
    }
}

fn dispatch_filter_menu(key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Char('q') => Message::Quit,
        KeyCode::Esc => Message::CloseOverlay,
        KeyCode::Enter => Message::FilterMenuApply,
        KeyCode::Up | KeyCode::Char('k') => Message::FilterMenuMove(-1),
        KeyCode::Down | KeyCode::Char('j') => Message::FilterMenuMove(1),
        KeyCode::Char(c @ '1'..='6') => {
            Message::FilterMenuSelect(c.to_digit(10).unwrap() as usize - 1)
        }
        _ => Message::None,
    }
}

fn dispatch_normal(app: &App, key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Message::Quit,
        KeyCode::Char('?') => Message::ToggleHelp,
        KeyCode::Tab => Message::NextPanel,
        KeyCode::Char('t') => Message::CycleTheme,

        // Quick time filters outside the menu.
        KeyCode::Char(c @ '1'..='6') => {
            Message::QuickFilter(c.to_digit(10).unwrap() as usize - 1)
        }

        KeyCode::Char('f') => {
            // Panel-local override: the delegation panel's min-count cycle.
            if app.focused_panel == Panel::Delegation {
                Message::CycleDelegationFilter
            } else {
                Message::ToggleFilterMenu
            }
        }

        KeyCode::Char('r') => {
            if app.focused_panel == Panel::Timeline {
                Message::ResetTimelineView
            } else {
                Message::Reload
            }
        }

        KeyCode::Up | KeyCode::Char('k') => vertical(app, -1),
        KeyCode::Down | KeyCode::Char('j') => vertical(app, 1),
        KeyCode::Left => horizontal(app, -1),
        KeyCode::Right => horizontal(app, 1),

        KeyCode::Char(' ') => {
            if app.focused_panel == Panel::Timeline {
                Message::SelectNearestEvent
            } else {
                Message::None
            }
        }

        KeyCode::Char('c') => {
            if app.focused_panel == Panel::Stats {
                Message::SetSortColumn(SortColumn::Count)
            } else {
                Message::None
            }
        }
        KeyCode::Char('s') => match app.focused_panel {
            Panel::Stats => Message::SetSortColumn(SortColumn::SuccessRate),
            Panel::Delegation => Message::CycleDelegationSort,
            _ => Message::None,
        },
        KeyCode::Char('d') => {
            if app.focused_panel == Panel::Stats {
                Message::SetSortColumn(SortColumn::Duration)
            } else {
                Message::None
            }
        }

        KeyCode::Char('m') => {
            if app.focused_panel == Panel::CoOccurrence {
                Message::CycleMatrixMode
            } else {
                Message::None
            }
        }
        KeyCode::Char('i') => {
            if app.focused_panel == Panel::CoOccurrence {
                Message::ShowInsights
            } else {
                Message::None
            }
        }

        _ => Message::None,
    }
}

fn vertical(app: &App, delta: i32) -> Message {
    match app.focused_panel {
        Panel::Timeline => Message::Zoom(delta),
        Panel::CoOccurrence if app.matrix_mode == MatrixMode::Matrix => {
            Message::MatrixCursor { row_delta: delta, col_delta: 0 }
        }
        Panel::CoOccurrence if app.matrix_mode == MatrixMode::Insights => Message::None,
        _ => Message::MoveSelection(delta),
    }
}

fn horizontal(app: &App, delta: i32) -> Message {
    match app.focused_panel {
        Panel::Timeline => Message::ScrollTimeline(delta),
        Panel::CoOccurrence if app.matrix_mode == MatrixMode::Matrix => {
            Message::MatrixCursor { row_delta: 0, col_delta: delta }
        }
        _ => Message::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::AppOptions;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn test_app() -> App {
        App::new(AppOptions::default())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    fn ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    #[test]
    fn test_quit_keys() {
        let app = test_app();
        assert_eq!(dispatch(&app, key(KeyCode::Char('q'))), Message::Quit);
        assert_eq!(dispatch(&app, key(KeyCode::Esc)), Message::Quit);
        assert_eq!(dispatch(&app, ctrl(KeyCode::Char('c'))), Message::Quit);
    }

    #[test]
    fn test_esc_closes_overlay_instead_of_quitting() {
        let mut app = test_app();
        app.show_help = true;
        assert_eq!(dispatch(&app, key(KeyCode::Esc)), Message::CloseOverlay);

        app.show_help = false;
        app.filter_menu_open = true;
        assert_eq!(dispatch(&app, key(KeyCode::Esc)), Message::CloseOverlay);
    }

    #[test]
    fn test_help_blocks_navigation() {
        let mut app = test_app();
        app.show_help = true;
        assert_eq!(dispatch(&app, key(KeyCode::Tab)), Message::None);
        assert_eq!(dispatch(&app, key(KeyCode::Char('1'))), Message::None);
        assert_eq!(dispatch(&app, key(KeyCode::Char('q'))), Message::Quit);
        assert_eq!(dispatch(&app, key(KeyCode::Char('?'))), Message::CloseOverlay);
    }

    #[test]
    fn test_digits_move_selection_inside_menu() {
        let mut app = test_app();
        app.filter_menu_open = true;
        assert_eq!(dispatch(&app, key(KeyCode::Char('3'))), Message::FilterMenuSelect(2));
        assert_eq!(dispatch(&app, key(KeyCode::Enter)), Message::FilterMenuApply);
    }

    #[test]
    fn test_digits_are_quick_filters_outside_menu() {
        let app = test_app();
        assert_eq!(dispatch(&app, key(KeyCode::Char('1'))), Message::QuickFilter(0));
        assert_eq!(dispatch(&app, key(KeyCode::Char('6'))), Message::QuickFilter(5));
    }

    #[test]
    fn test_f_is_panel_local_on_delegation() {
        let mut app = test_app();
        assert_eq!(dispatch(&app, key(KeyCode::Char('f'))), Message::ToggleFilterMenu);

        app.focused_panel = Panel::Delegation;
        assert_eq!(
            dispatch(&app, key(KeyCode::Char('f'))),
            Message::CycleDelegationFilter
        );
    }

    #[test]
    fn test_r_resets_timeline_but_reloads_elsewhere() {
        let mut app = test_app();
        assert_eq!(dispatch(&app, key(KeyCode::Char('r'))), Message::ResetTimelineView);

        app.focused_panel = Panel::Stats;
        assert_eq!(dispatch(&app, key(KeyCode::Char('r'))), Message::Reload);
    }

    #[test]
    fn test_arrows_zoom_on_timeline() {
        let app = test_app();
        assert_eq!(dispatch(&app, key(KeyCode::Up)), Message::Zoom(-1));
        assert_eq!(dispatch(&app, key(KeyCode::Down)), Message::Zoom(1));
        assert_eq!(dispatch(&app, key(KeyCode::Left)), Message::ScrollTimeline(-1));
        assert_eq!(dispatch(&app, key(KeyCode::Right)), Message::ScrollTimeline(1));
    }

    #[test]
    fn test_arrows_move_matrix_cursor() {
        let mut app = test_app();
        app.focused_panel = Panel::CoOccurrence;
        assert_eq!(
            dispatch(&app, key(KeyCode::Right)),
            Message::MatrixCursor { row_delta: 0, col_delta: 1 }
        );
        assert_eq!(
            dispatch(&app, key(KeyCode::Up)),
            Message::MatrixCursor { row_delta: -1, col_delta: 0 }
        );

        // Relationship mode navigates the list instead.
        app.matrix_mode = MatrixMode::Relationships;
        assert_eq!(dispatch(&app, key(KeyCode::Down)), Message::MoveSelection(1));

        // Insights ignores vertical navigation.
        app.matrix_mode = MatrixMode::Insights;
        assert_eq!(dispatch(&app, key(KeyCode::Down)), Message::None);
    }

    #[test]
    fn test_sort_keys_only_bind_on_their_panels() {
        let mut app = test_app();
        assert_eq!(dispatch(&app, key(KeyCode::Char('c'))), Message::None);

        app.focused_panel = Panel::Stats;
        assert_eq!(
            dispatch(&app, key(KeyCode::Char('c'))),
            Message::SetSortColumn(SortColumn::Count)
        );
        assert_eq!(
            dispatch(&app, key(KeyCode::Char('s'))),
            Message::SetSortColumn(SortColumn::SuccessRate)
        );
        assert_eq!(
            dispatch(&app, key(KeyCode::Char('d'))),
            Message::SetSortColumn(SortColumn::Duration)
        );

        app.focused_panel = Panel::Delegation;
        assert_eq!(dispatch(&app, key(KeyCode::Char('s'))), Message::CycleDelegationSort);
    }

    #[test]
    fn test_space_selects_event_on_timeline_only() {
        let mut app = test_app();
        assert_eq!(dispatch(&app, key(KeyCode::Char(' '))), Message::SelectNearestEvent);

        app.focused_panel = Panel::Stats;
        assert_eq!(dispatch(&app, key(KeyCode::Char(' '))), Message::None);
    }
}
