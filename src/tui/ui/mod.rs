//! Rendering. Everything here paints from view-models and app state; no
//! analytic logic lives in this module tree.

mod overlays;
mod panels;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::app::App;
use crate::data::Panel;

pub fn draw(f: &mut Frame, app: &App) {
    if app.show_help {
        overlays::draw_help(f, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),      // header
            Constraint::Percentage(30), // timeline
            Constraint::Min(10),        // matrix | stats
            Constraint::Length(7),      // delegation strip
            Constraint::Length(1),      // footer
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);
    panels::draw_timeline(f, chunks[1], app);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    panels::draw_matrix(f, middle[0], app);
    panels::draw_stats(f, middle[1], app);

    panels::draw_delegation(f, chunks[3], app);
    draw_footer(f, chunks[4], app);

    if app.filter_menu_open {
        overlays::draw_filter_menu(f, app);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let mut spans = vec![Span::styled(
        " swarmboard ",
        Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
    )];

    if app.is_loading {
        spans.push(Span::styled(" ⟳ loading…", Style::default().fg(theme.warning)));
    } else if let Some(error) = &app.last_error {
        spans.push(Span::styled(
            format!(" ⚠ {}", error),
            Style::default().fg(theme.error),
        ));
    } else if let Some(loaded) = app.last_load_time {
        let age = chrono::Utc::now().signed_duration_since(loaded);
        let (marker, color) = if age < chrono::Duration::minutes(1) {
            ("✓ fresh", theme.success)
        } else if age < chrono::Duration::minutes(5) {
            ("○ recent", theme.warning)
        } else {
            ("● stale", theme.muted)
        };
        spans.push(Span::styled(format!(" {}", marker), Style::default().fg(color)));
    }

    spans.push(Span::styled(
        format!(" [{}]", app.filter_description()),
        Style::default().fg(theme.info),
    ));
    spans.push(Span::styled(
        format!(" [{}]", theme.display_name),
        Style::default().fg(theme.muted),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let keys = match app.focused_panel {
        Panel::Timeline => {
            "Timeline: ←→ scroll · ↑↓ zoom · Space select · r reset │ t theme · 1-6 filter · f menu · Tab panels · ? help · q quit"
        }
        Panel::Stats => {
            "Stats: c/s/d sort · ↑↓ navigate · r reload │ 1-6 filter · f menu · Tab panels · ? help · q quit"
        }
        Panel::Delegation => {
            "Delegation: s sort · f min-count · ↑↓ navigate · r reload │ 1-6 filter · Tab panels · ? help · q quit"
        }
        Panel::CoOccurrence => {
            "Matrix: m mode · i insights · arrows navigate · r reload │ 1-6 filter · f menu · Tab panels · ? help · q quit"
        }
    };
    f.render_widget(
        Paragraph::new(keys).style(Style::default().fg(app.theme().muted)),
        area,
    );
}
