//! Overlay rendering: the filter menu popup and the help screen.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::data::TIME_RANGES;
use crate::tui::app::App;

/// Centered popup rectangle with the given percentage size.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

pub fn draw_filter_menu(f: &mut Frame, app: &App) {
    let theme = app.theme();
    let area = centered_rect(44, 55, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.secondary))
        .title(Span::styled(
            " Time Range Filter ",
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = vec![Line::default()];
    for (i, range) in TIME_RANGES.iter().enumerate() {
        let label = format!("{}. {} - {}", i + 1, range.label, range.desc);
        let line = if i == app.filter_menu_index {
            Line::from(Span::styled(
                format!("▶ {}", label),
                Style::default()
                    .fg(theme.highlight)
                    .bg(theme.border)
                    .add_modifier(Modifier::BOLD),
            ))
        } else if i == app.range_index && app.custom_since.is_none() {
            Line::from(Span::styled(
                format!("✓ {}", label),
                Style::default().fg(theme.success),
            ))
        } else {
            Line::from(Span::styled(
                format!("  {}", label),
                Style::default().fg(theme.foreground),
            ))
        };
        lines.push(line);
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "↑↓ or 1-6 select · Enter apply · Esc cancel",
        Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(lines), inner);
}

pub fn draw_help(f: &mut Frame, app: &App) {
    let theme = app.theme();
    let area = centered_rect(80, 90, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.primary))
        .title(Span::styled(
            " Help ",
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().fg(theme.secondary).add_modifier(Modifier::BOLD),
        ))
    };
    let item = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(
                format!("  {:<10}", key),
                Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD),
            ),
            Span::styled(desc, Style::default().fg(theme.foreground)),
        ])
    };

    let lines = vec![
        section("Navigation"),
        item("Tab", "Cycle panels: Timeline → Matrix → Stats → Delegation"),
        item("↑↓ / j k", "Move selection in the focused panel"),
        item("?", "Toggle this help"),
        item("q / Esc", "Quit (Esc closes an open overlay first)"),
        item("Ctrl-C", "Quit"),
        Line::default(),
        section("Time filter"),
        item("1-6", "Quick ranges: 7d · 30d · 90d · 180d · 365d · all"),
        item("f", "Open the filter menu"),
        item("r", "Reload with the current filter"),
        Line::default(),
        section("Timeline"),
        item("← →", "Scroll the viewport in time"),
        item("↑ ↓", "Zoom: Hour ↔ Day ↔ Week ↔ Month"),
        item("Space", "Select the event nearest the viewport center"),
        item("r", "Reset view to the last 24h at day zoom"),
        Line::default(),
        section("Stats"),
        item("c", "Sort by call count (repeat to flip direction)"),
        item("s", "Sort by success rate"),
        item("d", "Sort by mean duration"),
        Line::default(),
        section("Delegation"),
        item("s", "Cycle sort: frequency → recency → source → target"),
        item("f", "Cycle min-count filter: 0 → 2 → 5 → 10"),
        Line::default(),
        section("Matrix"),
        item("m", "Cycle mode: matrix → relationships → insights"),
        item("i", "Jump to insights"),
        item("arrows", "Move the matrix cursor (matrix mode)"),
        Line::default(),
        Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
        )),
    ];

    f.render_widget(Paragraph::new(lines), inner);
}
