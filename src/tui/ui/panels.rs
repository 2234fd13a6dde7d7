//! Panel rendering from view-models.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use ratatui::Frame;

use crate::data::{MatrixMode, Panel, RelationshipStrength, SortColumn, SortDirection};
use crate::tui::app::App;
use crate::tui::projector::{self, MatrixCell};
use crate::tui::theme::Theme;
use crate::util::fit_width;

/// Braille intensity ramp for the activity graph, low to high.
const ACTIVITY_RAMP: [char; 9] = [' ', '⠁', '⠃', '⠇', '⡇', '⣇', '⣧', '⣷', '⣿'];

fn activity_glyph(value: f64) -> char {
    if value <= 0.0 {
        return ACTIVITY_RAMP[0];
    }
    if value >= 1.0 {
        return '█';
    }
    let idx = (value * (ACTIVITY_RAMP.len() - 1) as f64).ceil() as usize;
    ACTIVITY_RAMP[idx.min(ACTIVITY_RAMP.len() - 1)]
}

fn strength_glyph(cell: MatrixCell) -> char {
    match cell {
        MatrixCell::SelfCell => '■',
        MatrixCell::Scored(RelationshipStrength::Strong) => '█',
        MatrixCell::Scored(RelationshipStrength::Medium) => '▓',
        MatrixCell::Scored(RelationshipStrength::Weak) => '▒',
        MatrixCell::Scored(RelationshipStrength::Minimal) => '░',
        MatrixCell::Empty => '·',
    }
}

fn strength_color(theme: &Theme, strength: RelationshipStrength) -> ratatui::style::Color {
    match strength {
        RelationshipStrength::Minimal => theme.matrix[0],
        RelationshipStrength::Weak => theme.matrix[1],
        RelationshipStrength::Medium => theme.matrix[2],
        RelationshipStrength::Strong => theme.matrix[3],
    }
}

fn panel_block<'a>(title: String, focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if focused {
        Style::default().fg(theme.highlight)
    } else {
        Style::default().fg(theme.border)
    };
    let border_type = if focused {
        BorderType::Double
    } else {
        BorderType::Plain
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(Span::styled(
            title,
            Style::default()
                .fg(if focused { theme.highlight } else { theme.primary })
                .add_modifier(Modifier::BOLD),
        ))
}

fn empty_state<'a>(text: &'a str, theme: &Theme) -> Paragraph<'a> {
    Paragraph::new(text).style(
        Style::default()
            .fg(theme.muted)
            .add_modifier(Modifier::ITALIC),
    )
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

pub fn draw_timeline(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let focused = app.focused_panel == Panel::Timeline;
    let project_name = app
        .project_root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| app.project_root.display().to_string());
    let block = panel_block(
        format!(" timeline [{}] · zoom {} ", project_name, app.timeline.zoom.label()),
        focused,
        theme,
    );
    let inner = block.inner(area);
    f.render_widget(block, area);

    let vm = projector::project_timeline(&app.snapshot.message_events, &app.timeline);
    let Some(graph) = &vm.graph else {
        f.render_widget(empty_state("No message events in view", theme), inner);
        return;
    };

    let graph_width = (inner.width as usize).saturating_sub(14).max(10);
    let user_row = sample_row(&graph.user_activity, graph_width);
    let assistant_row = sample_row(&graph.assistant_activity, graph_width);

    let mut lines = Vec::new();
    lines.push(graph_line("User ", &user_row, theme.graph_user, format!(" {:.1} msg/bkt", vm.user_rate), theme));
    lines.push(graph_line("Asst ", &assistant_row, theme.graph_assistant, format!(" {:.1} msg/bkt", vm.assistant_rate), theme));

    lines.push(Line::from(Span::styled(
        format!("     └{}", "─".repeat(graph_width)),
        Style::default().fg(theme.muted),
    )));
    lines.push(Line::from(Span::styled(
        format!("      {}", label_row(&graph.time_labels, graph_width)),
        Style::default().fg(theme.muted),
    )));

    let mut status = format!("{} events visible", vm.visible_events);
    if let Some(event) = &vm.selected_event {
        status.push_str(&format!(
            " · selected {} {} @ {}",
            event.role.label(),
            crate::util::truncate_chars(&event.content, 40),
            event.timestamp.format("%H:%M:%S"),
        ));
    }
    lines.push(Line::from(Span::styled(
        status,
        Style::default().fg(theme.info),
    )));

    f.render_widget(Paragraph::new(lines), inner);
}

fn graph_line<'a>(
    label: &'a str,
    row: &[f64],
    color: ratatui::style::Color,
    suffix: String,
    theme: &Theme,
) -> Line<'a> {
    let glyphs: String = row.iter().map(|&v| activity_glyph(v)).collect();
    Line::from(vec![
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled("│", Style::default().fg(theme.muted)),
        Span::styled(glyphs, Style::default().fg(color)),
        Span::styled(suffix, Style::default().fg(theme.foreground)),
    ])
}

/// Resample a normalized series to the drawable width by bucket-averaging.
fn sample_row(data: &[f64], width: usize) -> Vec<f64> {
    if data.is_empty() || width == 0 {
        return vec![0.0; width];
    }
    if data.len() == width {
        return data.to_vec();
    }
    (0..width)
        .map(|i| {
            let start = i * data.len() / width;
            let end = (((i + 1) * data.len()) / width).max(start + 1).min(data.len());
            data[start..end].iter().sum::<f64>() / (end - start) as f64
        })
        .collect()
}

fn label_row(labels: &[String], width: usize) -> String {
    let mut row = vec![' '; width];
    for (i, label) in labels.iter().enumerate() {
        if label.is_empty() {
            continue;
        }
        let pos = if labels.len() > 1 {
            i * width.saturating_sub(1) / (labels.len() - 1)
        } else {
            0
        };
        let start = pos.saturating_sub(label.chars().count() / 2);
        for (j, ch) in label.chars().enumerate() {
            if start + j < width {
                row[start + j] = ch;
            }
        }
    }
    row.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Stats leaderboard
// ---------------------------------------------------------------------------

pub fn draw_stats(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let focused = app.focused_panel == Panel::Stats;
    let block = panel_block(
        format!(" stats [{}] ", app.snapshot.agent_stats.len()),
        focused,
        theme,
    );
    let inner = block.inner(area);
    f.render_widget(block, area);

    let vm = projector::project_stats(
        &app.snapshot.agent_stats,
        app.effective_sort_column(),
        app.sort_direction,
        app.stats_selected,
    );

    if vm.rows.is_empty() {
        f.render_widget(
            empty_state("No agent data available\nRun some agent tasks to see statistics", theme),
            inner,
        );
        return;
    }

    let arrow = match app.sort_direction {
        SortDirection::Descending => "↓",
        SortDirection::Ascending => "↑",
    };
    let sort_column = app.effective_sort_column();
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Sort: {} {}", sort_column.label(), arrow),
            Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
        )),
        Line::from(Span::styled(
            header_row(sort_column, arrow),
            Style::default().fg(theme.secondary).add_modifier(Modifier::BOLD),
        )),
    ];

    let visible_rows = (inner.height as usize).saturating_sub(3);
    let offset = scroll_window(app.stats_selected, vm.rows.len(), visible_rows);
    for row in vm.rows.iter().skip(offset).take(visible_rows) {
        lines.push(stats_row_line(row, theme));
    }

    lines.push(Line::from(Span::styled(
        format!("Total: {} agents, {} calls", vm.rows.len(), vm.total_calls),
        Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(lines), inner);
}

fn header_row(sort_column: SortColumn, arrow: &str) -> String {
    let mark = |column: SortColumn| if column == sort_column { arrow } else { " " };
    format!(
        "  #  {} {:>7}{} {:>8}{} {:>9}{}",
        fit_width("agent", 24),
        "calls",
        mark(SortColumn::Count),
        "success",
        mark(SortColumn::SuccessRate),
        "mean",
        mark(SortColumn::Duration),
    )
}

fn stats_row_line<'a>(row: &projector::StatsRow, theme: &Theme) -> Line<'a> {
    let rate_color = if row.success_rate >= 90.0 {
        theme.success
    } else if row.success_rate >= 70.0 {
        theme.warning
    } else {
        theme.error
    };

    let mean = if row.duration_known {
        format!("{:>7.0}ms", row.mean_duration_ms)
    } else {
        format!("{:>9}", "-")
    };

    let marker = if row.is_selected { "▶ " } else { "  " };
    let base = if row.is_selected {
        Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.foreground)
    };

    Line::from(vec![
        Span::styled(marker.to_string(), Style::default().fg(theme.highlight)),
        Span::styled(format!("{:<3}", row.rank), base),
        Span::styled(fit_width(&row.name, 24), base),
        Span::styled(format!(" {:>7}", row.count), base),
        Span::styled(format!("  {:>6.1}%", row.success_rate), Style::default().fg(rate_color)),
        Span::styled(format!("  {}", mean), base),
    ])
}

fn scroll_window(selected: usize, len: usize, visible: usize) -> usize {
    if visible == 0 || len <= visible {
        return 0;
    }
    selected.saturating_sub(visible - 1).min(len - visible)
}

// ---------------------------------------------------------------------------
// Co-occurrence matrix / relationships / insights
// ---------------------------------------------------------------------------

pub fn draw_matrix(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let focused = app.focused_panel == Panel::CoOccurrence;
    let block = panel_block(
        format!(" matrix [{}] ", app.matrix_mode.label()),
        focused,
        theme,
    );
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.relationships.is_empty() {
        f.render_widget(empty_state("No co-occurrence patterns found", theme), inner);
        return;
    }

    let lines = match app.matrix_mode {
        MatrixMode::Matrix => matrix_lines(app, focused),
        MatrixMode::Relationships => relationship_lines(app),
        MatrixMode::Insights => insights_lines(app),
    };
    f.render_widget(Paragraph::new(lines), inner);
}

fn matrix_lines<'a>(app: &App, focused: bool) -> Vec<Line<'a>> {
    let theme = app.theme();
    let vm = projector::project_matrix(&app.relationships, app.matrix_cursor);
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        "Legend: █ strong  ▓ medium  ▒ weak  ░ minimal  · none",
        Style::default().fg(theme.muted),
    )));

    let name_width = 18;
    let header: String = vm
        .agents
        .iter()
        .map(|a| fit_width(a, 4))
        .collect::<Vec<_>>()
        .join("");
    lines.push(Line::from(Span::styled(
        format!("{} {}", " ".repeat(name_width), header),
        Style::default().fg(theme.secondary),
    )));

    for (i, agent) in vm.agents.iter().enumerate() {
        let mut spans = vec![Span::styled(
            format!("{} ", fit_width(agent, name_width)),
            Style::default().fg(theme.foreground),
        )];
        for (j, cell) in vm.grid[i].iter().enumerate() {
            let glyph = strength_glyph(*cell);
            let under_cursor = focused && app.matrix_cursor == (i, j);
            let style = match cell {
                MatrixCell::Scored(strength) => Style::default().fg(strength_color(theme, *strength)),
                _ => Style::default().fg(theme.muted),
            };
            let style = if under_cursor {
                style.bg(theme.border).add_modifier(Modifier::BOLD)
            } else {
                style
            };
            spans.push(Span::styled(format!("{}   ", glyph), style));
        }
        lines.push(Line::from(spans));
    }

    if let Some(rel) = &vm.selected {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!(
                "{} ⟷ {} · {} sessions · r={:.2} · {} · {}",
                rel.agent1,
                rel.agent2,
                rel.frequency,
                rel.correlation,
                rel.pattern.label(),
                rel.strength.label(),
            ),
            Style::default().fg(theme.info),
        )));
    }

    lines
}

fn relationship_lines<'a>(app: &App) -> Vec<Line<'a>> {
    let theme = app.theme();
    let rows = projector::project_relationship_list(&app.relationships, app.relationship_selected);

    let mut lines = vec![Line::from(Span::styled(
        "Relationships by correlation",
        Style::default().fg(theme.secondary).add_modifier(Modifier::BOLD),
    ))];

    for row in rows {
        let rel = &row.relationship;
        let marker = if row.is_selected { "▶ " } else { "  " };
        let style = if row.is_selected {
            Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.foreground)
        };
        lines.push(Line::from(vec![
            Span::styled(marker.to_string(), Style::default().fg(theme.highlight)),
            Span::styled(
                format!(
                    "{} ⟷ {} │ r={:.2} │ {:<3} │ {:<7} │ {} sessions",
                    fit_width(&rel.agent1, 14),
                    fit_width(&rel.agent2, 14),
                    rel.correlation,
                    &rel.pattern.label()[..3],
                    rel.strength.label(),
                    rel.frequency,
                ),
                style,
            ),
        ]));
    }
    lines
}

fn insights_lines<'a>(app: &App) -> Vec<Line<'a>> {
    let theme = app.theme();
    let vm = projector::project_insights(&app.relationships);
    let header = Style::default().fg(theme.secondary).add_modifier(Modifier::BOLD);
    let body = Style::default().fg(theme.foreground);

    let mut lines = vec![Line::from(Span::styled("Collaboration patterns", header))];
    for (pattern, count) in &vm.pattern_counts {
        let pct = *count as f64 / vm.total.max(1) as f64 * 100.0;
        lines.push(Line::from(Span::styled(
            format!("  {:<12} {:>3}  ({:.1}%)", pattern.label(), count, pct),
            body,
        )));
    }

    lines.push(Line::from(Span::styled("Strength distribution", header)));
    for (strength, count) in &vm.strength_counts {
        let pct = *count as f64 / vm.total.max(1) as f64 * 100.0;
        lines.push(Line::from(Span::styled(
            format!("  {:<12} {:>3}  ({:.1}%)", strength.label(), count, pct),
            body,
        )));
    }

    lines.push(Line::from(Span::styled("Correlation", header)));
    lines.push(Line::from(Span::styled(
        format!("  mean {:.3} · {} pairs ≥ 0.8", vm.mean_correlation, vm.high_correlation_count),
        body,
    )));

    lines.push(Line::from(Span::styled("Top pairs", header)));
    for rel in &vm.top_pairs {
        lines.push(Line::from(Span::styled(
            format!(
                "  {} ⟷ {}  r={:.3} ({} sessions)",
                fit_width(&rel.agent1, 14),
                fit_width(&rel.agent2, 14),
                rel.correlation,
                rel.frequency,
            ),
            body,
        )));
    }
    lines
}

// ---------------------------------------------------------------------------
// Delegation flows
// ---------------------------------------------------------------------------

pub fn draw_delegation(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let focused = app.focused_panel == Panel::Delegation;
    let block = panel_block(
        format!(
            " delegation [sort: {} · min {}] ",
            app.delegation_sort.label(),
            app.delegation_min_count,
        ),
        focused,
        theme,
    );
    let inner = block.inner(area);
    f.render_widget(block, area);

    let vm = projector::project_delegation(
        &app.snapshot.delegation_patterns,
        app.delegation_sort,
        app.delegation_min_count,
        app.delegation_selected,
        chrono::Utc::now(),
    );

    if vm.rows.is_empty() {
        let text = if vm.total == 0 {
            "No delegation patterns found"
        } else {
            "No patterns match the current filter"
        };
        f.render_widget(empty_state(text, theme), inner);
        return;
    }

    let max_count = vm.rows.iter().map(|r| r.count).max().unwrap_or(1);
    let mut lines = Vec::new();
    for row in vm.rows.iter().take(inner.height as usize) {
        let marker = if row.is_selected { "▶ " } else { "  " };
        let style = if row.is_selected {
            Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.foreground)
        };
        lines.push(Line::from(vec![
            Span::styled(marker.to_string(), Style::default().fg(theme.highlight)),
            Span::styled(
                format!(
                    "{} ──[{}]──▶ {} │ {:>3}× │ {}",
                    fit_width(&row.source, 16),
                    frequency_bar(row.count, max_count, 12),
                    fit_width(&row.target, 16),
                    row.count,
                    row.time_since,
                ),
                style,
            ),
        ]));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn frequency_bar(count: u64, max_count: u64, width: usize) -> String {
    let filled = ((count as f64 / max_count.max(1) as f64) * width as f64).ceil() as usize;
    let filled = filled.clamp(1, width);
    format!("{}{}", "█".repeat(filled), "·".repeat(width - filled))
}
