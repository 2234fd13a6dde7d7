//! Application state and the Elm-architecture update function.
//!
//! `App::update` is pure state mutation returning an optional command; the
//! event loop executes commands (spawning reloads, quitting). Background
//! reloads post a single `DataLoaded` over an mpsc channel, tagged with a
//! generation so superseded results are discarded.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::sync::mpsc;

use super::message::{DataLoaded, Message};
use super::projector;
use super::theme::{next_theme, theme_index, Theme, THEMES};
use crate::analytics::loader::load_snapshot;
use crate::analytics::relationships::score_relationships;
use crate::data::{
    AgentRelationship, AnalyticsSnapshot, DelegationSort, MatrixMode, Panel, SortColumn,
    SortDirection, ZoomLevel, TIME_RANGES,
};
use crate::error::LoadError;
use crate::ingest::LogDiscovery;

/// Side effects requested by `update`, executed by the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Reload,
}

/// Min-count filter steps for the delegation panel.
const MIN_COUNT_CYCLE: [u64; 4] = [0, 2, 5, 10];

/// Construction options; defaults suit tests and bare startup.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub project_root: PathBuf,
    pub since: Option<String>,
    pub theme: String,
    pub home_override: Option<PathBuf>,
    /// Configured default lookback, matched against the quick-filter ranges.
    pub default_range: Option<String>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            since: None,
            theme: THEMES[0].name.to_string(),
            home_override: None,
            default_range: None,
        }
    }
}

/// Timeline viewport state, reset by `r` to the last 24 h at day zoom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineView {
    pub zoom: ZoomLevel,
    /// Steps scrolled from the latest data; negative moves back in time.
    pub offset: i64,
    pub selected_event: Option<String>,
}

impl Default for TimelineView {
    fn default() -> Self {
        Self {
            zoom: ZoomLevel::Day,
            offset: 0,
            selected_event: None,
        }
    }
}

pub struct App {
    // Data published by the last completed reload.
    pub snapshot: AnalyticsSnapshot,
    pub relationships: Vec<AgentRelationship>,

    // Project and filter state.
    pub project_root: PathBuf,
    home_override: Option<PathBuf>,
    /// Index into TIME_RANGES; governs reloads once a quick filter is used.
    pub range_index: usize,
    /// Custom `--since` filter; cleared the first time a range is picked.
    pub custom_since: Option<String>,
    pub filter_menu_open: bool,
    pub filter_menu_index: usize,

    // Focus and overlays.
    pub focused_panel: Panel,
    pub show_help: bool,

    // Per-panel selection state.
    pub stats_selected: usize,
    pub delegation_selected: usize,
    pub relationship_selected: usize,
    pub matrix_cursor: (usize, usize),

    // Sort and display modes.
    /// None until a sort key has been pressed; display falls back to count.
    pub sort_column: Option<SortColumn>,
    pub sort_direction: SortDirection,
    pub delegation_sort: DelegationSort,
    pub delegation_min_count: u64,
    pub matrix_mode: MatrixMode,

    // Timeline viewport.
    pub timeline: TimelineView,

    // Loading state.
    pub is_loading: bool,
    pub last_error: Option<LoadError>,
    pub last_load_time: Option<DateTime<Utc>>,
    generation: u64,
    reload_rx: Option<mpsc::Receiver<DataLoaded>>,

    // Display.
    pub width: u16,
    pub height: u16,
    pub theme_index: usize,
}

impl App {
    pub fn new(options: AppOptions) -> Self {
        let range_index = options
            .default_range
            .as_deref()
            .and_then(|r| TIME_RANGES.iter().position(|range| range.filter == r))
            .unwrap_or(1); // 30d default lookback
        Self {
            snapshot: AnalyticsSnapshot::default(),
            relationships: Vec::new(),
            project_root: options.project_root,
            home_override: options.home_override,
            range_index,
            custom_since: options.since,
            filter_menu_open: false,
            filter_menu_index: 1,
            focused_panel: Panel::Timeline,
            show_help: false,
            stats_selected: 0,
            delegation_selected: 0,
            relationship_selected: 0,
            matrix_cursor: (0, 0),
            sort_column: None,
            sort_direction: SortDirection::Descending,
            delegation_sort: DelegationSort::Frequency,
            delegation_min_count: 0,
            matrix_mode: MatrixMode::Matrix,
            timeline: TimelineView::default(),
            is_loading: false,
            last_error: None,
            last_load_time: None,
            generation: 0,
            reload_rx: None,
            width: 80,
            height: 24,
            theme_index: theme_index(&options.theme),
        }
    }

    pub fn theme(&self) -> &'static Theme {
        &THEMES[self.theme_index]
    }

    /// Generation of the most recently requested reload; completions tagged
    /// with an older generation are discarded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The column the leaderboard is currently ordered by.
    pub fn effective_sort_column(&self) -> SortColumn {
        self.sort_column.unwrap_or(SortColumn::Count)
    }

    /// The filter string the next reload should use; `None` means all time.
    pub fn active_filter(&self) -> Option<String> {
        if let Some(custom) = &self.custom_since {
            return Some(custom.clone());
        }
        let filter = TIME_RANGES[self.range_index].filter;
        if filter.is_empty() {
            None
        } else {
            Some(filter.to_string())
        }
    }

    /// Human-readable description of the active filter for the header.
    pub fn filter_description(&self) -> String {
        match &self.custom_since {
            Some(custom) => format!("since {}", custom),
            None => TIME_RANGES[self.range_index].desc.to_string(),
        }
    }

    /// Process one message. Returns a command for the event loop to run.
    pub fn update(&mut self, msg: Message) -> Option<Command> {
        match msg {
            Message::Quit => return Some(Command::Quit),
            Message::Reload => return Some(self.begin_reload()),

            Message::NextPanel => {
                self.focused_panel = self.focused_panel.next();
            }
            Message::ToggleHelp => self.show_help = !self.show_help,
            Message::CloseOverlay => {
                self.show_help = false;
                self.filter_menu_open = false;
            }

            Message::ToggleFilterMenu => {
                self.filter_menu_open = !self.filter_menu_open;
                if self.filter_menu_open {
                    self.filter_menu_index = self.range_index;
                }
            }
            Message::FilterMenuMove(delta) => {
                self.filter_menu_index =
                    step_index(self.filter_menu_index, delta, TIME_RANGES.len());
            }
            Message::FilterMenuSelect(index) => {
                if index < TIME_RANGES.len() {
                    self.filter_menu_index = index;
                }
            }
            Message::FilterMenuApply => {
                self.filter_menu_open = false;
                return Some(self.apply_range(self.filter_menu_index));
            }
            Message::QuickFilter(index) => {
                if index < TIME_RANGES.len() {
                    return Some(self.apply_range(index));
                }
            }

            Message::MoveSelection(delta) => self.move_selection(delta),
            Message::MatrixCursor { row_delta, col_delta } => {
                if self.matrix_mode == MatrixMode::Matrix {
                    let (row, col) = self.matrix_cursor;
                    self.matrix_cursor = (
                        step_index(row, row_delta, projector::MATRIX_SIZE),
                        step_index(col, col_delta, projector::MATRIX_SIZE),
                    );
                }
            }

            Message::SetSortColumn(column) => {
                match self.sort_column {
                    // Repeating the active sort key flips the direction.
                    Some(current) if current == column => {
                        self.sort_direction = self.sort_direction.toggled();
                    }
                    // A new sort key always starts descending.
                    _ => {
                        self.sort_column = Some(column);
                        self.sort_direction = SortDirection::Descending;
                    }
                }
                self.stats_selected = 0;
            }

            Message::CycleDelegationSort => {
                self.delegation_sort = self.delegation_sort.next();
                self.delegation_selected = 0;
            }
            Message::CycleDelegationFilter => {
                let position = MIN_COUNT_CYCLE
                    .iter()
                    .position(|&c| c == self.delegation_min_count)
                    .unwrap_or(MIN_COUNT_CYCLE.len() - 1);
                self.delegation_min_count = MIN_COUNT_CYCLE[(position + 1) % MIN_COUNT_CYCLE.len()];
                self.delegation_selected = 0;
            }

            Message::CycleMatrixMode => {
                self.matrix_mode = self.matrix_mode.next();
            }
            Message::ShowInsights => {
                self.matrix_mode = MatrixMode::Insights;
            }

            Message::Zoom(direction) => {
                self.timeline.zoom = if direction < 0 {
                    self.timeline.zoom.zoom_in()
                } else {
                    self.timeline.zoom.zoom_out()
                };
            }
            Message::ScrollTimeline(direction) => {
                // Scrolling right past "now" is a no-op.
                self.timeline.offset = (self.timeline.offset + direction as i64).min(0);
            }
            Message::SelectNearestEvent => self.select_nearest_event(),
            Message::ResetTimelineView => self.timeline = TimelineView::default(),

            Message::CycleTheme => self.theme_index = next_theme(self.theme_index),

            Message::None => {}
        }
        None
    }

    fn apply_range(&mut self, index: usize) -> Command {
        self.range_index = index;
        self.custom_since = None;
        self.begin_reload()
    }

    /// Bookkeeping for a new reload: bump the generation (superseding any
    /// in-flight load) and flip the loading flag. The event loop follows up
    /// with `spawn_reload`.
    fn begin_reload(&mut self) -> Command {
        self.generation += 1;
        self.is_loading = true;
        Command::Reload
    }

    /// Spawn the background load for the current generation and filter.
    pub fn spawn_reload(&mut self) {
        let generation = self.generation;
        let project_root = self.project_root.clone();
        let since = self.active_filter();
        let home_override = self.home_override.clone();

        let (tx, rx) = mpsc::channel(1);
        self.reload_rx = Some(rx);

        tokio::spawn(async move {
            let joined = tokio::task::spawn_blocking(move || {
                let discovery = match home_override {
                    Some(home) => LogDiscovery::with_home(home),
                    None => LogDiscovery::new(),
                };
                load_snapshot(&discovery, &project_root, since.as_deref(), Utc::now())
            })
            .await;

            let result = match joined {
                Ok(r) => r,
                Err(e) => Err(LoadError::Analyzer(e.to_string())),
            };

            // The receiver may already be replaced by a newer reload; a
            // failed send is exactly the supersession we want.
            let _ = tx.send(DataLoaded { generation, result }).await;
        });
    }

    /// Drain completed reloads without blocking; called each tick.
    pub fn poll_reload(&mut self) {
        let Some(mut rx) = self.reload_rx.take() else {
            return;
        };

        let mut done = false;
        while let Ok(loaded) = rx.try_recv() {
            self.handle_data_loaded(loaded);
            done = true;
        }
        if !done {
            self.reload_rx = Some(rx);
        }
    }

    /// Apply one reload completion, dropping stale generations.
    pub fn handle_data_loaded(&mut self, loaded: DataLoaded) {
        if loaded.generation != self.generation {
            return;
        }
        self.is_loading = false;

        match loaded.result {
            Ok(snapshot) => {
                let now = Utc::now();
                self.relationships = score_relationships(&snapshot.co_occurrences, now);
                self.snapshot = snapshot;
                self.last_error = None;
                self.last_load_time = Some(now);
                self.reset_selections();
            }
            Err(error) => {
                tracing::warn!("reload failed: {}", error);
                self.last_error = Some(error);
            }
        }
    }

    fn reset_selections(&mut self) {
        self.stats_selected = 0;
        self.delegation_selected = 0;
        self.relationship_selected = 0;
        self.matrix_cursor = (0, 0);
        self.timeline.offset = 0;
        self.timeline.selected_event = None;
    }

    fn move_selection(&mut self, delta: i32) {
        match self.focused_panel {
            Panel::Stats => {
                self.stats_selected =
                    clamp_selection(self.stats_selected, delta, self.snapshot.agent_stats.len());
            }
            Panel::Delegation => {
                let visible = projector::project_delegation(
                    &self.snapshot.delegation_patterns,
                    self.delegation_sort,
                    self.delegation_min_count,
                    self.delegation_selected,
                    Utc::now(),
                )
                .rows
                .len();
                self.delegation_selected =
                    clamp_selection(self.delegation_selected, delta, visible);
            }
            Panel::CoOccurrence => {
                let visible = self.relationships.len().min(projector::RELATIONSHIP_CAP);
                self.relationship_selected =
                    clamp_selection(self.relationship_selected, delta, visible);
            }
            Panel::Timeline => {}
        }
    }

    fn select_nearest_event(&mut self) {
        let events = &self.snapshot.message_events;
        if events.is_empty() {
            return;
        }

        let anchor = events
            .last()
            .map(|e| e.timestamp)
            .unwrap_or_else(Utc::now);
        let step = self.timeline.zoom.scroll_step();
        let span = self.timeline.zoom.span();
        let view_end = anchor + step * self.timeline.offset as i32;
        let center = view_end - span / 2;

        let nearest = events.iter().min_by_key(|e| {
            (e.timestamp - center).num_milliseconds().abs()
        });
        self.timeline.selected_event = nearest.map(|e| e.id.clone());
    }
}

fn clamp_selection(current: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as i64 + delta as i64;
    next.clamp(0, len as i64 - 1) as usize
}

fn step_index(current: usize, delta: i32, len: usize) -> usize {
    clamp_selection(current, delta, len)
}
