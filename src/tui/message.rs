//! Message enum for the Elm-architecture update loop.
//!
//! Every user action and every background completion is a message; key
//! events never mutate state directly. This keeps `App::update` the single
//! place state changes and makes the whole state machine testable without a
//! terminal.

use crate::data::{AnalyticsSnapshot, SortColumn};
use crate::error::LoadError;

/// Completion of one background reload, tagged with the generation that
/// started it so superseded results can be discarded.
#[derive(Debug)]
pub struct DataLoaded {
    pub generation: u64,
    pub result: Result<AnalyticsSnapshot, LoadError>,
}

/// All possible state transitions of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // App lifecycle
    /// Quit the application
    Quit,
    /// Reload data with the current filter
    Reload,

    // Focus and overlays
    /// Cycle panel focus (Tab)
    NextPanel,
    /// Toggle the help overlay
    ToggleHelp,
    /// Close whatever overlay is open
    CloseOverlay,

    // Time filter
    /// Open or close the filter menu
    ToggleFilterMenu,
    /// Move the filter menu selection by delta
    FilterMenuMove(i32),
    /// Jump the filter menu selection to an index (digit keys)
    FilterMenuSelect(usize),
    /// Apply the currently selected menu entry
    FilterMenuApply,
    /// Apply a quick time filter by index (1-6 outside the menu)
    QuickFilter(usize),

    // Navigation within the focused panel
    /// Move the focused panel's selection by delta
    MoveSelection(i32),
    /// Move the matrix cursor (matrix mode only)
    MatrixCursor { row_delta: i32, col_delta: i32 },

    // Stats panel
    /// Select a sort column; repeating toggles direction
    SetSortColumn(SortColumn),

    // Delegation panel
    /// Cycle delegation sort order
    CycleDelegationSort,
    /// Cycle the delegation min-count filter
    CycleDelegationFilter,

    // Co-occurrence panel
    /// Cycle matrix display mode
    CycleMatrixMode,
    /// Jump straight to the insights view
    ShowInsights,

    // Timeline panel
    /// Zoom in (negative) or out (positive)
    Zoom(i32),
    /// Scroll the viewport left (negative) or right (positive)
    ScrollTimeline(i32),
    /// Select the event nearest the viewport center
    SelectNearestEvent,
    /// Reset the timeline view
    ResetTimelineView,

    // Appearance
    /// Cycle the color theme
    CycleTheme,

    /// No-op for unmapped keys
    None,
}
