//! Shared constants for the TUI to keep layout and timing in sync.

/// Interval in milliseconds between UI ticks/redraws.
pub const TUI_TICK_RATE_MS: u64 = 200;
/// Time-to-live in seconds for transient status messages.
pub const UI_MESSAGE_TTL_SECS: u64 = 5;
/// Highlight symbol shown beside selected list entries.
pub const TASK_LIST_HIGHLIGHT_SYMBOL: &str = "▶ ";
/// Marker shown beside the grabbed task while it is being moved.
pub const GRAB_MARKER: &str = "≡ ";
/// Width of the navigation sidebar in columns.
pub const SIDEBAR_WIDTH: u16 = 26;
/// Longest title shown in a list row before truncation.
pub const TITLE_MAX_GRAPHEMES: usize = 60;
