//! Router tuning knobs supplied by the host.
use std::time::Duration;

/// Input-handling configuration consumed by the router.
///
/// Hosts typically source these from platform conventions or user
/// preferences. The defaults suit a desktop pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Distance in pixels a primary-button press must travel before it
    /// becomes a drag rather than a click.
    pub drag_threshold: f32,
    /// Maximum pause between same-button releases for them to count as one
    /// combo.
    pub combo_max_interval: Duration,
    /// Largest combo count reported to widgets.
    pub max_combo_size: u8,
    /// What to do when a combo exceeds [`Settings::max_combo_size`]: reset
    /// the count to 1 when true, hold it at the cap when false.
    pub clear_combo_when_maxed: bool,
    /// Invert scroll direction, trackpad style.
    pub natural_scrolling: bool,
    /// Per-axis scroll scaling, applied after axis swapping.
    pub scroll_multiplier: (f32, f32),
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            drag_threshold: 4.0,
            combo_max_interval: Duration::from_millis(500),
            max_combo_size: 3,
            clear_combo_when_maxed: false,
            natural_scrolling: false,
            scroll_multiplier: (1.0, 1.0),
        }
    }
}
