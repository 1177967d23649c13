//! TUI constants and configuration

use std::time::Duration;

// ============================================================================
// Layout Constants
// ============================================================================

/// Layout constraints for main UI sections
pub mod layout {
    use ratatui::layout::Constraint;

    /// Up to 8 title lines plus borders
    pub const STATUS_HEIGHT: u16 = 10;
    pub const FOOTER_HEIGHT: u16 = 3;
    pub const MIN_CHART_HEIGHT: u16 = 8;
    pub const LOG_WINDOW_HEIGHT: u16 = 8;

    /// Terminal height from which the log pane is shown under the chart
    pub const MIN_HEIGHT_FOR_LOGS: u16 = 36;

    pub fn main_sections(show_logs: bool) -> Vec<Constraint> {
        let mut sections = vec![
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Min(MIN_CHART_HEIGHT),
        ];
        if show_logs {
            sections.push(Constraint::Length(LOG_WINDOW_HEIGHT));
        }
        sections.push(Constraint::Length(FOOTER_HEIGHT));
        sections
    }
}

// ============================================================================
// Chart Configuration
// ============================================================================

pub mod chart {
    pub const TITLE: &str = "Progress (%)";
    pub const X_TITLE: &str = "Time";
    pub const Y_TITLE: &str = "Value (%)";
    pub const X_LABEL_FORMAT: &str = "%H:%M:%S";
    pub const Y_LABELS: [&str; 3] = ["0", "50", "100"];
}

/// UI text styles
pub mod styles {
    use ratatui::style::Color;

    pub const LABEL: Color = Color::Gray;
    pub const SERIES: Color = Color::Green;
    pub const PROJECTION: Color = Color::Yellow;
    pub const VALUE_INFO: Color = Color::Cyan;
    pub const BORDER_ACTIVE: Color = Color::Cyan;
    pub const BORDER_NORMAL: Color = Color::White;
}

/// How often keyboard input is checked between redraws
pub const KEY_POLL: Duration = Duration::from_millis(50);
