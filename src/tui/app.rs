//! TUI application state and logic

use std::sync::Arc;

use super::log_capture::LogBuffer;
use crate::clock::ClockState;
use crate::report::{ReportView, Reporter};
use crate::types::{History, Timestamp};

/// TUI application state
pub struct TuiApp {
    /// Rebuilds the view from the log
    reporter: Reporter,
    /// Most recent view
    view: ReportView,
    /// Captured tracing output, if logging goes to the TUI
    log_buffer: Option<LogBuffer>,
    /// Shown in the status block
    log_label: String,
    show_log_fullscreen: bool,
}

impl TuiApp {
    /// Create a new TUI application with an empty view
    pub fn new(reporter: Reporter, log_label: impl Into<String>) -> Self {
        let view = ReportView::build(
            &History::new(),
            reporter.clock(),
            Timestamp::now(),
            reporter.threshold(),
        );
        Self {
            reporter,
            view,
            log_buffer: None,
            log_label: log_label.into(),
            show_log_fullscreen: false,
        }
    }

    #[must_use]
    pub fn with_log_buffer(mut self, log_buffer: LogBuffer) -> Self {
        self.log_buffer = Some(log_buffer);
        self
    }

    /// Re-read the log and recompute the view
    pub async fn update(&mut self) {
        self.view = self.reporter.refresh(Timestamp::now()).await;
    }

    #[must_use]
    pub fn view(&self) -> &ReportView {
        &self.view
    }

    #[must_use]
    pub fn clock(&self) -> &Arc<ClockState> {
        self.reporter.clock()
    }

    #[must_use]
    pub fn log_label(&self) -> &str {
        &self.log_label
    }

    /// Recent captured log lines, oldest first
    #[must_use]
    pub fn log_lines(&self, count: usize) -> Vec<String> {
        self.log_buffer
            .as_ref()
            .map(|b| b.tail(count))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn has_logs(&self) -> bool {
        self.log_buffer.is_some()
    }

    pub fn toggle_log_fullscreen(&mut self) {
        self.show_log_fullscreen = !self.show_log_fullscreen;
    }

    #[must_use]
    pub fn is_log_fullscreen(&self) -> bool {
        self.show_log_fullscreen && self.has_logs()
    }
}
