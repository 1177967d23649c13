//! TUI rendering and layout

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, Paragraph},
};

use super::constants::{chart, layout, styles};
use super::helpers::{clamp_points, x_bounds, x_labels};
use crate::constants::display::Y_BOUNDS;
use crate::tui::app::TuiApp;

/// Render the main UI
pub fn render_ui(f: &mut Frame, app: &TuiApp) {
    if app.is_log_fullscreen() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(layout::FOOTER_HEIGHT),
            ])
            .split(f.area());
        render_logs(f, chunks[0], app, true);
        render_footer(f, chunks[1], app);
        return;
    }

    let show_logs = app.has_logs() && f.area().height >= layout::MIN_HEIGHT_FOR_LOGS;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(layout::main_sections(show_logs))
        .split(f.area());

    render_status(f, chunks[0], app);
    render_chart(f, chunks[1], app);
    if show_logs {
        render_logs(f, chunks[2], app, false);
        render_footer(f, chunks[3], app);
    } else {
        render_footer(f, chunks[2], app);
    }
}

/// Title lines: countdown, current value, deltas, projection
fn render_status(f: &mut Frame, area: Rect, app: &TuiApp) {
    let view = app.view();
    let lines: Vec<Line> = view
        .title
        .iter()
        .map(|text| status_line(text))
        .collect();

    let mut summary = format!(
        " {}  |  {} samples, {} unavailable",
        app.log_label(),
        view.samples,
        view.unavailable
    );
    if let Some(estimate) = &view.estimate {
        summary.push_str(&format!("  |  fit r² {:.3}", estimate.fit.r_squared));
    }
    summary.push(' ');

    let status = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                " Progress Watch ",
                Style::default()
                    .fg(styles::BORDER_ACTIVE)
                    .add_modifier(Modifier::BOLD),
            ))
            .title_bottom(Line::from(summary).alignment(Alignment::Right))
            .border_style(Style::default().fg(styles::BORDER_NORMAL)),
    );

    f.render_widget(status, area);
}

/// Split "label: value" so the value can be highlighted
fn status_line(text: &str) -> Line<'_> {
    let value_color = if text.starts_with("Projected") || text.starts_with("Time remaining") {
        styles::PROJECTION
    } else {
        styles::VALUE_INFO
    };

    match text.split_once(": ") {
        Some((label, value)) => Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().fg(styles::LABEL)),
            Span::styled(
                value,
                Style::default()
                    .fg(value_color)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        None => Line::from(Span::styled(text, Style::default().fg(value_color))),
    }
}

fn render_chart(f: &mut Frame, area: Rect, app: &TuiApp) {
    let view = app.view();
    let points = clamp_points(&view.points, Y_BOUNDS);
    let bounds = x_bounds(&points);

    let datasets = vec![
        Dataset::default()
            .name("progress")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(styles::SERIES))
            .data(&points),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(chart::TITLE)
                .border_style(Style::default().fg(styles::BORDER_NORMAL)),
        )
        .x_axis(
            Axis::default()
                .title(chart::X_TITLE)
                .style(Style::default().fg(styles::LABEL))
                .bounds(bounds)
                .labels(x_labels(bounds)),
        )
        .y_axis(
            Axis::default()
                .title(chart::Y_TITLE)
                .style(Style::default().fg(styles::LABEL))
                .bounds(Y_BOUNDS)
                .labels(chart::Y_LABELS.to_vec()),
        );

    f.render_widget(chart, area);
}

fn render_logs(f: &mut Frame, area: Rect, app: &TuiApp, fullscreen: bool) {
    let visible = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = app
        .log_lines(visible)
        .into_iter()
        .map(|line| {
            let color = if line.contains("ERROR") {
                Color::Red
            } else if line.contains("WARN") {
                Color::Yellow
            } else {
                Color::Gray
            };
            ListItem::new(Span::styled(line, Style::default().fg(color)))
        })
        .collect();

    let border = if fullscreen {
        styles::BORDER_ACTIVE
    } else {
        styles::BORDER_NORMAL
    };
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Logs ")
            .border_style(Style::default().fg(border)),
    );

    f.render_widget(list, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &TuiApp) {
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    };
    let text = |t: &'static str| Span::styled(t, Style::default().fg(Color::Gray));

    let mut spans = vec![
        text("Press "),
        key("q"),
        text(", "),
        key("Esc"),
        text(" or "),
        key("Ctrl+C"),
        text(" to exit"),
    ];
    if app.has_logs() {
        spans.push(text("  |  "));
        spans.push(key("l"));
        spans.push(text(" to toggle logs"));
    }

    let footer = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Gray)),
        )
        .alignment(Alignment::Center);

    f.render_widget(footer, area);
}
