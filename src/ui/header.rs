use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};

use crate::stream::SystemSnapshot;
use crate::ui::theme::Theme;
use crate::view::ViewModel;

const PLACEHOLDER: &str = "--";

pub fn render(
    frame: &mut Frame,
    area: Rect,
    snapshot: Option<&SystemSnapshot>,
    view: Option<&ViewModel>,
    endpoint: &str,
    theme: &Theme,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    render_title(frame, rows[0], view, endpoint, theme);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
        ])
        .split(rows[1]);

    render_gauge(
        frame,
        cards[0],
        "CPU Usage",
        snapshot.map(|s| s.cpu_usage),
        view.map(|v| v.cpu.as_str()),
        theme,
    );
    render_gauge(
        frame,
        cards[1],
        "Memory Usage",
        snapshot.map(|s| s.mem_usage),
        view.map(|v| v.memory.as_str()),
        theme,
    );
    render_gauge(
        frame,
        cards[2],
        "Disk Usage",
        snapshot.map(|s| s.disk_usage),
        view.map(|v| v.disk.as_str()),
        theme,
    );
    render_value(
        frame,
        cards[3],
        "Network Traffic",
        view.map(|v| v.network.as_str()),
        theme,
    );
}

fn render_title(
    frame: &mut Frame,
    area: Rect,
    view: Option<&ViewModel>,
    endpoint: &str,
    theme: &Theme,
) {
    let mut spans = vec![
        Span::styled(
            " System Monitor ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(endpoint, Style::default().fg(theme.text_secondary)),
    ];
    if let Some(view) = view {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("Procs: {}", view.processes.len()),
            Style::default().fg(theme.text_secondary),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn card_block(title: &str, theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ))
}

/// Bar fill for a percentage. Only the bar is clamped; the label shows the
/// value as received.
pub fn gauge_ratio(percent: f64) -> f64 {
    let ratio = percent / 100.0;
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn render_gauge(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    percent: Option<f64>,
    label: Option<&str>,
    theme: &Theme,
) {
    let gauge = Gauge::default()
        .block(card_block(title, theme))
        .gauge_style(
            Style::default()
                .fg(theme.gauge_filled)
                .bg(theme.gauge_unfilled),
        )
        .ratio(percent.map_or(0.0, gauge_ratio))
        .label(Span::styled(
            label.unwrap_or(PLACEHOLDER).to_string(),
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        ));

    frame.render_widget(gauge, area);
}

fn render_value(frame: &mut Frame, area: Rect, title: &str, value: Option<&str>, theme: &Theme) {
    let text = Paragraph::new(Line::from(Span::styled(
        value.unwrap_or(PLACEHOLDER).to_string(),
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    )))
    .centered()
    .block(card_block(title, theme));

    frame.render_widget(text, area);
}
