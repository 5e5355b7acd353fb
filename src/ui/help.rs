use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::format::truncate_unicode;
use crate::stream::ConnectionState;
use crate::ui::theme::Theme;

const KEY_COLUMN: usize = 10;
const FOOTER_LINES: u16 = 2;

/// Centered overlay listing every keybind, with the subscribed endpoint and
/// its connection state underneath.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    entries: &[(String, &str)],
    endpoint: &str,
    connection: ConnectionState,
    theme: &Theme,
) {
    let width = 44u16.min(area.width.saturating_sub(4));
    // +2 for borders
    let height = (entries.len() as u16 + FOOTER_LINES + 2).min(area.height.saturating_sub(2));

    let overlay = centered_rect(width, height, area);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Keybinds ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(overlay);

    let mut lines: Vec<Line> = entries
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(
                    format!(" {key:>KEY_COLUMN$} "),
                    Style::default()
                        .fg(theme.pill_key_fg)
                        .bg(theme.pill_key_bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {desc}"), Style::default().fg(theme.pill_desc_fg)),
            ])
        })
        .collect();

    let state = format!(" {} ", connection.label());
    let endpoint_width = (inner.width as usize).saturating_sub(state.len() + 1);
    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled(
            state,
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.connection_color(connection))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}", truncate_unicode(endpoint, endpoint_width)),
            Style::default().fg(theme.text_secondary),
        ),
    ]));

    frame.render_widget(block, overlay);
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(theme.surface_bg)),
        inner,
    );
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [vert] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [horiz] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(vert);
    horiz
}
