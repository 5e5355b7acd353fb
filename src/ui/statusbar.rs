use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{ResolvedKeybinds, key_label};
use crate::format::truncate_unicode;
use crate::stream::{ConnectionState, StreamState};
use crate::ui::theme::Theme;

const MAX_ERROR_WIDTH: usize = 48;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    stream: &StreamState,
    status_message: Option<&(String, std::time::Instant)>,
    keybinds: &ResolvedKeybinds,
    theme: &Theme,
) {
    let bg_style = Style::default().bg(theme.statusbar_bg);
    let connection = stream.connection();

    let mut spans = vec![Span::styled(
        format!(" {} ", connection_text(connection)),
        Style::default()
            .fg(theme.pill_key_fg)
            .bg(theme.connection_color(connection))
            .add_modifier(Modifier::BOLD),
    )];

    if stream.is_stale() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            " STALE ",
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.status_warn)
                .add_modifier(Modifier::BOLD),
        ));
    }

    // Status message takes priority over the error and key hints
    if let Some((msg, _)) = status_message {
        spans.push(Span::styled(
            format!(" {msg}"),
            Style::default()
                .fg(theme.status_ok)
                .add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
        return;
    }

    if let Some(err) = stream.last_error() {
        spans.push(Span::styled(
            format!(" ! {}", truncate_unicode(err, MAX_ERROR_WIDTH)),
            Style::default().fg(theme.status_err),
        ));
    }

    spans.push(Span::styled(
        format!("  #{}", stream.snapshots_received()),
        Style::default().fg(theme.text_secondary),
    ));

    spans.extend(pill_spans(key_label(keybinds.quit), "Quit", theme));
    spans.extend(pill_spans(key_label(keybinds.reconnect), "Reconnect", theme));
    spans.extend(pill_spans(key_label(keybinds.toggle_theme), "Theme", theme));
    spans.extend(pill_spans(key_label(keybinds.help), "Help", theme));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

fn connection_text(state: ConnectionState) -> String {
    match state {
        ConnectionState::Reconnecting { attempt } => format!("Reconnecting #{attempt}"),
        other => other.label().to_string(),
    }
}

fn pill_spans<'a>(key: String, desc: &'a str, theme: &Theme) -> Vec<Span<'a>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}
