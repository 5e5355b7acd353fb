pub mod header;
pub mod help;
pub mod process_table;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &mut App) {
    frame.render_widget(
        Block::default().style(Style::default().fg(app.theme.text_primary)),
        frame.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    // Projected once per frame from the held snapshot.
    let view = app.view();
    let snapshot = app.stream.shared_snapshot();

    app.set_visible_rows(process_table::visible_rows(chunks[1]));

    header::render(
        frame,
        chunks[0],
        snapshot.as_deref(),
        view.as_ref(),
        &app.endpoint,
        &app.theme,
    );
    process_table::render(
        frame,
        chunks[1],
        view.as_ref().map(|v| v.processes.as_slice()),
        app.scroll,
        app.stream.is_stale(),
        &app.theme,
    );
    statusbar::render(
        frame,
        chunks[2],
        &app.stream,
        app.status_message.as_ref(),
        &app.keybinds,
        &app.theme,
    );

    // Help overlay rendered last so it sits on top
    if app.show_help() {
        help::render(
            frame,
            frame.area(),
            &app.help_entries(),
            &app.endpoint,
            app.connection(),
            &app.theme,
        );
    }
}
