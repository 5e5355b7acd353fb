use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table};

use crate::format::truncate_unicode;
use crate::ui::theme::Theme;
use crate::view::ProcessRow;

const PID_WIDTH: u16 = 8;
const CPU_WIDTH: u16 = 8;
const MEMORY_WIDTH: u16 = 12;
const COLUMN_SPACING: u16 = 1;

/// Number of process rows that fit in a table drawn into `area`
/// (borders and header row excluded).
pub fn visible_rows(area: Rect) -> usize {
    area.height.saturating_sub(3) as usize
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    rows: Option<&[ProcessRow]>,
    scroll: usize,
    stale: bool,
    theme: &Theme,
) {
    let title = match rows {
        Some(rows) if rows.len() > visible_rows(area) && visible_rows(area) > 0 => {
            let last = (scroll + visible_rows(area)).min(rows.len());
            format!(" Processes {}-{} of {} ", scroll + 1, last, rows.len())
        }
        Some(rows) => format!(" Processes ({}) ", rows.len()),
        None => " Processes ".to_string(),
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));
    if stale {
        block = block.title(
            Line::from(Span::styled(
                " stale ",
                Style::default()
                    .fg(theme.status_warn)
                    .add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        );
    }

    let Some(rows) = rows else {
        let waiting = Paragraph::new(Line::from(Span::styled(
            "Waiting for data\u{2026}",
            Style::default().fg(theme.text_secondary),
        )))
        .centered()
        .block(block);
        frame.render_widget(waiting, area);
        return;
    };

    let inner_width = area.width.saturating_sub(2);
    let name_width = inner_width
        .saturating_sub(PID_WIDTH + CPU_WIDTH + MEMORY_WIDTH + 3 * COLUMN_SPACING)
        .max(4);

    let text_style = Style::default().fg(theme.text_primary);
    let body: Vec<Row> = rows
        .iter()
        .skip(scroll)
        .take(visible_rows(area))
        .map(|row| {
            Row::new(vec![
                Cell::from(row.pid.to_string()),
                Cell::from(truncate_unicode(&row.name, name_width as usize)),
                Cell::from(Line::from(row.cpu.clone()).right_aligned()),
                Cell::from(Line::from(row.memory.clone()).right_aligned()),
            ])
            .style(text_style)
        })
        .collect();

    let header = Row::new(vec![
        Cell::from("PID"),
        Cell::from("Name"),
        Cell::from(Line::from("CPU %").right_aligned()),
        Cell::from(Line::from("Memory (MB)").right_aligned()),
    ])
    .style(
        Style::default()
            .fg(theme.table_header_fg)
            .add_modifier(Modifier::BOLD),
    );

    let table = Table::new(
        body,
        [
            Constraint::Length(PID_WIDTH),
            Constraint::Min(name_width),
            Constraint::Length(CPU_WIDTH),
            Constraint::Length(MEMORY_WIDTH),
        ],
    )
    .header(header)
    .column_spacing(COLUMN_SPACING)
    .block(block);

    frame.render_widget(table, area);
}
