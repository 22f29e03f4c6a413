//! Device management table, parameterized by device class.
//!
//! One view serves both the Sensors and Actuators tabs; the backing
//! [`DeviceTable`] carries the class, list, filter, and selection.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::tui::app::DeviceTable;

pub(super) fn draw_device_table(frame: &mut Frame, area: Rect, table: &DeviceTable) {
    let title = format!(
        " {}s [{}] ",
        capitalize(&table.class().to_string()),
        table.filter.label()
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(devices) = &table.devices else {
        let msg = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(msg, area);
        return;
    };

    let filtered = table.filtered();
    if filtered.is_empty() {
        let text = if devices.is_empty() {
            "No devices registered"
        } else {
            "No devices match the filter (press f to change it)"
        };
        let msg = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let header = Row::new(["Device ID", "Location", "Frequency (s)", "Unit", "Status"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = filtered
        .iter()
        .map(|d| {
            let (status, color) = if d.active {
                ("on", Color::Green)
            } else {
                ("off", Color::Red)
            };
            Row::new(vec![
                Cell::from(d.id.to_string()),
                Cell::from(d.location.clone()),
                Cell::from(d.update_frequency.to_string()),
                Cell::from(d.unit.clone()),
                Cell::from(Span::styled(status, Style::default().fg(color))),
            ])
        })
        .collect();

    let widget = Table::new(
        rows,
        [
            Constraint::Length(28),
            Constraint::Min(16),
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("> ");

    let mut state = TableState::default();
    state.select(Some(table.selected));
    frame.render_stateful_widget(widget, area, &mut state);
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
