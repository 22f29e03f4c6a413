//! Paginated history table.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::format::format_epoch_seconds;
use crate::tui::app::HistoryView;

pub(super) fn draw_history(frame: &mut Frame, area: Rect, view: &HistoryView) {
    let filtered = view.filtered();
    let title = format!(
        " History [{}]  page {}/{} - {} record(s) ",
        view.filter.label(),
        view.pager.current_page(),
        view.pager.total_pages(),
        filtered.len(),
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    if let Some(error) = &view.error {
        let msg = Paragraph::new(error.clone())
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    if view.records.is_none() {
        let msg = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    if filtered.is_empty() {
        let msg = Paragraph::new("No records")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let header = Row::new(["Time", "Device ID", "Type", "Location", "Value", "Unit"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = view
        .pager
        .page_of(&filtered)
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(format_epoch_seconds(r.time)),
                Cell::from(r.device_id.clone()),
                Cell::from(
                    r.device_type
                        .map(|ty| ty.wire_name().to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::from(r.location.clone()),
                Cell::from(r.value.to_string()),
                Cell::from(r.unit.clone()),
            ])
        })
        .collect();

    let widget = Table::new(
        rows,
        [
            Constraint::Length(20),
            Constraint::Length(28),
            Constraint::Length(24),
            Constraint::Min(12),
            Constraint::Length(10),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(widget, area);
}
