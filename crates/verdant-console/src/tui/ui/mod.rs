//! Layout and rendering for the dashboard.
//!
//! The layout is a header line, a tab bar, the active view, and a status
//! bar with key hints and transient messages.

mod chart;
mod devices;
mod history;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use verdant_types::SENSOR_TYPES;

use super::app::{App, Tab};

/// Draw the complete dashboard.
pub fn draw(frame: &mut Frame, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Active view
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, layout[0], app);
    draw_tab_bar(frame, layout[1], app);

    match app.active_tab {
        Tab::Charts => draw_charts(frame, layout[2], app),
        Tab::Sensors => devices::draw_device_table(frame, layout[2], &app.sensors),
        Tab::Actuators => devices::draw_device_table(frame, layout[2], &app.actuators),
        Tab::History => history::draw_history(frame, layout[2], &app.history),
    }

    draw_status_bar(frame, layout[3], app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        " verdant ",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(username) = &app.username {
        spans.push(Span::styled(
            format!("({username}) "),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans.push(Span::styled(
        "greenhouse console",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_tab_bar(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<String> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| format!("{} {}", i + 1, tab.label()))
        .collect();
    let selected = Tab::ALL
        .iter()
        .position(|&t| t == app.active_tab)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().borders(Borders::BOTTOM))
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

/// One chart per sensor type, in a 2x2 grid.
fn draw_charts(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (row, pair) in SENSOR_TYPES.chunks(2).enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[row]);
        for (col, &ty) in pair.iter().enumerate() {
            chart::draw_sensor_chart(frame, cols[col], app, ty);
        }
    }
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(message) = app.status() {
        let color = if message.is_error {
            Color::Red
        } else {
            Color::Green
        };
        let line = Paragraph::new(format!(" {}", message.text)).style(Style::default().fg(color));
        frame.render_widget(line, area);
        return;
    }

    let hints = match app.active_tab {
        Tab::Charts => " q quit | Tab views | r refresh",
        Tab::Sensors | Tab::Actuators => {
            " q quit | Tab views | j/k select | t toggle | d delete | O/X all on/off | f filter | r refresh"
        }
        Tab::History => " q quit | Tab views | n/p page | f filter | r refresh",
    };
    let line = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(line, area);
}
