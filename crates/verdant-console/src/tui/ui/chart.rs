//! Threshold-aware line charts for the dashboard.
//!
//! Each sensor type gets one chart fed from its rolling sample series. The
//! Y-axis domain is widened so the threshold guide lines are always visible
//! even when no sample breaches them, and the X-axis leaves headroom past the
//! latest sample so incoming points have room to land.

use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};

use verdant_types::{DeviceType, SampleSeries, ThresholdBand};

use crate::format::format_epoch_millis_hms;
use crate::tui::app::{App, FeedPhase};

/// Margin added below/above the threshold band when computing the Y domain.
const Y_MARGIN: f64 = 10.0;

/// X-axis headroom past the latest sample.
const X_HEADROOM_MS: i64 = 15 * 60 * 1000;

/// Y-axis domain for a series under a threshold band:
/// `min(data_min, band.min - 10)` to `max(data_max, band.max + 10)`.
///
/// An empty series still yields a domain around the band, so the guide lines
/// render while data is pending.
fn y_bounds(series: &SampleSeries, band: ThresholdBand) -> [f64; 2] {
    let (data_min, data_max) = series.value_bounds().unwrap_or((band.min, band.max));
    [
        data_min.min(band.min - Y_MARGIN),
        data_max.max(band.max + Y_MARGIN),
    ]
}

/// X-axis domain: earliest sample to 15 minutes past the latest.
fn x_bounds(series: &SampleSeries) -> [f64; 2] {
    let (earliest, latest) = series.time_bounds().unwrap_or((0, 0));
    [earliest as f64, (latest + X_HEADROOM_MS) as f64]
}

fn placeholder(text: &str, color: Color, block: Block<'_>, frame: &mut Frame, area: Rect) {
    let msg = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(msg, area);
}

/// Draw one sensor type's chart into `area`.
pub(super) fn draw_sensor_chart(frame: &mut Frame, area: Rect, app: &App, ty: DeviceType) {
    let series = app.charts.series_for(ty);
    let band = app.thresholds.band_or_fallback(ty);

    let stale = matches!(app.charts.phase, FeedPhase::Error(_)) && !series.is_empty();
    let title = format!(
        " {}  Threshold: {} - {} | points: {}{} ",
        ty.chart_label(),
        band.min,
        band.max,
        series.len(),
        if stale { " (stale)" } else { "" },
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if stale { Color::Red } else { Color::DarkGray }));

    match &app.charts.phase {
        FeedPhase::Loading => {
            placeholder("Loading...", Color::DarkGray, block, frame, area);
            return;
        }
        FeedPhase::Error(message) if series.is_empty() => {
            placeholder(message, Color::Red, block, frame, area);
            return;
        }
        _ if series.is_empty() => {
            placeholder("No data", Color::DarkGray, block, frame, area);
            return;
        }
        _ => {}
    }

    let points: Vec<(f64, f64)> = series
        .as_slice()
        .iter()
        .map(|s| (s.timestamp_ms as f64, s.value))
        .collect();

    let x = x_bounds(series);
    let y = y_bounds(series, band);

    // Threshold guide lines span the whole X domain.
    let min_line = [(x[0], band.min), (x[1], band.min)];
    let max_line = [(x[0], band.max), (x[1], band.max)];

    let datasets = vec![
        Dataset::default()
            .name("min")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&min_line),
        Dataset::default()
            .name("max")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&max_line),
        Dataset::default()
            .name(ty.wire_name())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&points),
    ];

    let x_labels = vec![
        format_epoch_millis_hms(x[0] as i64),
        format_epoch_millis_hms(((x[0] + x[1]) / 2.0) as i64),
        format_epoch_millis_hms(x[1] as i64),
    ];
    let y_labels = vec![
        format!("{:.1}", y[0]),
        format!("{:.1}", (y[0] + y[1]) / 2.0),
        format!("{:.1}", y[1]),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds(x)
                .labels(x_labels)
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds(y)
                .labels(y_labels)
                .style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_types::SensorSample;

    fn series_of(values: &[(i64, f64)]) -> SampleSeries {
        let mut series = SampleSeries::default();
        series.extend(values.iter().map(|&(timestamp_ms, value)| SensorSample {
            timestamp_ms,
            value,
        }));
        series
    }

    #[test]
    fn test_y_bounds_keep_threshold_lines_visible() {
        // Samples well inside the band: the domain still reaches past it.
        let series = series_of(&[(0, 20.0), (1000, 22.0)]);
        let band = ThresholdBand::new(15.0, 30.0);
        let [lower, upper] = y_bounds(&series, band);
        assert!(lower <= band.min - 10.0);
        assert!(upper >= band.max + 10.0);
    }

    #[test]
    fn test_y_bounds_follow_breaching_data() {
        let series = series_of(&[(0, -50.0), (1000, 120.0)]);
        let band = ThresholdBand::new(15.0, 30.0);
        let [lower, upper] = y_bounds(&series, band);
        assert_eq!(lower, -50.0);
        assert_eq!(upper, 120.0);
    }

    #[test]
    fn test_y_bounds_empty_series_frame_the_band() {
        let series = SampleSeries::default();
        let band = ThresholdBand::new(15.0, 30.0);
        assert_eq!(y_bounds(&series, band), [5.0, 40.0]);
    }

    #[test]
    fn test_x_bounds_extend_past_latest_sample() {
        let series = series_of(&[(1_000_000, 1.0), (2_000_000, 2.0)]);
        let [start, end] = x_bounds(&series);
        assert_eq!(start, 1_000_000.0);
        assert_eq!(end, (2_000_000 + X_HEADROOM_MS) as f64);
    }

    #[test]
    fn test_x_bounds_single_sample_still_has_width() {
        let series = series_of(&[(1_000_000, 1.0)]);
        let [start, end] = x_bounds(&series);
        assert!(end > start);
    }
}
