//! Application state for the dashboard.
//!
//! Each view owns its own state slice; nothing is shared across views except
//! by re-fetch through the worker. Backend events replace whole slices
//! (last-write-wins), matching the polling contract.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use verdant_types::{
    ACTUATOR_TYPES, Device, DeviceClass, DeviceType, HistoryRecord, SENSOR_TYPES, SampleSeries,
    ThresholdMap, TypeFilter,
};

use crate::pager::Pager;

use super::messages::{BackendEvent, Command};

/// How long a status-line message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(5);

/// Dashboard views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    /// Live threshold-aware charts, one per sensor type.
    #[default]
    Charts,
    /// Sensor device management.
    Sensors,
    /// Actuator device management.
    Actuators,
    /// Paginated history record table.
    History,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Charts, Tab::Sensors, Tab::Actuators, Tab::History];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Charts => "Charts",
            Tab::Sensors => "Sensors",
            Tab::Actuators => "Actuators",
            Tab::History => "History",
        }
    }

    pub fn next(self) -> Tab {
        match self {
            Tab::Charts => Tab::Sensors,
            Tab::Sensors => Tab::Actuators,
            Tab::Actuators => Tab::History,
            Tab::History => Tab::Charts,
        }
    }

    pub fn prev(self) -> Tab {
        match self {
            Tab::Charts => Tab::History,
            Tab::Sensors => Tab::Charts,
            Tab::Actuators => Tab::Sensors,
            Tab::History => Tab::Actuators,
        }
    }
}

/// Lifecycle of the chart feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FeedPhase {
    /// First fetch still outstanding.
    #[default]
    Loading,
    /// At least one snapshot or batch has arrived.
    Live,
    /// The last fetch failed; prior samples are kept and shown stale.
    Error(String),
}

/// Chart state: one rolling series per sensor type plus the feed phase.
#[derive(Debug, Default)]
pub struct ChartFeed {
    pub phase: FeedPhase,
    series: HashMap<DeviceType, SampleSeries>,
}

impl ChartFeed {
    pub fn series_for(&self, ty: DeviceType) -> &SampleSeries {
        static EMPTY: std::sync::OnceLock<SampleSeries> = std::sync::OnceLock::new();
        self.series
            .get(&ty)
            .unwrap_or_else(|| EMPTY.get_or_init(SampleSeries::default))
    }
}

/// One device-management view: the fetched list, a type filter, and a
/// selection cursor over the filtered rows.
#[derive(Debug)]
pub struct DeviceTable {
    class: DeviceClass,
    /// `None` until the first fetch lands.
    pub devices: Option<Vec<Device>>,
    pub filter: TypeFilter,
    pub selected: usize,
}

impl DeviceTable {
    fn new(class: DeviceClass) -> Self {
        Self {
            class,
            devices: None,
            filter: TypeFilter::All,
            selected: 0,
        }
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    /// The devices passing the current filter, in fetch order.
    pub fn filtered(&self) -> Vec<&Device> {
        self.devices
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|d| self.filter.matches(d.device_type()))
            .collect()
    }

    /// The currently selected device, if the filtered list is non-empty.
    pub fn selected_device(&self) -> Option<&Device> {
        self.filtered().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let len = self.filtered().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Advance the filter: All, then each type of this class, then back.
    pub fn cycle_filter(&mut self) {
        let types: &[DeviceType] = match self.class {
            DeviceClass::Sensor => &SENSOR_TYPES,
            DeviceClass::Actuator => &ACTUATOR_TYPES,
        };
        self.filter = match self.filter {
            TypeFilter::All => TypeFilter::Only(types[0]),
            TypeFilter::Only(current) => {
                match types.iter().position(|&t| t == current) {
                    Some(i) if i + 1 < types.len() => TypeFilter::Only(types[i + 1]),
                    _ => TypeFilter::All,
                }
            }
        };
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn replace(&mut self, devices: Vec<Device>) {
        self.devices = Some(devices);
        self.clamp_selection();
    }
}

/// History view: the fetched record set, filter, and pagination state.
#[derive(Debug)]
pub struct HistoryView {
    /// `None` until the first fetch lands.
    pub records: Option<Vec<HistoryRecord>>,
    pub error: Option<String>,
    pub filter: TypeFilter,
    pub pager: Pager,
}

impl HistoryView {
    fn new() -> Self {
        Self {
            records: None,
            error: None,
            filter: TypeFilter::All,
            pager: Pager::default(),
        }
    }

    /// The records passing the current filter, in fetch order.
    pub fn filtered(&self) -> Vec<&HistoryRecord> {
        self.records
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|r| r.matches(self.filter))
            .collect()
    }

    /// Advance the filter across All plus every device type. The pager
    /// re-clamps so the view never lands past the last page.
    pub fn cycle_filter(&mut self) {
        let all: Vec<DeviceType> = SENSOR_TYPES
            .iter()
            .chain(ACTUATOR_TYPES.iter())
            .copied()
            .collect();
        self.filter = match self.filter {
            TypeFilter::All => TypeFilter::Only(all[0]),
            TypeFilter::Only(current) => match all.iter().position(|&t| t == current) {
                Some(i) if i + 1 < all.len() => TypeFilter::Only(all[i + 1]),
                _ => TypeFilter::All,
            },
        };
        let count = self.filtered().len();
        self.pager.set_total_items(count);
    }

    fn replace(&mut self, records: Vec<HistoryRecord>) {
        self.records = Some(records);
        self.error = None;
        let count = self.filtered().len();
        self.pager.set_total_items(count);
    }
}

/// A transient status-line message.
#[derive(Debug)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    shown_at: Instant,
}

/// Top-level dashboard state.
pub struct App {
    pub event_rx: mpsc::Receiver<BackendEvent>,
    pub active_tab: Tab,
    pub charts: ChartFeed,
    pub thresholds: ThresholdMap,
    pub sensors: DeviceTable,
    pub actuators: DeviceTable,
    pub history: HistoryView,
    pub username: Option<String>,
    status: Option<StatusMessage>,
    should_quit: bool,
}

impl App {
    pub fn new(event_rx: mpsc::Receiver<BackendEvent>, username: Option<String>) -> Self {
        Self {
            event_rx,
            active_tab: Tab::default(),
            charts: ChartFeed::default(),
            thresholds: ThresholdMap::new(),
            sensors: DeviceTable::new(DeviceClass::Sensor),
            actuators: DeviceTable::new(DeviceClass::Actuator),
            history: HistoryView::new(),
            username,
            status: None,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// The device table backing the active tab, if it is a device tab.
    pub fn active_device_table(&mut self) -> Option<&mut DeviceTable> {
        match self.active_tab {
            Tab::Sensors => Some(&mut self.sensors),
            Tab::Actuators => Some(&mut self.actuators),
            _ => None,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error,
            shown_at: Instant::now(),
        });
    }

    /// The current status message, if it has not expired.
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status
            .as_ref()
            .filter(|m| m.shown_at.elapsed() < STATUS_TTL)
    }

    pub fn clear_expired_status(&mut self) {
        if let Some(message) = &self.status
            && message.shown_at.elapsed() >= STATUS_TTL
        {
            self.status = None;
        }
    }

    /// Apply one worker event to the owning state slice.
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Devices { class, devices } => match class {
                DeviceClass::Sensor => self.sensors.replace(devices),
                DeviceClass::Actuator => self.actuators.replace(devices),
            },
            BackendEvent::Thresholds(map) => {
                self.thresholds = map;
            }
            BackendEvent::ChartSnapshot(points) => {
                // Polling variant: the whole series is replaced per poll.
                self.charts.phase = FeedPhase::Live;
                for ty in SENSOR_TYPES {
                    let series = self
                        .charts
                        .series
                        .entry(ty)
                        .or_insert_with(SampleSeries::unbounded);
                    series.replace_all(points.iter().map(|p| p.sample_for(ty)));
                }
            }
            BackendEvent::ChartAppend(samples) => {
                // Streaming variant: bounded series, oldest points dropped.
                self.charts.phase = FeedPhase::Live;
                for (ty, sample) in samples {
                    self.charts.series.entry(ty).or_default().push(sample);
                }
            }
            BackendEvent::ChartError(message) => {
                self.charts.phase = FeedPhase::Error(message);
            }
            BackendEvent::HistoryLoaded(records) => {
                self.history.replace(records);
            }
            BackendEvent::HistoryError(message) => {
                self.history.error = Some(message);
            }
            BackendEvent::ActionFailed { context, message } => {
                self.set_status(format!("{context}: {message}"), true);
            }
        }
    }

    /// The refresh command for the active tab.
    pub fn refresh_command(&self) -> Command {
        match self.active_tab {
            Tab::Charts => Command::RefreshThresholds,
            Tab::Sensors => Command::RefreshDevices(DeviceClass::Sensor),
            Tab::Actuators => Command::RefreshDevices(DeviceClass::Actuator),
            Tab::History => Command::RefreshHistory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_types::{AveragePoint, DeviceId, HistoryValue, ThresholdBand};

    fn app() -> App {
        let (_tx, rx) = mpsc::channel(1);
        App::new(rx, None)
    }

    fn device(ty: DeviceType, number: u64, active: bool) -> Device {
        Device {
            id: DeviceId::new(ty, number),
            location: "bay".to_string(),
            update_frequency: 30,
            unit: ty.unit().unwrap_or_default().to_string(),
            active,
        }
    }

    fn record(ty: DeviceType, time: i64) -> HistoryRecord {
        HistoryRecord {
            device_id: format!("{ty}-1"),
            location: "bay".to_string(),
            device_type: Some(ty),
            value: HistoryValue::Number(1.0),
            unit: String::new(),
            time,
        }
    }

    #[test]
    fn test_tab_cycle_round_trip() {
        let mut tab = Tab::Charts;
        for _ in 0..Tab::ALL.len() {
            tab = tab.next();
        }
        assert_eq!(tab, Tab::Charts);
        assert_eq!(Tab::Charts.prev(), Tab::History);
    }

    #[test]
    fn test_device_filter_exact_subset() {
        let mut app = app();
        app.handle_backend_event(BackendEvent::Devices {
            class: DeviceClass::Sensor,
            devices: vec![
                device(DeviceType::Temperature, 1, true),
                device(DeviceType::Lightness, 2, false),
                device(DeviceType::Temperature, 3, false),
            ],
        });

        assert_eq!(app.sensors.filtered().len(), 3);

        app.sensors.filter = TypeFilter::Only(DeviceType::Temperature);
        let filtered = app.sensors.filtered();
        assert_eq!(filtered.len(), 2);
        assert!(
            filtered
                .iter()
                .all(|d| d.device_type() == DeviceType::Temperature)
        );
    }

    #[test]
    fn test_filter_cycle_returns_to_all() {
        let mut table = DeviceTable::new(DeviceClass::Sensor);
        table.devices = Some(Vec::new());
        let mut seen = vec![table.filter];
        for _ in 0..SENSOR_TYPES.len() {
            table.cycle_filter();
            seen.push(table.filter);
        }
        table.cycle_filter();
        assert_eq!(table.filter, TypeFilter::All);
        // Every sensor type was offered exactly once.
        assert_eq!(seen.len(), SENSOR_TYPES.len() + 1);
    }

    #[test]
    fn test_selection_clamps_when_filter_shrinks_list() {
        let mut app = app();
        app.handle_backend_event(BackendEvent::Devices {
            class: DeviceClass::Actuator,
            devices: vec![
                device(DeviceType::Heater, 1, true),
                device(DeviceType::Cooler, 2, false),
                device(DeviceType::Heater, 3, false),
            ],
        });
        app.actuators.selected = 2;
        app.actuators.filter = TypeFilter::Only(DeviceType::Cooler);
        app.actuators.clamp_selection();
        assert_eq!(app.actuators.selected, 0);
    }

    #[test]
    fn test_chart_snapshot_replaces_series() {
        let mut app = app();
        assert_eq!(app.charts.phase, FeedPhase::Loading);

        let mut point = AveragePoint {
            timestamp_ms: 1_000,
            ..AveragePoint::default()
        };
        point.values.insert(DeviceType::Temperature, 21.0);
        app.handle_backend_event(BackendEvent::ChartSnapshot(vec![point]));

        assert_eq!(app.charts.phase, FeedPhase::Live);
        let series = app.charts.series_for(DeviceType::Temperature);
        assert_eq!(series.len(), 1);
        assert_eq!(series.latest().unwrap().value, 21.0);
        // Types absent from the snapshot read 0, matching the wire coercion.
        assert_eq!(
            app.charts
                .series_for(DeviceType::Lightness)
                .latest()
                .unwrap()
                .value,
            0.0
        );
    }

    #[test]
    fn test_chart_error_keeps_prior_samples() {
        let mut app = app();
        let mut point = AveragePoint {
            timestamp_ms: 1_000,
            ..AveragePoint::default()
        };
        point.values.insert(DeviceType::Temperature, 21.0);
        app.handle_backend_event(BackendEvent::ChartSnapshot(vec![point]));
        app.handle_backend_event(BackendEvent::ChartError("boom".to_string()));

        assert_eq!(app.charts.phase, FeedPhase::Error("boom".to_string()));
        assert_eq!(app.charts.series_for(DeviceType::Temperature).len(), 1);
    }

    #[test]
    fn test_thresholds_replaced_whole() {
        let mut app = app();
        let mut map = ThresholdMap::new();
        map.insert(DeviceType::Temperature, ThresholdBand::new(15.0, 30.0));
        app.handle_backend_event(BackendEvent::Thresholds(map.clone()));
        assert_eq!(app.thresholds, map);
    }

    #[test]
    fn test_history_filter_reclamps_page() {
        let mut app = app();
        let records: Vec<HistoryRecord> = (0..60)
            .map(|i| record(DeviceType::Temperature, 1_700_000_000 + i))
            .chain((0..5).map(|i| record(DeviceType::Heater, 1_700_100_000 + i)))
            .collect();
        app.handle_backend_event(BackendEvent::HistoryLoaded(records));

        assert_eq!(app.history.pager.total_pages(), 5);
        app.history.pager.goto(5);

        // Narrowing to the 5 heater records pulls the page back into range.
        app.history.filter = TypeFilter::Only(DeviceType::Heater);
        let count = app.history.filtered().len();
        app.history.pager.set_total_items(count);
        assert_eq!(app.history.pager.total_pages(), 1);
        assert_eq!(app.history.pager.current_page(), 1);
    }

    #[test]
    fn test_status_expires() {
        let mut app = app();
        app.set_status("saved", false);
        assert!(app.status().is_some());
        app.status.as_mut().unwrap().shown_at = Instant::now() - STATUS_TTL;
        assert!(app.status().is_none());
        app.clear_expired_status();
    }
}
