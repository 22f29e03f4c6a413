//! Table and text rendering for CLI output.

use anyhow::Result;
use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use verdant_types::{Device, HistoryRecord, SENSOR_TYPES, ThresholdMap};

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Device ID")]
    id: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Frequency (s)")]
    frequency: u64,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Unit")]
    unit: String,
}

#[derive(Tabled)]
struct ThresholdRow {
    #[tabled(rename = "Device Type")]
    device_type: &'static str,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Unit")]
    unit: &'static str,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Device ID")]
    device_id: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Unit")]
    unit: String,
}

fn active_cell(active: bool) -> String {
    if active {
        "on".green().to_string()
    } else {
        "off".red().to_string()
    }
}

/// Render a device list as a table.
pub fn devices_table(devices: &[Device]) -> String {
    let rows: Vec<DeviceRow> = devices
        .iter()
        .map(|d| DeviceRow {
            id: d.id.to_string(),
            location: d.location.clone(),
            frequency: d.update_frequency,
            active: active_cell(d.active),
            unit: d.unit.clone(),
        })
        .collect();
    Table::new(rows).with(Style::sharp()).to_string()
}

/// Render a device list as pretty JSON.
pub fn devices_json(devices: &[Device]) -> Result<String> {
    Ok(serde_json::to_string_pretty(devices)?)
}

/// Render the threshold bands as a table, one row per sensor type.
/// Types without a configured band show dashes.
pub fn thresholds_table(map: &ThresholdMap) -> String {
    let rows: Vec<ThresholdRow> = SENSOR_TYPES
        .iter()
        .map(|ty| {
            let (min, max) = match map.get(*ty) {
                Some(band) => (format!("{}", band.min), format!("{}", band.max)),
                None => ("-".to_string(), "-".to_string()),
            };
            ThresholdRow {
                device_type: ty.wire_name(),
                min,
                max,
                unit: ty.unit().unwrap_or(""),
            }
        })
        .collect();
    Table::new(rows).with(Style::sharp()).to_string()
}

/// Render the threshold bands as pretty JSON.
pub fn thresholds_json(map: &ThresholdMap) -> Result<String> {
    let entries: Vec<serde_json::Value> = map
        .iter()
        .map(|(ty, band)| {
            serde_json::json!({
                "deviceType": ty,
                "thresholdMin": band.min,
                "thresholdMax": band.max,
            })
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

/// Render one page of history records as a table.
pub fn history_table(records: &[HistoryRecord]) -> String {
    let rows: Vec<HistoryRow> = records
        .iter()
        .map(|r| HistoryRow {
            time: format_epoch_seconds(r.time),
            device_id: r.device_id.clone(),
            device_type: r
                .device_type
                .map(|ty| ty.wire_name().to_string())
                .unwrap_or_else(|| "-".to_string()),
            location: r.location.clone(),
            value: r.value.to_string(),
            unit: r.unit.clone(),
        })
        .collect();
    Table::new(rows).with(Style::sharp()).to_string()
}

/// Render history records as pretty JSON.
pub fn history_json(records: &[HistoryRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Format an epoch-seconds timestamp as `YYYY-MM-DD HH:MM:SS` UTC.
pub fn format_epoch_seconds(secs: i64) -> String {
    let format =
        time::format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]")
            .expect("valid format description");
    time::OffsetDateTime::from_unix_timestamp(secs)
        .ok()
        .and_then(|dt| dt.format(&format).ok())
        .unwrap_or_else(|| secs.to_string())
}

/// Format an epoch-milliseconds timestamp as `HH:MM:SS` UTC.
pub fn format_epoch_millis_hms(millis: i64) -> String {
    let format = time::format_description::parse("[hour]:[minute]:[second]")
        .expect("valid format description");
    time::OffsetDateTime::from_unix_timestamp(millis / 1000)
        .ok()
        .and_then(|dt| dt.format(&format).ok())
        .unwrap_or_else(|| millis.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_types::{DeviceId, DeviceType, HistoryValue, ThresholdBand};

    #[test]
    fn test_format_epoch_seconds() {
        assert_eq!(format_epoch_seconds(1_700_000_000), "2023-11-14 22:13:20");
    }

    #[test]
    fn test_format_epoch_millis_hms() {
        assert_eq!(format_epoch_millis_hms(1_700_000_000_000), "22:13:20");
    }

    #[test]
    fn test_devices_table_contains_ids() {
        let devices = vec![Device {
            id: DeviceId::new(DeviceType::Temperature, 3),
            location: "north wing".to_string(),
            update_frequency: 30,
            unit: "Cel".to_string(),
            active: true,
        }];
        let table = devices_table(&devices);
        assert!(table.contains("Temperature-3"));
        assert!(table.contains("north wing"));
    }

    #[test]
    fn test_thresholds_table_shows_unset_as_dash() {
        let mut map = ThresholdMap::new();
        map.insert(DeviceType::Temperature, ThresholdBand::new(15.0, 30.0));
        let table = thresholds_table(&map);
        assert!(table.contains("15"));
        assert!(table.contains("Soil_Moisture"));
        assert!(table.contains('-'));
    }

    #[test]
    fn test_history_table_renders_switch_values() {
        let records = vec![HistoryRecord {
            device_id: "Heater-2".to_string(),
            location: "east bay".to_string(),
            device_type: Some(DeviceType::Heater),
            value: HistoryValue::Switch(true),
            unit: String::new(),
            time: 1_700_000_000,
        }];
        let table = history_table(&records);
        assert!(table.contains("Heater-2"));
        assert!(table.contains("on"));
        assert!(table.contains("2023-11-14"));
    }
}
