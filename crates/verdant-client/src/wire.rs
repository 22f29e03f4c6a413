//! Normalization of heterogeneous backend payloads.
//!
//! The backend services are loose about shapes: numeric ids arrive as numbers
//! or strings, status flags as booleans or 0/1, timestamps as epoch
//! milliseconds or formatted strings, and the history endpoint returns either
//! a bare array or a `{"data": {...}}` keyed object. Everything is funneled
//! through the coercions here before it reaches view state; rows that cannot
//! be recognized at all are dropped with a log line rather than failing the
//! whole response.

use serde_json::Value;
use tracing::warn;

use verdant_types::{
    AveragePoint, Device, DeviceId, DeviceType, HistoryRecord, HistoryValue, SENSOR_TYPES,
    ThresholdBand, ThresholdMap,
};

/// Look up the first present key among `keys`.
fn field<'a>(row: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| row.get(k))
}

/// Coerce a JSON value into a float: numbers directly, numeric strings parsed.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce a JSON value into an unsigned integer.
pub fn coerce_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce a JSON value into a boolean: booleans directly, 0/1, on/off strings.
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "1" => Some(true),
            "false" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Coerce a timestamp into epoch milliseconds.
///
/// Numbers are taken as epoch milliseconds (the backend's convention);
/// strings are parsed as RFC3339 or `YYYY-MM-DD HH:MM:SS` (assumed UTC).
pub fn coerce_timestamp_ms(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => parse_datetime_ms(s.trim()),
        _ => None,
    }
}

fn parse_datetime_ms(s: &str) -> Option<i64> {
    if let Ok(dt) = time::OffsetDateTime::parse(s, &time::format_description::well_known::Rfc3339) {
        return Some((dt.unix_timestamp_nanos() / 1_000_000) as i64);
    }

    let format =
        time::format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]").ok()?;
    let dt = time::PrimitiveDateTime::parse(s, &format).ok()?;
    Some(dt.assume_utc().unix_timestamp() * 1000)
}

/// Normalize one device-list row into a [`Device`].
///
/// Rows look like `{deviceType, deviceID, deviceLocation, info_frequency,
/// unit, status}`. Missing numeric fields coerce to 0; an unrecognized type
/// tag or missing id makes the row unusable and returns `None`.
pub fn device_from_row(row: &Value) -> Option<Device> {
    let type_tag = field(row, &["deviceType", "type"])?.as_str()?;
    let device_type: DeviceType = match type_tag.parse() {
        Ok(ty) => ty,
        Err(_) => {
            warn!(tag = type_tag, "Skipping device row with unknown type");
            return None;
        }
    };

    let number = field(row, &["deviceID", "deviceId", "id"]).and_then(coerce_u64)?;

    let location = field(row, &["deviceLocation", "location"])
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let update_frequency = field(row, &["info_frequency", "updateFrequency", "frequency"])
        .and_then(coerce_u64)
        .unwrap_or(0);
    let unit = field(row, &["unit"])
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| {
            device_type
                .unit()
                .map(String::from)
                .unwrap_or_default()
        });
    let active = field(row, &["status", "active"])
        .and_then(coerce_bool)
        .unwrap_or(false);

    Some(Device {
        id: DeviceId::new(device_type, number),
        location,
        update_frequency,
        unit,
        active,
    })
}

/// Normalize a device-list response body into devices.
pub fn devices_from_body(body: &Value) -> Vec<Device> {
    let rows = match body {
        Value::Array(rows) => rows.as_slice(),
        other => {
            warn!(shape = %json_shape(other), "Device list body is not an array");
            return Vec::new();
        }
    };
    rows.iter().filter_map(device_from_row).collect()
}

/// Normalize the threshold response (array of `{deviceType, thresholdMin,
/// thresholdMax}`) into a [`ThresholdMap`]. Rows for non-sensor or unknown
/// types are dropped.
pub fn thresholds_from_body(body: &Value) -> ThresholdMap {
    let Value::Array(rows) = body else {
        warn!(shape = %json_shape(body), "Threshold body is not an array");
        return ThresholdMap::new();
    };

    rows.iter()
        .filter_map(|row| {
            let tag = field(row, &["deviceType", "type"])?.as_str()?;
            let ty: DeviceType = tag.parse().ok()?;
            if ty.unit().is_none() {
                return None;
            }
            let min = field(row, &["thresholdMin", "min"])
                .and_then(coerce_f64)
                .unwrap_or(0.0);
            let max = field(row, &["thresholdMax", "max"])
                .and_then(coerce_f64)
                .unwrap_or(0.0);
            Some((ty, ThresholdBand::new(min, max)))
        })
        .collect()
}

/// Normalize the averaged-readings response (array of `{time, <type>:
/// value}`) into [`AveragePoint`]s. Missing values coerce to 0.
pub fn average_points_from_body(body: &Value) -> Vec<AveragePoint> {
    let Value::Array(rows) = body else {
        warn!(shape = %json_shape(body), "Average body is not an array");
        return Vec::new();
    };

    rows.iter()
        .map(|row| {
            let timestamp_ms = field(row, &["time", "timestamp"])
                .and_then(coerce_timestamp_ms)
                .unwrap_or(0);
            let mut point = AveragePoint {
                timestamp_ms,
                ..AveragePoint::default()
            };
            for ty in SENSOR_TYPES {
                if let Some(value) = row.get(ty.wire_name()).and_then(coerce_f64) {
                    point.values.insert(ty, value);
                }
            }
            point
        })
        .collect()
}

/// Normalize one history row.
fn history_record_from_row(row: &Value) -> Option<HistoryRecord> {
    let device_id = field(row, &["DeviceID", "deviceID", "deviceId"])
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })?;

    let device_type = field(row, &["DeviceType", "deviceType"])
        .and_then(Value::as_str)
        .and_then(|tag| tag.parse().ok());

    let value = match field(row, &["Value", "value"]) {
        Some(Value::Bool(b)) => HistoryValue::Switch(*b),
        Some(v) => HistoryValue::Number(coerce_f64(v).unwrap_or(0.0)),
        None => HistoryValue::Number(0.0),
    };

    let location = field(row, &["Location", "location"])
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let unit = field(row, &["Unit", "unit"])
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    // History times are epoch seconds on the wire (unlike the averaged
    // readings, which use milliseconds).
    let time = match field(row, &["Time", "time"])? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
        Value::String(s) => parse_datetime_ms(s.trim())? / 1000,
        _ => return None,
    };

    Some(HistoryRecord {
        device_id,
        location,
        device_type,
        value,
        unit,
        time,
    })
}

/// Normalize the full-history response into records.
///
/// The body is either a bare array of rows or a `{"data": {...}}` object
/// whose values are rows (or arrays of rows) keyed by an opaque index.
pub fn history_from_body(body: &Value) -> Vec<HistoryRecord> {
    fn collect(value: &Value, out: &mut Vec<HistoryRecord>) {
        match value {
            Value::Array(rows) => {
                for row in rows {
                    collect(row, out);
                }
            }
            Value::Object(map) => {
                if map.keys().any(|k| k == "DeviceID" || k == "deviceID") {
                    if let Some(record) = history_record_from_row(value) {
                        out.push(record);
                    }
                } else {
                    for nested in map.values() {
                        collect(nested, out);
                    }
                }
            }
            _ => {}
        }
    }

    let mut records = Vec::new();
    match body {
        Value::Object(map) if map.contains_key("data") => collect(&map["data"], &mut records),
        other => collect(other, &mut records),
    }
    records
}

/// Short description of a JSON value's shape, for log lines.
fn json_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_device_row_normalization() {
        let row = json!({
            "deviceType": "Temperature",
            "deviceID": 3,
            "deviceLocation": "north wing",
            "info_frequency": 30,
            "unit": "Cel",
            "status": true
        });
        let device = device_from_row(&row).unwrap();
        assert_eq!(device.id.to_string(), "Temperature-3");
        assert_eq!(device.location, "north wing");
        assert_eq!(device.update_frequency, 30);
        assert!(device.active);
    }

    #[test]
    fn test_device_row_coerces_loose_fields() {
        // Stringly-typed id, 0/1 status, missing frequency.
        let row = json!({
            "deviceType": "Soil_Moisture",
            "deviceID": "7",
            "deviceLocation": "bed 2",
            "status": 1
        });
        let device = device_from_row(&row).unwrap();
        assert_eq!(device.id.number, 7);
        assert_eq!(device.update_frequency, 0);
        assert_eq!(device.unit, "%");
        assert!(device.active);
    }

    #[test]
    fn test_device_row_unknown_type_dropped() {
        let body = json!([
            {"deviceType": "Temperature", "deviceID": 1, "status": false},
            {"deviceType": "Humidity", "deviceID": 2, "status": false},
        ]);
        let devices = devices_from_body(&body);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id.device_type, DeviceType::Temperature);
    }

    #[test]
    fn test_device_body_not_array() {
        assert!(devices_from_body(&json!({"oops": true})).is_empty());
    }

    #[test]
    fn test_thresholds_normalization() {
        let body = json!([
            {"deviceType": "Temperature", "thresholdMin": 15, "thresholdMax": 30},
            {"deviceType": "Lightness", "thresholdMin": "200", "thresholdMax": "900"},
            {"deviceType": "Heater", "thresholdMin": 0, "thresholdMax": 1},
        ]);
        let map = thresholds_from_body(&body);
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get(DeviceType::Temperature).unwrap(),
            ThresholdBand::new(15.0, 30.0)
        );
        assert_eq!(
            map.get(DeviceType::Lightness).unwrap(),
            ThresholdBand::new(200.0, 900.0)
        );
        // Actuator thresholds make no sense and are dropped.
        assert!(map.get(DeviceType::Heater).is_none());
    }

    #[test]
    fn test_thresholds_idempotent() {
        let body = json!([
            {"deviceType": "Temperature", "thresholdMin": 15, "thresholdMax": 30},
        ]);
        assert_eq!(thresholds_from_body(&body), thresholds_from_body(&body));
    }

    #[test]
    fn test_average_points_missing_values_read_zero() {
        let body = json!([
            {"time": 1700000000000_i64, "Temperature": 21.5, "Lightness": 480},
            {"time": 1700000001000_i64, "Temperature": null},
        ]);
        let points = average_points_from_body(&body);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value_for(DeviceType::Temperature), 21.5);
        assert_eq!(points[0].value_for(DeviceType::Lightness), 480.0);
        assert_eq!(points[0].value_for(DeviceType::SoilMoisture), 0.0);
        assert_eq!(points[1].value_for(DeviceType::Temperature), 0.0);
    }

    #[test]
    fn test_average_point_string_time() {
        let body = json!([
            {"time": "2023-11-14 22:13:20", "Temperature": 20.0},
        ]);
        let points = average_points_from_body(&body);
        assert_eq!(points[0].timestamp_ms, 1_700_000_000_000);
    }

    #[test]
    fn test_history_bare_array() {
        let body = json!([
            {"DeviceID": "T-1", "Value": 23.5, "Unit": "Cel", "Time": 1700000000},
            {"DeviceID": "Heater-2", "DeviceType": "Heater", "Value": true, "Unit": "", "Time": 1700000060},
        ]);
        let records = history_from_body(&body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].device_id, "T-1");
        assert_eq!(records[0].value, HistoryValue::Number(23.5));
        assert_eq!(records[0].device_type, None);
        assert_eq!(records[1].device_type, Some(DeviceType::Heater));
        assert_eq!(records[1].value, HistoryValue::Switch(true));
    }

    #[test]
    fn test_history_keyed_object() {
        let body = json!({
            "data": {
                "0": {"DeviceID": "T-1", "DeviceType": "Temperature", "Value": 21.0, "Unit": "Cel", "Time": 1700000000},
                "1": [
                    {"DeviceID": "T-2", "DeviceType": "Temperature", "Value": 22.0, "Unit": "Cel", "Time": 1700000030}
                ]
            }
        });
        let records = history_from_body(&body);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_history_rows_without_id_dropped() {
        let body = json!([{"Value": 1.0, "Time": 1700000000}]);
        assert!(history_from_body(&body).is_empty());
    }

    #[test]
    fn test_coerce_bool_variants() {
        assert_eq!(coerce_bool(&json!(true)), Some(true));
        assert_eq!(coerce_bool(&json!(0)), Some(false));
        assert_eq!(coerce_bool(&json!("on")), Some(true));
        assert_eq!(coerce_bool(&json!("off")), Some(false));
        assert_eq!(coerce_bool(&json!("maybe")), None);
    }

    #[test]
    fn test_coerce_timestamp_rfc3339() {
        let ms = coerce_timestamp_ms(&json!("2023-11-14T22:13:20Z")).unwrap();
        assert_eq!(ms, 1_700_000_000_000);
    }
}
