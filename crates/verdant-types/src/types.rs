//! Core types for greenhouse devices and readings.

use core::fmt;
use std::collections::HashMap;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Broad category of a device: does it measure or does it act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeviceClass {
    /// A measuring device (temperature probe, moisture sensor, ...).
    Sensor,
    /// A controllable device (heater, fan, ...).
    Actuator,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceClass::Sensor => write!(f, "sensor"),
            DeviceClass::Actuator => write!(f, "actuator"),
        }
    }
}

/// Type tag categorizing a sensor or actuator device.
///
/// Serialization uses the backend's wire spelling (`Soil_Moisture`,
/// `Drip irrigation pipe`, ...), which is also what [`fmt::Display`] and
/// [`FromStr`] produce and accept.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new device types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum DeviceType {
    /// Air temperature sensor (°C).
    Temperature,
    /// Soil moisture sensor (%).
    #[cfg_attr(feature = "serde", serde(rename = "Soil_Moisture"))]
    SoilMoisture,
    /// Light intensity sensor (lx).
    Lightness,
    /// CO2 concentration sensor (ppm).
    #[cfg_attr(feature = "serde", serde(rename = "CO2_Concentration"))]
    Co2Concentration,
    /// Heating actuator.
    Heater,
    /// Cooling actuator.
    Cooler,
    /// Drip irrigation pipe actuator.
    #[cfg_attr(feature = "serde", serde(rename = "Drip irrigation pipe"))]
    DripIrrigation,
    /// Grow-light actuator.
    #[cfg_attr(feature = "serde", serde(rename = "LED Light"))]
    LedLight,
    /// CO2 generator actuator.
    #[cfg_attr(feature = "serde", serde(rename = "Carbon Dioxide Generator"))]
    Co2Generator,
    /// Exhaust fan actuator.
    #[cfg_attr(feature = "serde", serde(rename = "Exhaust Fan"))]
    ExhaustFan,
    /// Sunshade net actuator.
    #[cfg_attr(feature = "serde", serde(rename = "Sunshade Net"))]
    SunshadeNet,
}

/// The four sensor types, in dashboard order.
pub const SENSOR_TYPES: [DeviceType; 4] = [
    DeviceType::Temperature,
    DeviceType::SoilMoisture,
    DeviceType::Lightness,
    DeviceType::Co2Concentration,
];

/// The seven actuator types.
pub const ACTUATOR_TYPES: [DeviceType; 7] = [
    DeviceType::Heater,
    DeviceType::Cooler,
    DeviceType::DripIrrigation,
    DeviceType::LedLight,
    DeviceType::Co2Generator,
    DeviceType::ExhaustFan,
    DeviceType::SunshadeNet,
];

impl DeviceType {
    /// The device's class (sensor or actuator).
    #[must_use]
    pub fn class(&self) -> DeviceClass {
        match self {
            DeviceType::Temperature
            | DeviceType::SoilMoisture
            | DeviceType::Lightness
            | DeviceType::Co2Concentration => DeviceClass::Sensor,
            _ => DeviceClass::Actuator,
        }
    }

    /// The measurement unit for sensor types; `None` for actuators.
    ///
    /// # Examples
    ///
    /// ```
    /// use verdant_types::DeviceType;
    ///
    /// assert_eq!(DeviceType::Temperature.unit(), Some("Cel"));
    /// assert_eq!(DeviceType::Heater.unit(), None);
    /// ```
    #[must_use]
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            DeviceType::Temperature => Some("Cel"),
            DeviceType::SoilMoisture => Some("%"),
            DeviceType::Lightness => Some("lx"),
            DeviceType::Co2Concentration => Some("ppm"),
            _ => None,
        }
    }

    /// The backend's wire spelling of this tag.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            DeviceType::Temperature => "Temperature",
            DeviceType::SoilMoisture => "Soil_Moisture",
            DeviceType::Lightness => "Lightness",
            DeviceType::Co2Concentration => "CO2_Concentration",
            DeviceType::Heater => "Heater",
            DeviceType::Cooler => "Cooler",
            DeviceType::DripIrrigation => "Drip irrigation pipe",
            DeviceType::LedLight => "LED Light",
            DeviceType::Co2Generator => "Carbon Dioxide Generator",
            DeviceType::ExhaustFan => "Exhaust Fan",
            DeviceType::SunshadeNet => "Sunshade Net",
        }
    }

    /// Human-friendly chart label, including the unit for sensors.
    #[must_use]
    pub fn chart_label(&self) -> String {
        match self.unit() {
            Some(unit) => format!("{} ({})", self.wire_name(), unit),
            None => self.wire_name().to_string(),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for DeviceType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let all = SENSOR_TYPES.iter().chain(ACTUATOR_TYPES.iter());
        for ty in all {
            if ty.wire_name() == s {
                return Ok(*ty);
            }
        }
        Err(ParseError::UnknownDeviceType(s.to_string()))
    }
}

/// Composite device identifier: `<type>-<numericId>`.
///
/// The numeric suffix is assigned by the backend and is the only token sent
/// back for mutation and deletion; the type prefix exists for display and
/// client-side filtering.
///
/// # Examples
///
/// ```
/// use verdant_types::{DeviceId, DeviceType};
///
/// let id: DeviceId = "Temperature-3".parse().unwrap();
/// assert_eq!(id.device_type, DeviceType::Temperature);
/// assert_eq!(id.number, 3);
/// assert_eq!(id.to_string(), "Temperature-3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId {
    /// The display/filter type tag.
    pub device_type: DeviceType,
    /// The backend-assigned numeric id.
    pub number: u64,
}

impl DeviceId {
    /// Build a composite id from its parts.
    #[must_use]
    pub fn new(device_type: DeviceType, number: u64) -> Self {
        Self {
            device_type,
            number,
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.device_type.wire_name(), self.number)
    }
}

impl FromStr for DeviceId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((prefix, suffix)) = s.rsplit_once('-') else {
            return Err(ParseError::InvalidDeviceId(s.to_string()));
        };
        let device_type = prefix
            .parse::<DeviceType>()
            .map_err(|_| ParseError::InvalidDeviceId(s.to_string()))?;
        let number = suffix
            .parse::<u64>()
            .map_err(|_| ParseError::InvalidDeviceId(s.to_string()))?;
        Ok(Self {
            device_type,
            number,
        })
    }
}

#[cfg(feature = "serde")]
impl Serialize for DeviceId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A registered sensor or actuator device.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Device {
    /// Composite identifier.
    pub id: DeviceId,
    /// Where the device is installed.
    pub location: String,
    /// Reporting interval in seconds.
    pub update_frequency: u64,
    /// Measurement unit as reported by the backend.
    pub unit: String,
    /// Whether the device is currently switched on.
    pub active: bool,
}

impl Device {
    /// The device's type tag.
    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        self.id.device_type
    }
}

/// Filter over a device list by type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    /// No filtering: every device matches.
    #[default]
    All,
    /// Only devices with the given type tag match.
    Only(DeviceType),
}

impl TypeFilter {
    /// Whether a device of type `ty` passes the filter.
    #[must_use]
    pub fn matches(&self, ty: DeviceType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(wanted) => *wanted == ty,
        }
    }

    /// Display label for the filter.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            TypeFilter::All => "All",
            TypeFilter::Only(ty) => ty.wire_name(),
        }
    }
}

/// Acceptable value range for a sensor type, rendered as chart guide lines.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThresholdBand {
    /// Lower bound of the acceptable range.
    pub min: f64,
    /// Upper bound of the acceptable range.
    pub max: f64,
}

impl ThresholdBand {
    /// Build a band from its bounds.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The band used when the store has no entry for a sensor type.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
        }
    }

    /// Whether the band is well-formed (`min < max`).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min < self.max
    }
}

impl Default for ThresholdBand {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Mapping from sensor type to its threshold band.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdMap {
    bands: HashMap<DeviceType, ThresholdBand>,
}

impl ThresholdMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the band for a type, if one is set.
    #[must_use]
    pub fn get(&self, ty: DeviceType) -> Option<ThresholdBand> {
        self.bands.get(&ty).copied()
    }

    /// Look up the band for a type, falling back to the default band.
    #[must_use]
    pub fn band_or_fallback(&self, ty: DeviceType) -> ThresholdBand {
        self.get(ty).unwrap_or_else(ThresholdBand::fallback)
    }

    /// Insert or replace the band for a type.
    pub fn insert(&mut self, ty: DeviceType, band: ThresholdBand) {
        self.bands.insert(ty, band);
    }

    /// Iterate over the configured bands.
    pub fn iter(&self) -> impl Iterator<Item = (&DeviceType, &ThresholdBand)> {
        self.bands.iter()
    }

    /// Number of types with a configured band.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Whether no bands are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

impl FromIterator<(DeviceType, ThresholdBand)> for ThresholdMap {
    fn from_iter<I: IntoIterator<Item = (DeviceType, ThresholdBand)>>(iter: I) -> Self {
        Self {
            bands: iter.into_iter().collect(),
        }
    }
}

/// A single point of chart data for one sensor type.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorSample {
    /// Sample time in epoch milliseconds.
    pub timestamp_ms: i64,
    /// Measured value.
    pub value: f64,
}

/// One row of the averaged-readings response: a timestamp plus a value per
/// sensor type. Missing values read as 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AveragePoint {
    /// Row time in epoch milliseconds.
    pub timestamp_ms: i64,
    /// Per-sensor-type averaged values.
    pub values: HashMap<DeviceType, f64>,
}

impl AveragePoint {
    /// The averaged value for a sensor type, 0 when the row has none.
    #[must_use]
    pub fn value_for(&self, ty: DeviceType) -> f64 {
        self.values.get(&ty).copied().unwrap_or(0.0)
    }

    /// This row's sample for one sensor type.
    #[must_use]
    pub fn sample_for(&self, ty: DeviceType) -> SensorSample {
        SensorSample {
            timestamp_ms: self.timestamp_ms,
            value: self.value_for(ty),
        }
    }
}

/// A recorded value: numeric for sensors, on/off for actuators.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum HistoryValue {
    /// A switch state (actuator records).
    Switch(bool),
    /// A measured value (sensor records).
    Number(f64),
}

impl fmt::Display for HistoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryValue::Number(v) => write!(f, "{v}"),
            HistoryValue::Switch(true) => write!(f, "on"),
            HistoryValue::Switch(false) => write!(f, "off"),
        }
    }
}

/// An immutable history record fetched from the DB reader service.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryRecord {
    /// Raw device identifier as reported by the backend.
    pub device_id: String,
    /// Where the device was installed.
    pub location: String,
    /// Type tag, when the backend reported a recognizable one.
    pub device_type: Option<DeviceType>,
    /// The recorded value.
    pub value: HistoryValue,
    /// Measurement unit.
    pub unit: String,
    /// Record time in epoch seconds.
    pub time: i64,
}

impl HistoryRecord {
    /// Whether this record passes a type filter. Records without a
    /// recognizable type only match [`TypeFilter::All`].
    #[must_use]
    pub fn matches(&self, filter: TypeFilter) -> bool {
        match filter {
            TypeFilter::All => true,
            TypeFilter::Only(wanted) => self.device_type == Some(wanted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_type_classes() {
        for ty in SENSOR_TYPES {
            assert_eq!(ty.class(), DeviceClass::Sensor);
            assert!(ty.unit().is_some());
        }
        for ty in ACTUATOR_TYPES {
            assert_eq!(ty.class(), DeviceClass::Actuator);
            assert!(ty.unit().is_none());
        }
    }

    #[test]
    fn test_device_type_wire_round_trip() {
        for ty in SENSOR_TYPES.iter().chain(ACTUATOR_TYPES.iter()) {
            let parsed: DeviceType = ty.wire_name().parse().unwrap();
            assert_eq!(parsed, *ty);
        }
    }

    #[test]
    fn test_device_type_unknown() {
        let err = "Humidity".parse::<DeviceType>().unwrap_err();
        assert_eq!(err, ParseError::UnknownDeviceType("Humidity".to_string()));
    }

    #[test]
    fn test_device_id_round_trip() {
        let id = DeviceId::new(DeviceType::SoilMoisture, 12);
        assert_eq!(id.to_string(), "Soil_Moisture-12");
        assert_eq!("Soil_Moisture-12".parse::<DeviceId>().unwrap(), id);
    }

    #[test]
    fn test_device_id_rejects_malformed() {
        assert!("Temperature".parse::<DeviceId>().is_err());
        assert!("Temperature-x".parse::<DeviceId>().is_err());
        assert!("Humidity-3".parse::<DeviceId>().is_err());
        assert!("-3".parse::<DeviceId>().is_err());
    }

    #[test]
    fn test_type_filter() {
        assert!(TypeFilter::All.matches(DeviceType::Heater));
        assert!(TypeFilter::Only(DeviceType::Heater).matches(DeviceType::Heater));
        assert!(!TypeFilter::Only(DeviceType::Heater).matches(DeviceType::Cooler));
        assert_eq!(TypeFilter::All.label(), "All");
        assert_eq!(TypeFilter::Only(DeviceType::LedLight).label(), "LED Light");
    }

    #[test]
    fn test_threshold_band_validity() {
        assert!(ThresholdBand::new(10.0, 30.0).is_valid());
        assert!(!ThresholdBand::new(10.0, 5.0).is_valid());
        assert!(!ThresholdBand::new(10.0, 10.0).is_valid());
    }

    #[test]
    fn test_threshold_map_fallback() {
        let mut map = ThresholdMap::new();
        assert_eq!(
            map.band_or_fallback(DeviceType::Lightness),
            ThresholdBand::fallback()
        );

        map.insert(DeviceType::Lightness, ThresholdBand::new(100.0, 800.0));
        assert_eq!(
            map.band_or_fallback(DeviceType::Lightness),
            ThresholdBand::new(100.0, 800.0)
        );
    }

    #[test]
    fn test_average_point_missing_value_reads_zero() {
        let mut point = AveragePoint {
            timestamp_ms: 1_700_000_000_000,
            values: HashMap::new(),
        };
        point.values.insert(DeviceType::Temperature, 21.5);

        assert_eq!(point.value_for(DeviceType::Temperature), 21.5);
        assert_eq!(point.value_for(DeviceType::Lightness), 0.0);

        let sample = point.sample_for(DeviceType::Temperature);
        assert_eq!(sample.timestamp_ms, 1_700_000_000_000);
        assert_eq!(sample.value, 21.5);
    }

    #[test]
    fn test_history_value_display() {
        assert_eq!(HistoryValue::Number(23.5).to_string(), "23.5");
        assert_eq!(HistoryValue::Switch(true).to_string(), "on");
        assert_eq!(HistoryValue::Switch(false).to_string(), "off");
    }

    #[test]
    fn test_history_record_filter() {
        let record = HistoryRecord {
            device_id: "T-1".to_string(),
            location: "north wing".to_string(),
            device_type: Some(DeviceType::Temperature),
            value: HistoryValue::Number(23.5),
            unit: "Cel".to_string(),
            time: 1_700_000_000,
        };
        assert!(record.matches(TypeFilter::All));
        assert!(record.matches(TypeFilter::Only(DeviceType::Temperature)));
        assert!(!record.matches(TypeFilter::Only(DeviceType::Heater)));

        let untyped = HistoryRecord {
            device_type: None,
            ..record
        };
        assert!(untyped.matches(TypeFilter::All));
        assert!(!untyped.matches(TypeFilter::Only(DeviceType::Temperature)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_device_type_serialization() {
        assert_eq!(
            serde_json::to_string(&DeviceType::SoilMoisture).unwrap(),
            "\"Soil_Moisture\""
        );
        assert_eq!(
            serde_json::to_string(&DeviceType::Co2Concentration).unwrap(),
            "\"CO2_Concentration\""
        );
        assert_eq!(
            serde_json::to_string(&DeviceType::DripIrrigation).unwrap(),
            "\"Drip irrigation pipe\""
        );

        let ty: DeviceType = serde_json::from_str("\"Exhaust Fan\"").unwrap();
        assert_eq!(ty, DeviceType::ExhaustFan);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_history_value_deserialization() {
        let v: HistoryValue = serde_json::from_str("23.5").unwrap();
        assert_eq!(v, HistoryValue::Number(23.5));

        let v: HistoryValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, HistoryValue::Switch(true));
    }
}
