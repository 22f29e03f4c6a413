//! Shared data model for the verdant greenhouse console.
//!
//! This crate provides the wire-facing types shared by the backend clients
//! (`verdant-client`) and the console binary (`verdant-console`).
//!
//! # Features
//!
//! - Device type tags with the backend's wire spellings
//! - Composite device ids (`<type>-<numericId>`)
//! - Threshold bands and the per-type threshold map
//! - Sensor samples and the bounded rolling series used for charting
//! - History records with sensor (numeric) and actuator (on/off) values

pub mod error;
pub mod series;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use series::{DEFAULT_CAPACITY, SampleSeries};
pub use types::{
    ACTUATOR_TYPES, AveragePoint, Device, DeviceClass, DeviceId, DeviceType, HistoryRecord,
    HistoryValue, SENSOR_TYPES, SensorSample, ThresholdBand, ThresholdMap, TypeFilter,
};
