//! Message types for communication between the UI and the backend worker.
//!
//! - [`Command`]: sent from the UI task to the background worker
//! - [`BackendEvent`]: sent from the worker back to the UI task

use verdant_types::{
    AveragePoint, Device, DeviceClass, DeviceId, DeviceType, HistoryRecord, SensorSample,
    ThresholdMap,
};

/// Commands sent from the UI to the backend worker.
#[derive(Debug, Clone)]
pub enum Command {
    /// Re-fetch the device list for a class.
    RefreshDevices(DeviceClass),
    /// Switch a single device to the opposite of its current status.
    ToggleDevice {
        id: DeviceId,
        /// The status as currently displayed; the worker targets its inverse.
        active: bool,
    },
    /// Delete a device.
    DeleteDevice(DeviceId),
    /// Switch a set of devices of one class to a target status.
    SetStatusAll {
        class: DeviceClass,
        ids: Vec<u64>,
        target: bool,
    },
    /// Re-fetch the threshold bands.
    RefreshThresholds,
    /// Re-fetch the full history record set.
    RefreshHistory,
    /// Stop the worker.
    Shutdown,
}

/// Events sent from the backend worker to the UI.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    /// A fresh device list for a class.
    Devices {
        class: DeviceClass,
        devices: Vec<Device>,
    },
    /// Fresh threshold bands.
    Thresholds(ThresholdMap),
    /// A full averaged-readings snapshot (polling variant).
    ChartSnapshot(Vec<AveragePoint>),
    /// Appended samples per sensor type (streaming variant).
    ChartAppend(Vec<(DeviceType, SensorSample)>),
    /// The chart feed failed; prior data is kept but flagged stale.
    ChartError(String),
    /// The full history record set.
    HistoryLoaded(Vec<HistoryRecord>),
    /// The history fetch failed.
    HistoryError(String),
    /// A background operation failed; shown on the status line.
    ActionFailed { context: String, message: String },
}
