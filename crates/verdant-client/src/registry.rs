//! HTTP client for the device registry service.
//!
//! Covers both sensor and actuator device management: listing, registering,
//! deleting, and switching devices on or off. The backend exposes parallel
//! endpoint families (`/sensor/...` and `/actuator/...`); the client picks
//! the family from the device class so callers never spell paths.
//!
//! The backend is the single source of truth: mutations never patch local
//! state, callers re-fetch the list after a successful call.
//!
//! # Example
//!
//! ```no_run
//! use verdant_client::RegistryClient;
//! use verdant_types::{DeviceClass, DeviceType, TypeFilter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RegistryClient::new("http://127.0.0.1:8081")?;
//!
//! let sensors = client
//!     .list(DeviceClass::Sensor, TypeFilter::Only(DeviceType::Temperature))
//!     .await?;
//! println!("{} temperature sensors", sensors.len());
//!
//! client
//!     .add(DeviceType::Temperature, "north wing", 30)
//!     .await?;
//! # Ok(())
//! # }
//! ```

use reqwest::Client;
use serde_json::json;

use verdant_types::{Device, DeviceClass, DeviceId, DeviceType, TypeFilter};

use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::wire;

/// HTTP client for sensor/actuator device records.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    transport: Transport,
}

fn class_prefix(class: DeviceClass) -> &'static str {
    match class {
        DeviceClass::Sensor => "/sensor",
        DeviceClass::Actuator => "/actuator",
    }
}

fn class_noun(class: DeviceClass) -> &'static str {
    match class {
        DeviceClass::Sensor => "Sensor",
        DeviceClass::Actuator => "Actuator",
    }
}

impl RegistryClient {
    /// Create a client for the registry service base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(base_url)?,
        })
    }

    /// Create a client with a caller-provided [`reqwest::Client`].
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        Ok(Self {
            transport: Transport::with_client(base_url, client)?,
        })
    }

    /// The normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Fetch the full device set for a class and filter it client-side.
    ///
    /// [`TypeFilter::All`] bypasses filtering. The full set is always
    /// re-fetched; there is no cache.
    pub async fn list(&self, class: DeviceClass, filter: TypeFilter) -> Result<Vec<Device>> {
        let path = format!("{}/get{}Device", class_prefix(class), class_noun(class));
        let body = self.transport.get_value(&path).await?;
        let devices = wire::devices_from_body(&body)
            .into_iter()
            .filter(|d| filter.matches(d.device_type()))
            .collect();
        Ok(devices)
    }

    /// Register a new device.
    ///
    /// Validates client-side before any request is sent: the location must be
    /// non-empty and the frequency positive. The sensor types' display unit
    /// is submitted alongside, matching the backend's add contract.
    pub async fn add(&self, ty: DeviceType, location: &str, frequency: u64) -> Result<()> {
        let location = location.trim();
        if location.is_empty() {
            return Err(Error::validation("Location is required."));
        }
        if frequency == 0 {
            return Err(Error::validation("Frequency must be a positive number."));
        }

        let class = ty.class();
        let path = format!("{}/add{}Device", class_prefix(class), class_noun(class));
        let body = json!({
            "type": ty,
            "location": location,
            "updateFrequency": frequency,
            "unit": ty.unit().unwrap_or(""),
        });
        self.transport.post_json(&path, &body).await?;
        Ok(())
    }

    /// Delete a device. Only the numeric id suffix is submitted.
    pub async fn delete(&self, id: DeviceId) -> Result<()> {
        let class = id.device_type.class();
        let path = format!("{}/delete{}Device", class_prefix(class), class_noun(class));
        let body = json!({ "deviceID": id.number });
        self.transport.post_json(&path, &body).await?;
        Ok(())
    }

    /// Switch one or more devices of a class to a target status.
    ///
    /// `ids` are the numeric id suffixes. An empty slice is a no-op that
    /// issues no request.
    pub async fn set_status(&self, class: DeviceClass, ids: &[u64], target: bool) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let path = format!("{}/update{}Status", class_prefix(class), class_noun(class));
        let body = json!({
            "device_ids": ids,
            "target_status": target,
        });
        self.transport.post_json(&path, &body).await?;
        Ok(())
    }

    /// Toggle a single device to the opposite of its current status.
    pub async fn toggle(&self, device: &Device) -> Result<()> {
        self.set_status(
            device.device_type().class(),
            &[device.id.number],
            !device.active,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = RegistryClient::new("http://127.0.0.1:8081/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8081");
    }

    #[test]
    fn test_client_invalid_url() {
        assert!(matches!(
            RegistryClient::new("127.0.0.1:8081"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_add_rejects_empty_location_without_request() {
        let client = RegistryClient::new("http://127.0.0.1:1").unwrap();
        // An unreachable port: if validation let this through, the error
        // would be NotReachable rather than Validation.
        let err = client
            .add(DeviceType::Temperature, "   ", 30)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_add_rejects_zero_frequency_without_request() {
        let client = RegistryClient::new("http://127.0.0.1:1").unwrap();
        let err = client
            .add(DeviceType::Heater, "east bay", 0)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_set_status_empty_ids_is_noop() {
        let client = RegistryClient::new("http://127.0.0.1:1").unwrap();
        // No request is issued for an empty id set, so the unreachable
        // endpoint is never contacted.
        client
            .set_status(DeviceClass::Sensor, &[], true)
            .await
            .unwrap();
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(class_prefix(DeviceClass::Sensor), "/sensor");
        assert_eq!(class_prefix(DeviceClass::Actuator), "/actuator");
        assert_eq!(class_noun(DeviceClass::Actuator), "Actuator");
    }
}
