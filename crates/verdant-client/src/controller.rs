//! HTTP client for the controller service.
//!
//! The controller owns the per-sensor-type threshold bands and serves the
//! averaged readings consumed by the dashboard charts.
//!
//! Displayed thresholds always reflect the last successful fetch: `set` does
//! not patch local state, callers re-fetch after a successful update.

use reqwest::Client;
use serde_json::json;

use verdant_types::{AveragePoint, DeviceType, ThresholdBand, ThresholdMap};

use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::wire;

/// HTTP client for threshold bands and averaged readings.
#[derive(Debug, Clone)]
pub struct ControllerClient {
    transport: Transport,
}

impl ControllerClient {
    /// Create a client for the controller service base URL.
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

    /// Fetch the threshold band for every sensor type that has one.
    pub async fn thresholds(&self) -> Result<ThresholdMap> {
        let body = self
            .transport
            .get_value("/controller/getControllerThreshold")
            .await?;
        Ok(wire::thresholds_from_body(&body))
    }

    /// Update the threshold band for a sensor type.
    ///
    /// Rejects client-side, before any request is sent, when `min >= max` or
    /// when the type is not a sensor.
    pub async fn set_threshold(&self, ty: DeviceType, band: ThresholdBand) -> Result<()> {
        if ty.unit().is_none() {
            return Err(Error::validation(format!(
                "{} is an actuator type and has no threshold band",
                ty
            )));
        }
        if !band.is_valid() {
            return Err(Error::validation(
                "Please make the Min value lower than Max.",
            ));
        }

        let body = json!({
            "deviceType": ty,
            "thresholdMin": band.min,
            "thresholdMax": band.max,
        });
        self.transport
            .post_json("/controller/updateControllerThreshold", &body)
            .await?;
        Ok(())
    }

    /// Fetch the averaged readings series for the dashboard charts.
    pub async fn averages(&self) -> Result<Vec<AveragePoint>> {
        let body = self
            .transport
            .get_value("/controller/getControllerAverageValue")
            .await?;
        Ok(wire::average_points_from_body(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ControllerClient::new("http://127.0.0.1:8082").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8082");
    }

    #[tokio::test]
    async fn test_set_threshold_rejects_inverted_band_without_request() {
        let client = ControllerClient::new("http://127.0.0.1:1").unwrap();
        let err = client
            .set_threshold(DeviceType::Temperature, ThresholdBand::new(10.0, 5.0))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_set_threshold_rejects_equal_bounds() {
        let client = ControllerClient::new("http://127.0.0.1:1").unwrap();
        let err = client
            .set_threshold(DeviceType::Temperature, ThresholdBand::new(10.0, 10.0))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_set_threshold_rejects_actuator_type() {
        let client = ControllerClient::new("http://127.0.0.1:1").unwrap();
        let err = client
            .set_threshold(DeviceType::Heater, ThresholdBand::new(0.0, 1.0))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }
}
