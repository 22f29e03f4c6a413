//! Backend service clients for the verdant greenhouse console.
//!
//! This crate talks to the three backend services over their HTTP contracts
//! and provides the polling/streaming machinery the console builds on:
//!
//! - [`RegistryClient`]: sensor/actuator device CRUD
//! - [`ControllerClient`]: threshold bands and averaged readings
//! - [`HistoryClient`]: the read-only history record set
//! - [`PollStream`]: cancellable periodic re-fetch (ticker + cancellation
//!   token)
//! - [`SensorSocket`]: WebSocket streaming variant with reconnect
//!
//! The backend is always the source of truth: mutations never patch local
//! state, consumers re-fetch after a successful call. Heterogeneous response
//! shapes are normalized in [`wire`] before they reach anything stateful.
//!
//! # Example
//!
//! ```no_run
//! use verdant_client::{ControllerClient, RegistryClient};
//! use verdant_types::{DeviceClass, TypeFilter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = RegistryClient::new("http://127.0.0.1:8081")?;
//! let controller = ControllerClient::new("http://127.0.0.1:8082")?;
//!
//! let sensors = registry.list(DeviceClass::Sensor, TypeFilter::All).await?;
//! let thresholds = controller.thresholds().await?;
//! println!("{} sensors, {} threshold bands", sensors.len(), thresholds.len());
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod error;
pub mod history;
pub mod poll;
pub mod registry;
pub mod stream;
pub mod wire;

mod transport;

pub use controller::ControllerClient;
pub use error::{Error, Result};
pub use history::HistoryClient;
pub use poll::{PollOptions, PollOptionsBuilder, PollSource, PollStream};
pub use registry::RegistryClient;
pub use stream::{SampleBatch, SensorSocket, SocketOptions};
