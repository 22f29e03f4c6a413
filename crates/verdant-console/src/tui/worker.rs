//! Background worker for backend operations.
//!
//! All network I/O happens here, in one Tokio task, keeping the rendering
//! loop responsive. The worker receives [`Command`]s from the UI and sends
//! [`BackendEvent`]s back. The chart feed (polling or streaming) runs as a
//! child task bound to a cancellation token that is cancelled when the
//! worker stops, so no ticker or socket outlives the dashboard.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use verdant_client::{
    ControllerClient, HistoryClient, PollOptions, PollStream, RegistryClient, SensorSocket,
    SocketOptions,
};
use verdant_types::{DeviceClass, DeviceId, SensorSample, TypeFilter};

use crate::feed::ControllerFeed;

use super::messages::{BackendEvent, Command};

/// Background worker owning the backend clients.
pub struct BackendWorker {
    command_rx: mpsc::Receiver<Command>,
    event_tx: mpsc::Sender<BackendEvent>,
    registry: RegistryClient,
    controller: ControllerClient,
    history: HistoryClient,
    stream_url: Option<String>,
    poll_interval: Duration,
}

/// Current time in epoch milliseconds.
fn now_ms() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

impl BackendWorker {
    pub fn new(
        command_rx: mpsc::Receiver<Command>,
        event_tx: mpsc::Sender<BackendEvent>,
        registry: RegistryClient,
        controller: ControllerClient,
        history: HistoryClient,
        stream_url: Option<String>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            command_rx,
            event_tx,
            registry,
            controller,
            history,
            stream_url,
            poll_interval,
        }
    }

    /// Run the worker until [`Command::Shutdown`] or a closed channel.
    pub async fn run(mut self) {
        info!("Backend worker started");

        let cancel = CancellationToken::new();
        self.spawn_chart_feed(&cancel);

        loop {
            match self.command_rx.recv().await {
                Some(Command::Shutdown) => {
                    info!("Backend worker received shutdown command");
                    break;
                }
                Some(cmd) => self.handle_command(cmd).await,
                None => {
                    info!("Command channel closed, shutting down worker");
                    break;
                }
            }
        }

        cancel.cancel();
        info!("Backend worker stopped");
    }

    /// Start the chart feed: the streaming socket when a stream URL is
    /// configured, the 1-second controller poll otherwise.
    fn spawn_chart_feed(&self, cancel: &CancellationToken) {
        let event_tx = self.event_tx.clone();
        let cancel = cancel.clone();

        if let Some(url) = self.stream_url.clone() {
            tokio::spawn(async move {
                let mut socket = SensorSocket::connect(url, SocketOptions::default());
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        batch = socket.next() => {
                            let Some(batch) = batch else { break };
                            // Frames carry values only; stamp them one second
                            // apart ending at arrival time.
                            let now = now_ms();
                            let samples: Vec<_> = batch
                                .into_iter()
                                .flat_map(|(ty, values)| {
                                    let len = values.len() as i64;
                                    values.into_iter().enumerate().map(move |(i, value)| {
                                        let offset = (len - 1 - i as i64) * 1000;
                                        (ty, SensorSample {
                                            timestamp_ms: now - offset,
                                            value,
                                        })
                                    })
                                })
                                .collect();
                            if event_tx.send(BackendEvent::ChartAppend(samples)).await.is_err() {
                                break;
                            }
                        }
                    }
                }
                socket.close();
            });
        } else {
            let source = Arc::new(ControllerFeed::new(self.controller.clone()));
            let options = PollOptions::builder()
                .interval(self.poll_interval)
                .include_errors(true)
                .build();

            tokio::spawn(async move {
                let mut stream = PollStream::new(source, options);
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        item = stream.next() => {
                            let Some(item) = item else { break };
                            let sent = match item {
                                Ok(tick) => {
                                    if let Some(thresholds) = tick.thresholds {
                                        let _ = event_tx
                                            .send(BackendEvent::Thresholds(thresholds))
                                            .await;
                                    }
                                    event_tx
                                        .send(BackendEvent::ChartSnapshot(tick.averages))
                                        .await
                                }
                                Err(e) => {
                                    event_tx.send(BackendEvent::ChartError(e.to_string())).await
                                }
                            };
                            if sent.is_err() {
                                break;
                            }
                        }
                    }
                }
                stream.close();
            });
        }
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::RefreshDevices(class) => self.refresh_devices(class).await,
            Command::ToggleDevice { id, active } => {
                self.set_status(id.device_type.class(), vec![id.number], !active)
                    .await;
            }
            Command::DeleteDevice(id) => self.delete_device(id).await,
            Command::SetStatusAll { class, ids, target } => {
                self.set_status(class, ids, target).await;
            }
            Command::RefreshThresholds => self.refresh_thresholds().await,
            Command::RefreshHistory => self.refresh_history().await,
            Command::Shutdown => {
                // Handled in run()
            }
        }
    }

    async fn refresh_devices(&self, class: DeviceClass) {
        match self.registry.list(class, TypeFilter::All).await {
            Ok(devices) => {
                let _ = self
                    .event_tx
                    .send(BackendEvent::Devices { class, devices })
                    .await;
            }
            Err(e) => {
                warn!(%class, "Failed to fetch device list: {}", e);
                let _ = self
                    .event_tx
                    .send(BackendEvent::ActionFailed {
                        context: format!("{class} list"),
                        message: e.to_string(),
                    })
                    .await;
            }
        }
    }

    /// Mutations are logged and swallowed on failure; the re-fetch only
    /// happens after a success, so a failed call leaves displayed state
    /// untouched until the next refresh.
    async fn set_status(&self, class: DeviceClass, ids: Vec<u64>, target: bool) {
        match self.registry.set_status(class, &ids, target).await {
            Ok(()) => self.refresh_devices(class).await,
            Err(e) => warn!(%class, "Failed to update device status: {}", e),
        }
    }

    async fn delete_device(&self, id: DeviceId) {
        match self.registry.delete(id).await {
            Ok(()) => self.refresh_devices(id.device_type.class()).await,
            Err(e) => warn!(%id, "Failed to delete device: {}", e),
        }
    }

    async fn refresh_thresholds(&self) {
        match self.controller.thresholds().await {
            Ok(map) => {
                let _ = self.event_tx.send(BackendEvent::Thresholds(map)).await;
            }
            Err(e) => {
                warn!("Failed to fetch thresholds: {}", e);
                let _ = self
                    .event_tx
                    .send(BackendEvent::ActionFailed {
                        context: "thresholds".to_string(),
                        message: e.to_string(),
                    })
                    .await;
            }
        }
    }

    async fn refresh_history(&self) {
        match self.history.all_records().await {
            Ok(records) => {
                let _ = self
                    .event_tx
                    .send(BackendEvent::HistoryLoaded(records))
                    .await;
            }
            Err(e) => {
                warn!("Failed to fetch history: {}", e);
                let _ = self
                    .event_tx
                    .send(BackendEvent::HistoryError(e.to_string()))
                    .await;
            }
        }
    }
}
