//! Streaming variant: live sensor values over a WebSocket.
//!
//! Instead of polling the controller's averaged readings, a deployment can
//! expose `ws://<host>/ws/sensor` pushing batched JSON frames of the shape
//! `{"<sensorType>": [numbers...]}`. The socket client runs a supervisor
//! loop: connect, drain frames, and on close or error wait a fixed delay and
//! reconnect. The loop is bound to a cancellation token and stops cleanly on
//! shutdown, like the polling machinery.

use std::collections::HashMap;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::StreamExt;
use futures::stream::Stream;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use verdant_types::DeviceType;

/// One pushed frame: new values per sensor type, oldest first.
pub type SampleBatch = HashMap<DeviceType, Vec<f64>>;

/// Options for the sensor socket.
#[derive(Debug, Clone)]
pub struct SocketOptions {
    /// Delay before reconnecting after a closed or failed connection.
    /// Default: 1 second.
    pub reconnect_delay: Duration,
    /// Buffer size for the batch channel. Default: 16.
    pub buffer_size: usize,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(1),
            buffer_size: 16,
        }
    }
}

/// A stream of sample batches pushed by the backend.
///
/// Supports graceful shutdown via [`close`](Self::close); dropping the
/// stream cancels the supervisor task as well.
pub struct SensorSocket {
    receiver: mpsc::Receiver<SampleBatch>,
    handle: tokio::task::JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl SensorSocket {
    /// Connect to a WebSocket URL and start the supervisor loop.
    ///
    /// The call returns immediately; connection failures surface as log
    /// lines and reconnect attempts, never as stream errors.
    pub fn connect(url: impl Into<String>, options: SocketOptions) -> Self {
        let url = url.into();
        let (tx, rx) = mpsc::channel(options.buffer_size);
        let cancel_token = CancellationToken::new();
        let task_token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            loop {
                if task_token.is_cancelled() {
                    break;
                }

                match connect_async(url.as_str()).await {
                    Ok((ws, _)) => {
                        info!(url = %url, "Sensor socket connected");
                        let (_, mut read) = ws.split();

                        loop {
                            tokio::select! {
                                _ = task_token.cancelled() => {
                                    debug!("Sensor socket cancelled, stopping");
                                    return;
                                }
                                item = read.next() => {
                                    let Some(item) = item else { break };
                                    match item {
                                        Ok(Message::Text(text)) => {
                                            if let Some(batch) = batch_from_text(text.as_str())
                                                && tx.send(batch).await.is_err()
                                            {
                                                debug!("Batch receiver dropped, stopping");
                                                return;
                                            }
                                        }
                                        Ok(Message::Close(_)) => break,
                                        Ok(_) => {}
                                        Err(e) => {
                                            warn!("Sensor socket read error: {}", e);
                                            break;
                                        }
                                    }
                                }
                            }
                        }
                    }
                    Err(e) => {
                        warn!(url = %url, "Sensor socket connect failed: {}", e);
                    }
                }

                // Fixed reconnect delay, interruptible by shutdown.
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = tokio::time::sleep(options.reconnect_delay) => {}
                }
            }
        });

        Self {
            receiver: rx,
            handle,
            cancel_token,
        }
    }

    /// Stop the supervisor loop gracefully.
    pub fn close(self) {
        self.cancel_token.cancel();
    }

    /// A token that can be used to cancel the socket externally.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Whether the supervisor task is still running.
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for SensorSocket {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

impl Stream for SensorSocket {
    type Item = SampleBatch;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Parse one text frame into a batch. Unknown type tags are skipped; frames
/// that are not an object of number arrays yield `None`.
fn batch_from_text(text: &str) -> Option<SampleBatch> {
    let raw: HashMap<String, Vec<f64>> = match serde_json::from_str(text) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Malformed sensor frame: {}", e);
            return None;
        }
    };

    let batch: SampleBatch = raw
        .into_iter()
        .filter_map(|(tag, values)| match tag.parse::<DeviceType>() {
            Ok(ty) => Some((ty, values)),
            Err(_) => {
                warn!(tag = %tag, "Skipping frame entry with unknown type");
                None
            }
        })
        .collect();

    if batch.is_empty() { None } else { Some(batch) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_from_text() {
        let batch =
            batch_from_text(r#"{"Temperature": [21.0, 21.5], "Soil_Moisture": [40.0]}"#).unwrap();
        assert_eq!(batch[&DeviceType::Temperature], vec![21.0, 21.5]);
        assert_eq!(batch[&DeviceType::SoilMoisture], vec![40.0]);
    }

    #[test]
    fn test_batch_skips_unknown_tags() {
        let batch = batch_from_text(r#"{"Temperature": [20.0], "Humidity": [55.0]}"#).unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_batch_rejects_malformed_frames() {
        assert!(batch_from_text("not json").is_none());
        assert!(batch_from_text(r#"{"Humidity": [1.0]}"#).is_none());
        assert!(batch_from_text(r#"{"Temperature": "oops"}"#).is_none());
    }
}
