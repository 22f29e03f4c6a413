//! Cancellable periodic re-fetch of backend state.
//!
//! Polling has an explicit lifecycle rather than a timer plus callback: a
//! [`PollStream`] owns a background ticker task that is started on
//! construction and stopped by [`PollStream::close`], a dropped stream, or an
//! external cancellation token. No task outlives its stream.
//!
//! Polls are deliberately naive, matching the consumed contract:
//!
//! - no retry or backoff: a failed poll is simply retried at the next tick
//! - no deduplication of in-flight requests: every tick spawns its fetch, so
//!   a response slower than the interval overlaps the next one and the last
//!   result to resolve wins at the consumer

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::Stream;
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// A backend fetch that can be polled on an interval.
#[async_trait]
pub trait PollSource: Send + Sync + 'static {
    /// The fetched value.
    type Item: Send + 'static;

    /// Issue one fetch.
    async fn fetch(&self) -> Result<Self::Item>;
}

/// Options for poll streams.
///
/// ```
/// use std::time::Duration;
/// use verdant_client::PollOptions;
///
/// let options = PollOptions::builder()
///     .interval(Duration::from_secs(1))
///     .include_errors(true)
///     .build();
/// assert_eq!(options.interval, Duration::from_secs(1));
/// ```
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Tick interval between fetches. Default: 1 second.
    pub interval: Duration,
    /// Buffer size for the result channel. Default: 16.
    pub buffer_size: usize,
    /// Whether failed fetches are forwarded as `Err` items.
    ///
    /// When `false` (default), failures are logged and the consumer keeps its
    /// prior state. When `true`, failures are forwarded so the consumer can
    /// show an error placeholder.
    pub include_errors: bool,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            buffer_size: 16,
            include_errors: false,
        }
    }
}

impl PollOptions {
    /// Create a new builder for `PollOptions`.
    pub fn builder() -> PollOptionsBuilder {
        PollOptionsBuilder::default()
    }

    /// Create options with a specific interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::validation("buffer_size must be > 0"));
        }
        if self.interval.is_zero() {
            return Err(Error::validation("interval must be > 0"));
        }
        Ok(())
    }
}

/// Builder for [`PollOptions`].
#[derive(Debug, Clone, Default)]
pub struct PollOptionsBuilder {
    options: PollOptions,
}

impl PollOptionsBuilder {
    /// Set the tick interval.
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.options.interval = interval;
        self
    }

    /// Set the result channel buffer size.
    #[must_use]
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.options.buffer_size = size;
        self
    }

    /// Set whether failed fetches are forwarded as `Err` items.
    #[must_use]
    pub fn include_errors(mut self, include: bool) -> Self {
        self.options.include_errors = include;
        self
    }

    /// Build the options.
    #[must_use]
    pub fn build(self) -> PollOptions {
        self.options
    }
}

/// A stream of periodically re-fetched values from a [`PollSource`].
///
/// The stream owns a background ticker task and supports graceful shutdown
/// via [`close`](Self::close); dropping the stream cancels the task as well.
pub struct PollStream<T> {
    receiver: mpsc::Receiver<Result<T>>,
    handle: tokio::task::JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl<T: Send + 'static> PollStream<T> {
    /// Start polling a source.
    ///
    /// The first fetch fires immediately; subsequent fetches fire once per
    /// interval. Each fetch runs in its own task so a slow response never
    /// delays the next tick.
    pub fn new<S>(source: Arc<S>, options: PollOptions) -> Self
    where
        S: PollSource<Item = T>,
    {
        let (tx, rx) = mpsc::channel(options.buffer_size);
        let cancel_token = CancellationToken::new();
        let task_token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(options.interval);

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => {
                        debug!("Poll stream cancelled, stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        if tx.is_closed() {
                            debug!("Poll receiver dropped, stopping");
                            break;
                        }

                        let source = Arc::clone(&source);
                        let tx = tx.clone();
                        let include_errors = options.include_errors;
                        tokio::spawn(async move {
                            match source.fetch().await {
                                Ok(item) => {
                                    let _ = tx.send(Ok(item)).await;
                                }
                                Err(e) => {
                                    warn!("Poll failed: {}", e);
                                    if include_errors {
                                        let _ = tx.send(Err(e)).await;
                                    }
                                }
                            }
                        });
                    }
                }
            }
        });

        Self {
            receiver: rx,
            handle,
            cancel_token,
        }
    }

    /// Stop the ticker task gracefully.
    ///
    /// In-flight fetches may still complete; their results are discarded once
    /// the receiver is gone.
    pub fn close(self) {
        self.cancel_token.cancel();
    }

    /// A token that can be used to cancel the stream externally.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Whether the ticker task is still running.
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Whether the stream has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

impl<T> Drop for PollStream<T> {
    fn drop(&mut self) {
        // No orphaned tickers: dropping the stream stops the task even if
        // close() was never called.
        self.cancel_token.cancel();
    }
}

impl<T: Send + 'static> Stream for PollStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
