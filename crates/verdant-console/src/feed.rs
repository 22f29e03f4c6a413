//! The dashboard's chart feed: thresholds plus averaged readings per tick.

use async_trait::async_trait;

use verdant_client::{ControllerClient, PollSource, Result};
use verdant_types::{AveragePoint, ThresholdMap};

/// One poll of the controller: averaged readings plus the threshold bands.
#[derive(Debug, Clone)]
pub struct ChartTick {
    /// Freshly fetched bands, or `None` when the threshold fetch failed
    /// (the consumer keeps its prior bands, falling back per type).
    pub thresholds: Option<ThresholdMap>,
    /// The averaged readings snapshot.
    pub averages: Vec<AveragePoint>,
}

/// Polls thresholds and averaged readings together, once per tick.
///
/// A failed averages fetch fails the tick (it drives the chart error state);
/// a failed threshold fetch degrades to `None` so stale or fallback bands
/// keep being used.
#[derive(Debug, Clone)]
pub struct ControllerFeed {
    controller: ControllerClient,
}

impl ControllerFeed {
    pub fn new(controller: ControllerClient) -> Self {
        Self { controller }
    }
}

#[async_trait]
impl PollSource for ControllerFeed {
    type Item = ChartTick;

    async fn fetch(&self) -> Result<ChartTick> {
        let (thresholds, averages) =
            tokio::join!(self.controller.thresholds(), self.controller.averages());
        Ok(ChartTick {
            thresholds: thresholds.ok(),
            averages: averages?,
        })
    }
}
