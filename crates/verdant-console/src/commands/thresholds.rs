//! Threshold band commands.

use anyhow::{Context, Result};

use verdant_client::ControllerClient;
use verdant_types::{DeviceType, ThresholdBand};

use crate::cli::OutputFormat;
use crate::format;

/// Fetch and print the configured threshold bands.
pub async fn cmd_get(controller: &ControllerClient, fmt: OutputFormat) -> Result<()> {
    let map = controller
        .thresholds()
        .await
        .context("Failed to fetch thresholds")?;

    match fmt {
        OutputFormat::Json => println!("{}", format::thresholds_json(&map)?),
        OutputFormat::Text => println!("{}", format::thresholds_table(&map)),
    }
    Ok(())
}

/// Update the band for a sensor type, then print the re-fetched bands.
///
/// An inverted band (`min >= max`) is rejected client-side before any
/// request is issued; the displayed thresholds stay unchanged.
pub async fn cmd_set(
    controller: &ControllerClient,
    device_type: DeviceType,
    min: f64,
    max: f64,
    quiet: bool,
) -> Result<()> {
    controller
        .set_threshold(device_type, ThresholdBand::new(min, max))
        .await
        .context("Failed to update threshold")?;

    if !quiet {
        eprintln!("Threshold for {} set to {} - {}", device_type, min, max);
    }
    cmd_get(controller, OutputFormat::Text).await
}
