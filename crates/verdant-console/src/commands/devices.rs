//! Device management commands.
//!
//! Every mutation re-fetches the device list afterwards and prints the fresh
//! state; the backend is the source of truth, there is no optimistic output.

use anyhow::{Context, Result, bail};

use verdant_client::RegistryClient;
use verdant_types::{DeviceClass, DeviceId, DeviceType, TypeFilter};

use crate::cli::OutputFormat;
use crate::format;

/// Fetch and print a device list.
pub async fn cmd_list(
    registry: &RegistryClient,
    class: DeviceClass,
    filter: TypeFilter,
    fmt: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let devices = registry
        .list(class, filter)
        .await
        .context("Failed to fetch device list")?;

    match fmt {
        OutputFormat::Json => println!("{}", format::devices_json(&devices)?),
        OutputFormat::Text => {
            if !quiet {
                eprintln!("{} {} device(s) [{}]", devices.len(), class, filter.label());
            }
            println!("{}", format::devices_table(&devices));
        }
    }
    Ok(())
}

/// Register a new device, then print the re-fetched list.
pub async fn cmd_add(
    registry: &RegistryClient,
    device_type: DeviceType,
    location: &str,
    frequency: u64,
    quiet: bool,
) -> Result<()> {
    registry
        .add(device_type, location, frequency)
        .await
        .context("Failed to add device")?;

    if !quiet {
        eprintln!("Added {} device at {}", device_type, location.trim());
    }
    cmd_list(
        registry,
        device_type.class(),
        TypeFilter::Only(device_type),
        OutputFormat::Text,
        quiet,
    )
    .await
}

/// Delete a device by composite id, then print the re-fetched list.
pub async fn cmd_delete(registry: &RegistryClient, id: DeviceId, quiet: bool) -> Result<()> {
    registry
        .delete(id)
        .await
        .with_context(|| format!("Failed to delete {}", id))?;

    if !quiet {
        eprintln!("Deleted {}", id);
    }
    cmd_list(
        registry,
        id.device_type.class(),
        TypeFilter::All,
        OutputFormat::Text,
        quiet,
    )
    .await
}

/// Switch a device on or off. With neither flag the current status is
/// toggled, which requires a list fetch to learn it first.
pub async fn cmd_switch(
    registry: &RegistryClient,
    id: DeviceId,
    on: bool,
    off: bool,
    quiet: bool,
) -> Result<()> {
    let class = id.device_type.class();

    let target = if on {
        true
    } else if off {
        false
    } else {
        let devices = registry
            .list(class, TypeFilter::All)
            .await
            .context("Failed to fetch device list")?;
        let Some(device) = devices.iter().find(|d| d.id == id) else {
            bail!("No such device: {}", id);
        };
        !device.active
    };

    registry
        .set_status(class, &[id.number], target)
        .await
        .with_context(|| format!("Failed to update {}", id))?;

    if !quiet {
        eprintln!("Switched {} {}", id, if target { "on" } else { "off" });
    }
    cmd_list(
        registry,
        class,
        TypeFilter::Only(id.device_type),
        OutputFormat::Text,
        quiet,
    )
    .await
}

/// Switch every device matching the filter to a target status.
pub async fn cmd_set_all(
    registry: &RegistryClient,
    class: DeviceClass,
    filter: TypeFilter,
    on: bool,
    off: bool,
    quiet: bool,
) -> Result<()> {
    if !on && !off {
        bail!("Pass --on or --off");
    }
    let target = on;

    let devices = registry
        .list(class, filter)
        .await
        .context("Failed to fetch device list")?;
    let ids: Vec<u64> = devices.iter().map(|d| d.id.number).collect();

    registry
        .set_status(class, &ids, target)
        .await
        .context("Failed to update device status")?;

    if !quiet {
        eprintln!(
            "Switched {} device(s) {}",
            ids.len(),
            if target { "on" } else { "off" }
        );
    }
    cmd_list(registry, class, filter, OutputFormat::Text, quiet).await
}
