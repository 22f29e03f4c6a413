//! Continuous monitoring command.
//!
//! Prints one line per tick with the latest averaged value per sensor type,
//! annotated with the threshold band and a breach marker. Runs until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use futures::StreamExt;
use owo_colors::OwoColorize;

use verdant_client::{ControllerClient, PollOptions, PollStream, SensorSocket, SocketOptions};
use verdant_types::{SENSOR_TYPES, ThresholdMap};

use crate::feed::{ChartTick, ControllerFeed};
use crate::format::format_epoch_millis_hms;

/// Run the watch loop until Ctrl-C.
pub async fn cmd_watch(
    controller: &ControllerClient,
    stream_url: Option<&str>,
    interval: Duration,
    use_stream: bool,
    quiet: bool,
) -> Result<()> {
    if use_stream {
        let Some(url) = stream_url else {
            bail!("No stream_url configured; set it in the config file");
        };
        watch_stream(url, quiet).await
    } else {
        watch_poll(controller, interval, quiet).await
    }
}

async fn watch_poll(controller: &ControllerClient, interval: Duration, quiet: bool) -> Result<()> {
    if !quiet {
        eprintln!(
            "Polling every {}s (Ctrl-C to stop)",
            interval.as_secs().max(1)
        );
    }

    let source = Arc::new(ControllerFeed::new(controller.clone()));
    let options = PollOptions::builder()
        .interval(interval)
        .include_errors(true)
        .build();
    let mut stream = PollStream::new(source, options);
    let mut thresholds = ThresholdMap::new();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            item = stream.next() => match item {
                Some(Ok(tick)) => {
                    if let Some(fresh) = &tick.thresholds {
                        thresholds = fresh.clone();
                    }
                    print_tick(&tick, &thresholds);
                }
                Some(Err(e)) => eprintln!("{} {}", "poll failed:".red(), e),
                None => break,
            },
        }
    }

    stream.close();
    Ok(())
}

async fn watch_stream(url: &str, quiet: bool) -> Result<()> {
    if !quiet {
        eprintln!("Streaming from {} (Ctrl-C to stop)", url);
    }

    let mut socket = SensorSocket::connect(url, SocketOptions::default());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            batch = socket.next() => match batch {
                Some(batch) => {
                    let mut parts = Vec::new();
                    for ty in SENSOR_TYPES {
                        if let Some(values) = batch.get(&ty)
                            && let Some(last) = values.last()
                        {
                            parts.push(format!("{} {}{}", ty, last, ty.unit().unwrap_or("")));
                        }
                    }
                    println!("{}", parts.join("  "));
                }
                None => break,
            },
        }
    }

    socket.close();
    Ok(())
}

fn print_tick(tick: &ChartTick, thresholds: &ThresholdMap) {
    let Some(last) = tick.averages.last() else {
        println!("{}", "no data".dimmed());
        return;
    };

    let mut line = format_epoch_millis_hms(last.timestamp_ms);
    for ty in SENSOR_TYPES {
        let value = last.value_for(ty);
        let band = thresholds.band_or_fallback(ty);
        let breach = value < band.min || value > band.max;

        let cell = format!(
            "  {} {}{} [{} - {}]",
            ty,
            value,
            ty.unit().unwrap_or(""),
            band.min,
            band.max
        );
        if breach {
            line.push_str(&format!("{} {}", cell, "!".red().bold()));
        } else {
            line.push_str(&cell);
        }
    }
    println!("{line}");
}
