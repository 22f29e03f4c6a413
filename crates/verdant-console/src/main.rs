use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use verdant_client::{ControllerClient, HistoryClient, RegistryClient};

use verdant_console::cli::{Cli, Commands, DeviceAction, ThresholdAction, filter_from};
use verdant_console::commands::{auth, devices, history, thresholds, watch};
use verdant_console::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions early, before tracing init.
    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "verdant", &mut io::stdout());
        return Ok(());
    }

    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(url) = &cli.registry_url {
        config.registry_url = url.clone();
    }
    if let Some(url) = &cli.controller_url {
        config.controller_url = url.clone();
    }
    if let Some(url) = &cli.history_url {
        config.history_url = url.clone();
    }

    let registry = RegistryClient::new(&config.registry_url)?;
    let controller = ControllerClient::new(&config.controller_url)?;
    let history_client = HistoryClient::new(&config.history_url)?;

    match cli.command {
        None | Some(Commands::Dashboard) => {
            run_dashboard(&config, registry, controller, history_client).await
        }

        Some(Commands::Devices { action }) => match action {
            DeviceAction::List {
                kind,
                device_type,
                format,
            } => {
                devices::cmd_list(
                    &registry,
                    kind.into(),
                    filter_from(device_type),
                    format,
                    cli.quiet,
                )
                .await
            }
            DeviceAction::Add {
                device_type,
                location,
                frequency,
            } => devices::cmd_add(&registry, device_type, &location, frequency, cli.quiet).await,
            DeviceAction::Delete { id } => devices::cmd_delete(&registry, id, cli.quiet).await,
            DeviceAction::Switch { id, on, off } => {
                devices::cmd_switch(&registry, id, on, off, cli.quiet).await
            }
            DeviceAction::SetAll {
                kind,
                device_type,
                on,
                off,
            } => {
                devices::cmd_set_all(
                    &registry,
                    kind.into(),
                    filter_from(device_type),
                    on,
                    off,
                    cli.quiet,
                )
                .await
            }
        },

        Some(Commands::Thresholds { action }) => match action {
            ThresholdAction::Get { format } => thresholds::cmd_get(&controller, format).await,
            ThresholdAction::Set {
                device_type,
                min,
                max,
            } => thresholds::cmd_set(&controller, device_type, min, max, cli.quiet).await,
        },

        Some(Commands::History {
            device_type,
            page,
            format,
        }) => {
            history::cmd_history(
                &history_client,
                filter_from(device_type),
                page,
                format,
                cli.quiet,
            )
            .await
        }

        Some(Commands::Watch { interval, stream }) => {
            let interval =
                Duration::from_secs(interval.unwrap_or(config.watch_interval_secs).max(1));
            watch::cmd_watch(
                &controller,
                config.stream_url.as_deref(),
                interval,
                stream,
                cli.quiet,
            )
            .await
        }

        Some(Commands::Register { username, password }) => {
            auth::cmd_register(&username, &password, cli.quiet)
        }
        Some(Commands::Login { username, password }) => {
            auth::cmd_login(&username, &password, cli.quiet)
        }
        Some(Commands::Logout) => auth::cmd_logout(cli.quiet),

        Some(Commands::Completions { .. }) => unreachable!("handled above"),
    }
}

#[cfg(feature = "tui")]
async fn run_dashboard(
    config: &Config,
    registry: RegistryClient,
    controller: ControllerClient,
    history: HistoryClient,
) -> Result<()> {
    use verdant_console::session::Session;

    // Header shows the logged-in user when a session exists; the dashboard
    // itself never requires one (mock auth).
    let username = Session::default_path()
        .and_then(|path| Session::load(path).ok())
        .and_then(|session| session.username().map(String::from));

    verdant_console::tui::run(
        registry,
        controller,
        history,
        config.stream_url.clone(),
        Duration::from_secs(config.poll_interval_secs.max(1)),
        username,
    )
    .await
}

#[cfg(not(feature = "tui"))]
async fn run_dashboard(
    _config: &Config,
    _registry: RegistryClient,
    _controller: ControllerClient,
    _history: HistoryClient,
) -> Result<()> {
    anyhow::bail!("This build does not include the dashboard (tui feature disabled)")
}
