//! The interactive dashboard.
//!
//! This module ties the dashboard together and owns the main event loop:
//!
//! - Terminal setup and restoration
//! - Channel creation for worker communication
//! - Input handling and rendering
//! - Graceful shutdown coordination
//!
//! All network I/O lives in the [`worker`]; the UI task only draws state and
//! translates key presses into commands.

pub mod app;
pub mod input;
pub mod messages;
pub mod ui;
pub mod worker;

pub use app::App;
pub use messages::{BackendEvent, Command};
pub use worker::BackendWorker;

use std::io::{self, stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;

use verdant_client::{ControllerClient, HistoryClient, RegistryClient};
use verdant_types::DeviceClass;

/// Set up the terminal for dashboard rendering.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state.
pub fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Run the dashboard until the user quits.
pub async fn run(
    registry: RegistryClient,
    controller: ControllerClient,
    history: HistoryClient,
    stream_url: Option<String>,
    poll_interval: Duration,
    username: Option<String>,
) -> Result<()> {
    let (command_tx, command_rx) = mpsc::channel::<Command>(32);
    let (event_tx, event_rx) = mpsc::channel::<BackendEvent>(32);

    let worker = BackendWorker::new(
        command_rx,
        event_tx,
        registry,
        controller,
        history,
        stream_url,
        poll_interval,
    );
    let worker_handle = tokio::spawn(worker.run());

    let mut app = App::new(event_rx, username);

    // Kick off the initial fetches; the chart feed starts on its own.
    let _ = command_tx.try_send(Command::RefreshDevices(DeviceClass::Sensor));
    let _ = command_tx.try_send(Command::RefreshDevices(DeviceClass::Actuator));
    let _ = command_tx.try_send(Command::RefreshThresholds);
    let _ = command_tx.try_send(Command::RefreshHistory);

    let mut terminal = setup_terminal()?;
    let result = run_event_loop(&mut terminal, &mut app, &command_tx).await;

    let _ = command_tx.try_send(Command::Shutdown);
    restore_terminal()?;
    let _ = worker_handle.await;

    result
}

/// Main event loop: draw, poll input, drain worker events.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    command_tx: &mpsc::Sender<Command>,
) -> Result<()> {
    while !app.should_quit() {
        app.clear_expired_status();
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let action = input::handle_key(key.code);
            if let Some(cmd) = input::apply_action(app, action) {
                let _ = command_tx.try_send(cmd);
            }
        }

        // Non-blocking drain of worker events.
        while let Ok(event) = app.event_rx.try_recv() {
            app.handle_backend_event(event);
        }
    }

    Ok(())
}
