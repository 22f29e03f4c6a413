//! Terminal administration console for greenhouse monitoring deployments.
//!
//! This crate provides the `verdant` binary: a CLI plus an interactive
//! dashboard for operating a greenhouse backend (device registry, controller,
//! and history services reached over HTTP, optionally a streaming WebSocket).
//!
//! # Features
//!
//! - **Device management**: list, register, delete, and switch sensor and
//!   actuator devices
//! - **Thresholds**: show and update per-sensor-type threshold bands
//! - **History**: browse the recorded history, filtered and paginated
//! - **Continuous monitoring**: watch mode printing averaged readings with
//!   threshold annotations
//! - **Dashboard**: live threshold-aware charts, device tables, and a
//!   paginated history view in the terminal
//! - **Multiple output formats**: text tables and JSON
//! - **Configuration file**: persistent service URLs and intervals
//! - **Shell completions**: generate completions for bash, zsh, fish, and
//!   PowerShell
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dashboard` | Open the interactive dashboard (default) |
//! | `devices` | List, add, delete, and switch devices |
//! | `thresholds` | Show or update threshold bands |
//! | `history` | Browse the history record set |
//! | `watch` | Continuously print averaged readings |
//! | `register` / `login` / `logout` | Mock-auth session management |
//! | `completions` | Generate shell completions |
//!
//! # Configuration
//!
//! The console stores configuration in `~/.config/verdant/config.toml` (or
//! the platform equivalent): service base URLs, the optional streaming
//! WebSocket URL, and poll/watch intervals. The service URLs can also be
//! overridden with `--registry-url`/`--controller-url`/`--history-url` or the
//! matching `VERDANT_*_URL` environment variables.

pub mod cli;
pub mod commands;
pub mod config;
pub mod feed;
pub mod format;
pub mod pager;
pub mod session;

#[cfg(feature = "tui")]
pub mod tui;
