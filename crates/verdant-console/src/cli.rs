//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use verdant_types::{DeviceClass, DeviceId, DeviceType, TypeFilter};

#[derive(Parser)]
#[command(name = "verdant")]
#[command(author, version, about = "Terminal console for greenhouse monitoring deployments", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the config file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the device registry base URL
    #[arg(long, global = true, env = "VERDANT_REGISTRY_URL")]
    pub registry_url: Option<String>,

    /// Override the controller base URL
    #[arg(long, global = true, env = "VERDANT_CONTROLLER_URL")]
    pub controller_url: Option<String>,

    /// Override the history (DB reader) base URL
    #[arg(long, global = true, env = "VERDANT_HISTORY_URL")]
    pub history_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive dashboard (default)
    Dashboard,

    /// Manage sensor and actuator devices
    Devices {
        #[command(subcommand)]
        action: DeviceAction,
    },

    /// Show or update per-type threshold bands
    Thresholds {
        #[command(subcommand)]
        action: ThresholdAction,
    },

    /// Browse the history record set
    History {
        /// Filter by device type (wire spelling, e.g. Soil_Moisture)
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        device_type: Option<DeviceType>,

        /// Page to display (1-based, 15 records per page)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Continuously print averaged readings with threshold annotations
    Watch {
        /// Poll interval in seconds (defaults to the configured value)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Consume the streaming socket instead of polling
        #[arg(long)]
        stream: bool,
    },

    /// Store registered credentials (mock auth, plaintext)
    Register {
        username: String,
        password: String,
    },

    /// Log in against the registered credentials
    Login {
        username: String,
        password: String,
    },

    /// Clear the current session token
    Logout,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum DeviceAction {
    /// List devices, optionally filtered by type
    List {
        /// Device kind to list
        #[arg(short, long, value_enum, default_value = "sensor")]
        kind: DeviceKind,

        /// Filter by device type (wire spelling)
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        device_type: Option<DeviceType>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Register a new device
    Add {
        /// Device type (wire spelling, e.g. Temperature or "LED Light")
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        device_type: DeviceType,

        /// Installation location
        #[arg(short, long)]
        location: String,

        /// Reporting interval in seconds
        #[arg(short, long)]
        frequency: u64,
    },

    /// Delete a device by composite id (e.g. Temperature-3)
    Delete {
        /// Composite device id
        id: DeviceId,
    },

    /// Switch a device on or off (toggles when neither flag is given)
    Switch {
        /// Composite device id
        id: DeviceId,

        /// Switch the device on
        #[arg(long, conflicts_with = "off")]
        on: bool,

        /// Switch the device off
        #[arg(long)]
        off: bool,
    },

    /// Switch every listed device on or off at once
    SetAll {
        /// Device kind to target
        #[arg(short, long, value_enum, default_value = "sensor")]
        kind: DeviceKind,

        /// Restrict to one device type (wire spelling)
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        device_type: Option<DeviceType>,

        /// Switch the devices on
        #[arg(long, conflicts_with = "off")]
        on: bool,

        /// Switch the devices off
        #[arg(long)]
        off: bool,
    },
}

#[derive(Subcommand)]
pub enum ThresholdAction {
    /// Show the configured threshold bands
    Get {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Update the threshold band for a sensor type
    Set {
        /// Sensor type (wire spelling)
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        device_type: DeviceType,

        /// Lower bound
        #[arg(long)]
        min: f64,

        /// Upper bound
        #[arg(long)]
        max: f64,
    },
}

/// Device kind selector for list/set-all commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeviceKind {
    Sensor,
    Actuator,
}

impl From<DeviceKind> for DeviceClass {
    fn from(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Sensor => DeviceClass::Sensor,
            DeviceKind::Actuator => DeviceClass::Actuator,
        }
    }
}

/// Output format for list-style commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table output
    Text,
    /// Machine-readable JSON output
    Json,
}

/// Turn an optional type argument into a filter.
pub fn filter_from(device_type: Option<DeviceType>) -> TypeFilter {
    match device_type {
        Some(ty) => TypeFilter::Only(ty),
        None => TypeFilter::All,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_device_type_argument_accepts_wire_names() {
        let cli = Cli::try_parse_from([
            "verdant", "devices", "add", "--type", "Soil_Moisture", "--location", "bed 2",
            "--frequency", "30",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Devices {
                action: DeviceAction::Add { device_type, .. },
            }) => assert_eq!(device_type, DeviceType::SoilMoisture),
            _ => panic!("expected devices add"),
        }
    }

    #[test]
    fn test_device_id_argument() {
        let cli = Cli::try_parse_from(["verdant", "devices", "delete", "Temperature-3"]).unwrap();
        match cli.command {
            Some(Commands::Devices {
                action: DeviceAction::Delete { id },
            }) => {
                assert_eq!(id.device_type, DeviceType::Temperature);
                assert_eq!(id.number, 3);
            }
            _ => panic!("expected devices delete"),
        }
    }

    #[test]
    fn test_switch_flags_conflict() {
        assert!(
            Cli::try_parse_from(["verdant", "devices", "switch", "Heater-1", "--on", "--off"])
                .is_err()
        );
    }

    #[test]
    fn test_filter_from() {
        assert_eq!(filter_from(None), TypeFilter::All);
        assert_eq!(
            filter_from(Some(DeviceType::Heater)),
            TypeFilter::Only(DeviceType::Heater)
        );
    }
}
