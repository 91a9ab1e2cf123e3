//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::session::{Coordinates, ParkingSessionInput};

/// Park command arguments.
#[derive(Debug, Args)]
pub struct ParkCommand {
    /// Latitude of the parked vehicle
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude of the parked vehicle
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Slot code, e.g. B3
    #[arg(short, long, default_value = "")]
    pub slot: String,

    /// Vehicle registration number
    #[arg(long, default_value = "")]
    pub vehicle: String,

    /// Name of the parking attendant
    #[arg(short, long, default_value = "")]
    pub attendant: String,

    /// Attendant's ID, if known
    #[arg(long)]
    pub attendant_id: Option<String>,

    /// Photo reference (repeatable, at most two)
    #[arg(long = "photo", value_name = "REF")]
    pub photos: Vec<String>,

    /// Output the saved session as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl ParkCommand {
    /// Convert the arguments into unvalidated session input.
    #[must_use]
    pub fn to_input(&self) -> ParkingSessionInput {
        let coordinates = match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        };
        ParkingSessionInput {
            coordinates,
            slot: self.slot.clone(),
            vehicle_number: self.vehicle.clone(),
            attendant_name: self.attendant.clone(),
            attendant_id: self.attendant_id.clone(),
            photo_references: self.photos.clone(),
        }
    }
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Watch command arguments.
#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Poll interval in milliseconds (defaults to the configured interval)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: Option<u64>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn park(lat: Option<f64>, lon: Option<f64>) -> ParkCommand {
        ParkCommand {
            lat,
            lon,
            slot: "b3".to_string(),
            vehicle: "tn01ab1234".to_string(),
            attendant: "Ravi".to_string(),
            attendant_id: Some("EMP-7".to_string()),
            photos: vec!["file:///a.jpg".to_string()],
            json: false,
        }
    }

    #[test]
    fn test_park_to_input() {
        let input = park(Some(12.97), Some(77.59)).to_input();
        assert_eq!(input.coordinates, Some(Coordinates::new(12.97, 77.59)));
        assert_eq!(input.slot, "b3");
        assert_eq!(input.vehicle_number, "tn01ab1234");
        assert_eq!(input.attendant_name, "Ravi");
        assert_eq!(input.attendant_id.as_deref(), Some("EMP-7"));
        assert_eq!(input.photo_references.len(), 1);
    }

    #[test]
    fn test_park_without_location() {
        assert!(park(None, None).to_input().coordinates.is_none());
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
