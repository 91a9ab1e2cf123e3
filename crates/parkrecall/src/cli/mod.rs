//! Command-line interface for parkrecall.
//!
//! This module provides the CLI structure for the `parkrec` binary and the
//! text rendering shared by its commands.

mod commands;

use std::fmt::{Display, Write as _};
use std::path::PathBuf;

use chrono::TimeZone;
use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, OutputFormat, ParkCommand, ShowCommand, StatusCommand, WatchCommand,
};

use crate::navigation::{format_coordinates, format_recorded_at};
use crate::session::ParkingSession;
use crate::slot::SlotGrid;

/// parkrec - Remember where you parked
///
/// Records the current parking spot (location, slot, vehicle, attendant) and
/// recalls it when it is time to head back.
#[derive(Debug, Parser)]
#[command(name = "parkrec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record where the vehicle is parked, replacing any previous record
    Park(ParkCommand),

    /// Show the current parking session
    Show(ShowCommand),

    /// Report whether a parking session is active
    Status(StatusCommand),

    /// Remove the current parking session
    Clear,

    /// Print a directions link to the parked vehicle
    Navigate,

    /// Watch for sessions being recorded or cleared
    Watch(WatchCommand),

    /// Print the parking slot grid
    Slots,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}

/// Render a session as the multi-line summary printed by `show`.
#[must_use]
pub fn render_session<Tz>(session: &ParkingSession, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "Slot:       {}", session.slot());
    let _ = writeln!(out, "Vehicle:    {}", session.vehicle_number());
    let _ = write!(
        out,
        "Attendant:  [{}] {}",
        session.attendant_initial(),
        session.attendant_name()
    );
    if let Some(id) = session.attendant_id() {
        let _ = write!(out, " (ID: {id})");
    }
    out.push('\n');
    let _ = writeln!(
        out,
        "Location:   {}",
        format_coordinates(session.coordinates())
    );
    let _ = writeln!(
        out,
        "Parked at:  {}",
        format_recorded_at(session.recorded_at(), tz)
    );
    for (i, photo) in session.photo_references().iter().enumerate() {
        let _ = writeln!(out, "Photo {}:    {photo}", i + 1);
    }
    out
}

/// Render the slot grid, one row per line, marking `occupied` with `*`.
#[must_use]
pub fn render_grid(grid: &SlotGrid, occupied: Option<&str>) -> String {
    let mut out = String::new();
    for &row in &grid.rows {
        let cells: Vec<String> = (1..=grid.columns)
            .map(|column| {
                let code = format!("{row}{column}");
                let mark = if occupied == Some(code.as_str()) { '*' } else { ' ' };
                format!("{code:>3}{mark}")
            })
            .collect();
        out.push_str(cells.join(" ").trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Coordinates, ParkingSessionInput, SessionPolicy};
    use chrono::{FixedOffset, Utc};
    use clap::CommandFactory;

    fn sample_session() -> ParkingSession {
        ParkingSessionInput::new(
            Coordinates::new(12.97, 77.59),
            "B3",
            "TN01AB1234",
            "ravi kumar",
        )
        .with_attendant_id("EMP-7")
        .with_photo("file:///front.jpg")
        .into_session(
            &SessionPolicy::default(),
            Utc.with_ymd_and_hms(2026, 10, 18, 11, 37, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "parkrec");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::try_parse_from(["parkrec", "-q", "status"]).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Quiet);

        let cli = Cli::try_parse_from(["parkrec", "-vv", "status"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Trace);
    }

    #[test]
    fn test_parse_park() {
        let cli = Cli::try_parse_from([
            "parkrec",
            "park",
            "--lat",
            "-33.86",
            "--lon",
            "151.2",
            "--slot",
            "B3",
            "--vehicle",
            "tn01ab1234",
            "--attendant",
            "Ravi",
            "--photo",
            "a.jpg",
            "--photo",
            "b.jpg",
        ])
        .unwrap();

        let Command::Park(park) = cli.command else {
            panic!("expected park command");
        };
        assert_eq!(park.lat, Some(-33.86));
        assert_eq!(park.lon, Some(151.2));
        assert_eq!(park.photos, vec!["a.jpg", "b.jpg"]);
        assert!(!park.json);
    }

    #[test]
    fn test_parse_park_lat_requires_lon() {
        assert!(Cli::try_parse_from(["parkrec", "park", "--lat", "1.0"]).is_err());
    }

    #[test]
    fn test_parse_show_format() {
        let cli = Cli::try_parse_from(["parkrec", "show", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Show(ShowCommand {
                format: OutputFormat::Json
            })
        ));
    }

    #[test]
    fn test_parse_simple_commands() {
        for (arg, check) in [
            ("clear", (|c: &Command| matches!(c, Command::Clear)) as fn(&Command) -> bool),
            ("navigate", |c| matches!(c, Command::Navigate)),
            ("slots", |c| matches!(c, Command::Slots)),
            ("status", |c| matches!(c, Command::Status(_))),
        ] {
            let cli = Cli::try_parse_from(["parkrec", arg]).unwrap();
            assert!(check(&cli.command), "{arg}");
        }
    }

    #[test]
    fn test_parse_watch_interval() {
        let cli = Cli::try_parse_from(["parkrec", "watch", "--interval-ms", "250"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Watch(WatchCommand {
                interval_ms: Some(250)
            })
        ));
        assert!(Cli::try_parse_from(["parkrec", "watch", "--interval-ms", "0"]).is_err());
    }

    #[test]
    fn test_parse_config_validate() {
        let cli =
            Cli::try_parse_from(["parkrec", "config", "validate", "--file", "/tmp/c.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["parkrec", "-c", "/custom/config.toml", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_render_session() {
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let text = render_session(&sample_session(), &ist);

        assert!(text.contains("Slot:       B3"));
        assert!(text.contains("Vehicle:    TN01AB1234"));
        assert!(text.contains("Attendant:  [R] ravi kumar (ID: EMP-7)"));
        assert!(text.contains("12.970000° N · 77.590000° E"));
        assert!(text.contains("18 Oct 2026, 05:07 PM"));
        assert!(text.contains("Photo 1:    file:///front.jpg"));
    }

    #[test]
    fn test_render_grid() {
        let grid = SlotGrid::new("AB", 3);
        let text = render_grid(&grid, Some("B2"));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], " A1   A2   A3");
        assert_eq!(lines[1], " B1   B2*  B3");
    }
}
