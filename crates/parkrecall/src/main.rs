//! `parkrec` - CLI for parkrecall
//!
//! This binary records, shows and clears the current parking session.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use tokio::sync::mpsc;

use parkrecall::cli::{
    render_grid, render_session, Cli, Command, ConfigCommand, OutputFormat, ParkCommand,
};
use parkrecall::monitor::{MonitorConfig, SessionMonitor};
use parkrecall::navigation::directions_url;
use parkrecall::{init_logging, open_backend, Config, ParkingSessionStore, SessionState};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult {
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Park(park_cmd) => handle_park(&config, &park_cmd).await,
        Command::Show(show_cmd) => handle_show(&config, show_cmd.format).await,
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json).await,
        Command::Clear => handle_clear(&config).await,
        Command::Navigate => handle_navigate(&config).await,
        Command::Watch(watch_cmd) => handle_watch(&config, watch_cmd.interval_ms).await,
        Command::Slots => handle_slots(&config).await,
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn open_store(config: &Config) -> Result<ParkingSessionStore, Box<dyn std::error::Error>> {
    let backend = open_backend(config)?;
    Ok(ParkingSessionStore::from_arc(backend).with_policy(config.session_policy()))
}

fn load_failed(e: &parkrecall::Error) -> Box<dyn std::error::Error> {
    format!("Could not load parking details: {e}").into()
}

async fn handle_park(config: &Config, cmd: &ParkCommand) -> CliResult {
    let store = open_store(config)?;

    let session = match store.save(cmd.to_input()).await {
        Ok(session) => session,
        Err(parkrecall::Error::Validation(e)) => return Err(e.to_string().into()),
        Err(e) => return Err(format!("Could not save parking details: {e}").into()),
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!("Parking details saved.");
        println!();
        print!("{}", render_session(&session, &Local));
    }
    Ok(())
}

async fn handle_show(config: &Config, format: OutputFormat) -> CliResult {
    let store = open_store(config)?;
    let session = store.load().await.map_err(|e| load_failed(&e))?;

    match (format, session) {
        (OutputFormat::Json, session) => {
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        (OutputFormat::Plain, Some(session)) => {
            print!("{}", render_session(&session, &Local));
        }
        (OutputFormat::Plain, None) => println!("NO ACTIVE SESSION"),
    }
    Ok(())
}

async fn handle_status(config: &Config, json: bool) -> CliResult {
    let store = open_store(config)?;
    let active = store
        .has_active_session()
        .await
        .map_err(|e| load_failed(&e))?;
    let state = if active {
        SessionState::Active
    } else {
        SessionState::Empty
    };

    if json {
        let status = serde_json::json!({
            "state": state,
            "active": active,
            "backend": config.storage.backend,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("{state}");
    }
    Ok(())
}

async fn handle_clear(config: &Config) -> CliResult {
    let store = open_store(config)?;
    store
        .clear()
        .await
        .map_err(|e| format!("Could not remove parking details: {e}"))?;
    println!("Session removed.");
    Ok(())
}

async fn handle_navigate(config: &Config) -> CliResult {
    let store = open_store(config)?;
    match store.load().await.map_err(|e| load_failed(&e))? {
        Some(session) => {
            println!(
                "{}",
                directions_url(
                    &config.navigation.directions_base_url,
                    session.coordinates()
                )
            );
            Ok(())
        }
        None => Err("NO ACTIVE SESSION".into()),
    }
}

async fn handle_watch(config: &Config, interval_ms: Option<u64>) -> CliResult {
    let store = open_store(config)?;
    let poll_interval = interval_ms.map_or_else(|| config.poll_interval(), Duration::from_millis);
    let monitor = Arc::new(SessionMonitor::new(store, MonitorConfig { poll_interval }));
    let handle = monitor.stop_handle();

    let (tx, mut rx) = mpsc::channel(16);
    let task = tokio::spawn({
        let monitor = Arc::clone(&monitor);
        async move { monitor.start(tx).await }
    });

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                let at = event.observed_at.with_timezone(&Local).format("%H:%M:%S");
                match event.session {
                    Some(session) => println!(
                        "[{at}] {} {} in slot {}",
                        event.state,
                        session.vehicle_number(),
                        session.slot()
                    ),
                    None => println!("[{at}] {}", event.state),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                handle.stop();
                break;
            }
        }
    }

    // A monitor parked on `send` exits once the receiver is gone.
    drop(rx);
    task.await??;
    Ok(())
}

async fn handle_slots(config: &Config) -> CliResult {
    let grid = config.slot_grid();
    let store = open_store(config)?;
    let session = store.load().await.map_err(|e| load_failed(&e))?;

    print!("{}", render_grid(&grid, session.as_ref().map(|s| s.slot())));
    println!(
        "{} slots, grid enforcement {}",
        grid.len(),
        if config.session.enforce_slot_grid {
            "on"
        } else {
            "off"
        }
    );
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> CliResult {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Backend:            {}", config.storage.backend);
                println!("  Database path:      {}", config.database_path().display());
                println!("  Data directory:     {}", config.data_dir().display());
                println!();
                println!("[Session]");
                println!(
                    "  Max vehicle length: {}",
                    config.session.max_vehicle_number_len
                );
                println!(
                    "  Slot grid:          {} x {}",
                    config.session.slot_rows, config.session.slot_columns
                );
                println!("  Enforce grid:       {}", config.session.enforce_slot_grid);
                println!();
                println!("[Monitor]");
                println!("  Poll interval (ms): {}", config.monitor.poll_interval_ms);
                println!();
                println!("[Navigation]");
                println!(
                    "  Directions URL:     {}",
                    config.navigation.directions_base_url
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => return Err(format!("Configuration error: {e}").into()),
            }
        }
    }
    Ok(())
}
