//! `parkrecall` - Remember where you parked
//!
//! This library keeps exactly one parking session (where the vehicle is,
//! which slot, which vehicle, who took it) in a pluggable key-value store,
//! and provides the helpers needed to find the way back to it.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod navigation;
pub mod session;
pub mod slot;
pub mod storage;
pub mod store;

pub use config::Config;
pub use error::{Error, Result, StorageError, ValidationError};
pub use logging::init_logging;
pub use session::{Coordinates, ParkingSession, ParkingSessionInput, SessionPolicy, SessionState};
pub use storage::{open_backend, KeyValueStore};
pub use store::{ParkingSessionStore, PARKED_LOCATION_KEY};
