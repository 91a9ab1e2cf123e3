//! Error types for parkrecall.
//!
//! Three families of failure exist: validation failures raised by `save`
//! before anything is written, storage failures raised by the key-value
//! backend, and configuration failures raised while loading settings.

use std::path::PathBuf;
use thiserror::Error;

/// A field-specific reason a parking session was rejected by `save`.
///
/// Each variant names exactly one input field so callers can point the user
/// at the value that needs fixing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// No coordinates were supplied.
    #[error("location is missing: coordinates are required")]
    MissingCoordinates,

    /// Latitude is outside [-90, 90] or not a finite number.
    #[error("latitude {0} is out of range (expected -90 to 90)")]
    LatitudeOutOfRange(f64),

    /// Longitude is outside [-180, 180] or not a finite number.
    #[error("longitude {0} is out of range (expected -180 to 180)")]
    LongitudeOutOfRange(f64),

    /// The slot code is empty after trimming.
    #[error("please select a parking slot")]
    EmptySlot,

    /// The slot code is not part of the configured slot grid.
    #[error("slot '{slot}' is not on the parking grid")]
    SlotNotOnGrid {
        /// The rejected slot code.
        slot: String,
    },

    /// The vehicle number is empty after trimming.
    #[error("please enter the vehicle number")]
    EmptyVehicleNumber,

    /// The vehicle number exceeds the configured length limit.
    #[error("vehicle number is {len} characters long (maximum {max})")]
    VehicleNumberTooLong {
        /// Length of the normalized vehicle number, in characters.
        len: usize,
        /// The configured maximum.
        max: usize,
    },

    /// The attendant name is empty after trimming.
    #[error("please enter the parking attendant's name")]
    EmptyAttendantName,

    /// More photo references were supplied than a session can hold.
    #[error("{count} photos supplied, you can add up to {max}")]
    TooManyPhotos {
        /// Number of references supplied.
        count: usize,
        /// The maximum allowed.
        max: usize,
    },

    /// One of the photo references is blank.
    #[error("photo reference #{index} is empty")]
    EmptyPhotoReference {
        /// Zero-based position of the blank reference.
        index: usize,
    },
}

impl ValidationError {
    /// The name of the input field this error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingCoordinates => "coordinates",
            Self::LatitudeOutOfRange(_) => "coordinates.latitude",
            Self::LongitudeOutOfRange(_) => "coordinates.longitude",
            Self::EmptySlot | Self::SlotNotOnGrid { .. } => "slot",
            Self::EmptyVehicleNumber | Self::VehicleNumberTooLong { .. } => "vehicleNumber",
            Self::EmptyAttendantName => "attendantName",
            Self::TooManyPhotos { .. } | Self::EmptyPhotoReference { .. } => "photoReferences",
        }
    }
}

/// A failure of the underlying key-value storage capability.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database statement failed.
    #[error("database query failed: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    Migration {
        /// Description of what went wrong.
        message: String,
    },

    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The record could not be encoded for storage.
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    /// A stored value exists but cannot be read back as text.
    #[error("stored value for {key} is unreadable: {message}")]
    CorruptValue {
        /// The key whose value is unreadable.
        key: String,
        /// Why the value could not be read.
        message: String,
    },

    /// A blocking storage task panicked or was cancelled.
    #[error("storage task failed: {0}")]
    Task(String),
}

/// The main error type for parkrecall operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The parking session input was rejected.
    #[error("invalid parking details: {0}")]
    Validation(#[from] ValidationError),

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },
}

/// A specialized Result type for parkrecall operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error is a rejected input.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error came from the storage backend.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// The validation failure carried by this error, if any.
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            ValidationError::EmptySlot.to_string(),
            "please select a parking slot"
        );
        let err = ValidationError::LatitudeOutOfRange(91.0);
        assert!(err.to_string().contains("91"));
        assert!(err.to_string().contains("-90 to 90"));
    }

    #[test]
    fn test_validation_error_field() {
        assert_eq!(ValidationError::MissingCoordinates.field(), "coordinates");
        assert_eq!(
            ValidationError::LongitudeOutOfRange(200.0).field(),
            "coordinates.longitude"
        );
        assert_eq!(
            ValidationError::SlotNotOnGrid {
                slot: "Z9".to_string()
            }
            .field(),
            "slot"
        );
        assert_eq!(
            ValidationError::VehicleNumberTooLong { len: 20, max: 15 }.field(),
            "vehicleNumber"
        );
        assert_eq!(ValidationError::EmptyAttendantName.field(), "attendantName");
        assert_eq!(
            ValidationError::TooManyPhotos { count: 3, max: 2 }.field(),
            "photoReferences"
        );
        assert_eq!(
            ValidationError::EmptyPhotoReference { index: 1 }.field(),
            "photoReferences"
        );
    }

    #[test]
    fn test_too_many_photos_display() {
        let msg = ValidationError::TooManyPhotos { count: 3, max: 2 }.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains("up to 2"));
    }

    #[test]
    fn test_error_is_validation_error() {
        let err: Error = ValidationError::EmptyVehicleNumber.into();
        assert!(err.is_validation_error());
        assert!(!err.is_storage_error());
        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::EmptyVehicleNumber)
        );
    }

    #[test]
    fn test_error_is_storage_error() {
        let err: Error = StorageError::Task("cancelled".to_string()).into();
        assert!(err.is_storage_error());
        assert!(!err.is_validation_error());
        assert!(err.as_validation().is_none());
        assert!(err.to_string().contains("cancelled"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::config_validation("poll_interval_ms must be greater than 0");
        assert!(err.to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StorageError = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = StorageError::from(sqlite_err).into();
            assert!(matches!(err, Error::Storage(StorageError::Database(_))));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: StorageError = json_err.into();
            assert!(matches!(err, StorageError::Encode(_)));
        }
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }

    #[test]
    fn test_corrupt_value_display() {
        let err = StorageError::CorruptValue {
            key: "PARKED_LOCATION".to_string(),
            message: "invalid utf-8 sequence".to_string(),
        };
        assert!(err.to_string().contains("PARKED_LOCATION"));
        assert!(err.to_string().contains("unreadable"));
    }

    #[test]
    fn test_migration_error_display() {
        let err = StorageError::Migration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }
}
