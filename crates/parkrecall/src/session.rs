//! Core parking session types.
//!
//! A [`ParkingSession`] is the one record the store persists: where the
//! vehicle was left, in which slot, who parked it, and when. Callers build a
//! [`ParkingSessionInput`] from raw values; the only way to obtain a session
//! is to validate that input against a [`SessionPolicy`] or to decode a
//! persisted record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::slot::SlotGrid;

/// Maximum number of photo references a session can hold.
pub const MAX_PHOTO_REFERENCES: usize = 2;

/// Default maximum vehicle number length, in characters.
pub const DEFAULT_MAX_VEHICLE_NUMBER_LEN: usize = 15;

/// A GPS position in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude, -90 to 90.
    pub latitude: f64,
    /// Longitude, -180 to 180.
    pub longitude: f64,
}

impl Coordinates {
    /// Create a new coordinate pair.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check both components are finite and in range.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range component.
    pub fn check(&self) -> Result<(), ValidationError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::LatitudeOutOfRange(self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }
}

/// Rules applied to input before a session is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Maximum vehicle number length after normalization.
    pub max_vehicle_number_len: usize,
    /// The lot layout.
    pub grid: SlotGrid,
    /// Reject slot codes that are not on `grid`.
    pub enforce_slot_grid: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            max_vehicle_number_len: DEFAULT_MAX_VEHICLE_NUMBER_LEN,
            grid: SlotGrid::default(),
            enforce_slot_grid: false,
        }
    }
}

/// Raw, unvalidated values supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParkingSessionInput {
    /// Where the vehicle is. `None` if no fix was obtained.
    pub coordinates: Option<Coordinates>,
    /// Slot code, e.g. `B3`.
    pub slot: String,
    /// Vehicle registration number.
    pub vehicle_number: String,
    /// Name of the attendant who parked the vehicle.
    pub attendant_name: String,
    /// Attendant ID or badge number.
    pub attendant_id: Option<String>,
    /// Opaque photo handles (file paths or URIs).
    pub photo_references: Vec<String>,
}

impl ParkingSessionInput {
    /// Create an input with the required fields set.
    #[must_use]
    pub fn new(
        coordinates: Coordinates,
        slot: impl Into<String>,
        vehicle_number: impl Into<String>,
        attendant_name: impl Into<String>,
    ) -> Self {
        Self {
            coordinates: Some(coordinates),
            slot: slot.into(),
            vehicle_number: vehicle_number.into(),
            attendant_name: attendant_name.into(),
            attendant_id: None,
            photo_references: Vec::new(),
        }
    }

    /// Set the attendant ID.
    #[must_use]
    pub fn with_attendant_id(mut self, id: impl Into<String>) -> Self {
        self.attendant_id = Some(id.into());
        self
    }

    /// Append a photo reference.
    #[must_use]
    pub fn with_photo(mut self, reference: impl Into<String>) -> Self {
        self.photo_references.push(reference.into());
        self
    }

    /// Validate and normalize this input into a session stamped at `now`.
    ///
    /// Checks run in field order (coordinates, slot, vehicle number,
    /// attendant name, photos) and the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first rejected field.
    pub fn into_session(
        self,
        policy: &SessionPolicy,
        now: DateTime<Utc>,
    ) -> Result<ParkingSession, ValidationError> {
        let coordinates = self
            .coordinates
            .ok_or(ValidationError::MissingCoordinates)?;
        coordinates.check()?;

        let slot = self.slot.trim().to_uppercase();
        if slot.is_empty() {
            return Err(ValidationError::EmptySlot);
        }
        if policy.enforce_slot_grid && !policy.grid.contains(&slot) {
            return Err(ValidationError::SlotNotOnGrid { slot });
        }

        let vehicle_number = self.vehicle_number.trim().to_uppercase();
        if vehicle_number.is_empty() {
            return Err(ValidationError::EmptyVehicleNumber);
        }
        let len = vehicle_number.chars().count();
        if len > policy.max_vehicle_number_len {
            return Err(ValidationError::VehicleNumberTooLong {
                len,
                max: policy.max_vehicle_number_len,
            });
        }

        let attendant_name = self.attendant_name.trim().to_string();
        if attendant_name.is_empty() {
            return Err(ValidationError::EmptyAttendantName);
        }

        if self.photo_references.len() > MAX_PHOTO_REFERENCES {
            return Err(ValidationError::TooManyPhotos {
                count: self.photo_references.len(),
                max: MAX_PHOTO_REFERENCES,
            });
        }
        let mut photo_references = Vec::with_capacity(self.photo_references.len());
        for (index, reference) in self.photo_references.iter().enumerate() {
            let reference = reference.trim();
            if reference.is_empty() {
                return Err(ValidationError::EmptyPhotoReference { index });
            }
            photo_references.push(reference.to_string());
        }

        Ok(ParkingSession {
            coordinates,
            slot,
            vehicle_number,
            attendant_name,
            attendant_id: normalize_optional(self.attendant_id),
            photo_references,
            recorded_at: now,
        })
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The active parking session.
///
/// Serialized as JSON with camelCase keys. Records written by the earlier
/// mobile app (`coords`, `carNumber`, `personName`, `personId`, `photos`,
/// `timestamp`) decode as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingSession {
    #[serde(alias = "coords")]
    coordinates: Coordinates,

    slot: String,

    #[serde(alias = "carNumber")]
    vehicle_number: String,

    #[serde(alias = "personName")]
    attendant_name: String,

    #[serde(default, alias = "personId", skip_serializing_if = "Option::is_none")]
    attendant_id: Option<String>,

    #[serde(default, alias = "photos")]
    photo_references: Vec<String>,

    #[serde(alias = "timestamp")]
    recorded_at: DateTime<Utc>,
}

impl ParkingSession {
    /// Where the vehicle was parked.
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// The slot code.
    #[must_use]
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// The normalized (trimmed, uppercase) vehicle number.
    #[must_use]
    pub fn vehicle_number(&self) -> &str {
        &self.vehicle_number
    }

    /// The attendant's name.
    #[must_use]
    pub fn attendant_name(&self) -> &str {
        &self.attendant_name
    }

    /// The attendant's ID or badge number, if one was given.
    #[must_use]
    pub fn attendant_id(&self) -> Option<&str> {
        self.attendant_id.as_deref()
    }

    /// Photo references in the order they were added.
    #[must_use]
    pub fn photo_references(&self) -> &[String] {
        &self.photo_references
    }

    /// When the session was recorded.
    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// First letter of the attendant's name, uppercased, for avatars.
    #[must_use]
    pub fn attendant_initial(&self) -> char {
        self.attendant_name
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('?')
    }

    /// BLAKE3 digest of the session content.
    ///
    /// Two sessions have the same fingerprint exactly when every field,
    /// including `recorded_at`, is equal.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.coordinates.latitude.to_bits().to_le_bytes());
        hasher.update(&self.coordinates.longitude.to_bits().to_le_bytes());
        for field in [
            self.slot.as_str(),
            self.vehicle_number.as_str(),
            self.attendant_name.as_str(),
            self.attendant_id.as_deref().unwrap_or_default(),
        ] {
            hasher.update(field.as_bytes());
            hasher.update(&[0]);
        }
        for reference in &self.photo_references {
            hasher.update(reference.as_bytes());
            hasher.update(&[0]);
        }
        hasher.update(self.recorded_at.to_rfc3339().as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    /// Serialize to the persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from the persisted JSON form.
    ///
    /// A blank optional attendant ID decodes as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or a required field is
    /// missing or mistyped.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        let mut session: Self = serde_json::from_str(raw)?;
        session.attendant_id = normalize_optional(session.attendant_id.take());
        Ok(session)
    }

    /// Check the invariants every persisted session must satisfy.
    ///
    /// Configurable policy (length limit, slot grid) is not
    /// re-applied here; only the fixed record invariants are.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn check_invariants(&self) -> Result<(), ValidationError> {
        self.coordinates.check()?;
        if self.slot.trim().is_empty() {
            return Err(ValidationError::EmptySlot);
        }
        if self.vehicle_number.trim().is_empty() {
            return Err(ValidationError::EmptyVehicleNumber);
        }
        if self.attendant_name.trim().is_empty() {
            return Err(ValidationError::EmptyAttendantName);
        }
        if self.photo_references.len() > MAX_PHOTO_REFERENCES {
            return Err(ValidationError::TooManyPhotos {
                count: self.photo_references.len(),
                max: MAX_PHOTO_REFERENCES,
            });
        }
        Ok(())
    }
}

/// Whether a session is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session is stored.
    Empty,
    /// A session is stored.
    Active,
}

impl SessionState {
    /// The state corresponding to a load result.
    #[must_use]
    pub fn of(session: Option<&ParkingSession>) -> Self {
        if session.is_some() {
            Self::Active
        } else {
            Self::Empty
        }
    }

    /// Check if this is the `Active` state.
    #[must_use]
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "NO SESSION"),
            Self::Active => write!(f, "SESSION ACTIVE"),
        }
    }
}
