//! The parking session store.
//!
//! A single-slot register over a [`KeyValueStore`]: at most one session is
//! persisted, under one fixed key, and every write is a full overwrite.
//!
//! Nothing is cached. Every `load` re-reads the backend, so any number of
//! readers (including pollers calling [`ParkingSessionStore::has_active_session`]
//! on a timer) observe exactly what was last persisted. Concurrent `save`s
//! are not serialized here; whichever backend write completes last wins.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{Result, StorageError};
use crate::session::{ParkingSession, ParkingSessionInput, SessionPolicy};
use crate::storage::KeyValueStore;

/// The one storage key the store reads and writes.
pub const PARKED_LOCATION_KEY: &str = "PARKED_LOCATION";

/// Why a persisted record was discarded on load.
#[derive(Debug)]
enum CorruptRecord {
    Unreadable(String),
    Unparseable(serde_json::Error),
    InvariantViolated(crate::error::ValidationError),
}

impl std::fmt::Display for CorruptRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable(message) => write!(f, "unreadable record: {message}"),
            Self::Unparseable(e) => write!(f, "unparseable record: {e}"),
            Self::InvariantViolated(e) => write!(f, "record violates invariant: {e}"),
        }
    }
}

/// Owner of the current parking session.
///
/// Cloning is cheap; clones share the same backend.
#[derive(Debug)]
pub struct ParkingSessionStore<S: KeyValueStore + ?Sized = dyn KeyValueStore> {
    backend: Arc<S>,
    policy: SessionPolicy,
}

impl<S: KeyValueStore + ?Sized> Clone for ParkingSessionStore<S> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            policy: self.policy.clone(),
        }
    }
}

impl<S: KeyValueStore> ParkingSessionStore<S> {
    /// Create a store over `backend` with the default policy.
    #[must_use]
    pub fn new(backend: S) -> Self {
        Self::from_arc(Arc::new(backend))
    }
}

impl<S: KeyValueStore + ?Sized> ParkingSessionStore<S> {
    /// Create a store over a shared backend with the default policy.
    #[must_use]
    pub fn from_arc(backend: Arc<S>) -> Self {
        Self {
            backend,
            policy: SessionPolicy::default(),
        }
    }

    /// Replace the validation policy.
    #[must_use]
    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The validation policy in effect.
    #[must_use]
    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Validate `candidate` and persist it as the current session.
    ///
    /// Any previous session is overwritten and cannot be recovered. On a
    /// validation failure nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Validation`] naming the first rejected field,
    /// or [`crate::Error::Storage`] if the write fails.
    pub async fn save(&self, candidate: ParkingSessionInput) -> Result<ParkingSession> {
        let session = candidate.into_session(&self.policy, Utc::now())?;
        let encoded = session.encode().map_err(StorageError::from)?;

        self.backend.set(PARKED_LOCATION_KEY, &encoded).await?;

        info!(
            slot = session.slot(),
            vehicle = session.vehicle_number(),
            "Parking session saved"
        );
        Ok(session)
    }

    /// Read the current session.
    ///
    /// Returns `Ok(None)` when nothing is stored. A record that cannot be
    /// read as text or decoded, or that violates a session invariant, is
    /// logged and also reported as `Ok(None)`; it is left in place untouched.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the read fails.
    pub async fn load(&self) -> Result<Option<ParkingSession>> {
        let decoded = match self.backend.get(PARKED_LOCATION_KEY).await {
            Ok(Some(raw)) => Self::decode(&raw),
            Ok(None) => {
                debug!("No parking session stored");
                return Ok(None);
            }
            Err(StorageError::CorruptValue { message, .. }) => {
                Err(CorruptRecord::Unreadable(message))
            }
            Err(e) => return Err(e.into()),
        };

        match decoded {
            Ok(session) => Ok(Some(session)),
            Err(reason) => {
                warn!(
                    key = PARKED_LOCATION_KEY,
                    backend = self.backend.name(),
                    %reason,
                    "Ignoring corrupt parking session record"
                );
                Ok(None)
            }
        }
    }

    fn decode(raw: &str) -> std::result::Result<ParkingSession, CorruptRecord> {
        let session = ParkingSession::decode(raw).map_err(CorruptRecord::Unparseable)?;
        session
            .check_invariants()
            .map_err(CorruptRecord::InvariantViolated)?;
        Ok(session)
    }

    /// Check whether a session is stored.
    ///
    /// Always agrees with [`Self::load`]: a corrupt record counts as absent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the read fails.
    pub async fn has_active_session(&self) -> Result<bool> {
        Ok(self.load().await?.is_some())
    }

    /// Remove the current session. Clearing when nothing is stored succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Storage`] if the removal fails.
    pub async fn clear(&self) -> Result<()> {
        self.backend.remove(PARKED_LOCATION_KEY).await?;
        info!("Parking session cleared");
        Ok(())
    }
}
