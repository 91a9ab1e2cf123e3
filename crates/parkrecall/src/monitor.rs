//! Session presence monitoring.
//!
//! A [`SessionMonitor`] polls the store at a fixed interval and reports
//! transitions between "no session" and "session active", as well as a
//! stored session being replaced by a different one. Each poll is a plain
//! `load`; nothing is cached between ticks except the last fingerprint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::session::{ParkingSession, SessionState};
use crate::store::ParkingSessionStore;

/// Errors that can occur during session monitoring.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The monitor is already running.
    #[error("monitor already running")]
    AlreadyRunning,
}

/// Result type for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Configuration for a session monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Interval between presence checks.
    pub poll_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
        }
    }
}

impl From<&Config> for MonitorConfig {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
        }
    }
}

/// A change observed by the monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    /// Whether a session is stored.
    pub state: SessionState,
    /// Fingerprint of the stored session, if any.
    pub fingerprint: Option<String>,
    /// When the observation was made.
    pub observed_at: DateTime<Utc>,
    /// The stored session, if any.
    pub session: Option<ParkingSession>,
}

/// Polls a [`ParkingSessionStore`] and emits [`SessionEvent`]s on change.
#[derive(Debug)]
pub struct SessionMonitor {
    store: ParkingSessionStore,
    config: MonitorConfig,
    running: Arc<AtomicBool>,
}

impl SessionMonitor {
    /// Create a monitor over `store`.
    #[must_use]
    pub fn new(store: ParkingSessionStore, config: MonitorConfig) -> Self {
        Self {
            store,
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get the monitor configuration.
    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Check if the monitor is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start polling and send events through the channel.
    ///
    /// The first observation is always sent. After that an event is sent
    /// only when the state or the stored session changes. Runs until
    /// [`MonitorHandle::stop`] is called or the receiver is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::AlreadyRunning`] if the monitor is already
    /// running.
    pub async fn start(&self, tx: mpsc::Sender<SessionEvent>) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Session monitor already running");
            return Err(MonitorError::AlreadyRunning);
        }

        debug!(
            interval_ms = self.config.poll_interval.as_millis(),
            "Starting session monitor"
        );

        let mut ticker = interval(self.config.poll_interval);
        let mut last: Option<Option<String>> = None;

        while self.running.load(Ordering::SeqCst) {
            ticker.tick().await;

            match self.check_for_changes(&mut last).await {
                Ok(Some(event)) => {
                    if tx.send(event).await.is_err() {
                        debug!("Event channel closed, stopping monitor");
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "Error checking parking session");
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        debug!("Session monitor stopped");
        Ok(())
    }

    async fn check_for_changes(
        &self,
        last: &mut Option<Option<String>>,
    ) -> crate::Result<Option<SessionEvent>> {
        let session = self.store.load().await?;
        let fingerprint = session.as_ref().map(ParkingSession::fingerprint);

        if last.as_ref() == Some(&fingerprint) {
            trace!("Parking session unchanged");
            return Ok(None);
        }

        let state = SessionState::of(session.as_ref());
        debug!(%state, "Parking session changed");
        *last = Some(fingerprint.clone());

        Ok(Some(SessionEvent {
            state,
            fingerprint,
            observed_at: Utc::now(),
            session,
        }))
    }

    /// Stop the monitor.
    pub fn stop(&self) {
        debug!("Stopping session monitor");
        self.running.store(false, Ordering::SeqCst);
    }

    /// Get a handle that can be used to stop the monitor from another task.
    #[must_use]
    pub fn stop_handle(&self) -> MonitorHandle {
        MonitorHandle {
            running: Arc::clone(&self.running),
        }
    }
}

/// A handle to control a running session monitor.
///
/// This can be cloned and sent to other tasks to stop the monitor remotely.
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    running: Arc<AtomicBool>,
}

impl MonitorHandle {
    /// Stop the associated monitor.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the monitor is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
