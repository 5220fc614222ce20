//! GPS climb session checkpoints.
//!
//! Every update writes the full session snapshot. Finished sessions move into
//! a most-recent-first history capped at `StoreConfig::history_limit`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::storage::{KeyValueStore, StorageKey};
use crate::{Clock, Result, StoreError, SummitStore};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level.
    pub altitude: f64,
    pub timestamp: u64,
    #[serde(default)]
    pub accuracy: Option<f64>,
}

impl GpsPoint {
    /// Great-circle distance in metres.
    pub fn distance_to(&self, other: &GpsPoint) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Paused,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimbSession {
    pub id: String,
    pub user_id: String,
    pub start_time: u64,
    #[serde(default)]
    pub end_time: Option<u64>,
    /// Moving time in milliseconds, pauses excluded.
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub max_altitude: f64,
    #[serde(default)]
    pub distance_m: f64,
    #[serde(default)]
    pub elevation_gain_m: f64,
    #[serde(default)]
    pub path: Vec<GpsPoint>,
    pub status: SessionStatus,
    #[serde(default)]
    pub paused_at: Option<u64>,
    #[serde(default)]
    pub paused_ms: u64,
    pub updated_at: u64,
}

impl ClimbSession {
    fn new(user: &str, now: u64) -> Self {
        Self {
            id: format!("climb-{}-{}", user.to_lowercase(), now),
            user_id: user.to_string(),
            start_time: now,
            end_time: None,
            duration_ms: 0,
            max_altitude: 0.0,
            distance_m: 0.0,
            elevation_gain_m: 0.0,
            path: Vec::new(),
            status: SessionStatus::Active,
            paused_at: None,
            paused_ms: 0,
            updated_at: now,
        }
    }

    fn add_point(&mut self, point: GpsPoint) {
        if let Some(last) = self.path.last() {
            self.distance_m += last.distance_to(&point);
            let climb = point.altitude - last.altitude;
            if climb > 0.0 {
                self.elevation_gain_m += climb;
            }
        }
        if self.path.is_empty() || point.altitude > self.max_altitude {
            self.max_altitude = point.altitude;
        }
        self.path.push(point);
    }

    fn touch(&mut self, now: u64) {
        let paused = self.paused_ms + self.paused_at.map_or(0, |at| now.saturating_sub(at));
        self.duration_ms = now.saturating_sub(self.start_time).saturating_sub(paused);
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimbOutcome {
    Completed,
    Abandoned,
}

/// A finished session as kept in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimbRecord {
    #[serde(flatten)]
    pub session: ClimbSession,
    pub outcome: ClimbOutcome,
}

impl<S: KeyValueStore, C: Clock> SummitStore<S, C> {
    /// Begin tracking a new climb. Fails while a fresh session exists.
    pub fn start_session(&self, user: &str) -> Result<ClimbSession> {
        if let Some(existing) = self.load_active_session(user) {
            return Err(StoreError::SessionInProgress(existing.id));
        }

        let session = ClimbSession::new(user, self.now());
        self.save_session(&session);
        debug!(user, id = %session.id, "climb session started");
        Ok(session)
    }

    /// Checkpoint the full session snapshot.
    pub fn save_session(&self, session: &ClimbSession) {
        self.records
            .write(StorageKey::ActiveSession, &session.user_id, session);
    }

    /// The user's active session, unless it is older than the staleness
    /// window, in which case it is deleted.
    pub fn load_active_session(&self, user: &str) -> Option<ClimbSession> {
        let session: ClimbSession = self.records.read(StorageKey::ActiveSession, user)?;
        let age = self.now().saturating_sub(session.start_time);
        if age > self.config.session_ttl_ms {
            warn!(user, id = %session.id, age_ms = age, "discarding stale climb session");
            self.records.remove(StorageKey::ActiveSession, user);
            return None;
        }
        Some(session)
    }

    /// Append a GPS fix. Ignored while the session is paused.
    pub fn record_point(&self, user: &str, point: GpsPoint) -> Result<ClimbSession> {
        let mut session = self.active_or_err(user)?;
        if session.status == SessionStatus::Paused {
            return Ok(session);
        }

        session.add_point(point);
        session.touch(self.now());
        self.save_session(&session);
        Ok(session)
    }

    pub fn pause_session(&self, user: &str) -> Result<ClimbSession> {
        let mut session = self.active_or_err(user)?;
        if session.status == SessionStatus::Active {
            let now = self.now();
            session.touch(now);
            session.status = SessionStatus::Paused;
            session.paused_at = Some(now);
            self.save_session(&session);
        }
        Ok(session)
    }

    pub fn resume_session(&self, user: &str) -> Result<ClimbSession> {
        let mut session = self.active_or_err(user)?;
        if let Some(at) = session.paused_at.take() {
            let now = self.now();
            session.paused_ms += now.saturating_sub(at);
            session.status = SessionStatus::Active;
            session.touch(now);
            self.save_session(&session);
        }
        Ok(session)
    }

    pub fn complete_session(&self, user: &str) -> Result<ClimbRecord> {
        self.finish_session(user, ClimbOutcome::Completed)
    }

    pub fn abandon_session(&self, user: &str) -> Result<ClimbRecord> {
        self.finish_session(user, ClimbOutcome::Abandoned)
    }

    /// Finished climbs, most recent first.
    pub fn climb_history(&self, user: &str) -> Vec<ClimbRecord> {
        self.records.read_list(StorageKey::ClimbHistory, user)
    }

    fn finish_session(&self, user: &str, outcome: ClimbOutcome) -> Result<ClimbRecord> {
        let mut session = self.active_or_err(user)?;
        let now = self.now();
        session.touch(now);
        if let Some(at) = session.paused_at.take() {
            session.paused_ms += now.saturating_sub(at);
        }
        session.status = SessionStatus::Completed;
        session.end_time = Some(now);

        let record = ClimbRecord { session, outcome };
        let mut history = self.climb_history(user);
        history.insert(0, record.clone());
        history.truncate(self.config.history_limit);

        if self.records.write(StorageKey::ClimbHistory, user, &history) {
            self.records.remove(StorageKey::ActiveSession, user);
        } else {
            warn!(user, id = %record.session.id, "climb history not saved, keeping active session");
        }
        info!(user, id = %record.session.id, ?outcome, distance_m = record.session.distance_m, "climb session finished");

        Ok(record)
    }

    fn active_or_err(&self, user: &str) -> Result<ClimbSession> {
        self.load_active_session(user).ok_or(StoreError::NoActiveSession)
    }
}
