use std::sync::RwLock;

use log::warn;

use crate::prelude::{Position, Velocity};
use crate::tracking::DroneTrack;

/// What a hub correction did to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionOutcome {
    /// An existing track was overwritten.
    Updated,
    /// The id was not in the table; a new track was registered.
    Registered,
}

/// Shared table of tracked drones.
///
/// Insertion order is preserved so each simulation tick walks the drones in
/// a stable order. Writes hold the lock for the whole entry update, so a
/// reader never observes a half-written position/velocity pair. The lock is
/// never held across an await point.
pub struct TrackTable {
    inner: RwLock<Vec<DroneTrack>>,
}

impl TrackTable {
    pub fn new(tracks: Vec<DroneTrack>) -> Self {
        Self {
            inner: RwLock::new(tracks),
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Dead-reckon every track forward by `dt` seconds under one write lock.
    pub fn advance_all(&self, dt: f64, now: f64) {
        let mut tracks = self.write();
        for track in tracks.iter_mut() {
            track.advance(dt, now);
        }
    }

    /// Cloned view of the table in insertion order.
    pub fn snapshot(&self) -> Vec<DroneTrack> {
        self.read().clone()
    }

    /// Apply a partial hub correction: only the vectors present in the
    /// message are overwritten. An unknown id registers a new track (late
    /// registration), with absent vectors zeroed.
    pub fn apply_correction(
        &self,
        drone_id: &str,
        position: Option<Position>,
        velocity: Option<Velocity>,
        now: f64,
    ) -> CorrectionOutcome {
        let mut tracks = self.write();
        if let Some(track) = tracks.iter_mut().find(|t| t.drone_id == drone_id) {
            if let Some(position) = position {
                track.position = position;
            }
            if let Some(velocity) = velocity {
                track.velocity = velocity;
            }
            track.last_updated = now;
            CorrectionOutcome::Updated
        } else {
            tracks.push(DroneTrack::new(
                drone_id,
                position.unwrap_or_default(),
                velocity.unwrap_or_default(),
                now,
            ));
            CorrectionOutcome::Registered
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<DroneTrack>> {
        self.inner.read().unwrap_or_else(|poisoned| {
            warn!("track table lock poisoned; continuing with inner state");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<DroneTrack>> {
        self.inner.write().unwrap_or_else(|poisoned| {
            warn!("track table lock poisoned; continuing with inner state");
            poisoned.into_inner()
        })
    }
}
