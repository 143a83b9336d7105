//! Entity payloads: runs and saved routes.
//!
//! The sync engine never looks inside a payload. [`SyncEntity`] is the whole
//! entity-specific surface it sees: a storage key and a display ordering.

use crate::record::Record;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// An entity type that can be stored and synchronized.
///
/// Implementors carry their own fields; the store and synchronizers treat
/// the payload as an opaque serde value and copy it verbatim.
pub trait SyncEntity:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    /// The durable storage key for this entity type's record list.
    const STORE_KEY: &'static str;

    /// Orders records for presentation after a pull merge.
    ///
    /// The default keeps insertion order. Implementations must use a stable
    /// sort so equal keys keep their relative positions.
    fn sort_for_display(_records: &mut [Record<Self>]) {}
}

/// A single GPS sample along a run's path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSample {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Seconds elapsed since the start of the run.
    pub elapsed_secs: u32,
}

/// One per-kilometer split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KmSplit {
    /// Kilometer number, starting at 1.
    pub km: u32,
    /// Time taken for this kilometer, in seconds.
    pub duration_secs: u32,
}

/// A recorded workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Start time as unix seconds.
    pub started_at: i64,
    /// Total duration in seconds.
    pub duration_secs: u32,
    /// Total distance in meters.
    pub distance_meters: f64,
    /// Cumulative elevation gain in meters, when available.
    pub elevation_gain_meters: Option<f64>,
    /// Average heart rate in beats per minute, when available.
    pub avg_heart_rate: Option<u16>,
    /// GPS path samples.
    pub path: Vec<PathSample>,
    /// Per-kilometer splits.
    pub splits: Vec<KmSplit>,
}

impl Run {
    /// Average pace in seconds per kilometer, or `None` for a zero-distance
    /// run.
    #[must_use]
    pub fn avg_pace_secs_per_km(&self) -> Option<f64> {
        if self.distance_meters <= 0.0 {
            return None;
        }
        Some(f64::from(self.duration_secs) / (self.distance_meters / 1000.0))
    }
}

impl SyncEntity for Run {
    const STORE_KEY: &'static str = "runs";

    /// Runs are presented newest-first by start time.
    fn sort_for_display(records: &mut [Record<Self>]) {
        records.sort_by(|a, b| b.payload.started_at.cmp(&a.payload.started_at));
    }
}

/// A waypoint on a saved route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// A saved route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// User-visible name.
    pub name: String,
    /// Route length in meters.
    pub distance_meters: f64,
    /// Ordered waypoints.
    pub waypoints: Vec<Waypoint>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl SyncEntity for Route {
    const STORE_KEY: &'static str = "routes";
    // Routes keep insertion order.
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(started_at: i64) -> Run {
        Run {
            started_at,
            duration_secs: 1800,
            distance_meters: 5000.0,
            elevation_gain_meters: None,
            avg_heart_rate: None,
            path: Vec::new(),
            splits: Vec::new(),
        }
    }

    #[test]
    fn run_display_order_is_newest_first() {
        let mut records = vec![
            Record::local(run(100)),
            Record::local(run(300)),
            Record::local(run(200)),
        ];
        Run::sort_for_display(&mut records);

        let times: Vec<i64> = records.iter().map(|r| r.payload.started_at).collect();
        assert_eq!(times, vec![300, 200, 100]);
    }

    #[test]
    fn run_display_order_is_stable_for_equal_times() {
        let mut records = vec![
            Record::local(run(100)),
            Record::local(run(100)),
        ];
        let first = records[0].local_id;
        Run::sort_for_display(&mut records);
        assert_eq!(records[0].local_id, first);
    }

    #[test]
    fn route_display_order_keeps_insertion_order() {
        let route = Route {
            name: "Riverside loop".into(),
            distance_meters: 7500.0,
            waypoints: vec![Waypoint {
                latitude: 52.52,
                longitude: 13.40,
            }],
            notes: None,
        };
        let mut records = vec![
            Record::local(route.clone()),
            Record::local(route),
        ];
        let order: Vec<_> = records.iter().map(|r| r.local_id).collect();
        Route::sort_for_display(&mut records);
        let after: Vec<_> = records.iter().map(|r| r.local_id).collect();
        assert_eq!(order, after);
    }

    #[test]
    fn avg_pace() {
        let r = run(0);
        // 1800 s over 5 km
        assert_eq!(r.avg_pace_secs_per_km(), Some(360.0));

        let mut zero = run(0);
        zero.distance_meters = 0.0;
        assert_eq!(zero.avg_pace_secs_per_km(), None);
    }
}
