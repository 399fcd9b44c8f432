use anyhow::Context;
use audiocore::prelude::{Position, Velocity};
use audiocore::tracking::DroneTrack;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One seeded drone in the simulated airspace.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DroneSeed {
    pub id: String,
    pub position: Position,
    pub velocity: Velocity,
}

/// Runtime configuration for the sensor node.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// C2 hub address, host:port.
    pub endpoint: String,
    /// Simulation tick and emission interval, seconds.
    pub interval_secs: f64,
    /// Acoustic detection range, meters.
    pub max_range_m: f64,
    /// Detection origin; defaults to the sensor mast at 50 m altitude.
    pub reference: Position,
    /// Seed for the detection RNG; omit for a nondeterministic run.
    pub seed: Option<u64>,
    /// Drones tracked from startup.
    pub drones: Vec<DroneSeed>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            endpoint: "127.0.0.1:8080".into(),
            interval_secs: 2.0,
            max_range_m: 500.0,
            reference: Position::new(0.0, 0.0, 50.0),
            seed: None,
            drones: vec![
                DroneSeed {
                    id: "AUDIO-SIM-001".into(),
                    position: Position::new(300.0, 250.0, 80.0),
                    velocity: Velocity::new(-8.0, -6.0, 0.0),
                },
                DroneSeed {
                    id: "AUDIO-SIM-002".into(),
                    position: Position::new(-200.0, 400.0, 120.0),
                    velocity: Velocity::new(3.0, -5.0, -1.0),
                },
            ],
        }
    }
}

impl NodeConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading node config {}", path_ref.display()))?;
        let config: NodeConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing node config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Materialize the seed list as live tracks.
    pub fn seed_tracks(&self, now: f64) -> Vec<DroneTrack> {
        self.drones
            .iter()
            .map(|seed| DroneTrack::new(seed.id.clone(), seed.position, seed.velocity, now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_matches_the_reference_deployment() {
        let config = NodeConfig::default();
        assert_eq!(config.interval_secs, 2.0);
        assert_eq!(config.max_range_m, 500.0);
        assert_eq!(config.reference.altitude, 50.0);
        assert_eq!(config.drones.len(), 2);
        assert_eq!(config.drones[0].id, "AUDIO-SIM-001");
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"endpoint: \"10.0.0.5:9100\"\ninterval_secs: 0.5\nseed: 17\ndrones:\n  - id: D-1\n    position: {x: 10.0, y: 20.0, altitude: 30.0}\n    velocity: {vx: 1.0, vy: 0.0, climbRate: 0.0}\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let config = NodeConfig::load(&path).unwrap();
        assert_eq!(config.endpoint, "10.0.0.5:9100");
        assert_eq!(config.interval_secs, 0.5);
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.drones.len(), 1);
        // Fields absent from the file keep their defaults.
        assert_eq!(config.max_range_m, 500.0);
    }

    #[test]
    fn seed_tracks_preserve_listing_order() {
        let config = NodeConfig::default();
        let tracks = config.seed_tracks(100.0);
        assert_eq!(tracks[0].drone_id, "AUDIO-SIM-001");
        assert_eq!(tracks[1].drone_id, "AUDIO-SIM-002");
        assert_eq!(tracks[0].last_updated, 100.0);
    }
}
