//! Render-facing frame view.
//!
//! Taken after a tick completes. Renderers consume this instead of touching
//! the engine, so drawing code never sees a half-updated pool.

use super::master_pipeline::FlockEngine;
use super::metrics::FrameStats;
use super::world::World;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoidFrame {
    pub x: f32,
    pub y: f32,
    /// `atan2(dy, dx)`, radians.
    pub heading: f32,
    /// Seam-split polylines, present only when trail drawing is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trail: Option<Vec<Vec<[f32; 2]>>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub world: World,
    pub stats: FrameStats,
    pub boids: Vec<BoidFrame>,
}

impl FrameSnapshot {
    pub fn capture(engine: &FlockEngine, with_trails: bool) -> Self {
        let pool = &engine.pool;
        let boids = (0..pool.n_agents)
            .map(|i| BoidFrame {
                x: pool.x[i],
                y: pool.y[i],
                heading: pool.heading(i),
                trail: with_trails.then(|| pool.trails[i].segments(&engine.world)),
            })
            .collect();
        FrameSnapshot {
            world: engine.world,
            stats: engine.last_stats(),
            boids,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FlockConfig;

    #[test]
    fn trails_only_when_asked() {
        let cfg = FlockConfig { num_boids: 5, seed: Some(4), ..FlockConfig::default() };
        let mut engine = FlockEngine::new(&cfg);
        engine.tick(&cfg);
        engine.tick(&cfg);

        let bare = FrameSnapshot::capture(&engine, false);
        assert_eq!(bare.boids.len(), 5);
        assert!(bare.boids.iter().all(|b| b.trail.is_none()));
        assert_eq!(bare.stats.tick, 2);

        let full = FrameSnapshot::capture(&engine, true);
        for b in &full.boids {
            let points: usize = b.trail.as_ref().map(|s| s.iter().map(Vec::len).sum()).unwrap_or(0);
            assert_eq!(points, 2);
        }
    }

    #[test]
    fn json_omits_absent_trails() {
        let cfg = FlockConfig { num_boids: 2, seed: Some(1), ..FlockConfig::default() };
        let engine = FlockEngine::new(&cfg);
        let json = FrameSnapshot::capture(&engine, false).to_json().unwrap();
        assert!(json.contains("\"heading\""));
        assert!(!json.contains("\"trail\""));
    }
}
