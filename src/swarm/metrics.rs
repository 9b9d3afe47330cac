//! Flock-level measurements read after each tick.

use super::pool::BoidPool;
use serde::Serialize;

/// Global heading coherence: `|Σ v| / n / speed`.
///
/// 1.0 when every boid moves the same way, near 0 for random headings.
/// An empty pool reports 0. Clamped to `[0, 1]` against float rounding.
pub fn alignment(pool: &BoidPool, speed: f32) -> f32 {
    if pool.is_empty() || speed <= 0.0 {
        return 0.0;
    }
    let total_x: f32 = pool.vx.iter().sum();
    let total_y: f32 = pool.vy.iter().sum();
    let metric = (total_x * total_x + total_y * total_y).sqrt() / pool.n_agents as f32 / speed;
    metric.clamp(0.0, 1.0)
}

/// Summary of one completed tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FrameStats {
    pub tick: u64,
    pub alignment: f32,
    /// Mean neighborhood size seen in the query phase, self included.
    pub mean_neighbors: f32,
    pub occupied_cells: usize,
    pub elapsed_micros: u64,
}
