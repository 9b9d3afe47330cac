//! Neighbor Query
//!
//! Perception-radius lookups on top of the uniform grid. The grid hands back
//! a square superset of the perception disk; this module applies the exact
//! toroidal distance test so the result equals a full scan.

use super::grid::UniformGrid;
use super::pool::BoidPool;
use super::world::World;
use crate::core::config::NeighborStrategy;

/// Read-only view used during the query phase. Holds shared borrows only, so
/// it can be handed to every worker thread at once.
#[derive(Clone, Copy)]
pub struct NeighborQuery<'a> {
    grid: &'a UniformGrid,
    pool: &'a BoidPool,
    world: &'a World,
    visual_range: f32,
    range_squared: f32,
    strategy: NeighborStrategy,
}

impl<'a> NeighborQuery<'a> {
    pub fn new(
        grid: &'a UniformGrid,
        pool: &'a BoidPool,
        world: &'a World,
        visual_range: f32,
        strategy: NeighborStrategy,
    ) -> Self {
        NeighborQuery {
            grid,
            pool,
            world,
            visual_range,
            range_squared: visual_range * visual_range,
            strategy,
        }
    }

    pub fn pool(&self) -> &'a BoidPool {
        self.pool
    }

    /// Call `callback(j)` for every boid `j` strictly within the perception
    /// radius of boid `idx`, itself included.
    #[inline]
    pub fn for_each_neighbor<F>(&self, idx: usize, mut callback: F)
    where
        F: FnMut(usize),
    {
        let center = self.pool.position(idx);
        let mut visit = |j: usize| {
            if self.world.toroidal_distance_squared(center, self.pool.position(j)) < self.range_squared {
                callback(j);
            }
        };

        match self.strategy {
            NeighborStrategy::Grid => {
                self.grid
                    .query_radius(self.world, center.0, center.1, self.visual_range, |j| visit(j as usize));
            }
            NeighborStrategy::FullScan => (0..self.pool.n_agents).for_each(visit),
        }
    }

    /// Indices of every boid within range of `idx`, unordered.
    pub fn neighbors_of(&self, idx: usize) -> Vec<usize> {
        let mut out = Vec::new();
        self.for_each_neighbor(idx, |j| out.push(j));
        out
    }
}

/// Reference result: every boid whose toroidal distance to `idx` is below
/// `visual_range`, found by scanning the whole pool.
pub fn brute_force_neighbors(pool: &BoidPool, world: &World, idx: usize, visual_range: f32) -> Vec<usize> {
    let r2 = visual_range * visual_range;
    let center = pool.position(idx);
    (0..pool.n_agents)
        .filter(|&j| world.toroidal_distance_squared(center, pool.position(j)) < r2)
        .collect()
}
