use super::alignment::{AlignmentKernel, Decision};
use super::grid::UniformGrid;
use super::metrics::{self, FrameStats};
use super::pool::BoidPool;
use super::spatial::NeighborQuery;
use super::world::World;
use crate::core::config::FlockConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::fmt;
use std::time::Instant;
use tracing::{debug, debug_span, info};

/// The four phases of a tick, run strictly in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepPhase {
    Query,
    Commit,
    Move,
    Reindex,
}

impl fmt::Display for StepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepPhase::Query => "query",
            StepPhase::Commit => "commit",
            StepPhase::Move => "move",
            StepPhase::Reindex => "reindex",
        };
        f.write_str(name)
    }
}

/// Owns the boid population and the grid that indexes it.
///
/// Between ticks the grid always reflects the pool's current positions: it is
/// built at construction, after every move phase, and after a resize.
pub struct FlockEngine {
    pub pool: BoidPool,
    pub grid: UniformGrid,
    pub world: World,
    rng: StdRng,
    pub global_tick: u64,
    last_stats: FrameStats,
}

impl FlockEngine {
    /// Spawn `config.num_boids` boids at random. Seeded from `config.seed`
    /// when set.
    pub fn new(config: &FlockConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let world = World::new(config.width, config.height);
        Self::with_rng(config, world, rng)
    }

    fn with_rng(config: &FlockConfig, world: World, mut rng: StdRng) -> Self {
        info!(
            "🐦 [Flock] Spawning {} boids in {}x{} (grid {}x{})",
            config.num_boids, world.width, world.height, config.grid_size, config.grid_size
        );
        let pool = BoidPool::spawn(config.num_boids, &world, config.speed, config.trail_length, &mut rng);
        Self::from_pool(config, world, pool, rng)
    }

    /// Wrap an existing pool. Used to place boids by hand.
    pub fn from_pool(config: &FlockConfig, world: World, pool: BoidPool, rng: StdRng) -> Self {
        let mut grid = UniformGrid::new(config.grid_size);
        grid.rebuild(&pool, &world);
        FlockEngine {
            pool,
            grid,
            world,
            rng,
            global_tick: 0,
            last_stats: FrameStats::default(),
        }
    }

    /// Throw the population away and spawn a fresh one. The RNG stream and
    /// the world bounds carry over.
    pub fn reinitialize(&mut self, config: &FlockConfig) {
        info!("🔄 [Flock] Reinitializing population with {} boids", config.num_boids);
        self.pool = BoidPool::spawn(
            config.num_boids,
            &self.world,
            config.speed,
            config.trail_length,
            &mut self.rng,
        );
        if self.grid.grid_size() != config.grid_size {
            self.grid = UniformGrid::new(config.grid_size);
        }
        self.grid.rebuild(&self.pool, &self.world);
        self.global_tick = 0;
        self.last_stats = FrameStats::default();
    }

    /// New world bounds. Boids stay where they are; the grid is rebuilt so
    /// the next query phase sees cells computed against the new bounds.
    pub fn resize(&mut self, width: f32, height: f32) {
        info!("📐 [Flock] World resized to {}x{}", width, height);
        self.world.resize(width, height);
        self.grid.rebuild(&self.pool, &self.world);
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// One frame: query → commit → move → reindex.
    pub fn tick(&mut self, config: &FlockConfig) -> FrameStats {
        let start_time = Instant::now();
        self.global_tick += 1;

        let kernel = AlignmentKernel::new(config.speed, config.noise_degrees);

        // 1. Query: every boid reads the frozen grid; nothing is written yet
        let decisions = {
            let _span = debug_span!("phase", name = %StepPhase::Query).entered();
            self.query_phase(&kernel, config)
        };

        // 2. Commit
        {
            let _span = debug_span!("phase", name = %StepPhase::Commit).entered();
            self.commit_phase(&kernel, &decisions);
        }

        // 3. Move
        {
            let _span = debug_span!("phase", name = %StepPhase::Move).entered();
            self.move_phase(&kernel);
        }

        // 4. Reindex for the next frame's queries
        {
            let _span = debug_span!("phase", name = %StepPhase::Reindex).entered();
            self.grid.rebuild(&self.pool, &self.world);
        }

        let total_neighbors: u64 = decisions.iter().map(|d| d.neighbors as u64).sum();
        let mean_neighbors = if decisions.is_empty() {
            0.0
        } else {
            total_neighbors as f32 / decisions.len() as f32
        };

        let elapsed = start_time.elapsed();
        self.last_stats = FrameStats {
            tick: self.global_tick,
            alignment: metrics::alignment(&self.pool, config.speed),
            mean_neighbors,
            occupied_cells: self.grid.occupied_cells(),
            elapsed_micros: elapsed.as_micros() as u64,
        };

        if self.global_tick % 100 == 0 {
            debug!(
                "Tick {}: {} boids processed in {:?} (alignment {:.3})",
                self.global_tick, self.pool.n_agents, elapsed, self.last_stats.alignment
            );
        }
        self.last_stats
    }

    /// Neighborhood scan for every boid, fanned out over rayon. Shared
    /// borrows only, so the result cannot depend on iteration order.
    fn query_phase(&self, kernel: &AlignmentKernel, config: &FlockConfig) -> Vec<Decision> {
        let query = NeighborQuery::new(
            &self.grid,
            &self.pool,
            &self.world,
            config.visual_range,
            config.neighbor_strategy,
        );
        (0..self.pool.n_agents)
            .into_par_iter()
            .map(|i| kernel.decide(&query, i))
            .collect()
    }

    /// Resolve decisions into staged velocities, then make them current.
    /// Random fallback headings are drawn in boid order so seeded runs replay.
    fn commit_phase(&mut self, kernel: &AlignmentKernel, decisions: &[Decision]) {
        let pool = &mut self.pool;
        for (i, decision) in decisions.iter().enumerate() {
            let staged = (pool.next_vx[i], pool.next_vy[i]);
            let (vx, vy) = kernel.resolve(decision.heading, staged, &mut self.rng);
            pool.next_vx[i] = vx;
            pool.next_vy[i] = vy;
        }
        pool.vx.copy_from_slice(&pool.next_vx);
        pool.vy.copy_from_slice(&pool.next_vy);
    }

    /// Noise, advance, wrap, record the trail.
    fn move_phase(&mut self, kernel: &AlignmentKernel) {
        let pool = &mut self.pool;
        for i in 0..pool.n_agents {
            let (vx, vy) = kernel.perturb(pool.vx[i], pool.vy[i], &mut self.rng);
            pool.vx[i] = vx;
            pool.vy[i] = vy;

            let (x, y) = self.world.wrap(pool.x[i] + vx, pool.y[i] + vy);
            pool.x[i] = x;
            pool.y[i] = y;
            pool.trails[i].push(x, y);
        }
    }
}
