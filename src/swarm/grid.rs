// grid.rs: uniform spatial grid over the toroidal world.
//
// gridSize × gridSize cells spanning the world; cell (i, j) covers
// [i·w/g, (i+1)·w/g) × [j·h/g, (j+1)·h/g).  Rebuild: one O(N) pass, no sort.
// Queries wrap at the grid edges the same way positions wrap at the world's.

use super::pool::BoidPool;
use super::world::World;
use crate::core::config::MAX_GRID_SIZE;

/// Uniform grid of boid indices.  Rebuild every tick after positions settle,
/// before the next tick's neighborhood queries.
pub struct UniformGrid {
    /// Flattened cell list: each cell is a contiguous slice in `data`.
    /// `offsets[c]` = start index in `data` for cell c.
    /// `counts[c]`  = number of boids in cell c.
    ///
    /// Two passes on rebuild:
    ///   Pass 1: count boids per cell.
    ///   Pass 2: scatter boids into pre-sized runs.
    /// No Vec-of-Vec, so a rebuild allocates nothing once warmed up.
    counts: Vec<u32>,  // [cells]  boids per cell
    offsets: Vec<u32>, // [cells]  start of each cell in `data`
    data: Vec<u32>,    // [N]      boid indices, packed
    grid_size: usize,
}

impl UniformGrid {
    /// `grid_size` is clamped to `1..=MAX_GRID_SIZE`, so the cell count
    /// always fits in a `u32`.
    pub fn new(grid_size: usize) -> Self {
        let grid_size = grid_size.clamp(1, MAX_GRID_SIZE);
        let cells = grid_size * grid_size;
        UniformGrid {
            counts: vec![0u32; cells],
            offsets: vec![0u32; cells],
            data: Vec::new(),
            grid_size,
        }
    }

    #[inline]
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Number of indexed boids.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `i = floor(x / width · g) mod g`, `j` likewise.  The euclidean mod keeps
    /// positions outside the bounds (stale after a resize) on a valid cell.
    #[inline(always)]
    pub fn cell_of(&self, world: &World, x: f32, y: f32) -> (usize, usize) {
        let g = self.grid_size as i64;
        let i = ((x / world.width * g as f32).floor() as i64).rem_euclid(g);
        let j = ((y / world.height * g as f32).floor() as i64).rem_euclid(g);
        (i as usize, j as usize)
    }

    #[inline(always)]
    fn flat(&self, i: usize, j: usize) -> usize {
        i + j * self.grid_size
    }

    /// Full O(N) rebuild from the pool.  Two-pass (count then scatter).
    pub fn rebuild(&mut self, pool: &BoidPool, world: &World) {
        let n = pool.n_agents;
        self.data.resize(n, 0);

        // ── Pass 1: count ────────────────────────────────────────────────────
        self.counts.iter_mut().for_each(|c| *c = 0);

        for k in 0..n {
            let (i, j) = self.cell_of(world, pool.x[k], pool.y[k]);
            let c = self.flat(i, j);
            self.counts[c] += 1;
        }

        // ── Prefix sum → offsets ─────────────────────────────────────────────
        let mut running = 0u32;
        for c in 0..self.counts.len() {
            self.offsets[c] = running;
            running += self.counts[c];
        }

        // ── Pass 2: scatter ──────────────────────────────────────────────────
        self.counts.iter_mut().for_each(|c| *c = 0); // reuse as cursor

        for k in 0..n {
            let (i, j) = self.cell_of(world, pool.x[k], pool.y[k]);
            let c = self.flat(i, j);
            let slot = (self.offsets[c] + self.counts[c]) as usize;
            self.data[slot] = k as u32;
            self.counts[c] += 1;
        }
    }

    /// Boids currently filed under cell `(i, j)`.
    #[inline]
    pub fn cell(&self, i: usize, j: usize) -> &[u32] {
        let c = self.flat(i, j);
        let start = self.offsets[c] as usize;
        let end = start + self.counts[c] as usize;
        &self.data[start..end]
    }

    /// Cells overlapping a disk of `radius` around `(x, y)`.
    ///
    /// A square of half-width `ceil(radius · g / width)` cells (resp. height)
    /// around the center cell, wrapped mod g.  This is a superset of the disk;
    /// callers still need the exact distance check.
    pub fn cells_in_radius(&self, world: &World, x: f32, y: f32, radius: f32) -> CellSpan {
        let (ci, cj) = self.cell_of(world, x, y);
        let g = self.grid_size as f32;
        let ki = (radius * g / world.width).ceil();
        let kj = (radius * g / world.height).ceil();
        CellSpan {
            cols: AxisSpan::around(ci, ki, self.grid_size),
            rows: AxisSpan::around(cj, kj, self.grid_size),
        }
    }

    /// Call `callback(boid_idx)` for every boid in the cells covering the disk.
    ///
    /// Each boid is reported at most once.  Callers MUST still perform the
    /// exact distance check; the grid is a filter, not a guarantee.
    #[inline]
    pub fn query_radius<F>(&self, world: &World, x: f32, y: f32, radius: f32, mut callback: F)
    where
        F: FnMut(u32),
    {
        for (i, j) in self.cells_in_radius(world, x, y, radius).iter() {
            for &idx in self.cell(i, j) {
                callback(idx);
            }
        }
    }

    /// Boids in the cell containing `(x, y)`.
    pub fn density_at(&self, world: &World, x: f32, y: f32) -> usize {
        let (i, j) = self.cell_of(world, x, y);
        self.cell(i, j).len()
    }

    pub fn occupied_cells(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }
}

/// Contiguous run of cell coordinates along one axis, wrapping mod g.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisSpan {
    start: i64,
    count: usize,
    grid_size: usize,
}

impl AxisSpan {
    /// `center ± half`, or the whole axis once that reaches all the way round.
    fn around(center: usize, half: f32, grid_size: usize) -> Self {
        let g = grid_size as i64;
        // NaN / inf radius collapses to the full axis as well
        let full = !(half.is_finite() && 2.0 * half + 1.0 < grid_size as f32);
        if full {
            AxisSpan { start: 0, count: grid_size, grid_size }
        } else {
            let half = half.max(0.0) as i64;
            AxisSpan {
                start: center as i64 - half,
                count: (2 * half + 1).min(g) as usize,
                grid_size,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> {
        let AxisSpan { start, count, grid_size } = *self;
        let g = grid_size as i64;
        (0..count as i64).map(move |t| (start + t).rem_euclid(g) as usize)
    }
}

/// Rectangular (wrapped) block of cells returned by
/// [`UniformGrid::cells_in_radius`].  No cell appears twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSpan {
    pub cols: AxisSpan,
    pub rows: AxisSpan,
}

impl CellSpan {
    pub fn len(&self) -> usize {
        self.cols.len() * self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(i, j)` pairs, column-major.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> {
        let rows = self.rows;
        self.cols.iter().flat_map(move |i| rows.iter().map(move |j| (i, j)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swarm::pool::{BoidPool, BoidState};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn random_pool(n: usize, world: &World, seed: u64) -> BoidPool {
        let mut rng = StdRng::seed_from_u64(seed);
        BoidPool::spawn(n, world, 1.0, 8, &mut rng)
    }

    fn partition(grid: &UniformGrid) -> Vec<Vec<u32>> {
        let g = grid.grid_size();
        let mut cells = Vec::with_capacity(g * g);
        for j in 0..g {
            for i in 0..g {
                let mut c = grid.cell(i, j).to_vec();
                c.sort_unstable();
                cells.push(c);
            }
        }
        cells
    }

    #[test]
    fn cell_of_follows_the_floor_formula() {
        let world = World::new(100.0, 50.0);
        let grid = UniformGrid::new(10);
        assert_eq!(grid.cell_of(&world, 0.0, 0.0), (0, 0));
        assert_eq!(grid.cell_of(&world, 99.9, 49.9), (9, 9));
        assert_eq!(grid.cell_of(&world, 25.0, 12.0), (2, 2));
        // out of bounds positions still land in the grid
        assert_eq!(grid.cell_of(&world, 100.0, -1.0), (0, 9));
    }

    #[test]
    fn grid_size_is_clamped_to_a_sane_range() {
        assert_eq!(UniformGrid::new(0).grid_size(), 1);
        assert_eq!(UniformGrid::new(5_000_000).grid_size(), MAX_GRID_SIZE);
        assert_eq!(UniformGrid::new(usize::MAX).grid_size(), MAX_GRID_SIZE);
    }

    #[test]
    fn rebuild_files_every_boid_under_its_own_cell() {
        let world = World::new(300.0, 200.0);
        let pool = random_pool(1000, &world, 3);
        let mut grid = UniformGrid::new(24);
        grid.rebuild(&pool, &world);

        assert_eq!(grid.len(), 1000);
        let mut seen = vec![0u32; 1000];
        for j in 0..24 {
            for i in 0..24 {
                for &k in grid.cell(i, j) {
                    seen[k as usize] += 1;
                    let (x, y) = pool.position(k as usize);
                    assert_eq!(grid.cell_of(&world, x, y), (i, j));
                }
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn rebuild_is_a_pure_function_of_positions() {
        let world = World::new(150.0, 150.0);
        let pool = random_pool(400, &world, 11);
        let mut grid = UniformGrid::new(180);
        grid.rebuild(&pool, &world);
        let first = partition(&grid);
        grid.rebuild(&pool, &world);
        assert_eq!(first, partition(&grid));
    }

    #[test]
    fn rebuild_shrinks_with_the_population() {
        let world = World::new(100.0, 100.0);
        let mut grid = UniformGrid::new(8);
        grid.rebuild(&random_pool(50, &world, 1), &world);
        grid.rebuild(&random_pool(5, &world, 2), &world);
        assert_eq!(grid.len(), 5);
        let total: usize = (0..8).flat_map(|j| (0..8).map(move |i| (i, j)))
            .map(|(i, j)| grid.cell(i, j).len())
            .sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn span_wraps_across_the_grid_edge() {
        let world = World::new(100.0, 100.0);
        let grid = UniformGrid::new(10);
        // radius 10 → one cell either side
        let span = grid.cells_in_radius(&world, 1.0, 55.0, 10.0);
        let cols: Vec<usize> = span.cols.iter().collect();
        let rows: Vec<usize> = span.rows.iter().collect();
        assert_eq!(cols, vec![9, 0, 1]);
        assert_eq!(rows, vec![4, 5, 6]);
        assert_eq!(span.len(), 9);
    }

    #[test]
    fn huge_radius_visits_each_cell_once() {
        let world = World::new(100.0, 100.0);
        let grid = UniformGrid::new(6);
        let span = grid.cells_in_radius(&world, 50.0, 50.0, 80.0);
        let cells: Vec<(usize, usize)> = span.iter().collect();
        let unique: HashSet<(usize, usize)> = cells.iter().copied().collect();
        assert_eq!(cells.len(), 36);
        assert_eq!(unique.len(), 36);
    }

    #[test]
    fn query_radius_reports_each_candidate_once() {
        let world = World::new(40.0, 40.0);
        let states: Vec<BoidState> = (0..40)
            .map(|k| BoidState::heading(k as f32, (k * 7 % 40) as f32, 0.0, 1.0))
            .collect();
        let pool = BoidPool::from_states(&states, 4);
        let mut grid = UniformGrid::new(4);
        grid.rebuild(&pool, &world);

        let mut found = Vec::new();
        grid.query_radius(&world, 20.0, 20.0, 1000.0, |k| found.push(k));
        found.sort_unstable();
        assert_eq!(found, (0..40).collect::<Vec<u32>>());
    }

    #[test]
    fn density_and_occupancy() {
        let world = World::new(10.0, 10.0);
        let pool = BoidPool::from_states(
            &[
                BoidState::heading(1.0, 1.0, 0.0, 1.0),
                BoidState::heading(1.5, 1.2, 0.0, 1.0),
                BoidState::heading(8.0, 8.0, 0.0, 1.0),
            ],
            4,
        );
        let mut grid = UniformGrid::new(5);
        grid.rebuild(&pool, &world);
        assert_eq!(grid.density_at(&world, 1.9, 1.9), 2);
        assert_eq!(grid.density_at(&world, 5.0, 5.0), 0);
        assert_eq!(grid.occupied_cells(), 2);
    }
}
