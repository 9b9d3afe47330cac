//! Boid population in Struct-of-Arrays layout.
//!
//! Positions and velocities live in parallel columns so the neighbor sums in
//! the query phase walk contiguous memory. The staged velocity columns hold
//! what the flocking rule decided this frame until the commit phase copies
//! them over.

use super::trail::Trail;
use super::world::World;
use rand::Rng;
use std::f32::consts::TAU;

/// Plain per-boid state, used to seed a pool with known positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoidState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl BoidState {
    /// A boid at `(x, y)` heading `angle` radians at `speed`.
    pub fn heading(x: f32, y: f32, angle: f32, speed: f32) -> Self {
        BoidState {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
        }
    }
}

pub struct BoidPool {
    pub n_agents: usize,

    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub vx: Vec<f32>,
    pub vy: Vec<f32>,

    // Written by the query phase, read by the commit phase
    pub next_vx: Vec<f32>,
    pub next_vy: Vec<f32>,

    pub trails: Vec<Trail>,
}

impl BoidPool {
    /// Uniformly random positions inside `world`, uniformly random headings at
    /// magnitude `speed`.
    pub fn spawn<R: Rng + ?Sized>(
        n_agents: usize,
        world: &World,
        speed: f32,
        trail_length: usize,
        rng: &mut R,
    ) -> Self {
        let states: Vec<BoidState> = (0..n_agents)
            .map(|_| {
                let angle = rng.gen::<f32>() * TAU;
                let x = rng.gen::<f32>() * world.width;
                let y = rng.gen::<f32>() * world.height;
                let (x, y) = world.wrap(x, y);
                BoidState::heading(x, y, angle, speed)
            })
            .collect();
        Self::from_states(&states, trail_length)
    }

    /// Build a pool from explicit states. Staged velocities start equal to the
    /// current ones.
    pub fn from_states(states: &[BoidState], trail_length: usize) -> Self {
        let n = states.len();
        let mut pool = BoidPool {
            n_agents: n,
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            vx: Vec::with_capacity(n),
            vy: Vec::with_capacity(n),
            next_vx: Vec::with_capacity(n),
            next_vy: Vec::with_capacity(n),
            trails: (0..n).map(|_| Trail::new(trail_length)).collect(),
        };
        for s in states {
            pool.x.push(s.x);
            pool.y.push(s.y);
            pool.vx.push(s.vx);
            pool.vy.push(s.vy);
            pool.next_vx.push(s.vx);
            pool.next_vy.push(s.vy);
        }
        pool
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n_agents
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_agents == 0
    }

    #[inline]
    pub fn position(&self, i: usize) -> (f32, f32) {
        (self.x[i], self.y[i])
    }

    #[inline]
    pub fn velocity(&self, i: usize) -> (f32, f32) {
        (self.vx[i], self.vy[i])
    }

    /// Direction of travel in radians, as renderers orient the boid.
    #[inline]
    pub fn heading(&self, i: usize) -> f32 {
        self.vy[i].atan2(self.vx[i])
    }

    pub fn state(&self, i: usize) -> BoidState {
        BoidState {
            x: self.x[i],
            y: self.y[i],
            vx: self.vx[i],
            vy: self.vy[i],
        }
    }
}
