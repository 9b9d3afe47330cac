//! Flocking rule: heading alignment plus angular noise.
//!
//! A single rule: each boid steers toward the mean direction of everything in
//! its perception radius, itself included. There are no separation or
//! cohesion terms. Headings go through `atan2` → `cos/sin` so the committed
//! speed is always exactly `speed`.

use super::spatial::NeighborQuery;
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// What the query phase decided for one boid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StagedHeading {
    /// No neighbors: the staged velocity stays as it was.
    Keep,
    /// Steer to this heading (radians).
    Align(f32),
    /// Neighbor velocities cancelled out exactly; pick a random heading.
    Scatter,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decision {
    pub heading: StagedHeading,
    pub neighbors: u32,
}

/// Rule weights for one frame, copied from the live config at the start of
/// the query phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignmentKernel {
    pub speed: f32,
    pub noise_degrees: f32,
}

impl AlignmentKernel {
    pub fn new(speed: f32, noise_degrees: f32) -> Self {
        AlignmentKernel { speed, noise_degrees }
    }

    #[inline]
    pub fn noise_radians(&self) -> f32 {
        self.noise_degrees * PI / 180.0
    }

    /// Average the velocities of `idx`'s neighbors and turn the mean into a
    /// heading. Reads only.
    pub fn decide(&self, query: &NeighborQuery<'_>, idx: usize) -> Decision {
        let pool = query.pool();
        let mut sum_x = 0.0f32;
        let mut sum_y = 0.0f32;
        let mut count = 0u32;
        query.for_each_neighbor(idx, |j| {
            sum_x += pool.vx[j];
            sum_y += pool.vy[j];
            count += 1;
        });

        if count == 0 {
            return Decision { heading: StagedHeading::Keep, neighbors: 0 };
        }

        let avg_x = sum_x / count as f32;
        let avg_y = sum_y / count as f32;
        let heading = if avg_x == 0.0 && avg_y == 0.0 {
            StagedHeading::Scatter
        } else {
            StagedHeading::Align(avg_y.atan2(avg_x))
        };
        Decision { heading, neighbors: count }
    }

    /// Velocity of magnitude `speed` along `heading`.
    #[inline]
    pub fn velocity_for(&self, heading: f32) -> (f32, f32) {
        (heading.cos() * self.speed, heading.sin() * self.speed)
    }

    /// Resolve a staged decision into a velocity. `current` is the previously
    /// staged value, returned untouched for [`StagedHeading::Keep`].
    pub fn resolve<R: Rng + ?Sized>(&self, heading: StagedHeading, current: (f32, f32), rng: &mut R) -> (f32, f32) {
        match heading {
            StagedHeading::Keep => current,
            StagedHeading::Align(angle) => self.velocity_for(angle),
            StagedHeading::Scatter => self.velocity_for(rng.gen::<f32>() * TAU),
        }
    }

    /// Rotate `(vx, vy)` by a uniform angle in `[-noise/2, +noise/2)` and
    /// renormalize to `speed`.
    pub fn perturb<R: Rng + ?Sized>(&self, vx: f32, vy: f32, rng: &mut R) -> (f32, f32) {
        let noise = self.noise_radians();
        let heading = vy.atan2(vx);
        let heading = (heading + rng.gen::<f32>() * noise - noise / 2.0).rem_euclid(TAU);
        self.velocity_for(heading)
    }
}
