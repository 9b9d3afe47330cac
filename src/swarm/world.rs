//! Toroidal world geometry.
//!
//! Opposite edges are identified, so every distance used for proximity is the
//! shortest displacement across the seams.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
}

impl World {
    pub fn new(width: f32, height: f32) -> Self {
        World { width, height }
    }

    /// Change the bounds. Existing positions are not rescaled.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        (0.0..self.width).contains(&x) && (0.0..self.height).contains(&y)
    }

    /// Bring a position back into `[0,width) x [0,height)`.
    #[inline]
    pub fn wrap(&self, x: f32, y: f32) -> (f32, f32) {
        (wrap_axis(x, self.width), wrap_axis(y, self.height))
    }

    /// Shortest signed displacement from `b` to `a`.
    #[inline]
    pub fn toroidal_delta(&self, a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
        let dx = a.0 - b.0;
        let dy = a.1 - b.1;
        (
            dx - self.width * (dx / self.width).round(),
            dy - self.height * (dy / self.height).round(),
        )
    }

    #[inline]
    pub fn toroidal_distance_squared(&self, a: (f32, f32), b: (f32, f32)) -> f32 {
        let (dx, dy) = self.toroidal_delta(a, b);
        dx * dx + dy * dy
    }
}

/// One span of correction covers any per-frame displacement. Anything further
/// out (after a shrinking resize) falls back to the euclidean remainder.
#[inline]
fn wrap_axis(v: f32, span: f32) -> f32 {
    let mut v = v;
    if v < 0.0 {
        v += span;
    } else if v >= span {
        v -= span;
    }
    if !(0.0..span).contains(&v) {
        v = v.rem_euclid(span);
    }
    // -1e-9 + span rounds up to span in f32
    if v >= span {
        0.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_takes_the_short_way_across_the_seam() {
        let world = World::new(100.0, 100.0);
        let (dx, dy) = world.toroidal_delta((1.0, 1.0), (99.0, 99.0));
        assert!((dx - 2.0).abs() < 1e-4, "dx = {}", dx);
        assert!((dy - 2.0).abs() < 1e-4, "dy = {}", dy);

        let (dx, dy) = world.toroidal_delta((99.0, 99.0), (1.0, 1.0));
        assert!((dx + 2.0).abs() < 1e-4);
        assert!((dy + 2.0).abs() < 1e-4);
    }

    #[test]
    fn delta_is_plain_difference_away_from_the_seam() {
        let world = World::new(200.0, 80.0);
        let (dx, dy) = world.toroidal_delta((60.0, 30.0), (40.0, 50.0));
        assert!((dx - 20.0).abs() < 1e-4);
        assert!((dy + 20.0).abs() < 1e-4);
        assert!((world.toroidal_distance_squared((60.0, 30.0), (40.0, 50.0)) - 800.0).abs() < 1e-2);
    }

    #[test]
    fn wrap_adds_or_subtracts_one_span() {
        let world = World::new(150.0, 100.0);
        assert_eq!(world.wrap(-3.0, 104.0), (147.0, 4.0));
        assert_eq!(world.wrap(150.0, 100.0), (0.0, 0.0));
        assert_eq!(world.wrap(20.0, 30.0), (20.0, 30.0));
    }

    #[test]
    fn wrap_handles_far_outside_and_rounding() {
        let world = World::new(50.0, 50.0);
        let (x, y) = world.wrap(180.0, -130.0);
        assert!(world.contains(x, y));
        assert!((x - 30.0).abs() < 1e-4);
        assert!((y - 20.0).abs() < 1e-4);

        let (x, _) = world.wrap(-1e-9, 1.0);
        assert!(world.contains(x, 1.0));
    }
}
