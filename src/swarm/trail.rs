use super::world::World;
use std::collections::VecDeque;

/// Bounded position history for one boid. Oldest points are evicted first.
///
/// Only renderers read this; the flocking math never does.
#[derive(Clone, Debug)]
pub struct Trail {
    points: VecDeque<[f32; 2]>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Trail {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, x: f32, y: f32) {
        if self.capacity == 0 {
            return;
        }
        while self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back([x, y]);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn points(&self) -> impl Iterator<Item = &[f32; 2]> {
        self.points.iter()
    }

    /// Split the trail into polylines that a renderer can stroke directly.
    ///
    /// A new polyline starts wherever two consecutive points sit half a span
    /// or more apart on either axis; that jump is a seam crossing, and drawing
    /// it would streak a line across the whole world.
    pub fn segments(&self, world: &World) -> Vec<Vec<[f32; 2]>> {
        let half_w = world.width / 2.0;
        let half_h = world.height / 2.0;

        let mut segments = Vec::new();
        let mut current: Vec<[f32; 2]> = Vec::new();
        for &p in &self.points {
            if let Some(prev) = current.last() {
                let jump = (prev[0] - p[0]).abs() >= half_w || (prev[1] - p[1]).abs() >= half_h;
                if jump {
                    segments.push(std::mem::take(&mut current));
                }
            }
            current.push(p);
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut trail = Trail::new(3);
        for i in 0..5 {
            trail.push(i as f32, 0.0);
        }
        assert_eq!(trail.len(), 3);
        let xs: Vec<f32> = trail.points().map(|p| p[0]).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn seam_crossing_splits_the_polyline() {
        let world = World::new(100.0, 100.0);
        let mut trail = Trail::new(50);
        trail.push(96.0, 50.0);
        trail.push(98.0, 50.0);
        trail.push(0.5, 50.0);
        trail.push(2.5, 50.0);

        let segments = trail.segments(&world);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], vec![[96.0, 50.0], [98.0, 50.0]]);
        assert_eq!(segments[1], vec![[0.5, 50.0], [2.5, 50.0]]);
    }

    #[test]
    fn empty_trail_has_no_segments() {
        let world = World::new(10.0, 10.0);
        assert!(Trail::new(4).segments(&world).is_empty());
    }
}
