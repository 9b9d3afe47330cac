//! Simulation controller
//!
//! The single mutation point for a running flock. UI callbacks, resize
//! handlers and the frame driver all go through here, between ticks, so a
//! parameter change is always picked up whole at the next query phase.

use super::master_pipeline::FlockEngine;
use super::metrics::{self, FrameStats};
use super::snapshot::FrameSnapshot;
use crate::core::config::{check_extent, FlockConfig, ParamError, Parameter};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

pub struct SimulationController {
    config: FlockConfig,
    engine: FlockEngine,
}

impl SimulationController {
    pub fn new(config: FlockConfig) -> Result<Self, ParamError> {
        config.validate()?;
        let engine = FlockEngine::new(&config);
        Ok(SimulationController { config, engine })
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    pub fn engine(&self) -> &FlockEngine {
        &self.engine
    }

    /// Run one frame with the current parameters.
    pub fn step(&mut self) -> FrameStats {
        self.engine.tick(&self.config)
    }

    /// Apply a validated update. A rejected value is logged and the old one
    /// stays in effect. A population change respawns every boid.
    pub fn set_parameter(&mut self, param: Parameter) -> Result<(), ParamError> {
        let mut next = self.config.clone();
        if let Err(e) = next.apply(param) {
            warn!("🚫 [Controller] Rejected update: {}", e);
            return Err(e);
        }
        info!("⚙️  [Controller] {} -> {:?}", param.name(), param);
        // Respawn against the candidate config; it is stored only afterwards
        if let Parameter::NumBoids(_) = param {
            self.engine.reinitialize(&next);
        }
        self.config = next;
        Ok(())
    }

    /// Form-field flavoured update: parameter name plus raw text.
    pub fn set_parameter_str(&mut self, name: &str, value: &str) -> Result<Parameter, ParamError> {
        let param = Parameter::parse(name, value).map_err(|e| {
            warn!("🚫 [Controller] Rejected update: {}", e);
            e
        })?;
        self.set_parameter(param)?;
        Ok(param)
    }

    /// New world bounds. Boids are not moved or rescaled.
    pub fn on_resize(&mut self, width: f32, height: f32) -> Result<(), ParamError> {
        if let Err(e) = check_extent("width", width).and_then(|_| check_extent("height", height)) {
            warn!("🚫 [Controller] Rejected resize: {}", e);
            return Err(e);
        }
        self.config.width = width;
        self.config.height = height;
        self.engine.resize(width, height);
        Ok(())
    }

    /// Respawn the population with the current parameters.
    pub fn reset(&mut self) {
        self.engine.reinitialize(&self.config);
    }

    /// Flip trail drawing; returns the new state.
    pub fn toggle_trail(&mut self) -> bool {
        self.config.draw_trail = !self.config.draw_trail;
        self.config.draw_trail
    }

    pub fn alignment(&self) -> f32 {
        metrics::alignment(&self.engine.pool, self.config.speed)
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(&self.engine, self.config.draw_trail)
    }
}

/// Controller shared between a frame driver and a configuration source on
/// different threads. One lock covers parameters and population together.
#[derive(Clone)]
pub struct SharedController {
    inner: Arc<Mutex<SimulationController>>,
}

impl SharedController {
    pub fn new(config: FlockConfig) -> Result<Self, ParamError> {
        Ok(SharedController {
            inner: Arc::new(Mutex::new(SimulationController::new(config)?)),
        })
    }

    pub fn step(&self) -> FrameStats {
        self.inner.lock().step()
    }

    pub fn set_parameter(&self, param: Parameter) -> Result<(), ParamError> {
        self.inner.lock().set_parameter(param)
    }

    pub fn set_parameter_str(&self, name: &str, value: &str) -> Result<Parameter, ParamError> {
        self.inner.lock().set_parameter_str(name, value)
    }

    pub fn on_resize(&self, width: f32, height: f32) -> Result<(), ParamError> {
        self.inner.lock().on_resize(width, height)
    }

    pub fn reset(&self) {
        self.inner.lock().reset()
    }

    pub fn toggle_trail(&self) -> bool {
        self.inner.lock().toggle_trail()
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        self.inner.lock().snapshot()
    }

    /// Run `f` with the lock held.
    pub fn with<T>(&self, f: impl FnOnce(&mut SimulationController) -> T) -> T {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn controller(n: usize) -> SimulationController {
        SimulationController::new(FlockConfig { num_boids: n, seed: Some(99), ..FlockConfig::default() }).unwrap()
    }

    #[test]
    fn invalid_config_is_refused() {
        let cfg = FlockConfig { speed: -1.0, ..FlockConfig::default() };
        assert!(SimulationController::new(cfg).is_err());
    }

    #[test]
    fn num_boids_update_respawns_population() {
        let mut ctl = controller(20);
        ctl.step();
        ctl.set_parameter(Parameter::NumBoids(45)).unwrap();
        assert_eq!(ctl.engine().pool.len(), 45);
        assert_eq!(ctl.engine().global_tick, 0);
    }

    #[test]
    fn rejected_update_keeps_old_value() {
        let mut ctl = controller(10);
        assert!(ctl.set_parameter_str("visualRange", "-5").is_err());
        assert!(ctl.set_parameter_str("speed", "fast").is_err());
        assert_eq!(ctl.config().visual_range, 30.0);
        assert_eq!(ctl.config().speed, 5.0);
        assert_eq!(ctl.engine().pool.len(), 10);
    }

    #[test]
    fn oversized_population_is_refused_and_old_flock_kept() {
        let mut ctl = controller(12);
        let err = ctl.set_parameter_str("numBoids", "1e20").unwrap_err();
        assert!(matches!(err, ParamError::InvalidParameter { name: "num_boids", .. }));
        assert!(ctl.set_parameter(Parameter::NumBoids(usize::MAX)).is_err());
        assert_eq!(ctl.config().num_boids, 12);
        assert_eq!(ctl.engine().pool.len(), 12);

        ctl.reset();
        assert_eq!(ctl.engine().pool.len(), 12);
    }

    #[test]
    fn population_change_stores_config_with_matching_pool() {
        let mut ctl = controller(12);
        ctl.set_parameter(Parameter::NumBoids(30)).unwrap();
        assert_eq!(ctl.config().num_boids, 30);
        assert_eq!(ctl.engine().pool.len(), ctl.config().num_boids);
        assert_eq!(ctl.engine().grid.len(), 30);
    }

    #[test]
    fn speed_change_applies_at_next_step() {
        let mut ctl = controller(30);
        ctl.set_parameter_str("speed", "2.5").unwrap();
        ctl.step();
        for i in 0..30 {
            let (vx, vy) = ctl.engine().pool.velocity(i);
            assert!(((vx * vx + vy * vy).sqrt() - 2.5).abs() < 1e-4);
        }
        assert!((0.0..=1.0).contains(&ctl.alignment()));
    }

    #[test]
    fn resize_updates_bounds_without_moving_boids() {
        let mut ctl = controller(15);
        let before = ctl.engine().pool.x.clone();
        ctl.on_resize(40.0, 30.0).unwrap();
        assert_eq!(ctl.engine().pool.x, before);
        assert_eq!(ctl.config().width, 40.0);

        ctl.step();
        let world = ctl.engine().world;
        for i in 0..15 {
            let (x, y) = ctl.engine().pool.position(i);
            assert!(world.contains(x, y));
        }

        assert!(ctl.on_resize(0.0, 30.0).is_err());
        assert_eq!(ctl.config().width, 40.0);
    }

    #[test]
    fn toggle_trail_and_reset() {
        let mut ctl = controller(8);
        ctl.step();
        assert!(ctl.snapshot().boids[0].trail.is_none());
        assert!(ctl.toggle_trail());
        assert!(ctl.snapshot().boids[0].trail.is_some());

        ctl.reset();
        assert_eq!(ctl.engine().pool.len(), 8);
        assert!(ctl.engine().pool.trails.iter().all(|t| t.is_empty()));
    }

    #[test]
    fn shared_controller_serializes_updates_and_ticks() {
        let shared = SharedController::new(FlockConfig {
            num_boids: 50,
            seed: Some(5),
            ..FlockConfig::default()
        })
        .unwrap();

        let driver = {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    shared.step();
                }
            })
        };
        for noise in [0.0f32, 90.0, 180.0, 360.0] {
            shared.set_parameter(Parameter::Noise(noise)).unwrap();
        }
        driver.join().unwrap();

        let tick = shared.with(|c| c.engine().global_tick);
        assert_eq!(tick, 50);
        assert_eq!(shared.with(|c| c.config().noise_degrees), 360.0);
        assert_eq!(shared.snapshot().boids.len(), 50);
    }

    #[test]
    fn shared_controller_forwards_reset_and_trail_toggle() {
        let shared = SharedController::new(FlockConfig {
            num_boids: 10,
            seed: Some(8),
            ..FlockConfig::default()
        })
        .unwrap();
        shared.step();
        assert!(shared.toggle_trail());
        assert!(shared.snapshot().boids[0].trail.is_some());
        assert!(!shared.toggle_trail());

        shared.reset();
        assert_eq!(shared.with(|c| c.engine().global_tick), 0);
        assert!(shared.with(|c| c.engine().pool.trails.iter().all(|t| t.is_empty())));
    }
}
