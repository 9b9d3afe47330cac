use super::controller::SimulationController;
use crate::core::config::{FlockConfig, ParamError};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

impl From<ParamError> for PyErr {
    fn from(e: ParamError) -> Self {
        PyValueError::new_err(e.to_string())
    }
}

#[pyclass]
pub struct PyFlock {
    controller: SimulationController,
}

#[pymethods]
impl PyFlock {
    #[new]
    #[pyo3(signature = (num_boids=100, width=150.0, height=150.0, speed=5.0, visual_range=30.0, noise=140.0, seed=None))]
    pub fn new(
        num_boids: usize,
        width: f32,
        height: f32,
        speed: f32,
        visual_range: f32,
        noise: f32,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let config = FlockConfig {
            num_boids,
            width,
            height,
            speed,
            visual_range,
            noise_degrees: noise,
            seed,
            ..FlockConfig::default()
        };
        Ok(Self {
            controller: SimulationController::new(config)?,
        })
    }

    /// Advance one frame. Returns the alignment metric after the move.
    pub fn tick(&mut self) -> f32 {
        self.controller.step().alignment
    }

    /// Update `numBoids`, `speed`, `visualRange` or `noise` from text.
    pub fn set_parameter(&mut self, name: &str, value: &str) -> PyResult<()> {
        self.controller.set_parameter_str(name, value)?;
        Ok(())
    }

    pub fn resize(&mut self, width: f32, height: f32) -> PyResult<()> {
        self.controller.on_resize(width, height)?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    pub fn toggle_trail(&mut self) -> bool {
        self.controller.toggle_trail()
    }

    pub fn alignment(&self) -> f32 {
        self.controller.alignment()
    }

    #[getter]
    pub fn tick_count(&self) -> u64 {
        self.controller.engine().global_tick
    }

    /// `(xs, ys)` position columns.
    pub fn positions(&self) -> (Vec<f32>, Vec<f32>) {
        let pool = &self.controller.engine().pool;
        (pool.x.clone(), pool.y.clone())
    }

    pub fn headings(&self) -> Vec<f32> {
        let pool = &self.controller.engine().pool;
        (0..pool.n_agents).map(|i| pool.heading(i)).collect()
    }

    /// Full frame (positions, headings, trails when enabled) as JSON.
    pub fn snapshot_json(&self) -> PyResult<String> {
        self.controller
            .snapshot()
            .to_json()
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }
}
