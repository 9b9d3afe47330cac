//! boidgrid core - grid-indexed flocking simulation
//!
//! Boids move on a wraparound 2D plane and steer toward the mean heading of
//! everything within their perception radius. A uniform grid, rebuilt every
//! tick, keeps each perception query near constant time.
//!
//! Frames run in four strictly ordered phases: query (read-only against the
//! grid built from last frame's positions), commit, move, reindex. Parameter
//! changes go through [`swarm::SimulationController`] between frames.

pub mod core;
pub mod swarm;

pub use crate::core::config::{ConfigError, FlockConfig, NeighborStrategy, ParamError, Parameter};
pub use swarm::{FlockEngine, FrameSnapshot, FrameStats, SharedController, SimulationController, World};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Install a `tracing` subscriber. `level` takes an env-filter directive
/// such as `"info"` or `"boidgrid_core=debug"`.
pub fn init_tracing(level: &str) {
    let _ = tracing_subscriber::fmt().with_env_filter(level).try_init();
}

/// Initialize tracing for the library.
#[cfg(feature = "python")]
#[pyfunction]
pub fn setup_logging(level: Option<String>) {
    init_tracing(level.as_deref().unwrap_or("info"));
}

/// Python module initialization
#[cfg(feature = "python")]
#[pymodule]
fn boidgrid_core(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(setup_logging, m)?)?;
    m.add_class::<swarm::py_api::PyFlock>()?;
    Ok(())
}
