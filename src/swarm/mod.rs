//! Flock Engine
//!
//! Grid-indexed flocking on a toroidal plane. Boid state is kept in
//! Struct-of-Arrays columns; a uniform grid rebuilt every tick turns each
//! perception query into a lookup over a handful of cells.

pub mod alignment;
pub mod controller;
pub mod grid;
pub mod master_pipeline;
pub mod metrics;
pub mod pool;
#[cfg(feature = "python")]
pub mod py_api;
pub mod snapshot;
pub mod spatial;
pub mod trail;
pub mod world;

pub use alignment::{AlignmentKernel, StagedHeading};
pub use controller::{SharedController, SimulationController};
pub use grid::UniformGrid;
pub use master_pipeline::{FlockEngine, StepPhase};
pub use metrics::{alignment as compute_alignment_metric, FrameStats};
pub use pool::{BoidPool, BoidState};
pub use snapshot::{BoidFrame, FrameSnapshot};
pub use spatial::NeighborQuery;
pub use trail::Trail;
pub use world::World;
