//! Configuration shared by the engine, the controller and the bindings.

pub mod config;

pub use config::{ConfigError, FlockConfig, NeighborStrategy, ParamError, Parameter};
