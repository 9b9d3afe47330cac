//! Flock configuration
//!
//! The parameter set a simulation runs with, the rules that keep it valid,
//! and the named-parameter update path used by UI layers. Everything here
//! runs at the configuration boundary: the engine assumes the values it is
//! handed already passed [`FlockConfig::validate`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Largest population a flock may hold. Grid cells store boid indices as
/// `u32`, and spawning allocates every column up front.
pub const MAX_BOIDS: usize = 10_000_000;

/// Largest cells-per-axis for the spatial index (`g * g` cells are allocated).
pub const MAX_GRID_SIZE: usize = 4096;

/// Rejected configuration value. The previous value is always retained.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("invalid value {value} for {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("could not parse '{value}' as a number for {name}")]
    Unparseable { name: &'static str, value: String },
}

/// Failure loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ParamError),
}

/// How candidate neighbors are gathered before the exact distance filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborStrategy {
    /// Uniform grid lookup over the cells covering the perception disk.
    #[default]
    Grid,
    /// Scan the whole population. O(n²) per frame.
    FullScan,
}

/// Simulation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    pub num_boids: usize,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    /// Perception radius.
    pub visual_range: f32,
    /// Full width of the random angular perturbation, in degrees.
    pub noise_degrees: f32,
    /// Cells per axis of the spatial index.
    pub grid_size: usize,
    pub trail_length: usize,
    pub draw_trail: bool,
    pub neighbor_strategy: NeighborStrategy,
    /// Fixed RNG seed; `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for FlockConfig {
    fn default() -> Self {
        FlockConfig {
            num_boids: 100,
            width: 150.0,
            height: 150.0,
            speed: 5.0,
            visual_range: 30.0,
            noise_degrees: 140.0,
            grid_size: 180,
            trail_length: 50,
            draw_trail: false,
            neighbor_strategy: NeighborStrategy::Grid,
            seed: None,
        }
    }
}

impl FlockConfig {
    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: FlockConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    #[inline]
    pub fn range_squared(&self) -> f32 {
        self.visual_range * self.visual_range
    }

    /// Check every field against its domain.
    pub fn validate(&self) -> Result<(), ParamError> {
        Parameter::NumBoids(self.num_boids).validate()?;
        Parameter::Speed(self.speed).validate()?;
        Parameter::VisualRange(self.visual_range).validate()?;
        Parameter::Noise(self.noise_degrees).validate()?;
        check_extent("width", self.width)?;
        check_extent("height", self.height)?;
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(invalid("grid_size", self.grid_size, "must be between 1 and 4096"));
        }
        if self.trail_length == 0 {
            return Err(invalid("trail_length", self.trail_length, "must be at least 1"));
        }
        Ok(())
    }

    /// Validate `param` and store it. On error `self` is untouched.
    pub fn apply(&mut self, param: Parameter) -> Result<(), ParamError> {
        param.validate()?;
        match param {
            Parameter::NumBoids(n) => self.num_boids = n,
            Parameter::Speed(v) => self.speed = v,
            Parameter::VisualRange(v) => self.visual_range = v,
            Parameter::Noise(v) => self.noise_degrees = v,
        }
        Ok(())
    }
}

/// A single settable parameter with its new value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Parameter {
    NumBoids(usize),
    Speed(f32),
    VisualRange(f32),
    Noise(f32),
}

impl Parameter {
    pub fn name(&self) -> &'static str {
        match self {
            Parameter::NumBoids(_) => "num_boids",
            Parameter::Speed(_) => "speed",
            Parameter::VisualRange(_) => "visual_range",
            Parameter::Noise(_) => "noise",
        }
    }

    /// Build a parameter from a name and a raw text value, as a form field
    /// would deliver them. Both camelCase and snake_case names are accepted.
    pub fn parse(name: &str, value: &str) -> Result<Self, ParamError> {
        let key = match name.trim() {
            "numBoids" | "num_boids" => "num_boids",
            "speed" => "speed",
            "visualRange" | "visual_range" | "range" => "visual_range",
            "noise" | "noise_degrees" => "noise",
            other => return Err(ParamError::UnknownParameter(other.to_string())),
        };

        let number: f64 = value.trim().parse().map_err(|_| ParamError::Unparseable {
            name: key,
            value: value.to_string(),
        })?;

        let param = match key {
            "num_boids" => {
                if !number.is_finite() || number < 0.0 || number.fract() != 0.0 {
                    return Err(invalid(key, value, "must be a non-negative integer"));
                }
                if number > MAX_BOIDS as f64 {
                    return Err(invalid(key, value, "must be at most 10000000"));
                }
                Parameter::NumBoids(number as usize)
            }
            "speed" => Parameter::Speed(number as f32),
            "visual_range" => Parameter::VisualRange(number as f32),
            _ => Parameter::Noise(number as f32),
        };
        param.validate()?;
        Ok(param)
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        match *self {
            Parameter::NumBoids(n) => {
                if n <= MAX_BOIDS {
                    Ok(())
                } else {
                    Err(invalid("num_boids", n, "must be at most 10000000"))
                }
            }
            Parameter::Speed(v) => {
                if v.is_finite() && v > 0.0 {
                    Ok(())
                } else {
                    Err(invalid("speed", v, "must be finite and greater than zero"))
                }
            }
            Parameter::VisualRange(v) => {
                if v.is_finite() && v > 0.0 {
                    Ok(())
                } else {
                    Err(invalid("visual_range", v, "must be finite and greater than zero"))
                }
            }
            Parameter::Noise(v) => {
                if v.is_finite() && (0.0..=360.0).contains(&v) {
                    Ok(())
                } else {
                    Err(invalid("noise", v, "must be between 0 and 360 degrees"))
                }
            }
        }
    }
}

/// World extents must be finite and positive.
pub fn check_extent(name: &'static str, value: f32) -> Result<(), ParamError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(name, value, "must be finite and greater than zero"))
    }
}

fn invalid(name: &'static str, value: impl ToString, reason: &'static str) -> ParamError {
    ParamError::InvalidParameter {
        name,
        value: value.to_string(),
        reason,
    }
}
