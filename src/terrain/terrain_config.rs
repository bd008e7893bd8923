// src/terrain/terrain_config.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::terrain::noise::{NoiseParameters, NoiseType};

/// Rejected configuration. Always fatal: the engine refuses to start rather
/// than run with undefined geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("ring radius must be positive, got {0}")]
    InvalidRingRadius(f32),
    #[error("chunk width {width} does not fit on a ring of radius {radius}")]
    ChordUndefined { width: f32, radius: f32 },
    #[error("chunk {axis} must be positive, got {value}")]
    InvalidChunkExtent { axis: &'static str, value: f32 },
    #[error("vertex resolution must be at least 1")]
    ZeroResolution,
    #[error("noise scale must be positive, got {0}")]
    InvalidNoiseScale(f32),
    #[error("target chunk count must be at least 1")]
    ZeroTargetChunkCount,
    #[error("{name} growth boundary must have near < far (near {near}, far {far})")]
    InvertedGrowthBoundary { name: &'static str, near: f32, far: f32 },
    #[error("vegetation probability must be within [0, 1], got {0}")]
    InvalidVegetationProbability(f32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Forward distances (world +X, viewpoint at the origin) gating each reveal.
///
/// Each pair is read as the half-open band `[near, far)`: fully revealed in
/// front of `near`, untouched at or beyond `far`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthBoundaries {
    pub height_far: f32,
    pub height_near: f32,
    pub color_far: f32,
    pub color_near: f32,
    pub flora_far: f32,
    pub flora_near: f32,
}

impl Default for GrowthBoundaries {
    fn default() -> Self {
        Self {
            height_far: 600.0,
            height_near: 300.0,
            color_far: 550.0,
            color_near: 250.0,
            flora_far: 350.0,
            flora_near: 150.0,
        }
    }
}

impl GrowthBoundaries {
    pub fn validate(&self) -> ConfigResult<()> {
        let pairs = [
            ("height", self.height_near, self.height_far),
            ("color", self.color_near, self.color_far),
            ("flora", self.flora_near, self.flora_far),
        ];
        for (name, near, far) in pairs {
            if !(near < far) {
                return Err(ConfigError::InvertedGrowthBoundary { name, near, far });
            }
        }
        Ok(())
    }

    /// Closest `near` threshold. A chunk entirely in front of it is fully revealed.
    pub fn nearest(&self) -> f32 {
        self.height_near.min(self.color_near).min(self.flora_near)
    }
}

/// Engine configuration. Read at construction, a few fields may be changed
/// live through the chunk manager's setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    // Ring geometry
    pub ring_radius: f32,
    pub chunk_width: f32,
    pub chunk_height: f32,
    /// Grid segments per world unit.
    pub resolution: u32,

    // Generation
    pub seed: u32,
    pub noise_type: NoiseType,
    pub noise_scale: f32,
    pub noise_strength: f32,
    pub vegetation_probability: f32,

    // Streaming
    pub target_chunk_count: usize,
    pub speed: f32,
    pub breathing_rate: f32,
    pub growth_boundaries: GrowthBoundaries,
    /// Forward position the trailing edge of the oldest chunk must reach
    /// before it is retired.
    pub retire_distance: f32,

    // Performance tuning
    pub use_parallel_processing: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            ring_radius: 1000.0,
            chunk_width: 30.0,
            chunk_height: 150.0,
            resolution: 1,
            seed: 3,
            noise_type: NoiseType::OpenSimplex,
            noise_scale: 50.0,
            noise_strength: 40.0,
            vegetation_probability: 0.01,
            target_chunk_count: 39,
            speed: 0.1,
            breathing_rate: 0.0,
            growth_boundaries: GrowthBoundaries::default(),
            retire_distance: 0.0,
            use_parallel_processing: false,
        }
    }
}

impl TerrainConfig {
    /// Check every relationship the ring geometry and the generator rely on.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.ring_radius > 0.0) {
            return Err(ConfigError::InvalidRingRadius(self.ring_radius));
        }
        if !(self.chunk_width > 0.0) {
            return Err(ConfigError::InvalidChunkExtent { axis: "width", value: self.chunk_width });
        }
        if !(self.chunk_height > 0.0) {
            return Err(ConfigError::InvalidChunkExtent { axis: "height", value: self.chunk_height });
        }
        if self.chunk_width > 2.0 * self.ring_radius {
            return Err(ConfigError::ChordUndefined {
                width: self.chunk_width,
                radius: self.ring_radius,
            });
        }
        if self.resolution == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        if !(self.noise_scale > 0.0) {
            return Err(ConfigError::InvalidNoiseScale(self.noise_scale));
        }
        if self.target_chunk_count == 0 {
            return Err(ConfigError::ZeroTargetChunkCount);
        }
        if !(0.0..=1.0).contains(&self.vegetation_probability) {
            return Err(ConfigError::InvalidVegetationProbability(self.vegetation_probability));
        }
        self.growth_boundaries.validate()
    }

    /// Central angle subtended by one chunk width:
    /// `2 * asin(width / (2 * radius))`.
    pub fn chord_angle(&self) -> ConfigResult<f32> {
        let ratio = self.chunk_width / (2.0 * self.ring_radius);
        if !(self.ring_radius > 0.0) || !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::ChordUndefined {
                width: self.chunk_width,
                radius: self.ring_radius,
            });
        }
        Ok(2.0 * ratio.asin())
    }

    /// Grid segment counts along the forward and lateral axes.
    pub fn segments(&self) -> (usize, usize) {
        let res = self.resolution.max(1) as f32;
        let seg_x = (self.chunk_width * res).round().max(1.0) as usize;
        let seg_y = (self.chunk_height * res).round().max(1.0) as usize;
        (seg_x, seg_y)
    }

    pub fn noise_parameters(&self) -> NoiseParameters {
        NoiseParameters::new(self.seed, self.noise_type, self.noise_scale as f64)
    }

    /// Slow, flat landscape with a gentle breath.
    pub fn calm_preset() -> Self {
        TerrainConfig {
            noise_scale: 80.0,
            noise_strength: 25.0,
            breathing_rate: 0.5,
            speed: 0.05,
            ..Self::default()
        }
    }

    /// Tall, busy terrain with denser vegetation.
    pub fn rugged_preset() -> Self {
        TerrainConfig {
            noise_scale: 30.0,
            noise_strength: 70.0,
            vegetation_probability: 0.02,
            speed: 0.2,
            ..Self::default()
        }
    }
}
