// src/terrain/noise/noise_parameters.rs
use serde::{Deserialize, Serialize};

/// Base noise primitive used underneath the fractal sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseType {
    #[default]
    OpenSimplex,
    Simplex,
    Perlin,
}

// Fixed fbm shape. Only the seed, base primitive and input scale vary per world.
pub const FBM_OCTAVES: usize = 4;
pub const FBM_LACUNARITY: f64 = 2.0;
pub const FBM_GAIN: f64 = 0.5;

/// Everything needed to rebuild the same elevation signal.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseParameters {
    pub seed: u32,
    pub noise_type: NoiseType,
    /// World units per noise unit. Larger values give broader features.
    pub scale: f64,
    pub octaves: usize,
    pub lacunarity: f64,
    pub gain: f64,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            seed: 3,
            noise_type: NoiseType::OpenSimplex,
            scale: 50.0,
            octaves: FBM_OCTAVES,
            lacunarity: FBM_LACUNARITY,
            gain: FBM_GAIN,
        }
    }
}

impl NoiseParameters {
    pub fn new(seed: u32, noise_type: NoiseType, scale: f64) -> Self {
        Self {
            seed,
            noise_type,
            scale,
            ..Self::default()
        }
    }
}
