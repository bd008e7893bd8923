// src/terrain/noise/noise_utils.rs
use std::sync::Arc;

use noise::{NoiseFn, OpenSimplex, Perlin, Simplex};

use crate::terrain::noise::noise_parameters::NoiseType;

// Shared handle to a seeded 2D primitive. Output is roughly [-1, 1].
pub type SharedNoiseFn = Arc<dyn NoiseFn<f64, 2> + Send + Sync>;

/// Build the raw seeded primitive for a noise type.
pub fn create_noise_function(noise_type: NoiseType, seed: u32) -> SharedNoiseFn {
    match noise_type {
        NoiseType::OpenSimplex => Arc::new(OpenSimplex::new(seed)),
        NoiseType::Simplex => Arc::new(Simplex::new(seed)),
        NoiseType::Perlin => Arc::new(Perlin::new(seed)),
    }
}

/// Linear remap of `val` from `[smin, smax]` onto `[emin, emax]`. Not clamped.
pub fn map_range(val: f64, smin: f64, smax: f64, emin: f64, emax: f64) -> f64 {
    let t = (val - smin) / (smax - smin);
    (emax - emin) * t + emin
}
