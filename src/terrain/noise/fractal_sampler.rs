// src/terrain/noise/fractal_sampler.rs
use crate::terrain::noise::noise_field::NoiseField;
use crate::terrain::noise::noise_parameters::NoiseParameters;

/// Fractal Brownian motion over a [`NoiseField`].
///
/// Each octave doubles the frequency and halves the amplitude (with the
/// default parameters). The weighted sum is divided by the total amplitude,
/// so the result stays inside `[0, 1]`.
#[derive(Debug, Clone)]
pub struct FractalSampler {
    field: NoiseField,
    octaves: usize,
    lacunarity: f64,
    gain: f64,
}

impl FractalSampler {
    pub fn new(field: NoiseField, octaves: usize, lacunarity: f64, gain: f64) -> Self {
        Self {
            field,
            octaves: octaves.max(1),
            lacunarity,
            gain,
        }
    }

    pub fn from_parameters(params: &NoiseParameters) -> Self {
        Self::new(
            NoiseField::new(params.seed, params.noise_type),
            params.octaves,
            params.lacunarity,
            params.gain,
        )
    }

    pub fn field(&self) -> &NoiseField {
        &self.field
    }

    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let mut freq = 1.0;
        let mut amp = 1.0;
        let mut total = 0.0;
        let mut max = 0.0;
        for _ in 0..self.octaves {
            total += amp * self.field.sample(x * freq, y * freq);
            max += amp;
            freq *= self.lacunarity;
            amp *= self.gain;
        }
        total / max
    }
}
