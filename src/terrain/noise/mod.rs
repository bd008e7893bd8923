pub mod fractal_sampler;
pub mod noise_field;
pub mod noise_parameters;
pub mod noise_utils;

pub use fractal_sampler::FractalSampler;
pub use noise_field::NoiseField;
pub use noise_parameters::{NoiseParameters, NoiseType};
