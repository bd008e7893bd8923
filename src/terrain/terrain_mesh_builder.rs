// src/terrain/terrain_mesh_builder.rs
use std::f32::consts::TAU;

use glam::Vec3;
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::terrain::biome_palette::{self, WATER_LEVEL};
use crate::terrain::generation_utils::PlaneGrid;
use crate::terrain::mesh_buffer::MeshBuffer;
use crate::terrain::noise::FractalSampler;
use crate::terrain::terrain_config::TerrainConfig;

/// Top of the band where vegetation may be planted (bottom is the water level).
pub const VEGETATION_BAND_TOP: f32 = 0.5;
/// Elevations above this get exaggerated.
pub const PEAK_LEVEL: f32 = 0.7;
pub const PEAK_EXPONENT: f32 = 1.012;
/// Elevation the side edges are pinned to.
pub const BASE_ELEVATION: f32 = 0.0;
/// Half-range of the in-plane jitter applied to interior vertices.
pub const JITTER: f32 = 0.5;
// Lateral falloff: centre of the track is scaled by the first value, the
// side edges by the second.
const FALLOFF_CENTER: f32 = 0.8;
const FALLOFF_EDGE: f32 = 1.2;

/// A vertex chosen for planting, with the yaw its plant will be given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VegetationSite {
    pub vertex: usize,
    pub yaw: f32,
}

/// Static data of one chunk, produced once at spawn.
#[derive(Debug, Clone)]
pub struct TerrainMesh {
    pub grid: PlaneGrid,
    pub height_map: Vec<f32>,
    pub face_colors: Vec<Vec3>,
    pub vegetation_sites: Vec<VegetationSite>,
    pub mesh: MeshBuffer,
}

/// Result of elevation post-processing for a single vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Elevation {
    Water,
    Lowland(f32),
    Upland(f32),
    Peak(f32),
}

impl Elevation {
    /// Apply, in order: water clamp, vegetation band, peak exaggeration.
    pub fn classify(h: f32) -> Self {
        if h <= WATER_LEVEL {
            Elevation::Water
        } else if h < VEGETATION_BAND_TOP {
            Elevation::Lowland(h)
        } else if h > PEAK_LEVEL {
            Elevation::Peak(h.powf(PEAK_EXPONENT))
        } else {
            Elevation::Upland(h)
        }
    }

    pub fn value(self) -> f32 {
        match self {
            Elevation::Water => WATER_LEVEL,
            Elevation::Lowland(h) | Elevation::Upland(h) | Elevation::Peak(h) => h,
        }
    }
}

/// Builds the height map, biome colours, planting sites and initial mesh of
/// a chunk. Holds the fractal sampler so its permutation tables are built
/// once per seed rather than once per chunk.
#[derive(Debug, Clone)]
pub struct TerrainMeshBuilder {
    grid: PlaneGrid,
    sampler: FractalSampler,
    seed: u32,
    noise_scale: f32,
    ring_radius: f32,
    vegetation_probability: f32,
}

impl TerrainMeshBuilder {
    pub fn new(config: &TerrainConfig) -> Self {
        let (seg_x, seg_y) = config.segments();
        Self {
            grid: PlaneGrid::new(config.chunk_width, config.chunk_height, seg_x, seg_y),
            sampler: FractalSampler::from_parameters(&config.noise_parameters()),
            seed: config.seed,
            noise_scale: config.noise_scale,
            ring_radius: config.ring_radius,
            vegetation_probability: config.vegetation_probability,
        }
    }

    pub fn grid(&self) -> &PlaneGrid {
        &self.grid
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Noise-space forward coordinate of grid column `ix`.
    ///
    /// Counted in whole columns from the origin, so the trailing column of
    /// one chunk and the leading column of the next land on the same value
    /// bit for bit. Offsets are snapped to the nearest column.
    pub fn column_x(&self, noise_offset: f32, ix: usize) -> f64 {
        let seg_w = self.grid.width as f64 / self.grid.seg_x as f64;
        let origin = (noise_offset as f64 / seg_w).round();
        (origin + ix as f64) * seg_w - self.grid.width as f64 / 2.0
    }

    /// fbm elevation with the lateral falloff applied, before post-processing.
    pub fn raw_elevation(&self, noise_x: f64, y: f32) -> f32 {
        let nx = noise_x / self.noise_scale as f64;
        let ny = y as f64 / self.noise_scale as f64;
        let h = self.sampler.sample(nx, ny) as f32;

        let half = self.grid.height / 2.0;
        let t = (y.abs() / half).min(1.0);
        h * (FALLOFF_CENTER + (FALLOFF_EDGE - FALLOFF_CENTER) * t)
    }

    /// Generator state for a chunk. Seeded from the world seed and the
    /// chunk's noise offset, so rebuilding a chunk reproduces it exactly.
    fn chunk_rng(&self, noise_offset: f32) -> ChaCha8Rng {
        let state = ((self.seed as u64) << 32) | noise_offset.to_bits() as u64;
        ChaCha8Rng::seed_from_u64(state)
    }

    pub fn build(&self, noise_offset: f32) -> TerrainMesh {
        let grid = self.grid;
        let mut rng = self.chunk_rng(noise_offset);
        let mut positions = grid.positions();
        let mut height_map = Vec::with_capacity(positions.len());
        let mut vegetation_sites = Vec::new();
        let squish_scale = (grid.width / 2.0) / self.ring_radius;

        for (i, vertex) in positions.iter_mut().enumerate() {
            let (ix, iy) = grid.cell_of(i);
            let lateral_edge = grid.is_lateral_edge(iy);

            let mut h = Elevation::classify(self.raw_elevation(self.column_x(noise_offset, ix), vertex.y));
            if lateral_edge {
                h = Elevation::Upland(BASE_ELEVATION);
            } else if let Elevation::Lowland(_) = h {
                if rng.random::<f32>() < self.vegetation_probability {
                    vegetation_sites.push(VegetationSite {
                        vertex: i,
                        yaw: rng.random::<f32>() * TAU,
                    });
                }
            }
            let h = h.value();
            height_map.push(h);

            // Shared edges stay on the grid so neighbours meet exactly.
            if !lateral_edge && !grid.is_forward_edge(ix) {
                vertex.x += rng.random_range(-JITTER..JITTER);
                vertex.y += rng.random_range(-JITTER..JITTER);
            }

            // Bow the forward axis so the chord width stays constant on the ring.
            let half_extent = (self.ring_radius - h) * squish_scale;
            vertex.x = vertex.x / (grid.width / 2.0) * half_extent;
        }

        let faces = grid.faces();
        let face_colors: Vec<Vec3> = faces
            .iter()
            .map(|&[a, b, c]| {
                let max = height_map[a as usize]
                    .max(height_map[b as usize])
                    .max(height_map[c as usize]);
                biome_palette::biome_color(max)
            })
            .collect();

        debug!(
            "TerrainMeshBuilder: Built chunk at noise offset {} ({} vertices, {} sites)",
            noise_offset,
            height_map.len(),
            vegetation_sites.len()
        );

        TerrainMesh {
            grid,
            height_map,
            face_colors,
            vegetation_sites,
            mesh: MeshBuffer::new(positions, faces, biome_palette::flat_color()),
        }
    }
}
