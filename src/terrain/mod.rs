// Export all components from the terrain module
pub mod biome_palette;
pub mod chunk;
pub mod chunk_manager;
pub mod generation_utils;
pub mod mesh_buffer;
pub mod noise;
pub mod terrain_config;
pub mod terrain_mesh_builder;
pub mod vegetation;

// Re-export main types for easier access
pub use chunk::{Chunk, ChunkPhase, ChunkSlot};
pub use chunk_manager::{ChunkManager, LiveSettings, StreamStats};
pub use mesh_buffer::MeshBuffer;
pub use self::noise::{FractalSampler, NoiseField, NoiseParameters, NoiseType};
pub use terrain_config::{ConfigError, ConfigResult, GrowthBoundaries, TerrainConfig};
pub use terrain_mesh_builder::{TerrainMesh, TerrainMeshBuilder, VegetationSite};
pub use vegetation::VegetationInstance;
