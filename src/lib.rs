//! Procedural terrain streamed along a circular track.
//!
//! A [`ChunkManager`] keeps a run of chunks on the ring ahead of a fixed
//! viewpoint. Chunks grow their height, colour and vegetation as they
//! approach and are released through the [`SceneHost`] once they pass.

pub mod bridge;
pub mod core;
pub mod terrain;

pub use bridge::{Renderable, RenderHandle, SceneHost, Transform};
pub use crate::core::{ConfigurationManager, Updatable};
pub use terrain::{ChunkManager, ConfigError, TerrainConfig};
