// src/terrain/vegetation.rs
use glam::{Quat, Vec3};

use crate::bridge::terrain_bridge::{RenderHandle, Transform};
use crate::terrain::terrain_mesh_builder::VegetationSite;

/// Full-grown plant size before the noise strength factor.
pub const VEGETATION_MAX_SIZE: Vec3 = Vec3::new(1.5, 1.5, 1.75);
/// Noise strength at which plants reach exactly [`VEGETATION_MAX_SIZE`].
pub const VEGETATION_REFERENCE_STRENGTH: f32 = 60.0;
/// How far a plant's origin sits below the surface, along the elevation axis.
pub const VEGETATION_SINK: f32 = 2.5;

/// One live plant bound to a planting site of its chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct VegetationInstance {
    handle: RenderHandle,
    site: VegetationSite,
    transform: Transform,
}

impl VegetationInstance {
    pub fn new(handle: RenderHandle, site: VegetationSite, transform: Transform) -> Self {
        Self {
            handle,
            site,
            transform,
        }
    }

    pub fn handle(&self) -> RenderHandle {
        self.handle
    }

    pub fn site(&self) -> VegetationSite {
        self.site
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }
}

/// Scale of a plant `growth` of the way (0..=1) into its grow-in band.
pub fn vegetation_scale(noise_strength: f32, growth: f32) -> Vec3 {
    VEGETATION_MAX_SIZE * (noise_strength / VEGETATION_REFERENCE_STRENGTH) * growth.clamp(0.0, 1.0)
}

/// Orientation of a plant: the chunk's frame spun by the site's yaw about
/// the elevation axis.
pub fn vegetation_rotation(chunk_rotation: Quat, yaw: f32) -> Quat {
    chunk_rotation * Quat::from_rotation_z(yaw)
}
