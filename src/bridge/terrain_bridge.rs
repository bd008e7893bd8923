// File: src/bridge/terrain_bridge.rs

use std::collections::BTreeMap;

use glam::{Mat4, Quat, Vec3};
use log::warn;

use crate::terrain::mesh_buffer::MeshBuffer;

/// Opaque id the host hands back for something it now displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * point)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Borrowed view of something the engine wants displayed. The host only
/// ever sees these views and the handles it returns, never chunk internals.
#[derive(Debug, Clone, Copy)]
pub enum Renderable<'a> {
    Terrain {
        chunk_id: u64,
        mesh: &'a MeshBuffer,
        transform: Transform,
    },
    Vegetation {
        chunk_id: u64,
        vertex: usize,
        transform: Transform,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderableKind {
    Terrain,
    Vegetation,
}

impl Renderable<'_> {
    pub fn kind(&self) -> RenderableKind {
        match self {
            Renderable::Terrain { .. } => RenderableKind::Terrain,
            Renderable::Vegetation { .. } => RenderableKind::Vegetation,
        }
    }

    pub fn chunk_id(&self) -> u64 {
        match *self {
            Renderable::Terrain { chunk_id, .. } | Renderable::Vegetation { chunk_id, .. } => chunk_id,
        }
    }

    pub fn transform(&self) -> Transform {
        match *self {
            Renderable::Terrain { transform, .. } | Renderable::Vegetation { transform, .. } => transform,
        }
    }
}

/// Scene-graph insertion and removal, implemented by the rendering side.
pub trait SceneHost {
    fn attach(&mut self, renderable: Renderable<'_>) -> RenderHandle;

    fn detach(&mut self, handle: RenderHandle);

    /// Called once per tick after a renderable has been mutated in place.
    fn refresh(&mut self, _handle: RenderHandle, _renderable: Renderable<'_>) {}
}

/// Host that displays nothing. Useful for headless runs.
#[derive(Debug, Default)]
pub struct NullSceneHost {
    next_handle: u64,
}

impl SceneHost for NullSceneHost {
    fn attach(&mut self, _renderable: Renderable<'_>) -> RenderHandle {
        self.next_handle += 1;
        RenderHandle(self.next_handle)
    }

    fn detach(&mut self, _handle: RenderHandle) {}
}

/// Bookkeeping host: tracks which handles are live and what they are.
#[derive(Debug, Default)]
pub struct RecordingSceneHost {
    next_handle: u64,
    live: BTreeMap<RenderHandle, (RenderableKind, u64)>,
    attached_total: usize,
    detached_total: usize,
    refresh_count: usize,
}

impl RecordingSceneHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live_of_kind(&self, kind: RenderableKind) -> usize {
        self.live.values().filter(|(k, _)| *k == kind).count()
    }

    pub fn live_for_chunk(&self, chunk_id: u64) -> usize {
        self.live.values().filter(|(_, id)| *id == chunk_id).count()
    }

    pub fn is_live(&self, handle: RenderHandle) -> bool {
        self.live.contains_key(&handle)
    }

    pub fn attached_total(&self) -> usize {
        self.attached_total
    }

    pub fn detached_total(&self) -> usize {
        self.detached_total
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_count
    }
}

impl SceneHost for RecordingSceneHost {
    fn attach(&mut self, renderable: Renderable<'_>) -> RenderHandle {
        self.next_handle += 1;
        let handle = RenderHandle(self.next_handle);
        self.live.insert(handle, (renderable.kind(), renderable.chunk_id()));
        self.attached_total += 1;
        handle
    }

    fn detach(&mut self, handle: RenderHandle) {
        if self.live.remove(&handle).is_some() {
            self.detached_total += 1;
        } else {
            warn!("RecordingSceneHost: Detach of unknown handle {:?}", handle);
        }
    }

    fn refresh(&mut self, handle: RenderHandle, _renderable: Renderable<'_>) {
        if self.live.contains_key(&handle) {
            self.refresh_count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_point_applies_scale_rotation_translation() {
        let transform = Transform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            scale: Vec3::splat(2.0),
        };
        let p = transform.transform_point(Vec3::X);
        let m = transform.to_matrix().transform_point3(Vec3::X);
        assert!((p - m).length() < 1e-5);
        assert!((p - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn recording_host_tracks_live_handles() {
        let mut host = RecordingSceneHost::new();
        let plant = Renderable::Vegetation {
            chunk_id: 4,
            vertex: 12,
            transform: Transform::IDENTITY,
        };
        let a = host.attach(plant);
        let b = host.attach(plant);
        assert_ne!(a, b);
        assert_eq!(host.live_of_kind(RenderableKind::Vegetation), 2);
        assert_eq!(host.live_for_chunk(4), 2);

        host.detach(a);
        host.detach(a);
        assert!(!host.is_live(a));
        assert!(host.is_live(b));
        assert_eq!(host.detached_total(), 1);
        assert_eq!(host.attached_total(), 2);
    }
}
