// src/terrain/mesh_buffer.rs
use glam::Vec3;

use crate::terrain::generation_utils::flat_normal;

/// Flat-shaded triangle mesh in chunk-local space, mutated in place every
/// frame and read by the host renderer.
///
/// Colors and normals are per face. The dirty flags tell the host which
/// attribute streams need re-uploading since it last looked.
#[derive(Debug, Clone, Default)]
pub struct MeshBuffer {
    positions: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
    face_colors: Vec<Vec3>,
    face_normals: Vec<Vec3>,
    positions_dirty: bool,
    colors_dirty: bool,
}

impl MeshBuffer {
    pub fn new(positions: Vec<Vec3>, faces: Vec<[u32; 3]>, fill_color: Vec3) -> Self {
        let face_colors = vec![fill_color; faces.len()];
        let mut mesh = Self {
            positions,
            faces,
            face_colors,
            face_normals: Vec::new(),
            positions_dirty: true,
            colors_dirty: true,
        };
        mesh.recompute_normals();
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        self.positions_dirty = true;
        &mut self.positions
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn face_colors(&self) -> &[Vec3] {
        &self.face_colors
    }

    pub fn face_colors_mut(&mut self) -> &mut [Vec3] {
        self.colors_dirty = true;
        &mut self.face_colors
    }

    /// Faces alongside the writable colour stream, for recolouring in place.
    pub fn faces_and_colors_mut(&mut self) -> (&[[u32; 3]], &mut [Vec3]) {
        self.colors_dirty = true;
        (&self.faces, &mut self.face_colors)
    }

    pub fn face_normals(&self) -> &[Vec3] {
        &self.face_normals
    }

    /// Vertex positions of one face.
    pub fn face_vertices(&self, face: usize) -> [Vec3; 3] {
        let [a, b, c] = self.faces[face];
        [
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ]
    }

    /// Rebuild the per-face normals from the current positions. Call after
    /// every elevation change.
    pub fn recompute_normals(&mut self) {
        self.face_normals.resize(self.faces.len(), Vec3::Z);
        let positions = &self.positions;
        for (normal, &[a, b, c]) in self.face_normals.iter_mut().zip(&self.faces) {
            *normal = flat_normal(
                positions[a as usize],
                positions[b as usize],
                positions[c as usize],
            );
        }
    }

    /// Returns `(positions_dirty, colors_dirty)` and clears both flags.
    pub fn take_dirty(&mut self) -> (bool, bool) {
        let flags = (self.positions_dirty, self.colors_dirty);
        self.positions_dirty = false;
        self.colors_dirty = false;
        flags
    }

    /// Drop every attribute stream and give the memory back.
    pub fn release(&mut self) {
        self.positions = Vec::new();
        self.faces = Vec::new();
        self.face_colors = Vec::new();
        self.face_normals = Vec::new();
        self.positions_dirty = false;
        self.colors_dirty = false;
    }

    pub fn is_released(&self) -> bool {
        self.positions.is_empty() && self.faces.is_empty()
    }
}
