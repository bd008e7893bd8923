// src/terrain/generation_utils.rs
use glam::Vec3;

/// Rectangular grid in the chunk's local XY plane, centred on the origin.
///
/// X runs forward along the ring, Y runs across the track. Vertices are laid
/// out row by row starting at `y = +height / 2`, each row going from
/// `x = -width / 2` to `x = +width / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneGrid {
    pub width: f32,
    pub height: f32,
    pub seg_x: usize,
    pub seg_y: usize,
}

impl PlaneGrid {
    pub fn new(width: f32, height: f32, seg_x: usize, seg_y: usize) -> Self {
        Self {
            width,
            height,
            seg_x: seg_x.max(1),
            seg_y: seg_y.max(1),
        }
    }

    pub fn columns(&self) -> usize {
        self.seg_x + 1
    }

    pub fn rows(&self) -> usize {
        self.seg_y + 1
    }

    pub fn vertex_count(&self) -> usize {
        self.columns() * self.rows()
    }

    pub fn face_count(&self) -> usize {
        self.seg_x * self.seg_y * 2
    }

    /// `(column, row)` of a vertex index.
    pub fn cell_of(&self, index: usize) -> (usize, usize) {
        (index % self.columns(), index / self.columns())
    }

    pub fn index_of(&self, ix: usize, iy: usize) -> usize {
        iy * self.columns() + ix
    }

    /// Unjittered local position of a grid vertex, at zero elevation.
    pub fn vertex_position(&self, ix: usize, iy: usize) -> Vec3 {
        let seg_w = self.width / self.seg_x as f32;
        let seg_h = self.height / self.seg_y as f32;
        // The trailing column is pinned so both forward edges are exact.
        let x = if ix >= self.seg_x {
            self.width / 2.0
        } else {
            ix as f32 * seg_w - self.width / 2.0
        };
        let y = self.height / 2.0 - iy as f32 * seg_h;
        Vec3::new(x, y, 0.0)
    }

    /// Row sits on one of the two side edges of the track.
    pub fn is_lateral_edge(&self, iy: usize) -> bool {
        iy == 0 || iy == self.seg_y
    }

    /// Column sits on the leading or trailing edge shared with a neighbour chunk.
    pub fn is_forward_edge(&self, ix: usize) -> bool {
        ix == 0 || ix == self.seg_x
    }

    pub fn positions(&self) -> Vec<Vec3> {
        let mut positions = Vec::with_capacity(self.vertex_count());
        for iy in 0..self.rows() {
            for ix in 0..self.columns() {
                positions.push(self.vertex_position(ix, iy));
            }
        }
        positions
    }

    /// Two triangles per cell, wound so the face normal points along +Z.
    pub fn faces(&self) -> Vec<[u32; 3]> {
        let cols = self.columns() as u32;
        let mut faces = Vec::with_capacity(self.face_count());
        for iy in 0..self.seg_y as u32 {
            for ix in 0..self.seg_x as u32 {
                let a = ix + cols * iy;
                let b = ix + cols * (iy + 1);
                let c = (ix + 1) + cols * (iy + 1);
                let d = (ix + 1) + cols * iy;
                faces.push([a, b, d]);
                faces.push([b, c, d]);
            }
        }
        faces
    }
}

/// Unit normal of a triangle, `+Z` for degenerate ones.
pub fn flat_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).try_normalize().unwrap_or(Vec3::Z)
}

/// Position of `value` in the half-open band `[near, far)` as a reveal factor:
/// 1 in front of `near`, 0 at or beyond `far`, linear in between.
pub fn reveal_factor(value: f32, near: f32, far: f32) -> f32 {
    if value < near {
        1.0
    } else if value < far {
        ((far - value) / (far - near)).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_counts() {
        let grid = PlaneGrid::new(30.0, 150.0, 30, 150);
        assert_eq!(grid.vertex_count(), 31 * 151);
        assert_eq!(grid.positions().len(), grid.vertex_count());
        assert_eq!(grid.faces().len(), grid.face_count());
    }

    #[test]
    fn grid_corners() {
        let grid = PlaneGrid::new(30.0, 150.0, 30, 150);
        let positions = grid.positions();
        assert_eq!(positions[0], Vec3::new(-15.0, 75.0, 0.0));
        assert_eq!(positions[grid.columns() - 1], Vec3::new(15.0, 75.0, 0.0));
        assert_eq!(positions[grid.vertex_count() - 1], Vec3::new(15.0, -75.0, 0.0));
        assert_eq!(grid.cell_of(grid.index_of(4, 7)), (4, 7));
    }

    #[test]
    fn faces_point_up() {
        let grid = PlaneGrid::new(4.0, 4.0, 2, 2);
        let positions = grid.positions();
        for [a, b, c] in grid.faces() {
            let n = flat_normal(positions[a as usize], positions[b as usize], positions[c as usize]);
            assert!((n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn forward_edges_are_exact_for_uneven_segments() {
        let grid = PlaneGrid::new(7.3, 4.0, 7, 4);
        assert_eq!(grid.vertex_position(0, 2).x, -3.65);
        assert_eq!(grid.vertex_position(grid.seg_x, 2).x, 3.65);
    }

    #[test]
    fn reveal_factor_is_half_open() {
        assert_eq!(reveal_factor(99.0, 100.0, 200.0), 1.0);
        assert_eq!(reveal_factor(100.0, 100.0, 200.0), 1.0);
        assert_eq!(reveal_factor(150.0, 100.0, 200.0), 0.5);
        assert_eq!(reveal_factor(200.0, 100.0, 200.0), 0.0);
        assert_eq!(reveal_factor(1e6, 100.0, 200.0), 0.0);
    }
}
