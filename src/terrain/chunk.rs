// src/terrain/chunk.rs
use std::f32::consts::TAU;

use glam::{Mat3, Quat, Vec3};
use log::debug;
use rayon::prelude::*;

use crate::bridge::terrain_bridge::{RenderHandle, Renderable, SceneHost, Transform};
use crate::core::updatable::{update_all, Updatable};
use crate::terrain::biome_palette;
use crate::terrain::generation_utils::{reveal_factor, PlaneGrid};
use crate::terrain::mesh_buffer::MeshBuffer;
use crate::terrain::terrain_config::{GrowthBoundaries, TerrainConfig};
use crate::terrain::terrain_mesh_builder::{TerrainMesh, VegetationSite, JITTER};
use crate::terrain::vegetation::{
    vegetation_rotation, vegetation_scale, VegetationInstance, VEGETATION_SINK,
};

/// Radians of ring rotation per unit of speed per tick.
pub const ANGULAR_RATE: f32 = 0.001 * TAU;
/// Strength of the chord-length correction applied at wide forward offsets.
pub const CHORD_CORRECTION: f32 = 15.0;
/// Milliseconds of host time per breathing time unit, before the rate factor.
const BREATH_PERIOD: f64 = 600.0;

/// Lifecycle of a chunk. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChunkPhase {
    /// Built and placed, still beyond every reveal boundary.
    Spawned,
    /// Some part of the chunk is inside the height reveal band.
    Growing,
    /// Entirely in front of every `near` boundary: terrain, colour and
    /// vegetation have settled.
    Mature,
    Retiring,
    Retired,
}

/// Where a new chunk goes on the ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkSlot {
    /// Fixed slot angle, unique and increasing in spawn order.
    pub theta_offset: f32,
    /// Current angle of the slot once the ring rotation so far is applied.
    pub theta: f32,
    pub noise_offset: f32,
}

/// Centre of the ring every chunk is placed on. The viewpoint sits at the
/// origin, on the ring itself.
pub fn ring_center(ring_radius: f32) -> Vec3 {
    Vec3::new(0.0, 0.0, ring_radius)
}

/// Cosmetic height modulation. Exactly 1 whenever `t` is 0.
pub fn breath(forward: f32, lateral: f32, t: f32) -> f32 {
    let lateral = lateral + 30.0 * (forward / 45.0).sin();
    1.0 - t.sin()
        * ((forward + t) / 63.0).sin()
        * (forward / 29.0).sin()
        * ((lateral + t) / 45.0).sin()
        * (lateral / 75.0).sin()
}

/// One terrain segment on the ring.
pub struct Chunk {
    id: u64,
    theta_offset: f32,
    theta: f32,
    noise_offset: f32,

    // Copied from the config at spawn, fixed for the chunk's lifetime
    ring_radius: f32,
    correction_span: f32,
    grid: PlaneGrid,

    height_map: Vec<f32>,
    face_colors: Vec<Vec3>,
    vegetation_sites: Vec<VegetationSite>,
    vegetation: Vec<VegetationInstance>,
    flora_populated: bool,

    mesh: MeshBuffer,
    mesh_handle: Option<RenderHandle>,
    ring_angle: f32,
    position: Vec3,
    rotation: Quat,
    phase: ChunkPhase,
    // Per-vertex forward positions, reused by every colour pass
    forward_scratch: Vec<f32>,

    update_list: Vec<Box<dyn Updatable>>,
}

impl Chunk {
    /// Take ownership of freshly built terrain, place it at its slot and hand
    /// the mesh to the host.
    pub fn spawn(
        id: u64,
        slot: ChunkSlot,
        terrain: TerrainMesh,
        config: &TerrainConfig,
        host: &mut dyn SceneHost,
    ) -> Self {
        let TerrainMesh {
            grid,
            height_map,
            face_colors,
            vegetation_sites,
            mesh,
        } = terrain;

        let mut chunk = Chunk {
            id,
            theta_offset: slot.theta_offset,
            theta: slot.theta,
            noise_offset: slot.noise_offset,
            ring_radius: config.ring_radius,
            correction_span: config.target_chunk_count as f32 * config.chunk_width,
            grid,
            height_map,
            face_colors,
            vegetation_sites,
            vegetation: Vec::new(),
            flora_populated: false,
            mesh,
            mesh_handle: None,
            ring_angle: slot.theta,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            phase: ChunkPhase::Spawned,
            forward_scratch: Vec::new(),
            update_list: Vec::new(),
        };
        chunk.place();
        chunk.color_terrain(&config.growth_boundaries);

        let renderable = chunk.terrain_renderable();
        chunk.mesh_handle = Some(host.attach(renderable));
        debug!(
            "Chunk {}: Spawned at theta {:.4} (noise offset {})",
            id, slot.theta, slot.noise_offset
        );
        chunk
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn theta_offset(&self) -> f32 {
        self.theta_offset
    }

    pub fn theta(&self) -> f32 {
        self.theta
    }

    pub fn noise_offset(&self) -> f32 {
        self.noise_offset
    }

    pub fn width(&self) -> f32 {
        self.grid.width
    }

    pub fn grid(&self) -> &PlaneGrid {
        &self.grid
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation_rotation(self.position, self.rotation)
    }

    pub fn phase(&self) -> ChunkPhase {
        self.phase
    }

    pub fn height_map(&self) -> &[f32] {
        &self.height_map
    }

    /// Base biome colour per face (the displayed colour lives in the mesh).
    pub fn face_colors(&self) -> &[Vec3] {
        &self.face_colors
    }

    pub fn vegetation_sites(&self) -> &[VegetationSite] {
        &self.vegetation_sites
    }

    pub fn vegetation(&self) -> &[VegetationInstance] {
        &self.vegetation
    }

    pub fn mesh(&self) -> &MeshBuffer {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut MeshBuffer {
        &mut self.mesh
    }

    pub fn mesh_handle(&self) -> Option<RenderHandle> {
        self.mesh_handle
    }

    /// Corrected angle the chunk is actually placed at. Negative once it
    /// has passed the viewpoint. Unlike the forward position it does not
    /// wrap around the ring.
    pub fn ring_angle(&self) -> f32 {
        self.ring_angle
    }

    /// Forward position of the edge closest to the viewpoint.
    pub fn near_edge(&self) -> f32 {
        self.position.x - self.grid.width / 2.0
    }

    /// Forward position of the edge furthest from the viewpoint.
    pub fn far_edge(&self) -> f32 {
        self.position.x + self.grid.width / 2.0
    }

    pub fn add_to_update_list(&mut self, object: Box<dyn Updatable>) {
        self.update_list.push(object);
    }

    /// World position of a point given in chunk-local space.
    pub fn world_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Forward (world X) position of a local point, measured on the flat
    /// plane so the reveal never feeds back on the height it produces.
    pub fn forward_of(&self, local: Vec3) -> f32 {
        self.world_point(Vec3::new(local.x, local.y, 0.0)).x
    }

    fn terrain_renderable(&self) -> Renderable<'_> {
        Renderable::Terrain {
            chunk_id: self.id,
            mesh: &self.mesh,
            transform: self.transform(),
        }
    }

    /// Put the chunk on the ring at its current angle, facing the ring centre.
    fn place(&mut self) {
        let radius = self.ring_radius;
        // Wide forward offsets fan out visibly; pull them back a little.
        let uncorrected_x = radius * self.theta.sin();
        let alpha = uncorrected_x / self.correction_span;
        let correction = CHORD_CORRECTION * alpha * TAU / 1000.0;
        let angle = self.theta - correction;
        self.ring_angle = angle;

        self.position = Vec3::new(radius * angle.sin(), 0.0, radius - radius * angle.cos());

        // Local +Z (elevation) towards the centre, local +Y stays world up.
        let z_axis = (ring_center(radius) - self.position).try_normalize().unwrap_or(Vec3::Z);
        let x_axis = Vec3::Y.cross(z_axis).try_normalize().unwrap_or(Vec3::X);
        let y_axis = z_axis.cross(x_axis);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(x_axis, y_axis, z_axis));
    }

    /// Advance around the ring by `speed` ticks' worth of rotation.
    pub fn move_on_ring(&mut self, speed: f32) {
        self.theta -= speed * ANGULAR_RATE;
        self.place();
    }

    /// Re-derive the displayed elevation of every vertex from the static
    /// height map and the vertex's forward position.
    pub fn grow_terrain(
        &mut self,
        noise_strength: f32,
        breathing_rate: f32,
        time_stamp: f64,
        boundaries: &GrowthBoundaries,
        parallel: bool,
    ) {
        if self.near_edge() > boundaries.height_far {
            return;
        }

        let t = (time_stamp / BREATH_PERIOD * breathing_rate as f64) as f32;
        let (near, far) = (boundaries.height_near, boundaries.height_far);
        let (position, rotation) = (self.position, self.rotation);

        let grow = move |(local, h): (&mut Vec3, &f32)| {
            let world = position + rotation * Vec3::new(local.x, local.y, 0.0);
            let alpha = reveal_factor(world.x, near, far);
            local.z = if alpha > 0.0 {
                h * alpha * noise_strength * breath(world.x, world.y, t)
            } else {
                0.0
            };
        };

        let heights = &self.height_map;
        let positions = self.mesh.positions_mut();
        if parallel {
            positions.par_iter_mut().zip(heights.par_iter()).for_each(grow);
        } else {
            positions.iter_mut().zip(heights.iter()).for_each(grow);
        }
        self.mesh.recompute_normals();
    }

    /// Blend each face from the flat grey to its biome colour as it
    /// approaches.
    pub fn color_terrain(&mut self, boundaries: &GrowthBoundaries) {
        // Still entirely flat grey.
        if self.near_edge() > boundaries.color_far {
            return;
        }

        let (position, rotation) = (self.position, self.rotation);
        self.forward_scratch.clear();
        self.forward_scratch.extend(
            self.mesh
                .positions()
                .iter()
                .map(|p| (position + rotation * Vec3::new(p.x, p.y, 0.0)).x),
        );

        let flat = biome_palette::flat_color();
        let forwards = &self.forward_scratch;
        let base = &self.face_colors;
        let (faces, colors) = self.mesh.faces_and_colors_mut();
        for ((color, base), &[a, b, c]) in colors.iter_mut().zip(base).zip(faces) {
            let forward = (forwards[a as usize] + forwards[b as usize] + forwards[c as usize]) / 3.0;
            let factor = reveal_factor(forward, boundaries.color_near, boundaries.color_far);
            *color = flat.lerp(*base, factor);
        }
    }

    /// Where and how big the plant on `site` should be this frame.
    fn vegetation_pose(&self, site: VegetationSite, noise_strength: f32, boundaries: &GrowthBoundaries) -> Transform {
        let surface = self.mesh.positions()[site.vertex];
        let translation = self.world_point(surface - Vec3::Z * VEGETATION_SINK);
        let growth = reveal_factor(translation.x, boundaries.flora_near, boundaries.flora_far);
        Transform {
            translation,
            rotation: vegetation_rotation(self.rotation, site.yaw),
            scale: vegetation_scale(noise_strength, growth),
        }
    }

    /// Populate planting sites once the chunk is close enough, then keep the
    /// plants glued to the surface and growing in.
    pub fn add_flora(&mut self, noise_strength: f32, boundaries: &GrowthBoundaries, host: &mut dyn SceneHost) {
        if self.near_edge() > boundaries.flora_far {
            return;
        }

        if !self.flora_populated {
            self.vegetation.reserve_exact(self.vegetation_sites.len());
            for i in 0..self.vegetation_sites.len() {
                let site = self.vegetation_sites[i];
                let transform = self.vegetation_pose(site, noise_strength, boundaries);
                let handle = host.attach(Renderable::Vegetation {
                    chunk_id: self.id,
                    vertex: site.vertex,
                    transform,
                });
                self.vegetation.push(VegetationInstance::new(handle, site, transform));
            }
            self.flora_populated = true;
            debug!("Chunk {}: Planted {} plants", self.id, self.vegetation.len());
            return;
        }

        for i in 0..self.vegetation.len() {
            let site = self.vegetation[i].site();
            let transform = self.vegetation_pose(site, noise_strength, boundaries);
            self.vegetation[i].set_transform(transform);
            host.refresh(
                self.vegetation[i].handle(),
                Renderable::Vegetation {
                    chunk_id: self.id,
                    vertex: site.vertex,
                    transform,
                },
            );
        }
    }

    /// Detach and drop every plant.
    pub fn remove_flora(&mut self, host: &mut dyn SceneHost) {
        for plant in self.vegetation.drain(..) {
            host.detach(plant.handle());
        }
        self.flora_populated = false;
    }

    fn advance_phase(&mut self, boundaries: &GrowthBoundaries) {
        if self.phase >= ChunkPhase::Retiring {
            return;
        }
        let reached = if self.far_edge() + JITTER < boundaries.nearest() {
            ChunkPhase::Mature
        } else if self.near_edge() <= boundaries.height_far {
            ChunkPhase::Growing
        } else {
            ChunkPhase::Spawned
        };
        if reached > self.phase {
            debug!("Chunk {}: {:?} -> {:?}", self.id, self.phase, reached);
            self.phase = reached;
        }
    }

    /// One frame: placement, height, colour, flora, children. Colour and
    /// flora read the placement and heights written earlier in the same call.
    pub fn update(
        &mut self,
        time_stamp: f64,
        speed: f32,
        noise_strength: f32,
        breathing_rate: f32,
        config: &TerrainConfig,
        host: &mut dyn SceneHost,
    ) {
        if self.phase >= ChunkPhase::Retiring {
            return;
        }
        let boundaries = &config.growth_boundaries;

        self.move_on_ring(speed);
        self.grow_terrain(
            noise_strength,
            breathing_rate,
            time_stamp,
            boundaries,
            config.use_parallel_processing,
        );
        self.color_terrain(boundaries);
        self.add_flora(noise_strength, boundaries, host);
        update_all(&mut self.update_list, time_stamp);

        self.advance_phase(boundaries);
        if let Some(handle) = self.mesh_handle {
            host.refresh(handle, self.terrain_renderable());
        }
    }

    /// Release everything the chunk holds. The chunk is inert afterwards.
    pub fn retire(&mut self, host: &mut dyn SceneHost) {
        if self.phase == ChunkPhase::Retired {
            return;
        }
        self.phase = ChunkPhase::Retiring;
        self.remove_flora(host);
        if let Some(handle) = self.mesh_handle.take() {
            host.detach(handle);
        }
        self.mesh.release();
        self.height_map = Vec::new();
        self.face_colors = Vec::new();
        self.vegetation_sites = Vec::new();
        self.vegetation = Vec::new();
        self.forward_scratch = Vec::new();
        self.update_list.clear();
        self.phase = ChunkPhase::Retired;
        debug!("Chunk {}: Retired", self.id);
    }
}
