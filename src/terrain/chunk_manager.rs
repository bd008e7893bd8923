// src/terrain/chunk_manager.rs
use std::collections::VecDeque;
use std::f32::consts::FRAC_PI_2;

use log::{debug, info, warn};

use crate::bridge::terrain_bridge::SceneHost;
use crate::core::updatable::{update_all, Updatable};
use crate::terrain::chunk::{Chunk, ChunkSlot, ANGULAR_RATE};
use crate::terrain::noise::NoiseType;
use crate::terrain::terrain_config::{ConfigError, ConfigResult, TerrainConfig};
use crate::terrain::terrain_mesh_builder::TerrainMeshBuilder;

/// Values the host may change between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveSettings {
    pub speed: f32,
    pub noise_strength: f32,
    pub breathing_rate: f32,
}

impl LiveSettings {
    fn from_config(config: &TerrainConfig) -> Self {
        Self {
            speed: config.speed,
            noise_strength: config.noise_strength,
            breathing_rate: config.breathing_rate,
        }
    }
}

/// Changes requested since the last tick. Applied together at the start of
/// the next one, never halfway through.
#[derive(Debug, Clone, Default, PartialEq)]
struct PendingChanges {
    speed: Option<f32>,
    noise_strength: Option<f32>,
    breathing_rate: Option<f32>,
    seed: Option<u32>,
    noise_type: Option<NoiseType>,
    noise_scale: Option<f32>,
    resolution: Option<u32>,
}

impl PendingChanges {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Running totals since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StreamStats {
    pub ticks: u64,
    pub spawned: u64,
    pub retired: u64,
    /// Total ring rotation in radians.
    pub angular_advance: f64,
}

/// Keeps a contiguous run of chunks on the ring: spawns ahead, retires
/// behind, and drives every chunk once per tick.
pub struct ChunkManager<H: SceneHost> {
    config: TerrainConfig,
    live: LiveSettings,
    pending: PendingChanges,
    builder: TerrainMeshBuilder,
    host: H,

    chunks: VecDeque<Chunk>,
    chord_angle: f32,
    next_slot: u64,
    ring_rotation: f32,
    stats: StreamStats,

    update_list: Vec<Box<dyn Updatable>>,
}

impl<H: SceneHost> ChunkManager<H> {
    /// Validate the configuration and fill the ring with
    /// `target_chunk_count` chunks.
    pub fn new(config: TerrainConfig, host: H) -> ConfigResult<Self> {
        config.validate()?;
        let chord_angle = config.chord_angle()?;
        info!(
            "ChunkManager: Initializing {} chunks of {}x{} on a ring of radius {} (chord angle {:.5})",
            config.target_chunk_count, config.chunk_width, config.chunk_height, config.ring_radius, chord_angle
        );

        let mut manager = ChunkManager {
            live: LiveSettings::from_config(&config),
            pending: PendingChanges::default(),
            builder: TerrainMeshBuilder::new(&config),
            host,
            chunks: VecDeque::with_capacity(config.target_chunk_count + 1),
            chord_angle,
            next_slot: 0,
            ring_rotation: 0.0,
            stats: StreamStats::default(),
            update_list: Vec::new(),
            config,
        };

        for _ in 0..manager.config.target_chunk_count {
            manager.spawn_chunk();
        }
        info!("ChunkManager: Initialization complete with {} chunks", manager.chunks.len());
        Ok(manager)
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn live_settings(&self) -> LiveSettings {
        self.live
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Active chunks, oldest (closest to the viewpoint) first.
    pub fn chunks(&self) -> impl ExactSizeIterator<Item = &Chunk> {
        self.chunks.iter()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn oldest(&self) -> Option<&Chunk> {
        self.chunks.front()
    }

    pub fn newest(&self) -> Option<&Chunk> {
        self.chunks.back()
    }

    pub fn chord_angle(&self) -> f32 {
        self.chord_angle
    }

    /// Fastest speed the pool can keep up with: one chord per tick, since
    /// only one chunk is retired per tick.
    pub fn max_speed(&self) -> f32 {
        self.chord_angle / ANGULAR_RATE
    }

    pub fn ring_rotation(&self) -> f32 {
        self.ring_rotation
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn add_to_update_list(&mut self, object: Box<dyn Updatable>) {
        self.update_list.push(object);
    }

    // --- Staged setters ---

    /// Speeds outside `0..=max_speed()` are accepted but clamped on every tick.
    pub fn set_speed(&mut self, speed: f32) {
        if !(0.0..=self.max_speed()).contains(&speed) {
            warn!(
                "ChunkManager: Speed {} will be clamped to [0, {:.3}]",
                speed,
                self.max_speed()
            );
        }
        self.pending.speed = Some(speed);
    }

    pub fn set_noise_strength(&mut self, noise_strength: f32) {
        self.pending.noise_strength = Some(noise_strength);
    }

    pub fn set_breathing_rate(&mut self, breathing_rate: f32) {
        self.pending.breathing_rate = Some(breathing_rate);
    }

    /// New seed for chunks spawned from the next tick on. Chunks already on
    /// the ring keep their terrain.
    pub fn set_seed(&mut self, seed: u32) {
        self.pending.seed = Some(seed);
    }

    pub fn set_noise_type(&mut self, noise_type: NoiseType) {
        self.pending.noise_type = Some(noise_type);
    }

    pub fn set_noise_scale(&mut self, noise_scale: f32) -> ConfigResult<()> {
        if !(noise_scale > 0.0) {
            warn!("ChunkManager: Rejected noise scale {}", noise_scale);
            return Err(ConfigError::InvalidNoiseScale(noise_scale));
        }
        self.pending.noise_scale = Some(noise_scale);
        Ok(())
    }

    pub fn set_resolution(&mut self, resolution: u32) -> ConfigResult<()> {
        if resolution == 0 {
            warn!("ChunkManager: Rejected vertex resolution 0");
            return Err(ConfigError::ZeroResolution);
        }
        self.pending.resolution = Some(resolution);
        Ok(())
    }

    fn apply_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);

        if let Some(speed) = pending.speed {
            self.live.speed = speed;
            self.config.speed = speed;
        }
        if let Some(noise_strength) = pending.noise_strength {
            self.live.noise_strength = noise_strength;
            self.config.noise_strength = noise_strength;
        }
        if let Some(breathing_rate) = pending.breathing_rate {
            self.live.breathing_rate = breathing_rate;
            self.config.breathing_rate = breathing_rate;
        }

        let mut rebuild = false;
        if let Some(seed) = pending.seed {
            self.config.seed = seed;
            rebuild = true;
        }
        if let Some(noise_type) = pending.noise_type {
            self.config.noise_type = noise_type;
            rebuild = true;
        }
        if let Some(noise_scale) = pending.noise_scale {
            self.config.noise_scale = noise_scale;
            rebuild = true;
        }
        if let Some(resolution) = pending.resolution {
            self.config.resolution = resolution;
            rebuild = true;
        }
        if rebuild {
            self.builder = TerrainMeshBuilder::new(&self.config);
            info!(
                "ChunkManager: Generation settings changed (seed {}, scale {}, resolution {})",
                self.config.seed, self.config.noise_scale, self.config.resolution
            );
        }
    }

    /// Build the chunk for the next slot and push it at the back.
    fn spawn_chunk(&mut self) {
        let slot_index = self.next_slot;
        let theta_offset = slot_index as f32 * self.chord_angle;
        // Continue contiguously from the current tail when there is one.
        let theta = match self.chunks.back() {
            Some(tail) => tail.theta() + self.chord_angle,
            None => theta_offset - self.ring_rotation,
        };
        let noise_offset = slot_index as f32 * self.config.chunk_width;

        let terrain = self.builder.build(noise_offset);
        let slot = ChunkSlot {
            theta_offset,
            theta,
            noise_offset,
        };
        let chunk = Chunk::spawn(slot_index, slot, terrain, &self.config, &mut self.host);
        self.chunks.push_back(chunk);

        self.next_slot += 1;
        self.stats.spawned += 1;
        debug!("ChunkManager: Spawned chunk {} ({} active)", slot_index, self.chunks.len());
    }

    /// Retire the oldest chunk if its trailing edge has passed the viewpoint.
    /// The angle check catches a head so far behind that its forward
    /// position has wrapped back to positive.
    fn retire_passed_chunk(&mut self) {
        let passed = match self.chunks.front() {
            Some(head) => {
                head.far_edge() <= self.config.retire_distance || head.ring_angle() <= -FRAC_PI_2
            }
            None => false,
        };
        if !passed {
            return;
        }
        if let Some(mut head) = self.chunks.pop_front() {
            head.retire(&mut self.host);
            self.stats.retired += 1;
            debug!("ChunkManager: Retired chunk {} ({} active)", head.id(), self.chunks.len());
        }
    }

    /// One frame with explicit per-frame values.
    ///
    /// Order: ring advance, spawn check, retire check, then every chunk in
    /// ring order. At most one chunk is built and one retired per call.
    pub fn update(&mut self, time_stamp: f64, speed: f32, noise_strength: f32, breathing_rate: f32) {
        self.apply_pending();

        let speed = speed.clamp(0.0, self.max_speed());
        let step = speed * ANGULAR_RATE;
        self.ring_rotation += step;
        self.stats.angular_advance += step as f64;
        self.stats.ticks += 1;

        // The new chunk continues from the tail, which has not moved yet
        // this tick; both move together in the update pass below.
        if self.chunks.len() < self.config.target_chunk_count {
            self.spawn_chunk();
        }

        self.retire_passed_chunk();

        for chunk in self.chunks.iter_mut() {
            chunk.update(
                time_stamp,
                speed,
                noise_strength,
                breathing_rate,
                &self.config,
                &mut self.host,
            );
        }
        update_all(&mut self.update_list, time_stamp);
    }

    /// One frame using the current live settings.
    pub fn tick(&mut self, time_stamp: f64) {
        // Staged changes must land before the values are read.
        self.apply_pending();
        let LiveSettings {
            speed,
            noise_strength,
            breathing_rate,
        } = self.live;
        self.update(time_stamp, speed, noise_strength, breathing_rate);
    }

    /// Retire every chunk, releasing all host resources.
    pub fn shutdown(&mut self) {
        while let Some(mut chunk) = self.chunks.pop_front() {
            chunk.retire(&mut self.host);
            self.stats.retired += 1;
        }
        info!("ChunkManager: Shut down after {} ticks", self.stats.ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::terrain_bridge::{NullSceneHost, RecordingSceneHost, RenderableKind};

    fn small_config() -> TerrainConfig {
        TerrainConfig {
            chunk_width: 10.0,
            chunk_height: 20.0,
            target_chunk_count: 12,
            ..TerrainConfig::default()
        }
    }

    #[test]
    fn construction_fills_the_pool() {
        let manager = ChunkManager::new(small_config(), NullSceneHost::default()).unwrap();
        assert_eq!(manager.chunk_count(), 12);
        let ids: Vec<u64> = manager.chunks().map(|c| c.id()).collect();
        assert_eq!(ids, (0..12).collect::<Vec<_>>());
        let offsets: Vec<f32> = manager.chunks().map(|c| c.theta_offset()).collect();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn invalid_config_is_fatal() {
        let config = TerrainConfig {
            chunk_width: 3000.0,
            ..small_config()
        };
        assert!(matches!(
            ChunkManager::new(config, NullSceneHost::default()),
            Err(ConfigError::ChordUndefined { .. })
        ));
    }

    #[test]
    fn neighbouring_chunks_are_one_chord_apart() {
        let mut manager = ChunkManager::new(small_config(), NullSceneHost::default()).unwrap();
        for i in 0..200 {
            manager.update(i as f64 * 16.0, 1.0, 40.0, 0.0);
        }
        let chord = manager.chord_angle();
        let thetas: Vec<f32> = manager.chunks().map(|c| c.theta()).collect();
        for pair in thetas.windows(2) {
            assert!((pair[1] - pair[0] - chord).abs() < 1e-4);
        }
    }

    #[test]
    fn at_most_one_spawn_and_retire_per_tick() {
        let mut manager = ChunkManager::new(small_config(), NullSceneHost::default()).unwrap();
        let mut last = manager.stats();
        for i in 0..2000 {
            manager.update(i as f64, 0.5, 40.0, 0.0);
            let now = manager.stats();
            assert!(now.spawned - last.spawned <= 1);
            assert!(now.retired - last.retired <= 1);
            let count = manager.chunk_count();
            assert!(count == 12 || count == 11, "pool size {count}");
            last = now;
        }
        assert!(last.retired > 0);
    }

    #[test]
    fn fast_rotation_never_leaves_the_head_across_the_ring() {
        let config = small_config();
        let radius = config.ring_radius;
        let mut manager = ChunkManager::new(config, NullSceneHost::default()).unwrap();
        for i in 0..1500 {
            manager.update(i as f64, 8.0, 40.0, 0.0);
            let head = manager.oldest().unwrap();
            assert!(head.ring_angle() > -FRAC_PI_2, "head angle {} at tick {i}", head.ring_angle());
            assert!(head.position().z < radius);
            assert!(head.near_edge() <= 0.0);
            assert!(manager.chunk_count() + 1 >= 12);
        }

        let stats = manager.stats();
        let step = manager.max_speed() * ANGULAR_RATE;
        assert!((stats.angular_advance - 1500.0 * step as f64).abs() < 1e-3);
        let passed = (stats.angular_advance / manager.chord_angle() as f64).floor() as u64;
        assert!(stats.retired <= passed + 1 && stats.retired + 3 >= passed);
    }

    #[test]
    fn negative_speed_holds_the_ring_still() {
        let mut manager = ChunkManager::new(small_config(), NullSceneHost::default()).unwrap();
        manager.update(0.0, -3.0, 40.0, 0.0);
        assert_eq!(manager.ring_rotation(), 0.0);
        assert_eq!(manager.oldest().unwrap().theta(), 0.0);
    }

    #[test]
    fn staged_settings_apply_on_next_tick() {
        let mut manager = ChunkManager::new(small_config(), NullSceneHost::default()).unwrap();
        manager.set_speed(1.5);
        manager.set_breathing_rate(1.0);
        assert_eq!(manager.live_settings().speed, small_config().speed);

        manager.tick(0.0);
        assert_eq!(manager.live_settings().speed, 1.5);
        assert_eq!(manager.live_settings().breathing_rate, 1.0);
        assert!((manager.ring_rotation() - 1.5 * ANGULAR_RATE).abs() < 1e-7);
    }

    #[test]
    fn rejected_settings_are_not_staged() {
        let mut manager = ChunkManager::new(small_config(), NullSceneHost::default()).unwrap();
        assert_eq!(manager.set_resolution(0), Err(ConfigError::ZeroResolution));
        assert!(manager.set_noise_scale(-1.0).is_err());
        manager.tick(0.0);
        assert_eq!(manager.config().resolution, 1);
        assert_eq!(manager.config().noise_scale, small_config().noise_scale);
    }

    #[test]
    fn seed_change_only_affects_new_chunks() {
        let original = small_config();
        let mut manager = ChunkManager::new(original.clone(), NullSceneHost::default()).unwrap();
        let first_heights = manager.oldest().unwrap().height_map().to_vec();
        manager.set_seed(99);
        manager.tick(0.0);
        assert_eq!(manager.config().seed, 99);
        assert_eq!(manager.oldest().unwrap().height_map(), first_heights.as_slice());

        while manager.stats().spawned == 12 {
            manager.update(0.0, 1.0, 40.0, 0.0);
        }
        let newest = manager.newest().unwrap();
        let old_terrain = TerrainMeshBuilder::new(&original).build(newest.noise_offset());
        assert_ne!(newest.height_map(), old_terrain.height_map.as_slice());
    }

    #[test]
    fn shutdown_releases_all_renderables() {
        let mut manager = ChunkManager::new(small_config(), RecordingSceneHost::new()).unwrap();
        for i in 0..50 {
            manager.update(i as f64, 1.0, 40.0, 0.0);
        }
        assert_eq!(manager.host().live_of_kind(RenderableKind::Terrain), manager.chunk_count());
        manager.shutdown();
        assert_eq!(manager.chunk_count(), 0);
        assert_eq!(manager.host().live_count(), 0);
        // Nothing left to retire: ticking an empty pool is harmless.
        manager.retire_passed_chunk();
    }
}
