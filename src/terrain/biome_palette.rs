// src/terrain/biome_palette.rs
use glam::Vec3;

// Elevation band edges, on the normalized height map scale.
pub const WATER_LEVEL: f32 = 0.25;
pub const BEACH_TOP: f32 = 0.28;
pub const GRASS_TOP: f32 = 0.45;
pub const CLIFF_START: f32 = 0.55;
pub const CLIFF_TOP: f32 = 0.7;
pub const SNOW_START: f32 = 0.9;

pub const WATER: u32 = 0x44ccff;
pub const BEACH: u32 = 0x483c32;
pub const GRASS: u32 = 0x356520;
pub const CLIFF: u32 = 0x335577;
pub const SNOW: u32 = 0xcccccc;
/// Shade of terrain that has not been revealed yet.
pub const FLAT: u32 = 0x777777;

/// `0xRRGGBB` to linear-ish `[0, 1]` channels.
pub fn hex_color(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

pub fn flat_color() -> Vec3 {
    hex_color(FLAT)
}

/// Base biome color for a face whose highest vertex sits at `max_elevation`.
///
/// Bands are water, beach, grass, grass to cliff, cliff, cliff to snow, snow.
/// The two mixed bands interpolate linearly across their whole width.
pub fn biome_color(max_elevation: f32) -> Vec3 {
    let h = max_elevation;
    if h <= WATER_LEVEL {
        hex_color(WATER)
    } else if h < BEACH_TOP {
        hex_color(BEACH)
    } else if h <= GRASS_TOP {
        hex_color(GRASS)
    } else if h <= CLIFF_START {
        let t = (h - GRASS_TOP) / (CLIFF_START - GRASS_TOP);
        hex_color(GRASS).lerp(hex_color(CLIFF), t)
    } else if h <= CLIFF_TOP {
        hex_color(CLIFF)
    } else if h <= SNOW_START {
        let t = (h - CLIFF_TOP) / (SNOW_START - CLIFF_TOP);
        hex_color(CLIFF).lerp(hex_color(SNOW), t)
    } else {
        hex_color(SNOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_unpacks_channels() {
        assert_eq!(hex_color(0xff0000), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(hex_color(0x000000), Vec3::ZERO);
    }

    #[test]
    fn pure_bands() {
        assert_eq!(biome_color(0.1), hex_color(WATER));
        assert_eq!(biome_color(WATER_LEVEL), hex_color(WATER));
        assert_eq!(biome_color(0.26), hex_color(BEACH));
        assert_eq!(biome_color(0.4), hex_color(GRASS));
        assert_eq!(biome_color(0.6), hex_color(CLIFF));
        assert_eq!(biome_color(1.2), hex_color(SNOW));
    }

    #[test]
    fn blends_are_continuous_at_their_edges() {
        let eps = 1e-4;
        let below = biome_color(GRASS_TOP);
        let above = biome_color(GRASS_TOP + eps);
        assert!(below.distance(above) < 1e-2);

        let snow_edge = biome_color(SNOW_START);
        assert!(snow_edge.distance(hex_color(SNOW)) < 1e-5);
    }

    #[test]
    fn midpoint_of_cliff_blend() {
        let mid = biome_color((CLIFF_TOP + SNOW_START) / 2.0);
        let expected = (hex_color(CLIFF) + hex_color(SNOW)) / 2.0;
        assert!(mid.distance(expected) < 1e-5);
    }
}
