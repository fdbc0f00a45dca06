//! Per-tile animation cycles.
//!
//! Animated tiles step through a short fixed cycle. The step index is offset
//! by the tile's position hash, so neighbouring cells shimmer or flicker out
//! of phase rather than blinking together.

use crate::palette::ColorKey;
use crate::terrain::{AnimationClass, Tile};

/// Frames per water shimmer step
pub const WATER_INTERVAL: u64 = 20;
pub const WATER_CYCLE: [char; 4] = ['~', '≈', '≋', '≈'];

/// Frames per campfire flicker step
pub const CAMPFIRE_INTERVAL: u64 = 6;
pub const CAMPFIRE_CYCLE: [(char, ColorKey); 4] = [
    ('☼', ColorKey::WarmGlow),
    ('♦', ColorKey::FireOrange),
    ('☼', ColorKey::FireOrange),
    ('*', ColorKey::WarmGlow),
];

/// `(hash + frame / interval) mod len`
#[inline]
pub fn cycle_index(position_hash: u32, frame: u64, interval: u64, len: usize) -> usize {
    let step = frame / interval.max(1);
    ((position_hash as u64).wrapping_add(step) % len as u64) as usize
}

/// Glyph and color key to display for a tile on a given frame.
pub fn animate(tile: &Tile, frame: u64) -> (char, ColorKey) {
    match tile.animation {
        AnimationClass::None => (tile.glyph, tile.color),
        AnimationClass::Water => {
            let i = cycle_index(tile.position_hash, frame, WATER_INTERVAL, WATER_CYCLE.len());
            (WATER_CYCLE[i], tile.color)
        }
        AnimationClass::Campfire => {
            let i = cycle_index(tile.position_hash, frame, CAMPFIRE_INTERVAL, CAMPFIRE_CYCLE.len());
            CAMPFIRE_CYCLE[i]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TileKind;

    fn tile(animation: AnimationClass, position_hash: u32) -> Tile {
        Tile {
            glyph: '~',
            color: ColorKey::WaterLight,
            animation,
            position_hash,
            kind: TileKind::River,
        }
    }

    #[test]
    fn test_water_steps_forward_once_per_interval() {
        for h in [0u32, 1, 2, 3, 17, 123_456_789, u32::MAX] {
            let t = tile(AnimationClass::Water, h);
            let start = cycle_index(h, 0, WATER_INTERVAL, WATER_CYCLE.len());
            let next = cycle_index(h, WATER_INTERVAL, WATER_INTERVAL, WATER_CYCLE.len());
            assert_eq!(next, (start + 1) % WATER_CYCLE.len());

            let (g0, _) = animate(&t, 0);
            let (g1, _) = animate(&t, WATER_INTERVAL);
            assert_ne!(g0, g1);
            assert_eq!(g0, WATER_CYCLE[start]);
            assert_eq!(g1, WATER_CYCLE[next]);

            // Holds steady within an interval
            assert_eq!(animate(&t, WATER_INTERVAL - 1).0, g0);

            let full = WATER_CYCLE.len() as u64 * WATER_INTERVAL;
            assert_eq!(animate(&t, full), animate(&t, 0));
        }
    }

    #[test]
    fn test_water_keeps_color() {
        let t = tile(AnimationClass::Water, 5);
        for frame in 0..100 {
            assert_eq!(animate(&t, frame).1, ColorKey::WaterLight);
        }
    }

    #[test]
    fn test_campfire_overrides_color() {
        let t = tile(AnimationClass::Campfire, 0);
        let colors: Vec<ColorKey> = (0..CAMPFIRE_CYCLE.len() as u64)
            .map(|step| animate(&t, step * CAMPFIRE_INTERVAL).1)
            .collect();
        assert!(colors.contains(&ColorKey::FireOrange));
        assert!(colors.contains(&ColorKey::WarmGlow));
        assert!(!colors.contains(&ColorKey::WaterLight));
    }

    #[test]
    fn test_adjacent_steps_differ() {
        for i in 0..WATER_CYCLE.len() {
            assert_ne!(WATER_CYCLE[i], WATER_CYCLE[(i + 1) % WATER_CYCLE.len()]);
        }
        for i in 0..CAMPFIRE_CYCLE.len() {
            assert_ne!(CAMPFIRE_CYCLE[i], CAMPFIRE_CYCLE[(i + 1) % CAMPFIRE_CYCLE.len()]);
        }
    }

    #[test]
    fn test_neighbours_out_of_phase() {
        let a = tile(AnimationClass::Water, 10);
        let b = tile(AnimationClass::Water, 11);
        assert_ne!(animate(&a, 0).0, animate(&b, 0).0);
    }

    #[test]
    fn test_static_tiles_untouched() {
        let t = tile(AnimationClass::None, 3);
        for frame in [0, 1, 1000] {
            assert_eq!(animate(&t, frame), ('~', ColorKey::WaterLight));
        }
    }
}
