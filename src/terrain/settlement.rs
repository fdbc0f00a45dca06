//! Villages, buildings, campfires and the roads between them.
//!
//! World-x is split into segments of `VILLAGE_SPACING` columns. Each segment
//! either holds a village or not, decided by an integer hash of the segment
//! index and the world seed, so placement never drifts as the world scrolls.
//! Neighbouring villages are joined by a road that runs from one centre to
//! the next, wobbling with low-frequency noise.

use noise::NoiseFn;

use super::TerrainGenerator;
use crate::hash::{position_hash, segment_hash, unit_fraction};

/// Width of a settlement segment in columns
pub const VILLAGE_SPACING: i64 = 80;
/// Probability that a segment holds a village
pub const VILLAGE_CHANCE: f64 = 0.6;
pub const BUILDING_WIDTH: i64 = 3;
pub const BUILDING_HEIGHT: i32 = 3;
pub const MAX_BUILDINGS_PER_VILLAGE: u32 = 3;
/// Roads widen to three rows within this many columns of a village centre
pub const ROAD_WIDEN_RADIUS: i64 = 10;

// Salts keep the per-segment decisions independent of each other
const PRESENCE_SALT: u64 = 7919;
const CENTER_SALT: u64 = 6271;
const COUNT_SALT: u64 = 4201;
const BUILDING_SALT: u64 = 3571;
const BUILDING_STRIDE: u64 = 997;
const BUILDING_HASH_SALT: u64 = 0x6275_696c_6469_6e67;
const CAMPFIRE_HASH_SALT: u64 = 0x6669_7265;

/// A building footprint anchored at its top-left cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Building {
    pub x: i64,
    pub y: i32,
    /// Chooses the wall and roof glyph variants
    pub hash: u32,
}

impl Building {
    /// Which part of the footprint covers `(x, y)`, if any.
    pub fn part_at(&self, x: i64, y: i32) -> Option<BuildingPart> {
        let dx = x - self.x;
        let dy = y - self.y;
        if !(0..BUILDING_WIDTH).contains(&dx) || !(0..BUILDING_HEIGHT).contains(&dy) {
            return None;
        }
        if dy == 0 {
            Some(BuildingPart::Roof)
        } else if dy == BUILDING_HEIGHT - 1 && dx == BUILDING_WIDTH / 2 {
            Some(BuildingPart::Door)
        } else {
            Some(BuildingPart::Wall)
        }
    }

    /// Campfire cell: one column right of the bottom-right corner
    pub fn campfire(&self) -> (i64, i32) {
        (self.x + BUILDING_WIDTH, self.y + BUILDING_HEIGHT - 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuildingPart {
    Roof,
    Wall,
    Door,
}

/// A village and its buildings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub segment: i64,
    pub center: (i64, i32),
    pub buildings: Vec<Building>,
}

/// Segment containing `world_x`
#[inline]
pub fn segment_of(world_x: i64) -> i64 {
    world_x.div_euclid(VILLAGE_SPACING)
}

/// World-x of a segment's village centre
#[inline]
pub fn segment_center_x(segment: i64) -> i64 {
    segment * VILLAGE_SPACING + VILLAGE_SPACING / 2
}

/// Settlement overlays that touch one column, gathered once per column.
pub(super) struct ColumnFeatures {
    buildings: Vec<Building>,
    campfires: Vec<(i32, u32)>,
    road_y: Option<i32>,
    road_wide: bool,
}

impl ColumnFeatures {
    pub(super) fn building_at(&self, x: i64, y: i32) -> Option<(BuildingPart, u32)> {
        self.buildings
            .iter()
            .find_map(|b| b.part_at(x, y).map(|part| (part, b.hash)))
    }

    pub(super) fn campfire_at(&self, y: i32) -> Option<u32> {
        self.campfires.iter().find(|(fy, _)| *fy == y).map(|&(_, hash)| hash)
    }

    /// Road test ignoring terrain; the caller checks the walkable band.
    pub(super) fn road_covers(&self, y: i32) -> bool {
        match self.road_y {
            Some(road_y) => {
                let dist = (y - road_y).abs();
                dist == 0 || (self.road_wide && dist <= 1)
            }
            None => false,
        }
    }
}

impl TerrainGenerator {
    pub fn has_village(&self, segment: i64) -> bool {
        unit_fraction(segment_hash(segment, PRESENCE_SALT, self.seed)) < VILLAGE_CHANCE
    }

    /// Village centre for a segment. The row stays within the middle 60% of
    /// the strip so buildings and roads are not clipped at the edges.
    pub fn village_center(&self, segment: i64, rows: usize) -> (i64, i32) {
        let h = segment_hash(segment, CENTER_SALT, self.seed);
        let min_y = (rows as f64 * 0.2).floor() as i32;
        let max_y = (rows as f64 * 0.8).floor() as i32;
        let span = (max_y - min_y).max(1) as u32;
        (segment_center_x(segment), min_y + (h % span) as i32)
    }

    /// Building anchors for a segment; empty when there is no village.
    pub fn building_positions(&self, segment: i64, rows: usize) -> Vec<Building> {
        if !self.has_village(segment) {
            return Vec::new();
        }

        let (cx, cy) = self.village_center(segment, rows);
        let count = 1 + segment_hash(segment, COUNT_SALT, self.seed) % MAX_BUILDINGS_PER_VILLAGE;
        let max_y = (rows as i32 - BUILDING_HEIGHT - 1).max(1);

        (0..count)
            .map(|i| {
                let bh = segment_hash(
                    segment,
                    BUILDING_SALT.wrapping_add(i as u64 * BUILDING_STRIDE),
                    self.seed,
                );
                // Offset from the centre: -6..=6 columns, -4..=4 rows
                let ox = (bh % 13) as i64 - 6;
                let oy = ((bh >> 8) % 9) as i32 - 4;
                let x = cx + ox;
                let y = (cy + oy).clamp(1, max_y);
                Building {
                    x,
                    y,
                    hash: position_hash(x, y, self.seed ^ BUILDING_HASH_SALT),
                }
            })
            .collect()
    }

    pub fn settlement(&self, segment: i64, rows: usize) -> Option<Settlement> {
        if !self.has_village(segment) {
            return None;
        }
        Some(Settlement {
            segment,
            center: self.village_center(segment, rows),
            buildings: self.building_positions(segment, rows),
        })
    }

    fn campfire_hash(&self, building: &Building) -> u32 {
        position_hash(building.x, building.y, self.seed ^ CAMPFIRE_HASH_SALT)
    }

    /// Row of the road at `world_x`, if a road passes this column.
    ///
    /// The candidate pair is the nearest village centre at or left of
    /// `world_x` and the one after it; a road exists only when both segments
    /// hold villages. At a centre exactly, the road leaving it wins, and the
    /// incoming road covers the centre when nothing leaves it.
    pub fn road_y(&self, world_x: i64, rows: usize) -> Option<i32> {
        let segment = segment_of(world_x);
        let center = segment_center_x(segment);
        let mut left = if world_x >= center { segment } else { segment - 1 };
        if world_x == center && !self.villages_connected(segment) {
            left = segment - 1;
        }
        if !self.villages_connected(left) {
            return None;
        }

        let (x1, y1) = self.village_center(left, rows);
        let (x2, y2) = self.village_center(left + 1, rows);
        let t = (world_x - x1) as f64 / (x2 - x1) as f64;
        let base = y1 as f64 + (y2 - y1) as f64 * t;
        let p = &self.params;
        let wobble = self.noise.get([world_x as f64 * p.road_wobble_scale, 0.0]) * p.road_wobble;
        Some((base + wobble).round() as i32)
    }

    /// Whether a road joins the villages of `segment` and `segment + 1`
    fn villages_connected(&self, segment: i64) -> bool {
        self.has_village(segment) && self.has_village(segment + 1)
    }

    /// Whether the road at `world_x` is widened near a village centre
    fn road_is_wide(&self, world_x: i64, rows: usize) -> bool {
        let segment = segment_of(world_x);
        if !self.has_village(segment) {
            return false;
        }
        let (cx, _) = self.village_center(segment, rows);
        (world_x - cx).abs() < ROAD_WIDEN_RADIUS
    }

    pub(super) fn column_features(&self, world_x: i64, rows: usize) -> ColumnFeatures {
        let segment = segment_of(world_x);
        let nearby: Vec<Building> = (segment - 1..=segment + 1)
            .flat_map(|s| self.building_positions(s, rows))
            .collect();

        let campfires = nearby
            .iter()
            .filter(|b| b.campfire().0 == world_x)
            .map(|b| (b.campfire().1, self.campfire_hash(b)))
            .collect();

        let buildings = nearby
            .into_iter()
            .filter(|b| (0..BUILDING_WIDTH).contains(&(world_x - b.x)))
            .collect();

        let road_y = self.road_y(world_x, rows);
        let road_wide = road_y.is_some() && self.road_is_wide(world_x, rows);

        ColumnFeatures { buildings, campfires, road_y, road_wide }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TileKind;

    const ROWS: usize = 40;

    #[test]
    fn test_segments() {
        assert_eq!(segment_of(0), 0);
        assert_eq!(segment_of(79), 0);
        assert_eq!(segment_of(80), 1);
        assert_eq!(segment_of(-1), -1);
        assert_eq!(segment_of(-80), -1);
        assert_eq!(segment_of(-81), -2);
        assert_eq!(segment_center_x(2), 200);
    }

    #[test]
    fn test_settlement_stability_independent_of_order() {
        let forward = TerrainGenerator::new(42);
        let expected: Vec<_> = (-20..20)
            .map(|s| (forward.has_village(s), forward.village_center(s, ROWS)))
            .collect();

        let backward = TerrainGenerator::new(42);
        // Query unrelated segments first, then in reverse order
        for s in 1000..1100 {
            backward.settlement(s, ROWS);
        }
        let segments: Vec<i64> = (-20..20).collect();
        for (i, &s) in segments.iter().enumerate().rev() {
            assert_eq!(
                (backward.has_village(s), backward.village_center(s, ROWS)),
                expected[i]
            );
        }
    }

    #[test]
    fn test_village_frequency_plausible() {
        let generator = TerrainGenerator::new(42);
        let count = (0..1000).filter(|&s| generator.has_village(s)).count();
        assert!((500..700).contains(&count), "village count {}", count);
    }

    #[test]
    fn test_village_center_bounds() {
        let generator = TerrainGenerator::new(9);
        for s in -50..50 {
            let (x, y) = generator.village_center(s, ROWS);
            assert_eq!(x, s * VILLAGE_SPACING + VILLAGE_SPACING / 2);
            assert!((8..32).contains(&y), "centre row {} out of band", y);
        }
        // Degenerate strip heights must not panic
        for rows in 0..4 {
            generator.village_center(3, rows);
            generator.building_positions(3, rows);
        }
    }

    #[test]
    fn test_buildings_near_center() {
        let generator = TerrainGenerator::new(42);
        let mut total = 0;
        for s in 0..100 {
            match generator.settlement(s, ROWS) {
                Some(settlement) => {
                    let n = settlement.buildings.len() as u32;
                    assert!((1..=MAX_BUILDINGS_PER_VILLAGE).contains(&n));
                    for b in &settlement.buildings {
                        assert!((b.x - settlement.center.0).abs() <= 6);
                        assert!(b.y >= 1 && b.y <= ROWS as i32 - BUILDING_HEIGHT - 1);
                    }
                    total += n;
                }
                None => assert!(generator.building_positions(s, ROWS).is_empty()),
            }
        }
        assert!(total > 0);
    }

    #[test]
    fn test_building_parts() {
        let b = Building { x: 10, y: 5, hash: 0 };
        assert_eq!(b.part_at(10, 5), Some(BuildingPart::Roof));
        assert_eq!(b.part_at(12, 5), Some(BuildingPart::Roof));
        assert_eq!(b.part_at(10, 6), Some(BuildingPart::Wall));
        assert_eq!(b.part_at(11, 7), Some(BuildingPart::Door));
        assert_eq!(b.part_at(12, 7), Some(BuildingPart::Wall));
        assert_eq!(b.part_at(13, 7), None);
        assert_eq!(b.part_at(10, 8), None);
        assert_eq!(b.part_at(9, 5), None);
        assert_eq!(b.campfire(), (13, 7));
    }

    fn connected_pair(generator: &TerrainGenerator) -> i64 {
        (0..200)
            .find(|&s| generator.has_village(s) && generator.has_village(s + 1))
            .expect("no adjacent villages in 200 segments")
    }

    /// Connected pairs whose right village has no road leaving it
    fn dead_end_pairs(seed: u64) -> Vec<i64> {
        let generator = TerrainGenerator::new(seed);
        (-20..20)
            .filter(|&s| {
                generator.has_village(s) && generator.has_village(s + 1) && !generator.has_village(s + 2)
            })
            .collect()
    }

    fn assert_road_continuous(generator: &TerrainGenerator, s: i64, rows: usize) {
        let (x1, _) = generator.village_center(s, rows);
        let (x2, _) = generator.village_center(s + 1, rows);

        let mut prev: Option<i32> = None;
        for x in x1..=x2 {
            let y = generator.road_y(x, rows);
            assert!(y.is_some(), "gap in road at x={} (seed {}, segment {})", x, generator.seed(), s);
            let y = y.unwrap();
            if let Some(p) = prev {
                assert!((y - p).abs() <= 3, "road jumps from {} to {} at x={}", p, y, x);
            }
            prev = Some(y);
        }
    }

    #[test]
    fn test_road_connectivity() {
        for seed in [1u64, 42, 1234] {
            let generator = TerrainGenerator::new(seed);
            let s = connected_pair(&generator);
            assert_road_continuous(&generator, s, ROWS);
        }
    }

    #[test]
    fn test_road_reaches_dead_end_village() {
        let mut checked = 0;
        for seed in 0..20u64 {
            let generator = TerrainGenerator::new(seed);
            for s in dead_end_pairs(seed) {
                for rows in [5usize, ROWS, 120] {
                    assert_road_continuous(&generator, s, rows);

                    // The last cell is the village centre itself
                    let (x2, y2) = generator.village_center(s + 1, rows);
                    let wobble = generator.noise.get([x2 as f64 * 0.05, 0.0]) * 3.0;
                    assert_eq!(generator.road_y(x2, rows), Some((y2 as f64 + wobble).round() as i32));
                    assert_eq!(generator.road_y(x2 + 1, rows), None);
                }
                checked += 1;
            }
        }
        assert!(checked > 0, "no dead-end village pairs found");
    }

    #[test]
    fn test_no_road_without_neighbour() {
        let generator = TerrainGenerator::new(42);
        let lonely = (0..500)
            .find(|&s| !generator.has_village(s) && !generator.has_village(s + 1))
            .expect("no empty segment pair");
        let from = segment_center_x(lonely);
        for x in from..from + VILLAGE_SPACING {
            assert_eq!(generator.road_y(x, ROWS), None);
        }
    }

    #[test]
    fn test_road_ends_at_centres() {
        let generator = TerrainGenerator::new(42);
        let s = connected_pair(&generator);
        let (x1, y1) = generator.village_center(s, ROWS);
        let wobble = generator.noise.get([x1 as f64 * 0.05, 0.0]) * 3.0;
        assert_eq!(generator.road_y(x1, ROWS), Some((y1 as f64 + wobble).round() as i32));
    }

    #[test]
    fn test_buildings_appear_in_columns() {
        let mut generator = TerrainGenerator::new(42);
        let settlement = (0..100)
            .find_map(|s| generator.settlement(s, ROWS))
            .expect("no settlement");
        let first = settlement.buildings[0];

        // Some building always owns the roof cell, though maybe not this one
        // when footprints overlap
        let column = generator.generate_column(first.x, ROWS);
        let tile = column.tiles[first.y as usize];
        assert!(matches!(
            tile.kind,
            TileKind::BuildingRoof | TileKind::BuildingWall | TileKind::BuildingDoor
        ));
        let features = generator.column_features(first.x, ROWS);
        assert!(features.building_at(first.x, first.y).is_some());
    }

    #[test]
    fn test_campfires_appear_in_columns() {
        let mut generator = TerrainGenerator::new(42);
        let mut found = false;
        for s in 0..60 {
            for b in generator.building_positions(s, ROWS) {
                let (fx, fy) = b.campfire();
                let features = generator.column_features(fx, ROWS);
                if features.building_at(fx, fy).is_some() {
                    continue;
                }
                assert!(features.campfire_at(fy).is_some());
                let column = generator.generate_column(fx, ROWS);
                assert_eq!(column.tiles[fy as usize].kind, TileKind::Campfire);
                found = true;
            }
        }
        assert!(found);
    }

    #[test]
    fn test_roads_and_bridges_in_columns() {
        let mut generator = TerrainGenerator::new(42);
        let s = connected_pair(&generator);
        let (x1, _) = generator.village_center(s, ROWS);
        let (x2, _) = generator.village_center(s + 1, ROWS);
        let mut road_cells = 0;
        for x in x1..=x2 {
            for tile in generator.generate_column(x, ROWS).tiles {
                if matches!(tile.kind, TileKind::Road | TileKind::Bridge) {
                    road_cells += 1;
                }
            }
        }
        assert!(road_cells > 0);
    }
}
