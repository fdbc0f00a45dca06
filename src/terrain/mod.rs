//! Procedural terrain columns.
//!
//! The world is an endless strip of fixed height. Each column is produced
//! from its world-x coordinate alone: elevation and moisture come from fbm
//! noise, and settlements, roads and rivers are overlaid on top of the base
//! biome in a fixed priority order. Nothing depends on which columns were
//! generated before, so regenerating a column always yields the same tiles.

pub mod glyphs;
pub mod settlement;

use crate::cache::{CacheStats, NoiseCache};
use crate::hash::{position_hash, unit_fraction};
use crate::noise_engine::NoiseEngine;
use crate::palette::ColorKey;

pub use settlement::{Building, BuildingPart, Settlement};

// =============================================================================
// TILE TYPES
// =============================================================================

/// Cyclic animation applied to a tile at draw time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum AnimationClass {
    #[default]
    None,
    Water,
    Campfire,
}

/// Base terrain categories derived from elevation and moisture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    Water,
    Shore,
    Grass,
    Meadow,
    Forest,
    DenseForest,
    Mountain,
    Peak,
}

impl Biome {
    /// Classify a cell. Thresholds run from sea level up to the peaks.
    pub fn classify(elevation: f64, moisture: f64) -> Biome {
        if elevation < WATER_LEVEL {
            Biome::Water
        } else if elevation < SHORE_LEVEL {
            Biome::Shore
        } else if elevation < 0.0 {
            if moisture > 0.1 { Biome::Meadow } else { Biome::Grass }
        } else if elevation < 0.25 {
            if moisture > 0.0 { Biome::Forest } else { Biome::Grass }
        } else if elevation < 0.45 {
            if moisture > -0.2 { Biome::DenseForest } else { Biome::Forest }
        } else if elevation < 0.65 {
            Biome::Mountain
        } else {
            Biome::Peak
        }
    }
}

/// Which layer produced a tile
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    Biome(Biome),
    Flower,
    River,
    RiverShore,
    Road,
    Bridge,
    Campfire,
    BuildingWall,
    BuildingRoof,
    BuildingDoor,
}

/// One renderable cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    pub glyph: char,
    pub color: ColorKey,
    pub animation: AnimationClass,
    /// Stable per-cell hash, used to pick variants and desynchronise animations
    pub position_hash: u32,
    pub kind: TileKind,
}

impl Tile {
    fn new(kind: TileKind, glyph: char, color: ColorKey, position_hash: u32) -> Self {
        Self { glyph, color, animation: AnimationClass::None, position_hash, kind }
    }

    fn animated(mut self, animation: AnimationClass) -> Self {
        self.animation = animation;
        self
    }
}

/// A vertical slice of the world, top to bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub world_x: i64,
    pub tiles: Vec<Tile>,
}

impl Column {
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, y: usize) -> Option<&Tile> {
        self.tiles.get(y)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tile> {
        self.tiles.iter()
    }
}

// =============================================================================
// TERRAIN PARAMETERS
// =============================================================================

const WATER_LEVEL: f64 = -0.3;
const SHORE_LEVEL: f64 = -0.15;

/// Elevation band in which rivers may form
const RIVER_BAND: (f64, f64) = (-0.15, 0.45);
/// Elevation band roads can cross
const WALKABLE_BAND: (f64, f64) = (-0.15, 0.65);

const RIVER_THRESHOLD: f64 = 0.92;
const RIVER_SHORE_THRESHOLD: f64 = 0.88;

/// Chance that a meadow cell shows a flower instead
const FLOWER_CHANCE: f64 = 0.08;
const FLOWER_COLORS: [ColorKey; 4] = [
    ColorKey::FlowerRed,
    ColorKey::FlowerYellow,
    ColorKey::FlowerPurple,
    ColorKey::FlowerWhite,
];

/// Noise frequencies and offsets for the terrain fields
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainParams {
    /// Elevation frequency (lower = larger features)
    pub elevation_scale: f64,
    pub elevation_octaves: u32,
    pub moisture_scale: f64,
    pub moisture_octaves: u32,
    /// Offset that decorrelates moisture from elevation
    pub moisture_offset: f64,
    pub river_scale: f64,
    pub river_offset: f64,
    pub detail_scale: f64,
    pub lacunarity: f64,
    pub gain: f64,
    /// Road wobble frequency along x
    pub road_wobble_scale: f64,
    /// Road wobble amplitude in rows
    pub road_wobble: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            elevation_scale: 0.04,
            elevation_octaves: 4,
            moisture_scale: 0.03,
            moisture_octaves: 3,
            moisture_offset: 500.0,
            river_scale: 0.015,
            river_offset: 1000.0,
            detail_scale: 0.1,
            lacunarity: 2.0,
            gain: 0.5,
            road_wobble_scale: 0.05,
            road_wobble: 3.0,
        }
    }
}

// =============================================================================
// GENERATOR
// =============================================================================

/// Column generator. Owns its noise engine and sample caches, so two
/// generators never share state.
pub struct TerrainGenerator {
    seed: u64,
    noise: NoiseEngine,
    params: TerrainParams,
    elevation_cache: NoiseCache,
    moisture_cache: NoiseCache,
}

impl TerrainGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            noise: NoiseEngine::new(seed),
            params: TerrainParams::default(),
            elevation_cache: NoiseCache::new(),
            moisture_cache: NoiseCache::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    // -------------------------------------------------------------------------
    // Noise fields
    // -------------------------------------------------------------------------

    pub fn elevation_uncached(&self, x: i64, y: i32) -> f64 {
        let p = &self.params;
        self.noise.fbm(
            x as f64 * p.elevation_scale,
            y as f64 * p.elevation_scale,
            p.elevation_octaves,
            p.lacunarity,
            p.gain,
        )
    }

    pub fn moisture_uncached(&self, x: i64, y: i32) -> f64 {
        let p = &self.params;
        self.noise.fbm(
            x as f64 * p.moisture_scale + p.moisture_offset,
            y as f64 * p.moisture_scale + p.moisture_offset,
            p.moisture_octaves,
            p.lacunarity,
            p.gain,
        )
    }

    pub fn elevation(&mut self, x: i64, y: i32) -> f64 {
        let p = &self.params;
        let noise = &self.noise;
        self.elevation_cache.get_or_insert_with(x, y, || {
            noise.fbm(
                x as f64 * p.elevation_scale,
                y as f64 * p.elevation_scale,
                p.elevation_octaves,
                p.lacunarity,
                p.gain,
            )
        })
    }

    pub fn moisture(&mut self, x: i64, y: i32) -> f64 {
        let p = &self.params;
        let noise = &self.noise;
        self.moisture_cache.get_or_insert_with(x, y, || {
            noise.fbm(
                x as f64 * p.moisture_scale + p.moisture_offset,
                y as f64 * p.moisture_scale + p.moisture_offset,
                p.moisture_octaves,
                p.lacunarity,
                p.gain,
            )
        })
    }

    /// Single-octave variation used for light/dark variants
    pub fn detail(&self, x: i64, y: i32) -> f64 {
        let scale = self.params.detail_scale;
        self.noise.noise2d(x as f64 * scale, y as f64 * scale)
    }

    /// Ridge field: close to 1 along the zero contours of a low-frequency fbm.
    pub fn river_value(&self, x: i64, y: i32) -> f64 {
        let p = &self.params;
        let n = self.noise.fbm(
            x as f64 * p.river_scale + p.river_offset,
            y as f64 * p.river_scale + p.river_offset,
            2,
            p.lacunarity,
            p.gain,
        );
        1.0 - n.abs()
    }

    pub fn is_river(&self, x: i64, y: i32, elevation: f64) -> bool {
        in_band(elevation, RIVER_BAND) && self.river_value(x, y) > RIVER_THRESHOLD
    }

    pub fn is_river_shore(&self, x: i64, y: i32, elevation: f64) -> bool {
        if !in_band(elevation, RIVER_BAND) {
            return false;
        }
        let rv = self.river_value(x, y);
        rv > RIVER_SHORE_THRESHOLD && rv <= RIVER_THRESHOLD
    }

    pub fn cache_stats(&self) -> (CacheStats, CacheStats) {
        (self.elevation_cache.stats(), self.moisture_cache.stats())
    }

    pub fn clear_cache(&mut self) {
        self.elevation_cache.clear();
        self.moisture_cache.clear();
    }

    // -------------------------------------------------------------------------
    // Column generation
    // -------------------------------------------------------------------------

    /// Generate the column at `world_x` with `rows` tiles.
    ///
    /// Layer priority (first match wins): buildings, campfires, bridges,
    /// roads, rivers, river shores, base biome.
    pub fn generate_column(&mut self, world_x: i64, rows: usize) -> Column {
        let features = self.column_features(world_x, rows);
        let mut tiles = Vec::with_capacity(rows);

        for row in 0..rows {
            let y = row as i32;
            let elevation = self.elevation(world_x, y);
            let moisture = self.moisture(world_x, y);
            let detail = self.detail(world_x, y);
            let hash = position_hash(world_x, y, self.seed);

            // Layer 1: buildings
            if let Some((part, building_hash)) = features.building_at(world_x, y) {
                tiles.push(building_tile(part, building_hash));
                continue;
            }

            // Layer 2: campfires
            if let Some(fire_hash) = features.campfire_at(y) {
                tiles.push(
                    Tile::new(
                        TileKind::Campfire,
                        glyphs::pick(glyphs::CAMPFIRE, fire_hash),
                        ColorKey::WarmGlow,
                        fire_hash,
                    )
                    .animated(AnimationClass::Campfire),
                );
                continue;
            }

            let river = self.is_river(world_x, y, elevation);
            let road = in_band(elevation, WALKABLE_BAND) && features.road_covers(y);

            // Layer 3: bridges where a road crosses a river
            if river && road {
                tiles.push(Tile::new(TileKind::Bridge, glyphs::pick(glyphs::BRIDGE, hash), ColorKey::Bridge, hash));
                continue;
            }

            // Layer 4: roads
            if road {
                tiles.push(Tile::new(TileKind::Road, glyphs::pick(glyphs::ROAD, hash), ColorKey::Road, hash));
                continue;
            }

            // Layer 5: rivers
            if river {
                let color = if detail > 0.0 { ColorKey::RiverBlue } else { ColorKey::RiverDark };
                tiles.push(
                    Tile::new(TileKind::River, glyphs::pick(glyphs::RIVER, hash), color, hash)
                        .animated(AnimationClass::Water),
                );
                continue;
            }

            // Layer 6: river shores
            if self.is_river_shore(world_x, y, elevation) {
                tiles.push(Tile::new(
                    TileKind::RiverShore,
                    glyphs::pick(glyphs::SHORE, hash),
                    ColorKey::RiverShore,
                    hash,
                ));
                continue;
            }

            // Layer 7: base biome
            tiles.push(biome_tile(Biome::classify(elevation, moisture), detail, hash));
        }

        Column { world_x, tiles }
    }
}

#[inline]
fn in_band(value: f64, band: (f64, f64)) -> bool {
    value >= band.0 && value <= band.1
}

fn building_tile(part: BuildingPart, hash: u32) -> Tile {
    match part {
        BuildingPart::Roof => Tile::new(
            TileKind::BuildingRoof,
            glyphs::pick(glyphs::BUILDING_ROOF, hash),
            ColorKey::BuildingRoof,
            hash,
        ),
        BuildingPart::Door => Tile::new(TileKind::BuildingDoor, glyphs::DOOR, ColorKey::BuildingWall, hash),
        BuildingPart::Wall => Tile::new(
            TileKind::BuildingWall,
            glyphs::pick(glyphs::BUILDING_WALL, hash),
            ColorKey::BuildingWall,
            hash,
        ),
    }
}

/// Base biome tile with its glyph and light/dark variant
fn biome_tile(biome: Biome, detail: f64, hash: u32) -> Tile {
    if biome == Biome::Meadow && unit_fraction(hash) < FLOWER_CHANCE {
        let color = FLOWER_COLORS[hash as usize % FLOWER_COLORS.len()];
        return Tile::new(TileKind::Flower, glyphs::FLOWER, color, hash);
    }

    let variant = |threshold: f64, light: ColorKey, dark: ColorKey| {
        if detail > threshold { light } else { dark }
    };

    let (set, color) = match biome {
        Biome::Water => (glyphs::WATER, variant(0.0, ColorKey::WaterLight, ColorKey::WaterDark)),
        Biome::Shore => (glyphs::SHORE, ColorKey::Shore),
        Biome::Grass => (glyphs::GRASS, variant(0.3, ColorKey::GrassLight, ColorKey::GrassDark)),
        Biome::Meadow => (glyphs::MEADOW, variant(0.0, ColorKey::MeadowLight, ColorKey::MeadowDark)),
        Biome::Forest => (glyphs::FOREST, variant(0.2, ColorKey::ForestLight, ColorKey::ForestDark)),
        Biome::DenseForest => (
            glyphs::DENSE_FOREST,
            variant(0.0, ColorKey::DenseForestLight, ColorKey::DenseForestDark),
        ),
        Biome::Mountain => (glyphs::MOUNTAIN, variant(0.0, ColorKey::MountainLight, ColorKey::MountainDark)),
        Biome::Peak => (glyphs::PEAK, ColorKey::Peak),
    };

    let tile = Tile::new(TileKind::Biome(biome), glyphs::pick(set, hash), color, hash);
    if biome == Biome::Water {
        tile.animated(AnimationClass::Water)
    } else {
        tile
    }
}
