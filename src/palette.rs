//! Day/night color palettes.
//!
//! Tiles carry a semantic [`ColorKey`]; the active [`Palette`] turns it into
//! an [`Rgb`] value. Three named palettes exist (day, night, dawn) and the
//! active one is a continuous function of the hour of day, blended per
//! channel through the dawn (5-7) and dusk (17-19) windows.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::PaletteError;

/// 8-bit RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a 0xRRGGBB literal.
    pub const fn hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        }
    }

    /// Parse `#rrggbb`.
    pub fn parse(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#')?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::hex)
    }

    /// Linear blend, each channel rounded to the nearest integer.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| -> u8 {
            let v = a as f32 + (b as f32 - a as f32) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Semantic color identifiers resolved against the active palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorKey {
    Bg,
    WaterLight,
    WaterDark,
    Shore,
    GrassLight,
    GrassDark,
    MeadowLight,
    MeadowDark,
    ForestLight,
    ForestDark,
    DenseForestLight,
    DenseForestDark,
    MountainLight,
    MountainDark,
    Peak,
    Path,
    Structure,
    FlowerRed,
    FlowerYellow,
    FlowerPurple,
    FlowerWhite,
    RiverBlue,
    RiverDark,
    RiverShore,
    WarmGlow,
    FireOrange,
    BuildingWall,
    BuildingRoof,
    Road,
    Bridge,
}

impl ColorKey {
    pub const COUNT: usize = 30;

    pub const ALL: [ColorKey; ColorKey::COUNT] = [
        ColorKey::Bg,
        ColorKey::WaterLight,
        ColorKey::WaterDark,
        ColorKey::Shore,
        ColorKey::GrassLight,
        ColorKey::GrassDark,
        ColorKey::MeadowLight,
        ColorKey::MeadowDark,
        ColorKey::ForestLight,
        ColorKey::ForestDark,
        ColorKey::DenseForestLight,
        ColorKey::DenseForestDark,
        ColorKey::MountainLight,
        ColorKey::MountainDark,
        ColorKey::Peak,
        ColorKey::Path,
        ColorKey::Structure,
        ColorKey::FlowerRed,
        ColorKey::FlowerYellow,
        ColorKey::FlowerPurple,
        ColorKey::FlowerWhite,
        ColorKey::RiverBlue,
        ColorKey::RiverDark,
        ColorKey::RiverShore,
        ColorKey::WarmGlow,
        ColorKey::FireOrange,
        ColorKey::BuildingWall,
        ColorKey::BuildingRoof,
        ColorKey::Road,
        ColorKey::Bridge,
    ];

    /// Name used in palette files
    pub fn name(&self) -> &'static str {
        match self {
            ColorKey::Bg => "bg",
            ColorKey::WaterLight => "water_light",
            ColorKey::WaterDark => "water_dark",
            ColorKey::Shore => "shore",
            ColorKey::GrassLight => "grass_light",
            ColorKey::GrassDark => "grass_dark",
            ColorKey::MeadowLight => "meadow_light",
            ColorKey::MeadowDark => "meadow_dark",
            ColorKey::ForestLight => "forest_light",
            ColorKey::ForestDark => "forest_dark",
            ColorKey::DenseForestLight => "dense_forest_light",
            ColorKey::DenseForestDark => "dense_forest_dark",
            ColorKey::MountainLight => "mountain_light",
            ColorKey::MountainDark => "mountain_dark",
            ColorKey::Peak => "peak",
            ColorKey::Path => "path",
            ColorKey::Structure => "structure",
            ColorKey::FlowerRed => "flower_red",
            ColorKey::FlowerYellow => "flower_yellow",
            ColorKey::FlowerPurple => "flower_purple",
            ColorKey::FlowerWhite => "flower_white",
            ColorKey::RiverBlue => "river_blue",
            ColorKey::RiverDark => "river_dark",
            ColorKey::RiverShore => "river_shore",
            ColorKey::WarmGlow => "warm_glow",
            ColorKey::FireOrange => "fire_orange",
            ColorKey::BuildingWall => "building_wall",
            ColorKey::BuildingRoof => "building_roof",
            ColorKey::Road => "road",
            ColorKey::Bridge => "bridge",
        }
    }

    pub fn from_name(name: &str) -> Option<ColorKey> {
        ColorKey::ALL.iter().copied().find(|k| k.name() == name)
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// A complete key -> color mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; ColorKey::COUNT],
}

impl Palette {
    /// Build a palette from a total function over keys.
    pub fn from_fn<F: Fn(ColorKey) -> Rgb>(color: F) -> Self {
        let mut colors = [Rgb::default(); ColorKey::COUNT];
        for key in ColorKey::ALL {
            colors[key.index()] = color(key);
        }
        Self { colors }
    }

    /// Parse a `name -> "#rrggbb"` table. Every key must be present and
    /// nothing else may appear.
    pub fn from_hex_table(palette: &str, table: &BTreeMap<String, String>) -> Result<Self, PaletteError> {
        let mut slots: [Option<Rgb>; ColorKey::COUNT] = [None; ColorKey::COUNT];
        for (name, value) in table {
            let key = ColorKey::from_name(name).ok_or_else(|| PaletteError::UnknownKey {
                palette: palette.to_string(),
                key: name.clone(),
            })?;
            let rgb = Rgb::parse(value).ok_or_else(|| PaletteError::InvalidColor {
                palette: palette.to_string(),
                key: name.clone(),
                value: value.clone(),
            })?;
            slots[key.index()] = Some(rgb);
        }

        let mut colors = [Rgb::default(); ColorKey::COUNT];
        for key in ColorKey::ALL {
            colors[key.index()] = slots[key.index()].ok_or_else(|| PaletteError::MissingKey {
                palette: palette.to_string(),
                key: key.name(),
            })?;
        }
        Ok(Self { colors })
    }

    #[inline]
    pub fn get(&self, key: ColorKey) -> Rgb {
        self.colors[key.index()]
    }

    pub fn background(&self) -> Rgb {
        self.get(ColorKey::Bg)
    }

    /// Per-channel blend towards `other`.
    pub fn lerp(&self, other: &Palette, t: f32) -> Palette {
        let mut colors = [Rgb::default(); ColorKey::COUNT];
        for (i, slot) in colors.iter_mut().enumerate() {
            *slot = self.colors[i].lerp(other.colors[i], t);
        }
        Palette { colors }
    }
}

/// The three named palettes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteSet {
    pub day: Palette,
    pub night: Palette,
    pub dawn: Palette,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PaletteFile {
    day: BTreeMap<String, String>,
    night: BTreeMap<String, String>,
    dawn: BTreeMap<String, String>,
}

impl PaletteSet {
    pub fn builtin() -> Self {
        Self {
            day: Palette::from_fn(day_color),
            night: Palette::from_fn(night_color),
            dawn: Palette::from_fn(dawn_color),
        }
    }

    /// Parse a JSON palette file of the form
    /// `{"day": {"bg": "#0a0e1a", ...}, "night": {...}, "dawn": {...}}`.
    pub fn from_json_str(text: &str) -> Result<Self, PaletteError> {
        let file: PaletteFile = serde_json::from_str(text)?;
        Ok(Self {
            day: Palette::from_hex_table("day", &file.day)?,
            night: Palette::from_hex_table("night", &file.night)?,
            dawn: Palette::from_hex_table("dawn", &file.dawn)?,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PaletteError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Palette for a (possibly fractional) hour of day.
    ///
    /// Night covers [19, 24) and [0, 5), day covers [7, 17). Dawn blends
    /// night -> dawn -> day across [5, 7) in two equal halves; dusk mirrors
    /// it across [17, 19).
    pub fn palette_at(&self, hour: f32) -> Palette {
        let hour = if hour.is_finite() { hour.rem_euclid(24.0) } else { 0.0 };

        if (5.0..7.0).contains(&hour) {
            let t = (hour - 5.0) / 2.0;
            return if t < 0.5 {
                self.night.lerp(&self.dawn, t * 2.0)
            } else {
                self.dawn.lerp(&self.day, (t - 0.5) * 2.0)
            };
        }
        if (7.0..17.0).contains(&hour) {
            return self.day.clone();
        }
        if (17.0..19.0).contains(&hour) {
            let t = (hour - 17.0) / 2.0;
            return if t < 0.5 {
                self.day.lerp(&self.dawn, t * 2.0)
            } else {
                self.dawn.lerp(&self.night, (t - 0.5) * 2.0)
            };
        }
        self.night.clone()
    }
}

impl Default for PaletteSet {
    fn default() -> Self {
        Self::builtin()
    }
}

static BUILTIN: OnceLock<PaletteSet> = OnceLock::new();

/// Palette for an hour of day using the built-in palettes. The tables are
/// built on first use and shared afterwards.
pub fn palette_at(hour: f32) -> Palette {
    BUILTIN.get_or_init(PaletteSet::builtin).palette_at(hour)
}

fn day_color(key: ColorKey) -> Rgb {
    Rgb::hex(match key {
        ColorKey::Bg => 0x0a0e1a,
        ColorKey::WaterLight => 0x4a9eff,
        ColorKey::WaterDark => 0x2d6bc4,
        ColorKey::Shore => 0xc4a74e,
        ColorKey::GrassLight => 0x5cb85c,
        ColorKey::GrassDark => 0x3d8b3d,
        ColorKey::MeadowLight => 0x7ec87e,
        ColorKey::MeadowDark => 0x5aa05a,
        ColorKey::ForestLight => 0x2d8b2d,
        ColorKey::ForestDark => 0x1a6b1a,
        ColorKey::DenseForestLight => 0x1a5c1a,
        ColorKey::DenseForestDark => 0x0e4a0e,
        ColorKey::MountainLight => 0x9e9e9e,
        ColorKey::MountainDark => 0x6e6e6e,
        ColorKey::Peak => 0xe0e0e0,
        ColorKey::Path => 0xd4c49a,
        ColorKey::Structure => 0x8e7a5a,
        ColorKey::FlowerRed => 0xe05050,
        ColorKey::FlowerYellow => 0xe0d050,
        ColorKey::FlowerPurple => 0xb070d0,
        ColorKey::FlowerWhite => 0xe8e8d8,
        ColorKey::RiverBlue => 0x3a8aee,
        ColorKey::RiverDark => 0x2060b0,
        ColorKey::RiverShore => 0x6aaa6a,
        ColorKey::WarmGlow => 0xff9933,
        ColorKey::FireOrange => 0xff5500,
        ColorKey::BuildingWall => 0x7a6a50,
        ColorKey::BuildingRoof => 0x5a4a3a,
        ColorKey::Road => 0xb0a080,
        ColorKey::Bridge => 0x9a8a60,
    })
}

fn night_color(key: ColorKey) -> Rgb {
    Rgb::hex(match key {
        ColorKey::Bg => 0x060810,
        ColorKey::WaterLight => 0x1a3a6e,
        ColorKey::WaterDark => 0x0e2a4e,
        ColorKey::Shore => 0x4a3a2a,
        ColorKey::GrassLight => 0x1a4a2a,
        ColorKey::GrassDark => 0x0e3a1a,
        ColorKey::MeadowLight => 0x1e4e2e,
        ColorKey::MeadowDark => 0x123a1e,
        ColorKey::ForestLight => 0x0e3a1a,
        ColorKey::ForestDark => 0x082a0e,
        ColorKey::DenseForestLight => 0x0a2e10,
        ColorKey::DenseForestDark => 0x061e08,
        ColorKey::MountainLight => 0x4a4a5e,
        ColorKey::MountainDark => 0x2e2e3e,
        ColorKey::Peak => 0x6a6a7e,
        ColorKey::Path => 0x4a4a3a,
        ColorKey::Structure => 0x3e3a2e,
        ColorKey::FlowerRed => 0x6e2020,
        ColorKey::FlowerYellow => 0x6e6020,
        ColorKey::FlowerPurple => 0x4a2a5e,
        ColorKey::FlowerWhite => 0x6a6a60,
        ColorKey::RiverBlue => 0x0e2a5e,
        ColorKey::RiverDark => 0x081a3e,
        ColorKey::RiverShore => 0x0e3a1e,
        ColorKey::WarmGlow => 0xcc6600,
        ColorKey::FireOrange => 0xaa3300,
        ColorKey::BuildingWall => 0x3a3028,
        ColorKey::BuildingRoof => 0x2a2018,
        ColorKey::Road => 0x4a4838,
        ColorKey::Bridge => 0x3a3828,
    })
}

fn dawn_color(key: ColorKey) -> Rgb {
    Rgb::hex(match key {
        ColorKey::Bg => 0x0a0c14,
        ColorKey::WaterLight => 0x3a6eba,
        ColorKey::WaterDark => 0x1e4a8a,
        ColorKey::Shore => 0x8a7a3a,
        ColorKey::GrassLight => 0x3a7a3a,
        ColorKey::GrassDark => 0x2a5a2a,
        ColorKey::MeadowLight => 0x4a8a4a,
        ColorKey::MeadowDark => 0x3a6a3a,
        ColorKey::ForestLight => 0x1e6a1e,
        ColorKey::ForestDark => 0x124a12,
        ColorKey::DenseForestLight => 0x124e14,
        ColorKey::DenseForestDark => 0x0a3a0a,
        ColorKey::MountainLight => 0x7a7a8a,
        ColorKey::MountainDark => 0x4e4e5e,
        ColorKey::Peak => 0xa0a0b0,
        ColorKey::Path => 0x8a7a6a,
        ColorKey::Structure => 0x6a5a4a,
        ColorKey::FlowerRed => 0xa03838,
        ColorKey::FlowerYellow => 0xa09838,
        ColorKey::FlowerPurple => 0x7a4a8a,
        ColorKey::FlowerWhite => 0xa0a090,
        ColorKey::RiverBlue => 0x2a5aaa,
        ColorKey::RiverDark => 0x183a7a,
        ColorKey::RiverShore => 0x3a6a3a,
        ColorKey::WarmGlow => 0xee8822,
        ColorKey::FireOrange => 0xcc4400,
        ColorKey::BuildingWall => 0x5a4a3a,
        ColorKey::BuildingRoof => 0x4a3a2a,
        ColorKey::Road => 0x7a6a5a,
        ColorKey::Bridge => 0x6a5a4a,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_channel_delta(a: &Palette, b: &Palette) -> u8 {
        ColorKey::ALL
            .iter()
            .map(|&k| {
                let (x, y) = (a.get(k), b.get(k));
                x.r.abs_diff(y.r).max(x.g.abs_diff(y.g)).max(x.b.abs_diff(y.b))
            })
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_pure_windows() {
        let set = PaletteSet::builtin();
        assert_eq!(set.palette_at(12.0), set.day);
        assert_eq!(set.palette_at(7.0), set.day);
        assert_eq!(set.palette_at(16.99), set.day);
        assert_eq!(set.palette_at(0.0), set.night);
        assert_eq!(set.palette_at(4.99), set.night);
        assert_eq!(set.palette_at(19.0), set.night);
        assert_eq!(set.palette_at(23.5), set.night);
    }

    #[test]
    fn test_transition_midpoints_are_dawn() {
        let set = PaletteSet::builtin();
        assert_eq!(set.palette_at(6.0), set.dawn);
        assert_eq!(set.palette_at(18.0), set.dawn);
    }

    #[test]
    fn test_continuity_at_boundaries() {
        let set = PaletteSet::builtin();
        let eps = 1e-3;
        for boundary in [5.0f32, 7.0, 17.0, 19.0] {
            let before = set.palette_at(boundary - eps);
            let at = set.palette_at(boundary);
            assert!(
                max_channel_delta(&before, &at) <= 1,
                "discontinuity at hour {}",
                boundary
            );
        }
        // Approaching 7 from below converges on the day palette
        assert!(max_channel_delta(&set.palette_at(7.0 - 1e-4), &set.day) <= 1);
        assert!(max_channel_delta(&set.palette_at(19.0 - 1e-4), &set.night) <= 1);
    }

    #[test]
    fn test_blend_rounds_channels() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(3, 255, 10);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(2, 128, 5));
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn test_hour_wraps() {
        let set = PaletteSet::builtin();
        assert_eq!(set.palette_at(36.0), set.day);
        assert_eq!(set.palette_at(-1.0), set.night);
        assert_eq!(set.palette_at(f32::NAN), set.night);
    }

    #[test]
    fn test_shared_builtin_palette_at() {
        let set = PaletteSet::builtin();
        for hour in [0.0, 5.5, 6.0, 12.0, 17.25, 18.9, 23.0] {
            assert_eq!(palette_at(hour), set.palette_at(hour), "hour {}", hour);
        }
        assert_eq!(BUILTIN.get(), Some(&set));
    }

    #[test]
    fn test_key_names_round_trip() {
        for key in ColorKey::ALL {
            assert_eq!(ColorKey::from_name(key.name()), Some(key));
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.name()));
        }
        assert_eq!(ColorKey::from_name("lava"), None);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgb::parse("#ff9933"), Some(Rgb::new(255, 153, 51)));
        assert_eq!(Rgb::parse("ff9933"), None);
        assert_eq!(Rgb::parse("#ff99"), None);
        assert_eq!(Rgb::parse("#gg9933"), None);
        assert_eq!(Rgb::new(10, 14, 26).to_string(), "#0a0e1a");
    }

    fn table_for(palette: &Palette) -> BTreeMap<String, String> {
        ColorKey::ALL
            .iter()
            .map(|&k| (k.name().to_string(), palette.get(k).to_string()))
            .collect()
    }

    fn json_for(set: &PaletteSet) -> String {
        serde_json::json!({
            "day": table_for(&set.day),
            "night": table_for(&set.night),
            "dawn": table_for(&set.dawn),
        })
        .to_string()
    }

    #[test]
    fn test_json_round_trip_matches_builtin() {
        let builtin = PaletteSet::builtin();
        let parsed = PaletteSet::from_json_str(&json_for(&builtin)).unwrap();
        assert_eq!(parsed, builtin);
    }

    #[test]
    fn test_missing_key_is_error() {
        let builtin = PaletteSet::builtin();
        let mut night = table_for(&builtin.night);
        night.remove("warm_glow");
        let json = serde_json::json!({
            "day": table_for(&builtin.day),
            "night": night,
            "dawn": table_for(&builtin.dawn),
        })
        .to_string();

        match PaletteSet::from_json_str(&json) {
            Err(PaletteError::MissingKey { palette, key }) => {
                assert_eq!(palette, "night");
                assert_eq!(key, "warm_glow");
            }
            other => panic!("expected missing key error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_key_and_bad_color() {
        let builtin = PaletteSet::builtin();
        let mut day = table_for(&builtin.day);
        day.insert("lava".to_string(), "#ff0000".to_string());
        let json = serde_json::json!({
            "day": day,
            "night": table_for(&builtin.night),
            "dawn": table_for(&builtin.dawn),
        })
        .to_string();
        assert!(matches!(
            PaletteSet::from_json_str(&json),
            Err(PaletteError::UnknownKey { .. })
        ));

        let mut dawn = table_for(&builtin.dawn);
        dawn.insert("bg".to_string(), "navy".to_string());
        let json = serde_json::json!({
            "day": table_for(&builtin.day),
            "night": table_for(&builtin.night),
            "dawn": dawn,
        })
        .to_string();
        assert!(matches!(
            PaletteSet::from_json_str(&json),
            Err(PaletteError::InvalidColor { .. })
        ));

        assert!(matches!(
            PaletteSet::from_json_str("{\"day\": {}}"),
            Err(PaletteError::Json(_))
        ));
    }
}
