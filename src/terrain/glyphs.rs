//! Glyph sets for each tile kind, plus a plain-ASCII fallback for
//! terminals whose font lacks the box-drawing and symbol characters.

use serde::{Deserialize, Serialize};

pub const WATER: &[char] = &['~', '≈', '~', '≈', '~', '○'];
pub const SHORE: &[char] = &['.', ',', '.', '·', '.', ','];
pub const GRASS: &[char] = &['.', ',', '\'', '·', '.', ',', '\'', '`'];
pub const MEADOW: &[char] = &['.', ',', '\'', '*', '.', ',', '*', '.'];
pub const FOREST: &[char] = &['♠', '♣', '↑', '▲', '♠', '♣', '↑'];
pub const DENSE_FOREST: &[char] = &['♠', '♣', '▲', '#', '♠', '░', '♣'];
pub const MOUNTAIN: &[char] = &['▲', '△', '∆', '▲', '△'];
pub const PEAK: &[char] = &['▲', '∆', '^', '▲'];
pub const RIVER: &[char] = &['~', '≈', '~', '≈', '○'];
pub const ROAD: &[char] = &['·', '·', '─', '─', '·'];
pub const BRIDGE: &[char] = &['═', '≡', '═', '≡'];
pub const CAMPFIRE: &[char] = &['☼', '♦'];
pub const BUILDING_WALL: &[char] = &['█', '▓', '█', '▓'];
pub const BUILDING_ROOF: &[char] = &['░', '▒', '░'];
pub const DOOR: char = '▯';
pub const FLOWER: char = '*';

/// Pick a glyph from a set by hash.
#[inline]
pub fn pick(set: &[char], hash: u32) -> char {
    set[hash as usize % set.len()]
}

/// Which characters the output device can show. This is the terminal
/// counterpart of choosing a font.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlyphSet {
    #[default]
    Unicode,
    Ascii,
}

impl GlyphSet {
    pub fn apply(self, glyph: char) -> char {
        match self {
            GlyphSet::Unicode => glyph,
            GlyphSet::Ascii => ascii_fallback(glyph),
        }
    }
}

/// Closest 7-bit stand-in for a glyph.
pub fn ascii_fallback(glyph: char) -> char {
    match glyph {
        '≈' | '≋' => '~',
        '○' => 'o',
        '·' => '.',
        '♠' => 'T',
        '♣' => 't',
        '↑' => '|',
        '▲' | '∆' => 'A',
        '△' => '^',
        '░' => ':',
        '▒' => '%',
        '▓' | '█' => '#',
        '─' => '-',
        '═' | '≡' => '=',
        '☼' => '*',
        '♦' => '+',
        '▯' => '|',
        c if c.is_ascii() => c,
        _ => '?',
    }
}
