use crate::color::Rgba;
use clap::ValueEnum;

pub const PALETTE_LEN: usize = 6;

/// Fixed palette catalog. Every entry resolves to exactly six ordered colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Palette {
    Dawn,
    Ocean,
    Aurora,
    Ember,
    Forest,
    Nebula,
    Candy,
    Mono,
}

impl Palette {
    pub const fn all() -> [Self; 8] {
        [
            Self::Dawn,
            Self::Ocean,
            Self::Aurora,
            Self::Ember,
            Self::Forest,
            Self::Nebula,
            Self::Candy,
            Self::Mono,
        ]
    }

    pub fn next(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|p| *p == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|p| *p == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dawn => "Dawn",
            Self::Ocean => "Ocean",
            Self::Aurora => "Aurora",
            Self::Ember => "Ember",
            Self::Forest => "Forest",
            Self::Nebula => "Nebula",
            Self::Candy => "Candy",
            Self::Mono => "Mono",
        }
    }

    /// Parse a palette by case-insensitive name (prefs file, CLI aliases).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::all()
            .into_iter()
            .find(|p| p.label().to_ascii_lowercase() == name)
    }

    pub fn colors(self) -> [Rgba; PALETTE_LEN] {
        let hex = match self {
            Self::Dawn => [0xFF9E80, 0xFFD180, 0xF48FB1, 0xCE93D8, 0x80DEEA, 0xFFF59D],
            Self::Ocean => [0x01579B, 0x0288D1, 0x26C6DA, 0x80DEEA, 0x1DE9B6, 0xE0F7FA],
            Self::Aurora => [0x00E676, 0x1DE9B6, 0x00B0FF, 0x7C4DFF, 0xE040FB, 0xB2FF59],
            Self::Ember => [0xBF360C, 0xFF5722, 0xFF9100, 0xFFC400, 0xFFEB3B, 0xD50000],
            Self::Forest => [0x1B5E20, 0x388E3C, 0x8BC34A, 0xCDDC39, 0x795548, 0xA5D6A7],
            Self::Nebula => [0x311B92, 0x6A1B9A, 0xAD1457, 0x3949AB, 0x00ACC1, 0xF8BBD0],
            Self::Candy => [0xFF4081, 0xFF80AB, 0x40C4FF, 0xB388FF, 0xFFFF8D, 0x69F0AE],
            Self::Mono => [0xFAFAFA, 0xE0E0E0, 0xBDBDBD, 0x9E9E9E, 0x757575, 0xCFD8DC],
        };
        hex.map(hex_color)
    }
}

fn hex_color(v: u32) -> Rgba {
    Rgba::from_u8((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_and_prev_cycle_the_catalog() {
        for p in Palette::all() {
            assert_eq!(p.next().prev(), p);
        }
        assert_eq!(Palette::Mono.next(), Palette::Dawn);
        assert_eq!(Palette::Dawn.prev(), Palette::Mono);
    }

    #[test]
    fn names_round_trip() {
        for p in Palette::all() {
            assert_eq!(Palette::from_name(p.label()), Some(p));
        }
        assert_eq!(Palette::from_name("  OCEAN "), Some(Palette::Ocean));
        assert_eq!(Palette::from_name("plaid"), None);
    }

    #[test]
    fn palettes_are_opaque() {
        for p in Palette::all() {
            assert!(p.colors().iter().all(|c| c.a == 1.0), "{} has alpha", p.label());
        }
    }
}
