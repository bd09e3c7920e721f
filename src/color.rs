/// Straight-alpha RGBA color with `f32` channels.
///
/// Channels are nominally in `0..=1` but are not clamped: palettes are authored
/// in a wide-gamut space and may step slightly outside sRGB.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Build from 8-bit sRGB components.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn fade(self, k: f32) -> Self {
        Self {
            a: self.a * k.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Move toward white by `k` (0 = unchanged, 1 = white).
    pub fn lighten(self, k: f32) -> Self {
        let k = k.clamp(0.0, 1.0);
        Self {
            r: self.r + (1.0 - self.r) * k,
            g: self.g + (1.0 - self.g) * k,
            b: self.b + (1.0 - self.b) * k,
            a: self.a,
        }
    }

    pub fn to_u8(self) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
            (self.g.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
            (self.b.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
            (self.a.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        ]
    }
}

/// Per-channel linear blend `from + (to - from) * t`.
///
/// The endpoints are returned exactly for `t <= 0` and `t >= 1` so a finished
/// cross-fade lands bit-for-bit on the target palette.
pub fn lerp(from: Rgba, to: Rgba, t: f32) -> Rgba {
    if t <= 0.0 || t.is_nan() {
        return from;
    }
    if t >= 1.0 {
        return to;
    }
    Rgba {
        r: from.r + (to.r - from.r) * t,
        g: from.g + (to.g - from.g) * t,
        b: from.b + (to.b - from.b) * t,
        a: from.a + (to.a - from.a) * t,
    }
}
