use crate::color::Rgba;
use fastrand::Rng;
use glam::Vec2;
use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Glowing orb: layered radial gradients.
    Circle,
    /// Smoothed open ribbon stroke.
    Curve,
    /// Faceted crystal shard.
    Polygon,
}

/// One procedural visual unit. Its rotated and mirrored copies form the pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedElement {
    /// Canvas-relative, nominally `0..=1` on both axes.
    pub position: Vec2,
    /// Normalized radius.
    pub size: f32,
    /// Displayed color (may be mid cross-fade).
    pub color: Rgba,
    /// Degrees.
    pub rotation: f32,
    pub kind: ElementKind,
    pub velocity: Vec2,
    /// Degrees per second.
    pub rotation_speed: f32,
    pub size_oscillation: f32,
    pub phase_offset: f32,
    /// Slot into the active palette; survives palette changes.
    pub color_index: usize,
    pub depth: f32,
    pub energy: f32,
}

fn uniform(rng: &mut Rng, lo: f32, hi: f32) -> f32 {
    lo + rng.f32() * (hi - lo)
}

fn size_bracket(depth: f32) -> (f32, f32) {
    if depth < 0.3 {
        (0.003, 0.025)
    } else if depth < 0.7 {
        (0.008, 0.045)
    } else {
        (0.015, 0.07)
    }
}

/// Produce a randomized element for slot `index` at normalized `depth`.
pub fn generate(rng: &mut Rng, colors: &[Rgba], index: usize, depth: f32) -> SeedElement {
    let depth = depth.clamp(0.0, 1.0);
    let (size_lo, size_hi) = size_bracket(depth);

    // 4/8 circle, 3/8 curve, 1/8 polygon.
    let kind = match rng.u8(0..8) {
        0..=3 => ElementKind::Circle,
        4..=6 => ElementKind::Curve,
        _ => ElementKind::Polygon,
    };

    let color = if colors.is_empty() {
        Rgba::WHITE
    } else {
        colors[index % colors.len()]
    };

    SeedElement {
        position: Vec2::new(uniform(rng, 0.02, 0.98), uniform(rng, 0.02, 0.98)),
        size: uniform(rng, size_lo, size_hi),
        color,
        rotation: uniform(rng, 0.0, 360.0),
        kind,
        velocity: Vec2::new(uniform(rng, -0.002, 0.002), uniform(rng, -0.002, 0.002)),
        rotation_speed: uniform(rng, -4.0, 4.0),
        size_oscillation: uniform(rng, 0.1, 0.3),
        phase_offset: uniform(rng, 0.0, TAU),
        color_index: index,
        depth,
        energy: 0.0,
    }
}

/// Generate `count` elements with depth spread evenly over `0..1`.
pub fn generate_set(rng: &mut Rng, colors: &[Rgba], count: usize) -> Vec<SeedElement> {
    let n = count.max(1) as f32;
    (0..count)
        .map(|i| generate(rng, colors, i, i as f32 / n))
        .collect()
}
