use super::shapes::draw_element;
use super::Detail;
use crate::canvas::Surface;
use crate::seed::SeedElement;
use glam::{Affine2, Vec2};
use std::f32::consts::TAU;

/// Parameters of one concentric kaleidoscope layer, in canvas pixels.
#[derive(Debug, Clone, Copy)]
pub struct KaleidoLayer {
    pub center: Vec2,
    /// Pixel radius that a normalized offset of 1.0 maps to.
    pub radius: f32,
    pub phase_offset: f32,
    pub symmetry: u32,
    /// Radians.
    pub rotation: f32,
    pub layer_phase: f32,
    pub opacity: f32,
    /// Pixel size of a normalized element radius of 1.0.
    pub element_extent: f32,
}

/// The `2 * symmetry` sector transforms: one rotation per sector, then the
/// same rotation with a horizontal mirror.
pub fn sector_transforms(center: Vec2, symmetry: u32, rotation: f32) -> Vec<Affine2> {
    let n = symmetry.max(1);
    let sector = TAU / n as f32;
    let mirror = Affine2::from_scale(Vec2::new(-1.0, 1.0));
    let mut out = Vec::with_capacity(n as usize * 2);
    for i in 0..n {
        let angle = i as f32 * sector + rotation;
        let base = Affine2::from_angle_translation(angle, center);
        out.push(base);
        out.push(base * mirror);
    }
    out
}

/// Draw `elements` into every sector of the layer. Returns the number of
/// subset passes issued (always `2 * symmetry`).
pub fn draw_kaleidoscope_layer<S: Surface + ?Sized>(
    surface: &mut S,
    layer: &KaleidoLayer,
    elements: &[SeedElement],
    detail: &Detail,
) -> usize {
    let transforms = sector_transforms(layer.center, layer.symmetry, layer.rotation);
    let shimmer_amp = layer.radius * 0.015;

    for xf in &transforms {
        for e in elements.iter().step_by(detail.element_stride.max(1)) {
            let phase = layer.layer_phase + layer.phase_offset + e.phase_offset;
            let shimmer = Vec2::new(phase.sin(), (phase * 0.8).cos()) * shimmer_amp * (1.0 + e.energy);
            let offset = (e.position - Vec2::splat(0.5)) * 2.0 * layer.radius + shimmer;

            let breathe = 1.0 + (phase * 2.0).sin() * e.size_oscillation * 0.3 + e.energy * 0.4;
            let size_px = e.size * layer.element_extent * breathe;
            if size_px < 0.25 {
                continue;
            }

            let local = *xf * Affine2::from_angle_translation(e.rotation.to_radians(), offset);
            let color = e.color.fade(layer.opacity);
            draw_element(surface, local, e.kind, size_px, color, phase, e.energy, detail);
        }
    }
    transforms.len()
}
