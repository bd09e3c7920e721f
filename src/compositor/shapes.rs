use super::Detail;
use crate::canvas::{GradientStop, Surface};
use crate::color::Rgba;
use crate::seed::ElementKind;
use glam::{Affine2, Vec2};
use std::f32::consts::{PI, TAU};

#[allow(clippy::too_many_arguments)]
pub(super) fn draw_element<S: Surface + ?Sized>(
    surface: &mut S,
    xf: Affine2,
    kind: ElementKind,
    size: f32,
    color: Rgba,
    phase: f32,
    energy: f32,
    detail: &Detail,
) {
    match kind {
        ElementKind::Circle => draw_orb(surface, xf, size, color, phase, energy),
        ElementKind::Curve => draw_curve(surface, xf, size, color, phase, energy, detail),
        ElementKind::Polygon => draw_crystal(surface, xf, size, color, phase, energy),
    }
}

/// Glow halo, shaded core and a specular glint: two radial fills and one circle.
fn draw_orb<S: Surface + ?Sized>(
    surface: &mut S,
    xf: Affine2,
    size: f32,
    color: Rgba,
    phase: f32,
    energy: f32,
) {
    let pulse = 0.85 + 0.15 * (phase * 1.7).sin();
    let glow = [
        GradientStop::new(0.0, color.fade(0.35 * pulse + energy * 0.2)),
        GradientStop::new(0.5, color.fade(0.12 * pulse)),
        GradientStop::new(1.0, color.with_alpha(0.0)),
    ];
    surface.fill_radial(xf, Vec2::ZERO, size * (2.2 + energy * 0.8), &glow);

    let core = [
        GradientStop::new(0.0, color.lighten(0.45)),
        GradientStop::new(0.55, color),
        GradientStop::new(1.0, color.fade(0.0)),
    ];
    surface.fill_radial(xf, Vec2::ZERO, size, &core);

    let glint = Rgba::WHITE.fade(color.a * (0.35 + 0.25 * (phase * 2.3).sin().abs()));
    surface.fill_circle(xf, Vec2::splat(-size * 0.3), size * 0.22, glint);
}

/// Ribbon: sampled sine arc, one Chaikin smoothing pass, glow strokes, bright core.
fn draw_curve<S: Surface + ?Sized>(
    surface: &mut S,
    xf: Affine2,
    size: f32,
    color: Rgba,
    phase: f32,
    energy: f32,
    detail: &Detail,
) {
    let n = detail.curve_samples.max(3);
    let sway = 0.8 + 0.3 * (phase * 0.9).sin();
    let raw: Vec<Vec2> = (0..n)
        .map(|i| {
            let u = i as f32 / (n - 1) as f32;
            let x = (u - 0.5) * size * 4.0;
            let y = (u * PI * 1.5 + phase).sin() * size * sway;
            Vec2::new(x, y)
        })
        .collect();
    let path = chaikin(&raw);

    let widths = [0.9, 0.55, 0.3];
    let alphas = [0.10, 0.2, 0.35];
    for pass in 0..detail.glow_passes.min(widths.len()) {
        let w = size * widths[pass] * (1.0 + energy * 0.5);
        surface.stroke_path(xf, &path, w, color.fade(alphas[pass]));
    }
    surface.stroke_path(xf, &path, size * 0.16, color.lighten(0.4));
}

/// Eight-pointed crystal with a hexagonal facet, edge highlight and glints.
fn draw_crystal<S: Surface + ?Sized>(
    surface: &mut S,
    xf: Affine2,
    size: f32,
    color: Rgba,
    phase: f32,
    energy: f32,
) {
    let shimmer = 1.0 + 0.08 * (phase * 1.3).sin() + energy * 0.15;
    let star: Vec<Vec2> = (0..16)
        .map(|i| {
            let a = i as f32 * TAU / 16.0;
            let r = if i % 2 == 0 { size * shimmer } else { size * 0.45 };
            Vec2::from_angle(a) * r
        })
        .collect();

    let halo = [
        GradientStop::new(0.0, color.fade(0.3)),
        GradientStop::new(1.0, color.with_alpha(0.0)),
    ];
    surface.fill_radial(xf, Vec2::ZERO, size * 1.6, &halo);
    surface.fill_polygon(xf, &star, color.fade(0.85));

    let facet: Vec<Vec2> = (0..6)
        .map(|i| Vec2::from_angle(i as f32 * TAU / 6.0 + phase * 0.2) * size * 0.4)
        .collect();
    surface.fill_polygon(xf, &facet, color.lighten(0.35).fade(0.6));

    let mut edge = star.clone();
    edge.push(star[0]);
    surface.stroke_path(xf, &edge, size * 0.07, color.lighten(0.6).fade(0.7));

    for k in 0..2 {
        let tip = star[k * 6];
        let twinkle = ((phase * 3.0 + k as f32 * 2.1).sin() * 0.5 + 0.5) * color.a;
        surface.fill_circle(xf, tip * 0.8, size * 0.09, Rgba::WHITE.fade(twinkle));
    }
}

fn chaikin(points: &[Vec2]) -> Vec<Vec2> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len() * 2);
    out.push(points[0]);
    for pair in points.windows(2) {
        out.push(pair[0].lerp(pair[1], 0.25));
        out.push(pair[0].lerp(pair[1], 0.75));
    }
    out.push(points[points.len() - 1]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chaikin_keeps_endpoints() {
        let pts = [Vec2::ZERO, Vec2::new(1.0, 1.0), Vec2::new(2.0, 0.0)];
        let out = chaikin(&pts);
        assert_eq!(out.first(), Some(&Vec2::ZERO));
        assert_eq!(out.last(), Some(&Vec2::new(2.0, 0.0)));
        assert_eq!(out.len(), 6);
    }
}
