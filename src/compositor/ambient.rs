//! Non-symmetric passes drawn around the kaleidoscope layers.
//!
//! Particles never draw fresh random numbers: each one derives its position,
//! size and twinkle from `hash01(index, salt)` plus wall time, so consecutive
//! frames animate instead of flickering.

use super::Detail;
use crate::canvas::{GradientStop, Surface};
use crate::color::Rgba;
use crate::ripple::RIPPLE_MAX_AGE;
use crate::simulation::SimulationState;
use glam::{Affine2, Vec2};
use std::f32::consts::TAU;

const ID: Affine2 = Affine2::IDENTITY;

/// Frame geometry shared by every ambient pass.
#[derive(Debug, Clone, Copy)]
pub(super) struct Stage {
    pub size: Vec2,
    pub center: Vec2,
    /// Larger canvas dimension.
    pub extent: f32,
    pub wall_time: f32,
    pub seed: u32,
}

pub(super) fn hash01(i: u32, salt: u32) -> f32 {
    let mut n = i.wrapping_mul(374_761_393) ^ salt.wrapping_mul(0x9E37_79B9);
    n = (n ^ (n >> 13)).wrapping_mul(1_274_126_177);
    n ^= n >> 16;
    ((n & 0x00FF_FFFF) as f32) / 16_777_215.0
}

fn count(base: usize, detail: &Detail) -> usize {
    ((base as f32 * detail.particles).round() as usize).max(1)
}

fn tint(c: Rgba, k: f32) -> Rgba {
    Rgba::new(c.r * k, c.g * k, c.b * k, c.a)
}

pub(super) fn background<S: Surface + ?Sized>(surface: &mut S, state: &SimulationState, stage: &Stage) {
    let breathe = 1.0 + (stage.wall_time * 0.3).sin() * 0.12;
    let top = tint(state.displayed_color(3), 0.07 * breathe);
    let bottom = tint(state.displayed_color(0), 0.025 * breathe);
    surface.fill_vertical_gradient(
        Rgba::rgb(top.r + 0.008, top.g + 0.008, top.b + 0.02),
        Rgba::rgb(bottom.r, bottom.g, bottom.b + 0.01),
    );

    for i in 0..4u32 {
        let h = hash01(i, stage.seed ^ 0xB10B);
        let orbit = stage.wall_time * (0.02 + h * 0.03) + h * TAU;
        let pos = stage.center
            + Vec2::new(orbit.cos(), (orbit * 0.7).sin()) * stage.extent * (0.2 + h * 0.2);
        let color = state.displayed_color(i as usize + 1);
        let stops = [
            GradientStop::new(0.0, color.fade(0.09)),
            GradientStop::new(0.6, color.fade(0.03)),
            GradientStop::new(1.0, color.with_alpha(0.0)),
        ];
        surface.fill_radial(ID, pos, stage.extent * (0.3 + h * 0.15), &stops);
    }
}

/// Three depths of stars; nearer ones are larger and drift with the rotation.
pub(super) fn starfield<S: Surface + ?Sized>(
    surface: &mut S,
    state: &SimulationState,
    stage: &Stage,
    detail: &Detail,
) {
    let px = stage.extent / 600.0;
    for (depth, base) in [(0.3f32, 70usize), (0.6, 40), (1.0, 18)] {
        let n = count(base, detail) as u32;
        let salt = stage.seed ^ (depth * 1000.0) as u32;
        let spin = state.global_rotation() * depth * 0.2;
        let rot = Affine2::from_angle_translation(spin, stage.center);
        for i in 0..n {
            let p = Vec2::new(hash01(i, salt), hash01(i, salt ^ 0x51)) - Vec2::splat(0.5);
            let h = hash01(i, salt ^ 0x7A);
            let twinkle = 0.55 + 0.45 * (stage.wall_time * (1.0 + h * 3.0) + h * TAU).sin();
            let color = Rgba::rgb(0.85 + h * 0.15, 0.9, 1.0).fade(twinkle * (0.35 + depth * 0.5));
            surface.fill_circle(rot, p * stage.extent * 1.2, (0.4 + depth) * px, color);
        }
    }
}

/// Slow palette-colored motes wandering behind the pattern.
pub(super) fn motes<S: Surface + ?Sized>(
    surface: &mut S,
    state: &SimulationState,
    stage: &Stage,
    detail: &Detail,
) {
    let n = count(36, detail) as u32;
    let salt = stage.seed ^ 0x0E7E;
    for i in 0..n {
        let h = hash01(i, salt);
        let drift = Vec2::new(
            (hash01(i, salt ^ 1) + stage.wall_time * (0.004 + h * 0.01)).fract(),
            (hash01(i, salt ^ 2) - stage.wall_time * (0.003 + h * 0.008)).rem_euclid(1.0),
        );
        let wobble = Vec2::new((stage.wall_time + h * TAU).sin(), (stage.wall_time * 0.8 + h * 5.0).cos()) * 0.01;
        let pos = (drift + wobble) * stage.size;
        let color = state.displayed_color(i as usize);
        let r = stage.extent * (0.004 + h * 0.006);
        let stops = [
            GradientStop::new(0.0, color.fade(0.35)),
            GradientStop::new(1.0, color.with_alpha(0.0)),
        ];
        surface.fill_radial(ID, pos, r * 3.0, &stops);
    }
}

/// Expanding rings and sparks for each live tap ripple.
pub(super) fn ripples<S: Surface + ?Sized>(surface: &mut S, state: &SimulationState, stage: &Stage) {
    let phase = state.animation_phase();
    for (k, r) in state.ripples().enumerate() {
        let progress = (r.age(phase) / RIPPLE_MAX_AGE).clamp(0.0, 1.0);
        let fade = (1.0 - progress) * (1.0 - progress) * r.intensity;
        if fade <= 0.0 {
            continue;
        }
        let pos = r.normalized_position * stage.size;
        let radius = stage.extent * (0.03 + progress * 0.4);
        surface.stroke_circle(ID, pos, radius, stage.extent * 0.006, r.color.fade(fade * 0.8));
        surface.stroke_circle(ID, pos, radius * 0.7, stage.extent * 0.003, r.color.lighten(0.4).fade(fade * 0.5));

        for s in 0..8u32 {
            let a = s as f32 * TAU / 8.0 + progress * 2.0 + hash01(s, k as u32) * 0.4;
            let spark = pos + Vec2::from_angle(a) * radius * (1.0 + hash01(s, 0x5A) * 0.15);
            surface.fill_circle(ID, spark, stage.extent * 0.003, Rgba::WHITE.fade(fade));
        }
    }
}

/// Offset red/green/blue ghosts of each ripple ring.
pub(super) fn ripple_echoes<S: Surface + ?Sized>(surface: &mut S, state: &SimulationState, stage: &Stage) {
    let phase = state.animation_phase();
    let split = stage.extent * 0.006 * (1.0 + state.shake_energy() * 2.0);
    let channels = [
        (Rgba::rgb(1.0, 0.2, 0.2), Vec2::new(-split, 0.0)),
        (Rgba::rgb(0.2, 1.0, 0.3), Vec2::new(0.0, split * 0.5)),
        (Rgba::rgb(0.25, 0.35, 1.0), Vec2::new(split, 0.0)),
    ];
    for r in state.ripples() {
        let progress = (r.age(phase) / RIPPLE_MAX_AGE).clamp(0.0, 1.0);
        let fade = (1.0 - progress) * r.intensity * 0.25;
        let pos = r.normalized_position * stage.size;
        let radius = stage.extent * (0.03 + progress * 0.4) * 1.08;
        for (color, offset) in channels {
            surface.stroke_circle(ID, pos + offset, radius, stage.extent * 0.002, color.fade(fade));
        }
    }
}

/// Faint concentric rings around the center, like light through a grating.
pub(super) fn diffraction_rings<S: Surface + ?Sized>(
    surface: &mut S,
    state: &SimulationState,
    stage: &Stage,
) {
    let strength = 0.04 + 0.08 * state.kinetic_energy();
    for i in 0..4 {
        let wobble = 1.0 + (stage.wall_time * 0.5 + i as f32).sin() * 0.03;
        let radius = stage.extent * (0.12 + i as f32 * 0.11) * wobble;
        let color = state.displayed_color(i + 2).lighten(0.3);
        surface.stroke_circle(ID, stage.center, radius, stage.extent * 0.0025, color.fade(strength));
    }
}

/// Offset RGB blobs that separate as the pattern moves faster.
pub(super) fn chromatic_fringes<S: Surface + ?Sized>(
    surface: &mut S,
    state: &SimulationState,
    stage: &Stage,
) {
    let amount = state.kinetic_energy() * 0.6 + state.shake_energy();
    if amount <= 0.01 {
        return;
    }
    let spread = stage.extent * 0.02 * amount;
    let dir = Vec2::from_angle(state.global_rotation());
    let blobs = [
        (Rgba::rgb(1.0, 0.1, 0.25), dir * spread),
        (Rgba::rgb(0.1, 1.0, 0.4), Vec2::ZERO),
        (Rgba::rgb(0.2, 0.3, 1.0), -dir * spread),
    ];
    for (color, offset) in blobs {
        let stops = [
            GradientStop::new(0.0, color.fade(0.05 * amount.min(1.0))),
            GradientStop::new(1.0, color.with_alpha(0.0)),
        ];
        surface.fill_radial(ID, stage.center + offset, stage.extent * 0.28, &stops);
    }
}

pub(super) fn central_glow<S: Surface + ?Sized>(surface: &mut S, state: &SimulationState, stage: &Stage) {
    let slot = (stage.wall_time * 0.1) as usize;
    let color = state.displayed_color(slot).lighten(0.35);
    let k = 0.2 + 0.3 * state.kinetic_energy();
    let stops = [
        GradientStop::new(0.0, color.fade(k)),
        GradientStop::new(0.4, color.fade(k * 0.35)),
        GradientStop::new(1.0, color.with_alpha(0.0)),
    ];
    surface.fill_radial(ID, stage.center, stage.extent * 0.18, &stops);
}

/// Edge vignette glow plus a spray of particles along the shake direction.
pub(super) fn shake_effects<S: Surface + ?Sized>(
    surface: &mut S,
    state: &SimulationState,
    stage: &Stage,
    detail: &Detail,
) {
    let shake = state.shake_energy();
    if shake <= 0.0 {
        return;
    }
    let color = state.displayed_color(1);
    let stops = [
        GradientStop::new(0.0, color.with_alpha(0.0)),
        GradientStop::new(0.65, color.with_alpha(0.0)),
        GradientStop::new(1.0, color.fade(0.45 * shake)),
    ];
    surface.fill_radial(ID, stage.center, stage.extent * 0.75, &stops);

    let n = count((28.0 * shake).ceil() as usize, detail) as u32;
    let dir = state.motion_direction();
    for i in 0..n {
        let h = hash01(i, stage.seed ^ 0x5AC3);
        let a = h * TAU;
        let bias = Vec2::from_angle(a) + dir * 0.6;
        let dist = stage.extent * (0.15 + hash01(i, 0x77) * 0.3 + (1.0 - shake) * 0.3);
        let pos = stage.center + bias * dist;
        let c = state.displayed_color(i as usize).lighten(0.5);
        surface.fill_circle(ID, pos, stage.extent * 0.004 * (0.5 + shake), c.fade(shake));
    }
}

/// Foreground dust: tiny, faint, slow.
pub(super) fn dust<S: Surface + ?Sized>(surface: &mut S, stage: &Stage, detail: &Detail) {
    let n = count(60, detail) as u32;
    let salt = stage.seed ^ 0xD057;
    for i in 0..n {
        let h = hash01(i, salt);
        let pos = Vec2::new(
            (hash01(i, salt ^ 3) + stage.wall_time * 0.002 * (1.0 + h)).fract(),
            (hash01(i, salt ^ 4) + (stage.wall_time * 0.3 + h * TAU).sin() * 0.004).rem_euclid(1.0),
        ) * stage.size;
        let alpha = 0.08 + 0.1 * (stage.wall_time * 0.7 + h * 9.0).sin().abs();
        surface.fill_circle(ID, pos, stage.extent * 0.0012, Rgba::WHITE.fade(alpha));
    }
}

/// Brief four-point glints that pop in and out.
pub(super) fn sparkles<S: Surface + ?Sized>(surface: &mut S, state: &SimulationState, stage: &Stage, detail: &Detail) {
    let n = count(30, detail) as u32;
    let salt = stage.seed ^ 0x59A4;
    let arm = stage.extent * 0.008;
    for i in 0..n {
        let h = hash01(i, salt);
        let wave = (stage.wall_time * (1.5 + h * 2.0) + h * TAU).sin();
        if wave < 0.8 {
            continue;
        }
        let k = (wave - 0.8) / 0.2;
        let pos = Vec2::new(hash01(i, salt ^ 5), hash01(i, salt ^ 6)) * stage.size;
        let color = state.displayed_color(i as usize).lighten(0.7).fade(k);
        let xf = Affine2::from_angle_translation(h * TAU, pos);
        surface.stroke_path(xf, &[Vec2::new(-arm, 0.0), Vec2::new(arm, 0.0)], arm * 0.15, color);
        surface.stroke_path(xf, &[Vec2::new(0.0, -arm), Vec2::new(0.0, arm)], arm * 0.15, color);
        surface.fill_circle(xf, Vec2::ZERO, arm * 0.2, Rgba::WHITE.fade(k));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_and_in_unit_range() {
        for i in 0..1000 {
            let a = hash01(i, 42);
            assert_eq!(a, hash01(i, 42));
            assert!((0.0..=1.0).contains(&a));
        }
        assert_ne!(hash01(1, 42), hash01(2, 42));
    }
}
