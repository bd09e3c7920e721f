//! Kinetic-energy gated simulation of the seed elements.
//!
//! One scalar, `kinetic_energy`, decides how much the whole piece moves. Taps
//! and shakes inject it; every frame bleeds it away. Phase, global spin, flow
//! drift and element responsiveness all scale with its square so the pattern
//! eases into a still image instead of stopping abruptly.

mod evolution;
mod injection;

use crate::color::{lerp, Rgba};
use crate::palette::{Palette, PALETTE_LEN};
use crate::ripple::{RippleBuffer, TapRipple, RIPPLE_MAX_AGE};
use crate::seed::{self, SeedElement};
use fastrand::Rng;
use glam::Vec2;
use log::debug;

pub use evolution::{EVOLUTION_INTERVAL_RANGE, MAX_ELEMENTS, MIN_ELEMENTS};

pub const MIN_SYMMETRY: u32 = 3;
pub const MAX_SYMMETRY: u32 = 12;

/// Frame hitches are integrated as if they were this long.
pub const MAX_DT: f32 = 0.033;

const KINETIC_DECAY: f32 = 0.004;
const ROTATION_DECAY: f32 = 0.003;
const REST_THRESHOLD: f32 = 0.001;
const INITIAL_KINETIC_ENERGY: f32 = 0.5;
const INITIAL_ROTATION_VELOCITY: f32 = 0.01;

const SPRING_OMEGA: f32 = 3.0;
const TOUCH_SMOOTHING: f32 = 8.0;
const EVOLUTION_ENERGY_GATE: f32 = 0.3;
const PALETTE_FADE_RATE: f32 = 0.6;

const FLOW_STRENGTH: f32 = 0.0004;
const PARALLAX_GAIN: f32 = 0.5;
const BOUNDARY: f32 = 0.05;
const BOUNDARY_SOFTNESS: f32 = 0.15;
const BOUNDARY_NUDGE: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct SimulationState {
    symmetry_count: u32,
    seed_elements: Vec<SeedElement>,
    pending_elements: Vec<SeedElement>,
    animation_phase: f32,

    global_rotation: f32,
    target_global_rotation: f32,

    touch_offset: Vec2,
    smooth_touch_offset: Vec2,

    palette: Palette,
    current_palette_colors: [Rgba; PALETTE_LEN],
    target_palette_colors: [Rgba; PALETTE_LEN],
    color_transition_progress: f32,

    time_since_last_evolution: f32,
    evolution_interval: f32,
    is_transitioning: bool,
    transition_progress: f32,

    kinetic_energy: f32,
    rotation_velocity: f32,
    is_resting: bool,
    motion_intensity: f32,
    motion_direction: Vec2,
    shake_energy: f32,

    ripples: RippleBuffer,
    rng: Rng,
}

impl SimulationState {
    /// Randomly seeded session.
    pub fn new(palette: Palette, symmetry: u32) -> Self {
        Self::with_rng(palette, symmetry, Rng::new())
    }

    /// Deterministic session: identical seed and inputs give identical frames.
    pub fn with_seed(palette: Palette, symmetry: u32, seed: u64) -> Self {
        Self::with_rng(palette, symmetry, Rng::with_seed(seed))
    }

    pub fn with_rng(palette: Palette, symmetry: u32, mut rng: Rng) -> Self {
        let colors = palette.colors();
        let count = rng.usize(MIN_ELEMENTS..=MAX_ELEMENTS);
        let seed_elements = seed::generate_set(&mut rng, &colors, count);
        let (lo, hi) = EVOLUTION_INTERVAL_RANGE;
        let evolution_interval = lo + rng.f32() * (hi - lo);

        Self {
            symmetry_count: symmetry.clamp(MIN_SYMMETRY, MAX_SYMMETRY),
            seed_elements,
            pending_elements: Vec::new(),
            animation_phase: 0.0,
            global_rotation: 0.0,
            target_global_rotation: 0.0,
            touch_offset: Vec2::ZERO,
            smooth_touch_offset: Vec2::ZERO,
            palette,
            current_palette_colors: colors,
            target_palette_colors: colors,
            color_transition_progress: 1.0,
            time_since_last_evolution: 0.0,
            evolution_interval,
            is_transitioning: false,
            transition_progress: 0.0,
            kinetic_energy: INITIAL_KINETIC_ENERGY,
            rotation_velocity: INITIAL_ROTATION_VELOCITY,
            is_resting: false,
            motion_intensity: 0.0,
            motion_direction: Vec2::ZERO,
            shake_energy: 0.0,
            ripples: RippleBuffer::new(),
            rng,
        }
    }

    /// Advance the simulation by `dt` seconds (clamped to `0..=MAX_DT`).
    pub fn evolve(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_DT) } else { 0.0 };

        // Kinetic decay.
        self.kinetic_energy =
            (self.kinetic_energy * (1.0 - KINETIC_DECAY * dt * 60.0).max(0.0)).clamp(0.0, 1.0);
        if self.kinetic_energy < REST_THRESHOLD {
            self.kinetic_energy = 0.0;
            self.is_resting = true;
        } else {
            self.is_resting = false;
        }
        self.rotation_velocity =
            (self.rotation_velocity * (1.0 - ROTATION_DECAY * dt * 60.0)).max(0.0);
        self.decay_motion(dt);
        let effective = self.effective_energy();

        // Phase and global rotation.
        let phase_speed = 0.3 + (self.animation_phase * 0.1).sin() * 0.05;
        self.animation_phase += dt * phase_speed * effective;
        self.target_global_rotation += dt * self.rotation_velocity * effective;
        let stiffness = SPRING_OMEGA * SPRING_OMEGA;
        self.global_rotation += stiffness
            * (self.target_global_rotation - self.global_rotation)
            * dt
            * (0.3 + 0.7 * effective);

        let follow = 1.0 - (-TOUCH_SMOOTHING * dt).exp();
        self.smooth_touch_offset += (self.touch_offset - self.smooth_touch_offset) * follow;

        if self.kinetic_energy > EVOLUTION_ENERGY_GATE {
            self.time_since_last_evolution += dt;
        }
        if self.time_since_last_evolution >= self.evolution_interval && !self.is_transitioning {
            self.start_evolution();
        }

        if self.is_transitioning {
            self.transition_progress =
                (self.transition_progress + dt * 0.2 * effective.max(0.5)).min(1.0);
            if self.transition_progress >= 1.0 {
                self.complete_evolution();
            } else {
                self.update_transition();
            }
        }

        if self.color_transition_progress < 1.0 {
            self.color_transition_progress =
                (self.color_transition_progress + dt * PALETTE_FADE_RATE).min(1.0);
            self.recolor_elements();
            if self.color_transition_progress >= 1.0 {
                self.current_palette_colors = self.target_palette_colors;
            }
        }

        self.ripples.prune(self.animation_phase, RIPPLE_MAX_AGE);

        self.integrate_elements(dt, effective);
    }

    fn integrate_elements(&mut self, dt: f32, effective: f32) {
        let phase = self.animation_phase;
        let touch = self.smooth_touch_offset;
        let decay_2 = (-2.0 * dt).exp();
        let velocity_decay = (-(3.5 + (1.0 - effective) * 5.0) * dt).exp();

        for e in &mut self.seed_elements {
            e.energy = (e.energy * decay_2).clamp(0.0, 1.0);

            let flow = flow_field(e.position, e.depth, phase + e.phase_offset)
                * FLOW_STRENGTH
                * effective
                * (1.0 + 1.5 * e.energy);

            e.velocity *= velocity_decay;

            let responsiveness = ((0.92 - e.depth * 0.15) * effective).max(0.1);
            let target = e.position + (e.velocity + flow) * 25.0;
            let pull = 1.0 - (-6.0 * responsiveness * dt).exp();
            e.position += (target - e.position) * pull;

            let depth_factor = 1.0 - e.depth * 0.6;
            e.position += touch * depth_factor * depth_factor * PARALLAX_GAIN * dt;

            soft_boundary(&mut e.position.x, &mut e.velocity.x);
            soft_boundary(&mut e.position.y, &mut e.velocity.y);

            e.rotation_speed *= decay_2;
            let base_rotation = (phase * 0.3 + e.phase_offset).sin() * 0.5;
            e.rotation = (e.rotation + (e.rotation_speed + base_rotation) * dt * 60.0).rem_euclid(360.0);
        }
    }

    /// Start a cross-fade toward `palette`. Element colors follow in `evolve`.
    pub fn update_palette(&mut self, palette: Palette) {
        if self.color_transition_progress < 1.0 {
            // Re-targeted mid-fade: continue from what is on screen now.
            let t = self.color_transition_progress;
            for (cur, tgt) in self
                .current_palette_colors
                .iter_mut()
                .zip(self.target_palette_colors.iter())
            {
                *cur = lerp(*cur, *tgt, t);
            }
        }
        debug!("palette {} -> {}", self.palette.label(), palette.label());
        self.palette = palette;
        self.target_palette_colors = palette.colors();
        self.color_transition_progress = 0.0;
    }

    /// Set the fold count, clamped to `3..=12`.
    pub fn adjust_symmetry(&mut self, count: i32) {
        let clamped = count.clamp(MIN_SYMMETRY as i32, MAX_SYMMETRY as i32) as u32;
        if clamped != self.symmetry_count {
            debug!("symmetry {} -> {}", self.symmetry_count, clamped);
        }
        self.symmetry_count = clamped;
    }

    /// Raw normalized drag offset; smoothed inside `evolve`.
    pub fn set_touch_offset(&mut self, offset: Vec2) {
        self.touch_offset = if offset.is_finite() { offset } else { Vec2::ZERO };
    }

    /// Color currently displayed for palette slot `index`.
    pub fn displayed_color(&self, index: usize) -> Rgba {
        let i = index % PALETTE_LEN;
        lerp(
            self.current_palette_colors[i],
            self.target_palette_colors[i],
            self.color_transition_progress,
        )
    }

    fn recolor_elements(&mut self) {
        let current = self.current_palette_colors;
        let target = self.target_palette_colors;
        let t = self.color_transition_progress;
        for e in self
            .seed_elements
            .iter_mut()
            .chain(self.pending_elements.iter_mut())
        {
            let i = e.color_index % PALETTE_LEN;
            e.color = lerp(current[i], target[i], t);
        }
    }

    pub fn effective_energy(&self) -> f32 {
        self.kinetic_energy * self.kinetic_energy
    }

    pub fn symmetry_count(&self) -> u32 {
        self.symmetry_count
    }

    pub fn seed_elements(&self) -> &[SeedElement] {
        &self.seed_elements
    }

    pub fn pending_elements(&self) -> &[SeedElement] {
        &self.pending_elements
    }

    pub fn animation_phase(&self) -> f32 {
        self.animation_phase
    }

    pub fn global_rotation(&self) -> f32 {
        self.global_rotation
    }

    pub fn target_global_rotation(&self) -> f32 {
        self.target_global_rotation
    }

    pub fn touch_offset(&self) -> Vec2 {
        self.touch_offset
    }

    pub fn smooth_touch_offset(&self) -> Vec2 {
        self.smooth_touch_offset
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn current_palette_colors(&self) -> &[Rgba; PALETTE_LEN] {
        &self.current_palette_colors
    }

    pub fn target_palette_colors(&self) -> &[Rgba; PALETTE_LEN] {
        &self.target_palette_colors
    }

    pub fn color_transition_progress(&self) -> f32 {
        self.color_transition_progress
    }

    pub fn time_since_last_evolution(&self) -> f32 {
        self.time_since_last_evolution
    }

    pub fn evolution_interval(&self) -> f32 {
        self.evolution_interval
    }

    pub fn is_transitioning(&self) -> bool {
        self.is_transitioning
    }

    pub fn transition_progress(&self) -> f32 {
        self.transition_progress
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.kinetic_energy
    }

    pub fn rotation_velocity(&self) -> f32 {
        self.rotation_velocity
    }

    pub fn is_resting(&self) -> bool {
        self.is_resting
    }

    pub fn motion_intensity(&self) -> f32 {
        self.motion_intensity
    }

    pub fn motion_direction(&self) -> Vec2 {
        self.motion_direction
    }

    pub fn shake_energy(&self) -> f32 {
        self.shake_energy
    }

    pub fn ripples(&self) -> impl Iterator<Item = &TapRipple> {
        self.ripples.iter()
    }

    pub fn ripple_count(&self) -> usize {
        self.ripples.len()
    }
}

/// Three-harmonic drift field. Frequencies rise with depth, amplitude falls.
fn flow_field(p: Vec2, depth: f32, phase: f32) -> Vec2 {
    let f = 1.0 + depth;
    let amp = 1.2 - depth * 0.6;
    let fx = (phase * 0.7 + p.y * 3.0 * f).sin() * 0.4
        + (phase * 1.3 + p.x * 5.0 * f).sin() * 0.3
        + (phase * 0.5 + (p.x + p.y) * 2.0 * f).cos() * 0.3;
    let fy = (phase * 0.6 + p.x * 3.0 * f).cos() * 0.4
        + (phase * 1.1 + p.y * 4.0 * f).cos() * 0.3
        + (phase * 0.4 + (p.x - p.y) * 2.0 * f).sin() * 0.3;
    Vec2::new(fx, fy) * amp
}

/// Spring the coordinate back inside `[BOUNDARY, 1 - BOUNDARY]` without a hard clamp.
fn soft_boundary(pos: &mut f32, vel: &mut f32) {
    if *pos < BOUNDARY {
        let penetration = BOUNDARY - *pos;
        *vel += penetration * BOUNDARY_SOFTNESS;
        *pos += penetration * BOUNDARY_NUDGE;
    } else if *pos > 1.0 - BOUNDARY {
        let penetration = *pos - (1.0 - BOUNDARY);
        *vel -= penetration * BOUNDARY_SOFTNESS;
        *pos -= penetration * BOUNDARY_NUDGE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_boundary_pushes_inward_without_clamping() {
        let mut pos = -0.05;
        let mut vel = 0.0;
        soft_boundary(&mut pos, &mut vel);
        assert!(pos > -0.05 && pos < BOUNDARY);
        assert!(vel > 0.0);

        let mut pos = 1.02;
        let mut vel = 0.0;
        soft_boundary(&mut pos, &mut vel);
        assert!(pos < 1.02 && pos > 1.0 - BOUNDARY);
        assert!(vel < 0.0);

        let mut pos = 0.5;
        let mut vel = 0.001;
        soft_boundary(&mut pos, &mut vel);
        assert_eq!((pos, vel), (0.5, 0.001));
    }

    #[test]
    fn flow_field_is_bounded() {
        for i in 0..200 {
            let t = i as f32 * 0.37;
            let v = flow_field(Vec2::new(t.sin() * 0.5 + 0.5, t.cos() * 0.5 + 0.5), (i % 10) as f32 / 10.0, t);
            assert!(v.x.abs() <= 1.2 && v.y.abs() <= 1.2);
        }
    }

    #[test]
    fn zero_dt_changes_nothing_but_bookkeeping() {
        let mut s = SimulationState::with_seed(Palette::Dawn, 8, 1);
        let before: Vec<_> = s.seed_elements().iter().map(|e| e.position).collect();
        let phase = s.animation_phase();
        s.evolve(0.0);
        assert_eq!(s.animation_phase(), phase);
        let after: Vec<_> = s.seed_elements().iter().map(|e| e.position).collect();
        for (a, b) in before.iter().zip(after.iter()) {
            assert!((*a - *b).length() < 0.05);
        }
    }

    #[test]
    fn nan_dt_is_treated_as_zero() {
        let mut s = SimulationState::with_seed(Palette::Dawn, 8, 2);
        s.evolve(f32::NAN);
        assert!(s.animation_phase().is_finite());
        assert!(s.seed_elements().iter().all(|e| e.position.is_finite()));
    }

    #[test]
    fn mid_fade_retarget_starts_from_displayed_colors() {
        let mut s = SimulationState::with_seed(Palette::Dawn, 8, 3);
        s.update_palette(Palette::Ocean);
        for _ in 0..30 {
            s.evolve(1.0 / 60.0);
        }
        let shown = s.displayed_color(2);
        s.update_palette(Palette::Ember);
        assert_eq!(s.color_transition_progress(), 0.0);
        let c = s.current_palette_colors()[2];
        assert!((c.r - shown.r).abs() < 1e-6 && (c.g - shown.g).abs() < 1e-6 && (c.b - shown.b).abs() < 1e-6);
    }
}
