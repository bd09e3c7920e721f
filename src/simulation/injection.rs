use super::SimulationState;
use crate::easing::ease_out_quad;
use crate::palette::PALETTE_LEN;
use crate::ripple::TapRipple;
use glam::Vec2;
use log::debug;
use std::f32::consts::TAU;

const TAP_KINETIC: f32 = 0.15;
const TAP_SPIN: f32 = 0.005;
const TAP_SPIN_CAP: f32 = 0.03;
const TAP_RADIUS: f32 = 0.6;
const TAP_FORCE: f32 = 0.08;
const TAP_ENERGY: f32 = 1.5;
const TAP_ROTATION_KICK: f32 = 10.0;

const MOTION_KINETIC: f32 = 0.5;
const MOTION_SPIN: f32 = 0.02;
const MOTION_SPIN_CAP: f32 = 0.05;
const MOTION_WAKE: f32 = 0.2;
const MOTION_SHAKE: f32 = 0.3;
const MOTION_FORCE: f32 = 0.003;
const MOTION_ROTATION_KICK: f32 = 20.0;
const MOTION_ENERGY: f32 = 0.6;
const MOTION_BURST: f32 = 0.5;
const MOTION_BURST_ANGLE: f32 = 0.6;
const MOTION_FORCED_EVOLUTION: f32 = 0.8;
/// Cooldown before a hard shake may force an evolution, measured on the
/// evolution clock (`time_since_last_evolution`). That clock only runs while
/// kinetic energy is above the scheduling gate, so time spent at rest never
/// counts. Ripple lifetimes use `animation_phase` instead, which also stalls
/// at rest.
const MIN_SECONDS_BETWEEN_FORCED: f32 = 3.0;

const MOTION_INTENSITY_DECAY: f32 = 3.0;
const SHAKE_DECAY: f32 = 1.5;
const MOTION_SNAP: f32 = 0.01;

/// Tap/shake forces are authored as displacement budgets; this maps them into
/// the generator's velocity units.
const IMPULSE_TO_VELOCITY: f32 = 0.05;

impl SimulationState {
    /// Register a tap: ripple, energy injection, and a radial push.
    pub fn add_tap_ripple(&mut self, position: Vec2, normalized_position: Vec2) {
        let slot = self.rng.usize(0..PALETTE_LEN);
        let ripple = TapRipple {
            position,
            normalized_position,
            start_time: self.animation_phase,
            color: self.displayed_color(slot),
            intensity: 1.0,
        };
        self.ripples.push(ripple);

        self.kinetic_energy = (self.kinetic_energy + TAP_KINETIC).min(1.0);
        if self.rotation_velocity < TAP_SPIN_CAP {
            self.rotation_velocity = (self.rotation_velocity + TAP_SPIN).min(TAP_SPIN_CAP);
        }
        self.is_resting = false;

        for e in &mut self.seed_elements {
            let away = e.position - normalized_position;
            let dist = away.length();
            if !(dist < TAP_RADIUS) {
                continue;
            }
            let falloff = 1.0 - ease_out_quad(dist / TAP_RADIUS);
            let dir = if dist > 1e-5 {
                away / dist
            } else {
                Vec2::from_angle(self.rng.f32() * TAU)
            };
            e.velocity += dir * falloff * TAP_FORCE * IMPULSE_TO_VELOCITY;
            e.energy = (e.energy + falloff * TAP_ENERGY).min(1.0);
            e.rotation_speed += (self.rng.f32() * 2.0 - 1.0) * TAP_ROTATION_KICK * falloff;
        }
    }

    /// Consume a filtered device-motion sample.
    pub fn apply_motion(&mut self, direction: Vec2, intensity: f32) {
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let dir = direction.normalize_or_zero();

        self.motion_intensity = self.motion_intensity.max(intensity);
        self.motion_direction = dir;
        self.kinetic_energy = (self.kinetic_energy + intensity * MOTION_KINETIC).min(1.0);
        if self.rotation_velocity < MOTION_SPIN_CAP {
            self.rotation_velocity =
                (self.rotation_velocity + intensity * MOTION_SPIN).min(MOTION_SPIN_CAP);
        }
        if intensity > MOTION_WAKE {
            self.is_resting = false;
        }
        self.shake_energy = (self.shake_energy + intensity * MOTION_SHAKE).min(1.0);

        for e in &mut self.seed_elements {
            let reach = 1.0 - e.depth * 0.5;
            e.velocity += dir * intensity * MOTION_FORCE * reach;
            e.rotation_speed += (self.rng.f32() * 2.0 - 1.0) * MOTION_ROTATION_KICK * intensity;
            e.energy = (e.energy + intensity * MOTION_ENERGY * reach).min(1.0);
        }

        if intensity > MOTION_BURST {
            self.target_global_rotation +=
                (self.rng.f32() * 2.0 - 1.0) * MOTION_BURST_ANGLE * intensity;
        }

        if intensity > MOTION_FORCED_EVOLUTION
            && !self.is_transitioning
            && self.time_since_last_evolution >= MIN_SECONDS_BETWEEN_FORCED
        {
            debug!("shake forced evolution (intensity {:.2})", intensity);
            self.start_evolution();
        }
    }

    /// Bleed off motion intensity and shake energy.
    pub fn decay_motion(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.motion_intensity *= (1.0 - MOTION_INTENSITY_DECAY * dt).max(0.0);
        if self.motion_intensity < MOTION_SNAP {
            self.motion_intensity = 0.0;
        }
        self.shake_energy *= (1.0 - SHAKE_DECAY * dt).max(0.0);
        if self.shake_energy < MOTION_SNAP {
            self.shake_energy = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::palette::Palette;
    use crate::simulation::SimulationState;
    use glam::Vec2;

    #[test]
    fn tap_pushes_nearby_elements_away() {
        let mut s = SimulationState::with_seed(Palette::Candy, 8, 21);
        let tap = Vec2::new(0.5, 0.5);
        let before = s.seed_elements().to_vec();
        s.add_tap_ripple(Vec2::new(100.0, 100.0), tap);
        for (b, a) in before.iter().zip(s.seed_elements()) {
            let away = b.position - tap;
            let dv = a.velocity - b.velocity;
            if away.length() < 0.6 && away.length() > 1e-3 {
                assert!(dv.dot(away) > 0.0, "element pulled toward tap");
                assert!(a.energy > b.energy);
            } else if away.length() >= 0.6 {
                assert_eq!(dv, Vec2::ZERO);
                assert_eq!(a.energy, b.energy);
            }
        }
    }

    #[test]
    fn tap_spin_respects_cap_but_never_lowers() {
        let mut s = SimulationState::with_seed(Palette::Candy, 8, 22);
        for _ in 0..20 {
            s.add_tap_ripple(Vec2::ZERO, Vec2::splat(0.5));
        }
        assert!((s.rotation_velocity() - 0.03).abs() < 1e-6);
        s.apply_motion(Vec2::X, 1.0);
        let boosted = s.rotation_velocity();
        assert!(boosted > 0.03);
        s.add_tap_ripple(Vec2::ZERO, Vec2::splat(0.5));
        assert_eq!(s.rotation_velocity(), boosted);
    }

    #[test]
    fn decay_motion_snaps_to_zero() {
        let mut s = SimulationState::with_seed(Palette::Mono, 8, 23);
        s.apply_motion(Vec2::Y, 0.6);
        assert!(s.shake_energy() > 0.0 && s.motion_intensity() > 0.0);
        for _ in 0..400 {
            s.decay_motion(1.0 / 60.0);
        }
        assert_eq!(s.motion_intensity(), 0.0);
        assert_eq!(s.shake_energy(), 0.0);
    }

    #[test]
    fn hard_shake_forces_evolution_only_after_cooldown() {
        let mut s = SimulationState::with_seed(Palette::Dawn, 8, 24);
        s.apply_motion(Vec2::X, 0.95);
        assert!(!s.is_transitioning(), "cooldown not yet elapsed");

        s.time_since_last_evolution = 3.5;
        s.apply_motion(Vec2::X, 0.95);
        assert!(s.is_transitioning());
        assert!(!s.pending_elements().is_empty());
    }
}
