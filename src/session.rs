//! Host-facing driver around [`SimulationState`].
//!
//! Owns the frame clock, gesture bookkeeping (drag, pinch) and the injected
//! collaborators for haptics and device motion. All calls are expected on one
//! thread, serialized with `on_frame`.

use crate::palette::Palette;
use crate::simulation::SimulationState;
use glam::Vec2;
use log::debug;

const MAX_FRAME_DT: f64 = 1.0;
/// Rate at which a released drag or key nudge eases back to centre.
const RELEASE_DECAY: f32 = 2.5;
const RELEASE_SNAP: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticKind {
    Light,
    Medium,
    Heavy,
    Selection,
}

pub trait HapticSink {
    fn impact(&mut self, kind: HapticKind);
}

/// Discards every impact.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl HapticSink for NoHaptics {
    fn impact(&mut self, _kind: HapticKind) {}
}

/// Writes impacts to the debug log; handy on hosts without an actuator.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHaptics;

impl HapticSink for LogHaptics {
    fn impact(&mut self, kind: HapticKind) {
        debug!("haptic {:?}", kind);
    }
}

/// A shake sample after host-side thresholding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub direction: Vec2,
    /// `0..=1`.
    pub intensity: f32,
}

pub trait MotionSource {
    /// Next pending sample at host time `now` (seconds), if any.
    fn next_sample(&mut self, now: f64) -> Option<MotionSample>;
}

/// No motion hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMotion;

impl MotionSource for NoMotion {
    fn next_sample(&mut self, _now: f64) -> Option<MotionSample> {
        None
    }
}

/// Synthetic shake: a short burst of 60 Hz samples with linearly falling
/// intensity. Used where no accelerometer exists (keyboard `s` in the viewer).
#[derive(Debug, Default, Clone)]
pub struct ShakeBurst {
    start: Option<f64>,
    last_emit: f64,
    direction: Vec2,
    peak: f32,
    duration: f64,
}

impl ShakeBurst {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&mut self, now: f64, direction: Vec2, peak: f32, duration: f64) {
        self.start = Some(now);
        self.last_emit = f64::NEG_INFINITY;
        self.direction = direction;
        self.peak = peak.clamp(0.0, 1.0);
        self.duration = duration.max(1e-3);
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }
}

impl MotionSource for ShakeBurst {
    fn next_sample(&mut self, now: f64) -> Option<MotionSample> {
        let start = self.start?;
        let age = now - start;
        if age < 0.0 {
            return None;
        }
        if age > self.duration {
            self.start = None;
            return None;
        }
        if now - self.last_emit < 1.0 / 60.0 {
            return None;
        }
        self.last_emit = now;
        let k = (1.0 - age / self.duration) as f32;
        Some(MotionSample {
            direction: self.direction,
            intensity: self.peak * k,
        })
    }
}

/// Turns host timestamps into clamped `dt` values.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameClock {
    prev: Option<f64>,
}

impl FrameClock {
    /// `max(0, min(now - prev, 1))`; the first tick yields 0.
    pub fn tick(&mut self, now: f64) -> f32 {
        let dt = match self.prev {
            Some(prev) if now.is_finite() => (now - prev).clamp(0.0, MAX_FRAME_DT),
            _ => 0.0,
        };
        if now.is_finite() {
            self.prev = Some(now);
        }
        dt as f32
    }
}

pub struct Session<H: HapticSink, M: MotionSource> {
    state: SimulationState,
    haptics: H,
    motion: M,
    clock: FrameClock,
    dragging: bool,
    pinch_base: u32,
}

impl<H: HapticSink, M: MotionSource> Session<H, M> {
    pub fn new(state: SimulationState, haptics: H, motion: M) -> Self {
        let pinch_base = state.symmetry_count();
        Self {
            state,
            haptics,
            motion,
            clock: FrameClock::default(),
            dragging: false,
            pinch_base,
        }
    }

    /// Per-display-refresh entry point. Drains motion samples, then evolves
    /// unless a drag is in progress. Returns the `dt` that was applied.
    ///
    /// Once released, the raw touch offset decays toward zero after each
    /// step, so the smoothed offset first follows the drag and then drifts
    /// back to centre.
    pub fn on_frame(&mut self, now: f64) -> f32 {
        while let Some(sample) = self.motion.next_sample(now) {
            self.on_motion(sample.direction, sample.intensity);
        }
        let dt = self.clock.tick(now);
        if self.dragging {
            return 0.0;
        }
        self.state.evolve(dt);
        self.release_touch(dt);
        dt
    }

    fn release_touch(&mut self, dt: f32) {
        let mut offset = self.state.touch_offset();
        if offset == Vec2::ZERO {
            return;
        }
        offset *= (-RELEASE_DECAY * dt).exp();
        if offset.length() < RELEASE_SNAP {
            offset = Vec2::ZERO;
        }
        self.state.set_touch_offset(offset);
    }

    pub fn on_drag(&mut self, translation_normalized: Vec2) {
        self.dragging = true;
        self.state.set_touch_offset(translation_normalized);
    }

    /// Ends the drag. The last translation stays as the touch offset and
    /// eases back to zero as frames resume.
    pub fn on_drag_end(&mut self) {
        self.dragging = false;
    }

    /// Adds a keyboard pan step to the touch offset, clamped to `±1` per
    /// axis. Ignored while a drag owns the offset.
    pub fn nudge(&mut self, delta: Vec2) {
        if self.dragging {
            return;
        }
        let offset = (self.state.touch_offset() + delta).clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
        self.state.set_touch_offset(offset);
    }

    pub fn on_pinch_start(&mut self) {
        self.pinch_base = self.state.symmetry_count();
    }

    pub fn on_pinch(&mut self, scale: f32) {
        if !scale.is_finite() {
            return;
        }
        let before = self.state.symmetry_count();
        let target = (self.pinch_base as f32 * scale).round() as i32;
        self.state.adjust_symmetry(target);
        if self.state.symmetry_count() != before {
            self.haptics.impact(HapticKind::Selection);
        }
    }

    pub fn on_tap(&mut self, canvas_position: Vec2, normalized_position: Vec2) {
        self.state.add_tap_ripple(canvas_position, normalized_position);
        self.haptics.impact(HapticKind::Light);
    }

    pub fn on_motion(&mut self, direction: Vec2, intensity: f32) {
        let was_transitioning = self.state.is_transitioning();
        self.state.apply_motion(direction, intensity);
        if !was_transitioning && self.state.is_transitioning() {
            self.haptics.impact(HapticKind::Heavy);
        } else if intensity > 0.5 {
            self.haptics.impact(HapticKind::Medium);
        }
    }

    pub fn select_palette(&mut self, palette: Palette) {
        if palette == self.state.palette() {
            return;
        }
        self.state.update_palette(palette);
        self.haptics.impact(HapticKind::Selection);
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn motion_mut(&mut self) -> &mut M {
        &mut self.motion
    }

    pub fn haptics(&self) -> &H {
        &self.haptics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_clamps_and_ignores_backwards_time() {
        let mut c = FrameClock::default();
        assert_eq!(c.tick(10.0), 0.0);
        assert!((c.tick(10.016) - 0.016).abs() < 1e-5);
        assert_eq!(c.tick(15.0), 1.0);
        assert_eq!(c.tick(14.0), 0.0);
        assert_eq!(c.tick(f64::NAN), 0.0);
    }

    #[test]
    fn shake_burst_fades_and_expires() {
        let mut b = ShakeBurst::new();
        b.trigger(1.0, Vec2::X, 0.9, 0.3);
        let first = b.next_sample(1.0).expect("first sample");
        assert!((first.intensity - 0.9).abs() < 1e-6);
        assert!(b.next_sample(1.001).is_none(), "rate limited to 60 Hz");
        let later = b.next_sample(1.2).expect("later sample");
        assert!(later.intensity < first.intensity);
        assert!(b.next_sample(1.5).is_none());
        assert!(!b.is_active());
    }

    #[test]
    fn nudge_clamps_and_waits_for_drag() {
        let mut s = Session::new(
            SimulationState::with_seed(Palette::Dawn, 6, 9),
            NoHaptics,
            NoMotion,
        );
        for _ in 0..6 {
            s.nudge(Vec2::new(0.25, -0.25));
        }
        assert_eq!(s.state().touch_offset(), Vec2::new(1.0, -1.0));
        s.on_drag(Vec2::new(0.1, 0.1));
        s.nudge(Vec2::X);
        assert_eq!(s.state().touch_offset(), Vec2::new(0.1, 0.1));
    }
}
