use glam::Vec2;
use kaleidoscope::palette::Palette;
use kaleidoscope::session::{
    FrameClock, HapticKind, HapticSink, MotionSample, MotionSource, NoHaptics, NoMotion, Session,
    ShakeBurst,
};
use kaleidoscope::simulation::SimulationState;
use std::collections::VecDeque;

#[derive(Default)]
struct RecordingHaptics {
    impacts: Vec<HapticKind>,
}

impl HapticSink for RecordingHaptics {
    fn impact(&mut self, kind: HapticKind) {
        self.impacts.push(kind);
    }
}

/// Replays queued samples, one batch per frame.
#[derive(Default)]
struct ScriptedMotion {
    queue: VecDeque<MotionSample>,
}

impl MotionSource for ScriptedMotion {
    fn next_sample(&mut self, _now: f64) -> Option<MotionSample> {
        self.queue.pop_front()
    }
}

fn state() -> SimulationState {
    SimulationState::with_seed(Palette::Dawn, 6, 42)
}

#[test]
fn frames_evolve_with_clamped_dt() {
    let mut s = Session::new(state(), NoHaptics, NoMotion);
    assert_eq!(s.on_frame(100.0), 0.0);
    let dt = s.on_frame(100.016);
    assert!((dt - 0.016).abs() < 1e-4);
    assert!(s.state().animation_phase() > 0.0);
    assert_eq!(s.on_frame(50.0), 0.0, "clock going backwards yields zero dt");
}

#[test]
fn drag_suspends_evolution_but_keeps_clock() {
    let mut s = Session::new(state(), NoHaptics, NoMotion);
    s.on_frame(0.0);
    s.on_frame(0.016);
    s.on_drag(Vec2::new(0.2, -0.1));
    let phase = s.state().animation_phase();
    for i in 2..30 {
        assert_eq!(s.on_frame(i as f64 * 0.016), 0.0);
    }
    assert_eq!(s.state().animation_phase(), phase);
    assert_eq!(s.state().touch_offset(), Vec2::new(0.2, -0.1));

    s.on_drag_end();
    assert_eq!(s.state().touch_offset(), Vec2::new(0.2, -0.1));
    // First frame after the drag only covers the last refresh interval.
    let dt = s.on_frame(30.0 * 0.016);
    assert!((dt - 0.016).abs() < 1e-4);
    assert!(s.state().animation_phase() > phase);
}

#[test]
fn released_drag_pans_elements_then_recentres() {
    let mut dragged = Session::new(state(), NoHaptics, NoMotion);
    let mut still = Session::new(state(), NoHaptics, NoMotion);
    let mut t = 0.0;
    for _ in 0..90 {
        dragged.on_drag(Vec2::new(0.6, 0.4));
        dragged.on_frame(t);
        still.on_frame(t);
        t += 1.0 / 60.0;
    }
    dragged.on_drag_end();

    let mut peak = 0.0f32;
    for _ in 0..200 {
        dragged.on_frame(t);
        still.on_frame(t);
        peak = peak.max(dragged.state().smooth_touch_offset().length());
        t += 1.0 / 60.0;
    }
    assert!(peak > 0.1, "smoothed offset peaked at {peak}");
    assert_eq!(dragged.state().touch_offset(), Vec2::ZERO);
    assert!(dragged.state().smooth_touch_offset().length() < peak);
    assert_eq!(still.state().smooth_touch_offset(), Vec2::ZERO);
    assert!(
        dragged
            .state()
            .seed_elements()
            .iter()
            .zip(still.state().seed_elements())
            .any(|(a, b)| a.position.distance(b.position) > 1e-4),
        "drag should displace elements through parallax"
    );
}

#[test]
fn pinch_scales_from_the_base_symmetry() {
    let mut s = Session::new(state(), RecordingHaptics::default(), NoMotion);
    s.on_pinch_start();
    s.on_pinch(1.5);
    assert_eq!(s.state().symmetry_count(), 9);
    s.on_pinch(2.0);
    assert_eq!(s.state().symmetry_count(), 12);
    s.on_pinch(10.0);
    assert_eq!(s.state().symmetry_count(), 12);
    s.on_pinch(0.1);
    assert_eq!(s.state().symmetry_count(), 3);

    s.on_pinch_start();
    s.on_pinch(f32::NAN);
    assert_eq!(s.state().symmetry_count(), 3);
    assert_eq!(
        s.haptics().impacts,
        vec![HapticKind::Selection, HapticKind::Selection, HapticKind::Selection]
    );
}

#[test]
fn tap_adds_ripple_and_light_haptic() {
    let mut s = Session::new(state(), RecordingHaptics::default(), NoMotion);
    s.on_tap(Vec2::new(50.0, 60.0), Vec2::new(0.5, 0.6));
    assert_eq!(s.state().ripple_count(), 1);
    assert_eq!(s.haptics().impacts, vec![HapticKind::Light]);
}

#[test]
fn palette_selection_skips_the_current_palette() {
    let mut s = Session::new(state(), RecordingHaptics::default(), NoMotion);
    s.select_palette(Palette::Dawn);
    assert_eq!(s.state().color_transition_progress(), 1.0);
    s.select_palette(Palette::Forest);
    assert_eq!(s.state().palette(), Palette::Forest);
    assert_eq!(s.state().color_transition_progress(), 0.0);
    assert_eq!(s.haptics().impacts, vec![HapticKind::Selection]);
}

#[test]
fn motion_samples_are_drained_each_frame() {
    let mut motion = ScriptedMotion::default();
    for _ in 0..3 {
        motion.queue.push_back(MotionSample {
            direction: Vec2::X,
            intensity: 0.6,
        });
    }
    let mut s = Session::new(state(), RecordingHaptics::default(), motion);
    s.on_frame(0.0);
    assert!(s.state().shake_energy() > 0.5);
    assert!(s.state().motion_intensity() > 0.5);
    assert_eq!(s.haptics().impacts, vec![HapticKind::Medium; 3]);
}

#[test]
fn hard_shake_after_cooldown_reports_heavy_impact() {
    let mut s = Session::new(state(), RecordingHaptics::default(), NoMotion);
    // Accumulate evolution time while energetic.
    let mut t = 0.0;
    while s.state().time_since_last_evolution() < 3.5 {
        if (t * 60.0) as u32 % 20 == 0 {
            s.state_mut().apply_motion(Vec2::Y, 0.3);
        }
        s.on_frame(t);
        t += 1.0 / 60.0;
        assert!(t < 60.0);
    }
    assert!(!s.state().is_transitioning());
    s.on_motion(Vec2::X, 0.95);
    assert!(s.state().is_transitioning());
    assert_eq!(s.haptics().impacts.last(), Some(&HapticKind::Heavy));
}

#[test]
fn shake_burst_feeds_the_session() {
    let mut burst = ShakeBurst::new();
    burst.trigger(1.0, Vec2::new(0.0, 1.0), 0.8, 0.3);
    let mut s = Session::new(state(), NoHaptics, burst);
    s.on_frame(1.0);
    let first = s.state().motion_intensity();
    assert!(first > 0.7);
    for i in 1..40 {
        s.on_frame(1.0 + i as f64 / 60.0);
    }
    assert!(!s.motion_mut().is_active());
    assert!(s.state().motion_intensity() < first);
}

#[test]
fn frame_clock_first_tick_is_zero() {
    let mut clock = FrameClock::default();
    assert_eq!(clock.tick(3.0), 0.0);
    assert!((clock.tick(3.5) - 0.5).abs() < 1e-6);
}
