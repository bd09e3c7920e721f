mod ambient;
mod layer;
mod shapes;

use crate::canvas::{Canvas, Surface};
use crate::config::Quality;
use crate::seed::SeedElement;
use crate::simulation::SimulationState;
use ambient::Stage;
use glam::Vec2;

pub use layer::{draw_kaleidoscope_layer, sector_transforms, KaleidoLayer};

/// Level-of-detail knobs derived from [`Quality`]. Never affects simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detail {
    /// Multiplier on ambient particle counts.
    pub particles: f32,
    pub curve_samples: usize,
    pub glow_passes: usize,
    /// Draw every n-th element of each layer subset.
    pub element_stride: usize,
}

impl Detail {
    pub fn for_quality(q: Quality) -> Self {
        match q {
            Quality::Ultra => Self {
                particles: 1.5,
                curve_samples: 16,
                glow_passes: 3,
                element_stride: 1,
            },
            Quality::High => Self {
                particles: 1.0,
                curve_samples: 12,
                glow_passes: 3,
                element_stride: 1,
            },
            Quality::Balanced => Self {
                particles: 0.7,
                curve_samples: 9,
                glow_passes: 2,
                element_stride: 1,
            },
            Quality::Fast => Self {
                particles: 0.4,
                curve_samples: 6,
                glow_passes: 1,
                element_stride: 2,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Slice {
    Full,
    /// Leading fraction of the element list.
    Prefix(f32),
    /// Trailing fraction of the element list.
    Suffix(f32),
}

impl Slice {
    fn apply(self, elements: &[SeedElement]) -> &[SeedElement] {
        let n = elements.len();
        let take = |f: f32| ((n as f32 * f).round() as usize).min(n);
        match self {
            Self::Full => elements,
            Self::Prefix(f) => &elements[..take(f)],
            Self::Suffix(f) => &elements[n - take(f)..],
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RingDef {
    /// Fraction of the larger canvas dimension.
    radius: f32,
    slice: Slice,
    phase: f32,
    fold_delta: i32,
    spin: f32,
    opacity: f32,
    element_scale: f32,
}

const fn ring(
    radius: f32,
    slice: Slice,
    phase: f32,
    fold_delta: i32,
    spin: f32,
    opacity: f32,
    element_scale: f32,
) -> RingDef {
    RingDef {
        radius,
        slice,
        phase,
        fold_delta,
        spin,
        opacity,
        element_scale,
    }
}

/// Back-to-front. Outer rings are faint, inner ones spin faster with more folds.
const LAYERS: [RingDef; 13] = [
    ring(0.95, Slice::Suffix(0.5), 0.0, 0, 0.3, 0.30, 1.4),
    ring(0.85, Slice::Prefix(0.5), 1.3, 2, -0.5, 0.38, 1.2),
    ring(0.85, Slice::Full, 2.1, 4, 0.7, 0.28, 0.9),
    ring(0.65, Slice::Suffix(0.6), 0.7, 0, 1.0, 0.55, 1.0),
    ring(0.65, Slice::Prefix(0.4), 3.4, 6, -1.4, 0.45, 0.8),
    ring(0.42, Slice::Full, 1.9, 0, 1.2, 0.70, 0.9),
    ring(0.42, Slice::Suffix(0.3), 4.2, 8, -2.0, 0.55, 0.7),
    ring(0.32, Slice::Prefix(0.6), 2.6, 2, 1.6, 0.78, 0.8),
    ring(0.32, Slice::Full, 5.1, -2, -0.8, 0.60, 0.6),
    ring(0.20, Slice::Suffix(0.5), 0.4, 4, 2.4, 0.85, 0.7),
    ring(0.20, Slice::Prefix(0.3), 3.8, 0, -3.0, 0.80, 0.55),
    ring(0.10, Slice::Full, 1.1, 6, 3.0, 0.90, 0.5),
    ring(0.10, Slice::Prefix(0.25), 2.9, 8, -2.5, 0.95, 0.4),
];

pub const LAYER_COUNT: usize = LAYERS.len();

/// Turns a read-only [`SimulationState`] into a frame.
#[derive(Debug, Clone)]
pub struct Compositor {
    detail: Detail,
    seed: u32,
}

impl Compositor {
    pub fn new(quality: Quality) -> Self {
        Self {
            detail: Detail::for_quality(quality),
            seed: 0x4B41_4C45,
        }
    }

    pub fn set_quality(&mut self, quality: Quality) {
        self.detail = Detail::for_quality(quality);
    }

    pub fn detail(&self) -> &Detail {
        &self.detail
    }

    /// Render a fresh `width` x `height` frame.
    pub fn render(&self, state: &SimulationState, width: usize, height: usize, wall_time: f32) -> Canvas {
        let mut canvas = Canvas::new(width, height);
        self.render_into(&mut canvas, state, wall_time);
        canvas
    }

    /// Draw a full frame onto `surface`. `wall_time` only drives cosmetic
    /// effects; all motion comes from `state`.
    pub fn render_into<S: Surface + ?Sized>(&self, surface: &mut S, state: &SimulationState, wall_time: f32) {
        let size = Vec2::new(surface.width() as f32, surface.height() as f32);
        if size.x < 1.0 || size.y < 1.0 {
            return;
        }
        let extent = size.x.max(size.y);
        let pan = state.smooth_touch_offset() * extent * 0.15;
        let stage = Stage {
            size,
            center: size * 0.5 + pan,
            extent,
            wall_time,
            seed: self.seed,
        };
        let detail = &self.detail;

        ambient::background(surface, state, &stage);
        ambient::starfield(surface, state, &stage, detail);
        ambient::motes(surface, state, &stage, detail);

        let energy_glow = 0.85 + 0.15 * state.kinetic_energy();
        for (i, ring) in LAYERS.iter().enumerate() {
            let layer = self.layer_params(state, ring, i, &stage, energy_glow);
            let subset = ring.slice.apply(state.seed_elements());
            draw_kaleidoscope_layer(surface, &layer, subset, detail);
        }

        ambient::diffraction_rings(surface, state, &stage);
        ambient::chromatic_fringes(surface, state, &stage);
        ambient::ripples(surface, state, &stage);
        ambient::ripple_echoes(surface, state, &stage);
        ambient::central_glow(surface, state, &stage);
        ambient::shake_effects(surface, state, &stage, detail);
        ambient::dust(surface, &stage, detail);
        ambient::sparkles(surface, state, &stage, detail);
    }

    fn layer_params(
        &self,
        state: &SimulationState,
        ring: &RingDef,
        index: usize,
        stage: &Stage,
        energy_glow: f32,
    ) -> KaleidoLayer {
        let folds = (state.symmetry_count() as i32 + ring.fold_delta).max(3) as u32;
        KaleidoLayer {
            center: stage.center,
            radius: stage.extent * ring.radius * 0.5,
            phase_offset: ring.phase,
            symmetry: folds,
            rotation: state.global_rotation() * ring.spin + ring.phase * 0.2,
            layer_phase: state.animation_phase() * (1.0 + index as f32 * 0.07),
            opacity: (ring.opacity * energy_glow).clamp(0.0, 1.0),
            element_extent: stage.extent * ring.element_scale * 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_table_is_back_to_front() {
        assert_eq!(LAYER_COUNT, 13);
        for pair in LAYERS.windows(2) {
            assert!(pair[0].radius >= pair[1].radius);
        }
        assert!(LAYERS.iter().all(|l| (-8..=8).contains(&l.fold_delta)));
        assert!(LAYERS.iter().all(|l| (0.3..=3.0).contains(&l.spin.abs())));
    }

    #[test]
    fn slices_pick_expected_ranges() {
        let mut rng = fastrand::Rng::with_seed(1);
        let colors = crate::palette::Palette::Dawn.colors();
        let els = crate::seed::generate_set(&mut rng, &colors, 10);
        assert_eq!(Slice::Full.apply(&els).len(), 10);
        assert_eq!(Slice::Prefix(0.3).apply(&els)[0], els[0]);
        assert_eq!(Slice::Prefix(0.3).apply(&els).len(), 3);
        let tail = Slice::Suffix(0.5).apply(&els);
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[4], els[9]);
        assert!(Slice::Prefix(0.5).apply(&[]).is_empty());
    }
}
