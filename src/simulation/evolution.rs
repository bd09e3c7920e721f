use super::SimulationState;
use crate::easing::ease_in_out_cubic;
use crate::seed;
use log::debug;

pub const MIN_ELEMENTS: usize = 40;
pub const MAX_ELEMENTS: usize = 60;
/// Seconds of "awake" time between scheduled evolutions.
pub const EVOLUTION_INTERVAL_RANGE: (f32, f32) = (10.0, 16.0);

const EVOLVED_MIN_SYMMETRY: i32 = 5;
const EVOLVED_MAX_SYMMETRY: i32 = 12;
const SHRINK_PER_STEP: f32 = 0.02;
const BLEND_PER_STEP: f32 = 0.05;

impl SimulationState {
    /// Steady -> Transitioning. Returns `false` if a cycle is already running.
    pub fn start_evolution(&mut self) -> bool {
        if self.is_transitioning {
            return false;
        }

        self.is_transitioning = true;
        self.transition_progress = 0.0;
        self.time_since_last_evolution = 0.0;
        let (lo, hi) = EVOLUTION_INTERVAL_RANGE;
        self.evolution_interval = lo + self.rng.f32() * (hi - lo);

        let count = self.rng.usize(MIN_ELEMENTS..=MAX_ELEMENTS);
        self.pending_elements =
            seed::generate_set(&mut self.rng, &self.current_palette_colors, count);
        if self.color_transition_progress < 1.0 {
            self.recolor_elements();
        }

        if self.rng.bool() && self.rng.bool() {
            let delta = self.rng.i32(-1..=1);
            self.symmetry_count = (self.symmetry_count as i32 + delta)
                .clamp(EVOLVED_MIN_SYMMETRY, EVOLVED_MAX_SYMMETRY)
                as u32;
        }

        debug!(
            "evolution started: {} pending elements, folds={}, next interval {:.1}s",
            count, self.symmetry_count, self.evolution_interval
        );
        true
    }

    /// One blending step toward the pending set.
    pub(super) fn update_transition(&mut self) {
        let t = ease_in_out_cubic(self.transition_progress);
        let shrink = 1.0 - t * SHRINK_PER_STEP;
        let blend = BLEND_PER_STEP * t;

        for e in &mut self.seed_elements {
            e.size = (e.size * shrink).max(0.0);
        }
        // Only the overlapping prefix has a partner to blend toward.
        for (e, p) in self
            .seed_elements
            .iter_mut()
            .zip(self.pending_elements.iter())
        {
            e.position += (p.position - e.position) * blend;
        }
    }

    /// Transitioning -> Steady: adopt the pending set wholesale.
    pub(super) fn complete_evolution(&mut self) {
        let pending = std::mem::take(&mut self.pending_elements);
        let overlap = self.seed_elements.len().min(pending.len());
        self.seed_elements[..overlap].copy_from_slice(&pending[..overlap]);
        if pending.len() > overlap {
            self.seed_elements.extend_from_slice(&pending[overlap..]);
        } else {
            self.seed_elements.truncate(pending.len());
        }

        self.is_transitioning = false;
        self.transition_progress = 0.0;
        self.recolor_elements();
        debug!("evolution complete: {} elements", self.seed_elements.len());
    }
}

#[cfg(test)]
mod tests {
    use crate::palette::Palette;
    use crate::simulation::SimulationState;

    #[test]
    fn start_is_guarded_while_transitioning() {
        let mut s = SimulationState::with_seed(Palette::Dawn, 8, 5);
        assert!(s.start_evolution());
        let pending = s.pending_elements().to_vec();
        assert!(!s.start_evolution());
        assert_eq!(s.pending_elements(), pending.as_slice());
    }

    #[test]
    fn evolved_symmetry_stays_in_internal_range() {
        for seed in 0..64 {
            let mut s = SimulationState::with_seed(Palette::Dawn, 12, seed);
            s.start_evolution();
            assert!((5..=12).contains(&s.symmetry_count()));
        }
    }

    #[test]
    fn transition_step_shrinks_and_blends_prefix() {
        let mut s = SimulationState::with_seed(Palette::Forest, 6, 9);
        s.start_evolution();
        s.transition_progress = 0.6;
        let before = s.seed_elements().to_vec();
        s.update_transition();
        for (i, (b, a)) in before.iter().zip(s.seed_elements()).enumerate() {
            assert!(a.size < b.size);
            if let Some(p) = s.pending_elements().get(i) {
                let d_before = (p.position - b.position).length();
                let d_after = (p.position - a.position).length();
                assert!(d_after <= d_before + 1e-6);
            } else {
                assert_eq!(a.position, b.position);
            }
        }
    }

    #[test]
    fn completion_adopts_pending_length() {
        let mut s = SimulationState::with_seed(Palette::Nebula, 7, 13);
        s.start_evolution();
        let pending = s.pending_elements().to_vec();
        s.complete_evolution();
        assert!(!s.is_transitioning());
        assert!(s.pending_elements().is_empty());
        assert_eq!(s.seed_elements().len(), pending.len());
        for (a, p) in s.seed_elements().iter().zip(pending.iter()) {
            assert_eq!(a.position, p.position);
            assert_eq!(a.color_index, p.color_index);
        }
    }
}
