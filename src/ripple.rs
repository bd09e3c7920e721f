use crate::color::Rgba;
use glam::Vec2;
use ringbuf::traits::{Consumer as _, Observer as _, RingBuffer as _};
use ringbuf::HeapRb;

pub const MAX_RIPPLES: usize = 6;
/// Ripples older than this (in animation-phase units) are pruned.
pub const RIPPLE_MAX_AGE: f32 = 5.0;

/// Visual echo of one tap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapRipple {
    /// Canvas space (pixels of the canvas the tap landed on).
    pub position: Vec2,
    pub normalized_position: Vec2,
    /// Animation phase at creation.
    pub start_time: f32,
    pub color: Rgba,
    pub intensity: f32,
}

impl TapRipple {
    pub fn age(&self, phase: f32) -> f32 {
        (phase - self.start_time).max(0.0)
    }
}

/// Fixed-capacity ripple list; pushing past capacity drops the oldest.
pub struct RippleBuffer {
    rb: HeapRb<TapRipple>,
}

impl RippleBuffer {
    pub fn new() -> Self {
        Self {
            rb: HeapRb::new(MAX_RIPPLES),
        }
    }

    pub fn push(&mut self, ripple: TapRipple) {
        let _ = self.rb.push_overwrite(ripple);
    }

    /// Drop ripples (oldest first) whose age exceeds `max_age`.
    pub fn prune(&mut self, phase: f32, max_age: f32) {
        while let Some(front) = self.rb.try_peek() {
            if front.age(phase) <= max_age {
                break;
            }
            let _ = self.rb.try_pop();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TapRipple> {
        self.rb.iter()
    }

    pub fn len(&self) -> usize {
        self.rb.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.rb.is_empty()
    }
}

impl Default for RippleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RippleBuffer {
    fn clone(&self) -> Self {
        let mut out = Self::new();
        for r in self.iter() {
            out.push(*r);
        }
        out
    }
}

impl std::fmt::Debug for RippleBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ripple(start_time: f32) -> TapRipple {
        TapRipple {
            position: Vec2::ZERO,
            normalized_position: Vec2::splat(0.5),
            start_time,
            color: Rgba::WHITE,
            intensity: 1.0,
        }
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut buf = RippleBuffer::new();
        for i in 0..9 {
            buf.push(ripple(i as f32));
        }
        assert_eq!(buf.len(), MAX_RIPPLES);
        let starts: Vec<f32> = buf.iter().map(|r| r.start_time).collect();
        assert_eq!(starts, vec![3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn prune_removes_only_expired() {
        let mut buf = RippleBuffer::new();
        buf.push(ripple(0.0));
        buf.push(ripple(2.0));
        buf.push(ripple(4.0));
        buf.prune(6.5, RIPPLE_MAX_AGE);
        assert_eq!(buf.len(), 2);
        buf.prune(9.5, RIPPLE_MAX_AGE);
        assert!(buf.is_empty());
    }

    #[test]
    fn clone_preserves_order() {
        let mut buf = RippleBuffer::new();
        buf.push(ripple(1.0));
        buf.push(ripple(2.0));
        let copy = buf.clone();
        assert_eq!(
            copy.iter().map(|r| r.start_time).collect::<Vec<_>>(),
            vec![1.0, 2.0]
        );
    }
}
