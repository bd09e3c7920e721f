//! Minimal 2D drawing surface.
//!
//! Every primitive takes its transform by value; there is no mutable
//! transform stack. Transforms are assumed to be similarity transforms
//! (rotation, uniform scale, mirror, translation), so radii and stroke widths
//! scale by the length of the transformed x axis.

use crate::color::Rgba;
use glam::{Affine2, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Rgba,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Rgba) -> Self {
        Self { offset, color }
    }
}

pub trait Surface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Cover the whole surface with a top-to-bottom gradient.
    fn fill_vertical_gradient(&mut self, top: Rgba, bottom: Rgba);
    fn fill_radial(&mut self, xf: Affine2, center: Vec2, radius: f32, stops: &[GradientStop]);
    fn fill_circle(&mut self, xf: Affine2, center: Vec2, radius: f32, color: Rgba);
    fn stroke_circle(&mut self, xf: Affine2, center: Vec2, radius: f32, width: f32, color: Rgba);
    /// Open polyline. Close it by repeating the first point.
    fn stroke_path(&mut self, xf: Affine2, points: &[Vec2], width: f32, color: Rgba);
    fn fill_polygon(&mut self, xf: Affine2, points: &[Vec2], color: Rgba);
}

/// Software raster target: opaque RGB in `f32`, source-over blending.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    px: Vec<[f32; 3]>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            px: vec![[0.0; 3]; width.saturating_mul(height)],
        }
    }

    pub fn clear(&mut self, color: Rgba) {
        self.px.fill([color.r, color.g, color.b]);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let [r, g, b] = self.px[y * self.width + x];
        Some(Rgba::rgb(r, g, b))
    }

    /// Row-major RGBA8, alpha always 255.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.px.len() * 4);
        for p in &self.px {
            out.extend_from_slice(&Rgba::rgb(p[0], p[1], p[2]).to_u8());
        }
        out
    }

    /// Write RGBA8 into an existing buffer (terminal path, no allocation).
    pub fn write_rgba8(&self, out: &mut [u8]) {
        for (dst, p) in out.chunks_exact_mut(4).zip(self.px.iter()) {
            dst.copy_from_slice(&Rgba::rgb(p[0], p[1], p[2]).to_u8());
        }
    }

    #[inline]
    fn blend(&mut self, x: usize, y: usize, c: Rgba, coverage: f32) {
        let a = (c.a * coverage).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let p = &mut self.px[y * self.width + x];
        p[0] += (c.r - p[0]) * a;
        p[1] += (c.g - p[1]) * a;
        p[2] += (c.b - p[2]) * a;
    }

    /// Pixel-index bounds covering `[min, max]`, clipped to the canvas.
    fn clip(&self, min: Vec2, max: Vec2) -> Option<(usize, usize, usize, usize)> {
        if !(min.is_finite() && max.is_finite()) || self.width == 0 || self.height == 0 {
            return None;
        }
        let x0 = min.x.floor().max(0.0);
        let y0 = min.y.floor().max(0.0);
        let x1 = max.x.ceil().min(self.width as f32);
        let y1 = max.y.ceil().min(self.height as f32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }
}

fn scale_of(xf: &Affine2) -> f32 {
    xf.matrix2.x_axis.length()
}

fn sample_stops(stops: &[GradientStop], t: f32) -> Rgba {
    let Some(first) = stops.first() else {
        return Rgba::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = (b.offset - a.offset).max(1e-6);
            return crate::color::lerp(a.color, b.color, (t - a.offset) / span);
        }
    }
    stops[stops.len() - 1].color
}

fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= 1e-12 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

impl Surface for Canvas {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn fill_vertical_gradient(&mut self, top: Rgba, bottom: Rgba) {
        let h = self.height.max(2) as f32 - 1.0;
        for y in 0..self.height {
            let c = crate::color::lerp(top, bottom, y as f32 / h);
            for x in 0..self.width {
                self.blend(x, y, c, 1.0);
            }
        }
    }

    fn fill_radial(&mut self, xf: Affine2, center: Vec2, radius: f32, stops: &[GradientStop]) {
        let r = radius * scale_of(&xf);
        if !(r > 0.0) || stops.is_empty() {
            return;
        }
        let c = xf.transform_point2(center);
        let Some((x0, y0, x1, y1)) = self.clip(c - Vec2::splat(r), c + Vec2::splat(r)) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(c);
                if d >= r {
                    continue;
                }
                let color = sample_stops(stops, d / r);
                self.blend(x, y, color, (r - d).min(1.0));
            }
        }
    }

    fn fill_circle(&mut self, xf: Affine2, center: Vec2, radius: f32, color: Rgba) {
        let r = radius * scale_of(&xf);
        if !(r > 0.0) {
            return;
        }
        let c = xf.transform_point2(center);
        let reach = Vec2::splat(r + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(c - reach, c + reach) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(c);
                let cov = (r - d + 0.5).clamp(0.0, 1.0);
                if cov > 0.0 {
                    self.blend(x, y, color, cov);
                }
            }
        }
    }

    fn stroke_circle(&mut self, xf: Affine2, center: Vec2, radius: f32, width: f32, color: Rgba) {
        let s = scale_of(&xf);
        let r = radius * s;
        let hw = (width * s * 0.5).max(0.35);
        if !(r > 0.0) {
            return;
        }
        let c = xf.transform_point2(center);
        let reach = Vec2::splat(r + hw + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(c - reach, c + reach) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(c);
                let cov = (hw - (d - r).abs() + 0.5).clamp(0.0, 1.0);
                if cov > 0.0 {
                    self.blend(x, y, color, cov);
                }
            }
        }
    }

    fn stroke_path(&mut self, xf: Affine2, points: &[Vec2], width: f32, color: Rgba) {
        if points.len() < 2 {
            return;
        }
        let hw = (width * scale_of(&xf) * 0.5).max(0.35);
        let pts: Vec<Vec2> = points.iter().map(|p| xf.transform_point2(*p)).collect();
        let (mut lo, mut hi) = (pts[0], pts[0]);
        for p in &pts {
            lo = lo.min(*p);
            hi = hi.max(*p);
        }
        let reach = Vec2::splat(hw + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(lo - reach, hi + reach) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = pts
                    .windows(2)
                    .map(|s| segment_distance(p, s[0], s[1]))
                    .fold(f32::INFINITY, f32::min);
                let cov = (hw - d + 0.5).clamp(0.0, 1.0);
                if cov > 0.0 {
                    self.blend(x, y, color, cov);
                }
            }
        }
    }

    fn fill_polygon(&mut self, xf: Affine2, points: &[Vec2], color: Rgba) {
        if points.len() < 3 {
            return;
        }
        let pts: Vec<Vec2> = points.iter().map(|p| xf.transform_point2(*p)).collect();
        let (mut lo, mut hi) = (pts[0], pts[0]);
        for p in &pts {
            lo = lo.min(*p);
            hi = hi.max(*p);
        }
        let Some((x0, y0, x1, y1)) = self.clip(lo - Vec2::ONE, hi + Vec2::ONE) else {
            return;
        };
        let n = pts.len();
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let mut inside = false;
                let mut edge = f32::INFINITY;
                for i in 0..n {
                    let a = pts[i];
                    let b = pts[(i + 1) % n];
                    if (a.y > p.y) != (b.y > p.y) {
                        let cross_x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                        if p.x < cross_x {
                            inside = !inside;
                        }
                    }
                    edge = edge.min(segment_distance(p, a, b));
                }
                let cov = if inside {
                    (edge + 0.5).clamp(0.0, 1.0)
                } else {
                    (0.5 - edge).clamp(0.0, 1.0)
                };
                if cov > 0.0 {
                    self.blend(x, y, color, cov);
                }
            }
        }
    }
}
