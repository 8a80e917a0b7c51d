//! CPU rasterizer for headless rendering.
//!
//! [`Frame`] is an RGBA8 pixel buffer implementing [`Canvas`]. Shapes are
//! sampled at pixel centers and composited source-over with straight alpha,
//! like a 2D canvas in sRGB space. Circle edges get one pixel of coverage
//! antialiasing; shadows are a Gaussian falloff outside the circle with
//! `sigma = blur / 2`.

use glam::{Vec2, Vec4};

use crate::surface::{Canvas, Paint, Rect, Shadow};
use crate::visuals::to_rgba8;

/// RGBA8 framebuffer, rows top to bottom.
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocate for a new size. Contents are cleared.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize, [0; 4]);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Raw bytes for upload, `width * height * 4` long.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Source-over blend of `color` at `coverage` onto one pixel.
    fn blend(&mut self, x: i64, y: i64, color: Vec4, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let alpha = (color.w * coverage).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let index = (y as u64 * self.width as u64 + x as u64) as usize;
        let [r, g, b, a] = self.pixels[index];
        let dst = Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0;

        let out_a = alpha + dst.w * (1.0 - alpha);
        let rgb = if out_a > 0.0 {
            (color.truncate() * alpha + dst.truncate() * dst.w * (1.0 - alpha)) / out_a
        } else {
            color.truncate()
        };
        self.pixels[index] = to_rgba8(rgb.extend(out_a));
    }

    /// Clipped integer pixel span covering `lo..hi` in one axis.
    fn span(lo: f32, hi: f32, limit: u32) -> (i64, i64) {
        let start = lo.floor().max(0.0) as i64;
        let end = (hi.ceil() as i64).min(limit as i64);
        (start, end)
    }
}

impl Canvas for Frame {
    fn clear(&mut self) {
        self.pixels.fill([0; 4]);
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        let (x0, x1) = Self::span(rect.x, rect.right(), self.width);
        let (y0, y1) = Self::span(rect.y, rect.bottom(), self.height);
        for y in y0..y1 {
            let cy = y as f32 + 0.5;
            if cy < rect.y || cy >= rect.bottom() {
                continue;
            }
            for x in x0..x1 {
                let cx = x as f32 + 0.5;
                if cx < rect.x || cx >= rect.right() {
                    continue;
                }
                let color = paint.color_at(Vec2::new(cx, cy));
                self.blend(x, y, color, 1.0);
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4, shadow: Option<Shadow>) {
        if !(radius > 0.0) {
            return;
        }

        if let Some(shadow) = shadow.filter(|s| s.blur > 0.0) {
            let sigma = shadow.blur / 2.0;
            let reach = radius + shadow.blur * 1.5;
            let (x0, x1) = Self::span(center.x - reach, center.x + reach, self.width);
            let (y0, y1) = Self::span(center.y - reach, center.y + reach, self.height);
            let shadow_color = shadow.color.truncate().extend(shadow.color.w * color.w);
            for y in y0..y1 {
                for x in x0..x1 {
                    let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(center) - radius;
                    if d <= 0.0 || d > reach - radius {
                        continue;
                    }
                    let falloff = (-(d * d) / (2.0 * sigma * sigma)).exp();
                    self.blend(x, y, shadow_color, falloff);
                }
            }
        }

        let (x0, x1) = Self::span(center.x - radius - 1.0, center.x + radius + 1.0, self.width);
        let (y0, y1) = Self::span(center.y - radius - 1.0, center.y + radius + 1.0, self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(center);
                let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Vec4) {
        if points.len() < 3 {
            return;
        }
        let (min_y, max_y) = points
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
        let (y0, y1) = Self::span(min_y, max_y, self.height);

        let mut crossings: Vec<f32> = Vec::with_capacity(points.len());
        for y in y0..y1 {
            let cy = y as f32 + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                // Half-open in y so shared vertices count once.
                if (a.y <= cy) != (b.y <= cy) {
                    let t = (cy - a.y) / (b.y - a.y);
                    crossings.push(a.x + t * (b.x - a.x));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for pair in crossings.chunks_exact(2) {
                let (x0, x1) = Self::span(pair[0] - 0.5, pair[1] - 0.5, self.width);
                for x in x0..x1 {
                    let cx = x as f32 + 0.5;
                    if cx >= pair[0] && cx < pair[1] {
                        self.blend(x, y, color, 1.0);
                    }
                }
            }
        }
    }
}
