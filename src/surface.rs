//! The drawing surface.
//!
//! [`Canvas`] is the immediate-mode drawing API the scene is rendered
//! through: rectangles filled with a solid color or a linear gradient,
//! circles with an optional soft shadow, and polygons. Two implementations
//! ship with the crate:
//!
//! | Canvas | Use |
//! |--------|-----|
//! | `SceneBatch` | Triangles and circle instances for the window runner's GPU pipelines |
//! | [`Frame`](crate::raster::Frame) | CPU rasterizer, for headless rendering and tests |
//! | [`RecordingCanvas`] | Records commands, for tests without a display |

use glam::{Vec2, Vec4};

/// Size of the drawing area in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
}

impl Surface {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whole-surface rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Surface {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width as f32, size.height as f32)
    }
}

/// Axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Linear gradient between two points with sorted color stops.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    stops: Vec<(f32, Vec4)>,
}

impl LinearGradient {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self {
            start,
            end,
            stops: Vec::new(),
        }
    }

    /// Top-to-bottom gradient over `height`.
    pub fn vertical(height: f32, top: Vec4, bottom: Vec4) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(0.0, height))
            .with_stop(0.0, top)
            .with_stop(1.0, bottom)
    }

    /// Add a color stop at `offset` in `0.0..=1.0`.
    pub fn with_stop(mut self, offset: f32, color: Vec4) -> Self {
        let offset = offset.clamp(0.0, 1.0);
        let index = self.stops.partition_point(|(o, _)| *o <= offset);
        self.stops.insert(index, (offset, color));
        self
    }

    pub fn stops(&self) -> &[(f32, Vec4)] {
        &self.stops
    }

    /// Color at gradient parameter `t`; clamps outside the stops.
    pub fn at(&self, t: f32) -> Vec4 {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Vec4::ZERO,
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.0 {
                let span = b.0 - a.0;
                if span <= f32::EPSILON {
                    return b.1;
                }
                return a.1.lerp(b.1, (t - a.0) / span);
            }
        }
        last.1
    }

    /// Color at a point, projected onto the start-end axis.
    pub fn sample(&self, point: Vec2) -> Vec4 {
        let axis = self.end - self.start;
        let len_sq = axis.length_squared();
        if len_sq <= f32::EPSILON {
            return self.at(0.0);
        }
        self.at((point - self.start).dot(axis) / len_sq)
    }
}

/// How a filled shape is colored.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Vec4),
    Linear(LinearGradient),
}

impl Paint {
    pub fn color_at(&self, point: Vec2) -> Vec4 {
        match self {
            Paint::Solid(color) => *color,
            Paint::Linear(gradient) => gradient.sample(point),
        }
    }
}

impl From<Vec4> for Paint {
    fn from(color: Vec4) -> Self {
        Paint::Solid(color)
    }
}

/// Soft glow drawn beneath a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Vec4,
    pub blur: f32,
}

/// Immediate-mode 2D drawing target.
pub trait Canvas {
    /// Reset every pixel to transparent.
    fn clear(&mut self);

    fn fill_rect(&mut self, rect: Rect, paint: &Paint);

    /// Filled circle. Radii at or below zero draw nothing.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4, shadow: Option<Shadow>);

    /// Filled polygon using the even-odd rule.
    fn fill_polygon(&mut self, points: &[Vec2], color: Vec4);
}

/// One recorded call on a [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Rect {
        rect: Rect,
        paint: Paint,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Vec4,
        shadow: Option<Shadow>,
    },
    Polygon {
        points: Vec<Vec2>,
        color: Vec4,
    },
}

/// Canvas that keeps every command instead of drawing it.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded circles as `(center, radius, color)`.
    pub fn circles(&self) -> impl Iterator<Item = (Vec2, f32, Vec4)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Circle {
                center,
                radius,
                color,
                ..
            } => Some((*center, *radius, *color)),
            _ => None,
        })
    }

    pub fn polygon_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Polygon { .. }))
            .count()
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        self.commands.push(DrawCommand::Rect {
            rect,
            paint: paint.clone(),
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4, shadow: Option<Shadow>) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            shadow,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Vec4) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }
}
