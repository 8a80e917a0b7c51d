//! Canvas that collects the scene into GPU buffers.
//!
//! Rectangles and polygons become colored triangles; circles become one
//! instance each, expanded to a quad and shaded (edge antialiasing, glow,
//! translucency) in the fragment shader. Calls are grouped into [`DrawRun`]s
//! so painter's order survives switching between the two pipelines.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};

use crate::surface::{Canvas, LinearGradient, Paint, Rect, Shadow};

/// Triangle vertex in pixel coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShapeVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl ShapeVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x2, // position
        },
        wgpu::VertexAttribute {
            offset: 8,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x4, // color
        },
    ];

    fn new(position: Vec2, color: Vec4) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// One circle, drawn as an instanced quad.
///
/// `glow.w` already carries the circle's own alpha; `blur == 0` means no glow.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CircleInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub blur: f32,
    pub color: [f32; 4],
    pub glow: [f32; 4],
}

impl CircleInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = [
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x2, // center
        },
        wgpu::VertexAttribute {
            offset: 8,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32, // radius
        },
        wgpu::VertexAttribute {
            offset: 12,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32, // blur
        },
        wgpu::VertexAttribute {
            offset: 16,
            shader_location: 3,
            format: wgpu::VertexFormat::Float32x4, // color
        },
        wgpu::VertexAttribute {
            offset: 32,
            shader_location: 4,
            format: wgpu::VertexFormat::Float32x4, // glow
        },
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// A contiguous slice of one buffer, drawn with one pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawRun {
    /// Vertex range into [`SceneBatch::vertices`].
    Shapes(Range<u32>),
    /// Instance range into [`SceneBatch::circles`].
    Circles(Range<u32>),
}

/// Scene geometry for one frame.
#[derive(Debug, Default)]
pub struct SceneBatch {
    vertices: Vec<ShapeVertex>,
    circles: Vec<CircleInstance>,
    runs: Vec<DrawRun>,
}

impl SceneBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[ShapeVertex] {
        &self.vertices
    }

    pub fn circles(&self) -> &[CircleInstance] {
        &self.circles
    }

    /// Draw runs in painter's order.
    pub fn runs(&self) -> &[DrawRun] {
        &self.runs
    }

    fn push_triangle(&mut self, corners: [Vec2; 3], colors: [Vec4; 3]) {
        let start = self.vertices.len() as u32;
        self.vertices
            .extend(corners.iter().zip(colors).map(|(p, c)| ShapeVertex::new(*p, c)));
        let end = self.vertices.len() as u32;

        match self.runs.last_mut() {
            Some(DrawRun::Shapes(range)) if range.end == start => range.end = end,
            _ => self.runs.push(DrawRun::Shapes(start..end)),
        }
    }

    /// Quad with per-corner colors: top-left, top-right, bottom-right, bottom-left.
    fn push_quad(&mut self, rect: Rect, colors: [Vec4; 4]) {
        let tl = Vec2::new(rect.x, rect.y);
        let tr = Vec2::new(rect.right(), rect.y);
        let br = Vec2::new(rect.right(), rect.bottom());
        let bl = Vec2::new(rect.x, rect.bottom());
        let [c_tl, c_tr, c_br, c_bl] = colors;
        self.push_triangle([tl, tr, br], [c_tl, c_tr, c_br]);
        self.push_triangle([tl, br, bl], [c_tl, c_br, c_bl]);
    }

    /// Gradient fill as bands split at every stop, so per-vertex
    /// interpolation matches the piecewise-linear gradient exactly.
    fn push_gradient_rect(&mut self, rect: Rect, gradient: &LinearGradient) {
        let axis = gradient.end - gradient.start;

        if axis.x == 0.0 && axis.y != 0.0 {
            let edges = band_edges(rect.y, rect.bottom(), gradient.start.y, axis.y, gradient);
            for pair in edges.windows(2) {
                let band = Rect::new(rect.x, pair[0], rect.width, pair[1] - pair[0]);
                let top = gradient.sample(Vec2::new(rect.x, pair[0]));
                let bottom = gradient.sample(Vec2::new(rect.x, pair[1]));
                self.push_quad(band, [top, top, bottom, bottom]);
            }
        } else if axis.y == 0.0 && axis.x != 0.0 {
            let edges = band_edges(rect.x, rect.right(), gradient.start.x, axis.x, gradient);
            for pair in edges.windows(2) {
                let band = Rect::new(pair[0], rect.y, pair[1] - pair[0], rect.height);
                let left = gradient.sample(Vec2::new(pair[0], rect.y));
                let right = gradient.sample(Vec2::new(pair[1], rect.y));
                self.push_quad(band, [left, right, right, left]);
            }
        } else {
            // Exact only between two stops.
            let corner = |x: f32, y: f32| gradient.sample(Vec2::new(x, y));
            self.push_quad(
                rect,
                [
                    corner(rect.x, rect.y),
                    corner(rect.right(), rect.y),
                    corner(rect.right(), rect.bottom()),
                    corner(rect.x, rect.bottom()),
                ],
            );
        }
    }
}

/// Sorted band boundaries over `lo..hi`, cut at every stop inside it.
fn band_edges(lo: f32, hi: f32, origin: f32, extent: f32, gradient: &LinearGradient) -> Vec<f32> {
    let mut edges = vec![lo, hi];
    edges.extend(
        gradient
            .stops()
            .iter()
            .map(|(offset, _)| origin + offset * extent)
            .filter(|edge| *edge > lo && *edge < hi),
    );
    edges.sort_by(|a, b| a.total_cmp(b));
    edges.dedup();
    edges
}

/// Ear-clipping triangulation of a simple polygon, as vertex indices.
///
/// Collinear vertices are dropped. An outline with no ear left (one that
/// crosses itself) has its remainder fanned from the first vertex.
fn triangulate(points: &[Vec2]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    let area: f32 = (0..n).map(|i| points[i].perp_dot(points[(i + 1) % n])).sum();
    if area == 0.0 {
        return Vec::new();
    }
    let winding = area.signum();

    let mut ring: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while ring.len() > 3 {
        let len = ring.len();
        let ear = (0..len).find_map(|i| {
            let (a, b, c) = (ring[(i + len - 1) % len], ring[i], ring[(i + 1) % len]);
            let turn = (points[b] - points[a]).perp_dot(points[c] - points[b]) * winding;
            if turn == 0.0 {
                return Some((i, None));
            }
            if turn < 0.0 {
                return None;
            }
            let corners = [points[a], points[b], points[c]];
            let blocked = ring
                .iter()
                .map(|&j| points[j])
                .any(|p| !corners.contains(&p) && covers(corners, p, winding));
            (!blocked).then_some((i, Some([a, b, c])))
        });

        match ear {
            Some((i, triangle)) => {
                triangles.extend(triangle);
                ring.remove(i);
            }
            None => break,
        }
    }

    for k in 1..ring.len().saturating_sub(1) {
        triangles.push([ring[0], ring[k], ring[k + 1]]);
    }
    triangles
}

/// Whether `p` lies inside or on the edge of a triangle.
///
/// Vertices touching an ear's edge block it; clipping such an ear would
/// pinch the remaining outline.
fn covers([a, b, c]: [Vec2; 3], p: Vec2, winding: f32) -> bool {
    let side = |u: Vec2, v: Vec2| (v - u).perp_dot(p - u) * winding;
    side(a, b) >= 0.0 && side(b, c) >= 0.0 && side(c, a) >= 0.0
}

impl Canvas for SceneBatch {
    fn clear(&mut self) {
        self.vertices.clear();
        self.circles.clear();
        self.runs.clear();
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        if !(rect.width > 0.0 && rect.height > 0.0) {
            return;
        }
        match paint {
            Paint::Solid(color) => self.push_quad(rect, [*color; 4]),
            Paint::Linear(gradient) => self.push_gradient_rect(rect, gradient),
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4, shadow: Option<Shadow>) {
        if !(radius > 0.0) {
            return;
        }
        let (glow, blur) = match shadow.filter(|s| s.blur > 0.0) {
            Some(s) => (s.color.truncate().extend(s.color.w * color.w), s.blur),
            None => (Vec4::ZERO, 0.0),
        };

        let index = self.circles.len() as u32;
        self.circles.push(CircleInstance {
            center: center.to_array(),
            radius,
            blur,
            color: color.to_array(),
            glow: glow.to_array(),
        });

        match self.runs.last_mut() {
            Some(DrawRun::Circles(range)) if range.end == index => range.end = index + 1,
            _ => self.runs.push(DrawRun::Circles(index..index + 1)),
        }
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Vec4) {
        for [a, b, c] in triangulate(points) {
            self.push_triangle([points[a], points[b], points[c]], [color; 3]);
        }
    }
}
