//! Static backdrop: sky gradient, starfield, mountains and the ground band.

use glam::{Vec2, Vec4};
use rand::Rng;

use crate::config::SceneConfig;
use crate::surface::{Canvas, LinearGradient, Paint, Rect, Shadow, Surface};

/// A fixed star in the sky. Never updated after seeding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundStar {
    pub position: Vec2,
    pub radius: f32,
    pub color: Vec4,
}

/// One row of overlapping mountain peaks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountainLayer {
    /// Number of peaks across the surface width.
    pub amount: u32,
    /// Distance from the top of the surface down to the peaks.
    pub peak_inset: f32,
    pub color: Vec4,
}

impl MountainLayer {
    pub fn new(amount: u32, peak_inset: f32, color: Vec4) -> Self {
        Self {
            amount,
            peak_inset,
            color,
        }
    }

    /// Peak height above the bottom of a surface of the given height.
    pub fn height(&self, surface_height: f32) -> f32 {
        surface_height - self.peak_inset
    }
}

/// Scatter `count` stars uniformly over the surface.
pub fn seed_stars<R: Rng + ?Sized>(
    count: usize,
    surface: Surface,
    max_radius: f32,
    color: Vec4,
    rng: &mut R,
) -> Vec<BackgroundStar> {
    (0..count)
        .map(|_| BackgroundStar {
            position: Vec2::new(
                rng.gen::<f32>() * surface.width,
                rng.gen::<f32>() * surface.height,
            ),
            radius: rng.gen::<f32>() * max_radius,
            color,
        })
        .collect()
}

/// Outlines of one mountain layer.
///
/// Segment `i` of width `w = surface.width / amount` is a triangle whose base
/// runs from `i*w - overlap` to `i*w + w + overlap` along the bottom edge and
/// whose apex sits at the segment center, `height` above the bottom. The
/// outline keeps the segment's own bottom-left corner as a fourth, collinear
/// point.
pub fn mountain_polygons(
    amount: u32,
    height: f32,
    overlap: f32,
    surface: Surface,
) -> Vec<[Vec2; 4]> {
    if amount == 0 {
        return Vec::new();
    }
    let width = surface.width / amount as f32;
    let bottom = surface.height;
    (0..amount)
        .map(|i| {
            let left = i as f32 * width;
            [
                Vec2::new(left, bottom),
                Vec2::new(left + width + overlap, bottom),
                Vec2::new(left + width / 2.0, bottom - height),
                Vec2::new(left - overlap, bottom),
            ]
        })
        .collect()
}

/// Sky gradient for a surface.
pub fn sky_gradient(surface: Surface, config: &SceneConfig) -> LinearGradient {
    LinearGradient::vertical(surface.height, config.palette.sky_top, config.palette.sky_bottom)
}

/// Draw the full backdrop in painter's order.
pub fn draw_background(
    canvas: &mut dyn Canvas,
    surface: Surface,
    sky: &LinearGradient,
    stars: &[BackgroundStar],
    config: &SceneConfig,
) {
    canvas.fill_rect(surface.rect(), &Paint::Linear(sky.clone()));

    let glow = Shadow {
        color: config.palette.glow,
        blur: config.glow_blur,
    };
    for star in stars {
        canvas.fill_circle(star.position, star.radius, star.color, Some(glow));
    }

    for layer in &config.mountains {
        let height = layer.height(surface.height);
        for outline in mountain_polygons(layer.amount, height, config.mountain_overlap, surface) {
            canvas.fill_polygon(&outline, layer.color);
        }
    }

    canvas.fill_rect(
        Rect::new(
            0.0,
            surface.height - config.ground_height,
            surface.width,
            config.ground_height,
        ),
        &Paint::Solid(config.palette.ground),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingCanvas};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_seed_stars_within_surface() {
        let mut rng = SmallRng::seed_from_u64(42);
        let surface = Surface::new(640.0, 480.0);
        let stars = seed_stars(150, surface, 3.0, Vec4::ONE, &mut rng);

        assert_eq!(stars.len(), 150);
        for star in &stars {
            assert!(star.position.x >= 0.0 && star.position.x < 640.0);
            assert!(star.position.y >= 0.0 && star.position.y < 480.0);
            assert!(star.radius >= 0.0 && star.radius < 3.0);
        }
    }

    #[test]
    fn test_single_mountain_geometry() {
        let surface = Surface::new(1000.0, 800.0);
        let polys = mountain_polygons(1, 650.0, 625.0, surface);

        assert_eq!(polys.len(), 1);
        assert_eq!(
            polys[0],
            [
                Vec2::new(0.0, 800.0),
                Vec2::new(1625.0, 800.0),
                Vec2::new(500.0, 150.0),
                Vec2::new(-625.0, 800.0),
            ]
        );
    }

    #[test]
    fn test_mountain_segments_tile_width() {
        let surface = Surface::new(900.0, 600.0);
        let polys = mountain_polygons(3, 100.0, 625.0, surface);

        assert_eq!(polys.len(), 3);
        let apexes: Vec<f32> = polys.iter().map(|p| p[2].x).collect();
        assert_eq!(apexes, vec![150.0, 450.0, 750.0]);
        assert!(polys.iter().all(|p| p[2].y == 500.0));
    }

    #[test]
    fn test_zero_mountains() {
        assert!(mountain_polygons(0, 10.0, 625.0, Surface::new(10.0, 10.0)).is_empty());
    }

    #[test]
    fn test_draw_order() {
        let config = SceneConfig::default();
        let surface = Surface::new(800.0, 600.0);
        let mut rng = SmallRng::seed_from_u64(1);
        let stars = seed_stars(5, surface, 3.0, Vec4::ONE, &mut rng);
        let mut canvas = RecordingCanvas::new();

        draw_background(&mut canvas, surface, &sky_gradient(surface, &config), &stars, &config);

        // sky + 5 stars + (1 + 2 + 3) peaks + ground
        assert_eq!(canvas.commands.len(), 1 + 5 + 6 + 1);
        assert!(matches!(
            canvas.commands[0],
            DrawCommand::Rect {
                paint: Paint::Linear(_),
                ..
            }
        ));
        assert_eq!(canvas.polygon_count(), 6);
        match canvas.commands.last() {
            Some(DrawCommand::Rect { rect, paint }) => {
                assert_eq!(*rect, Rect::new(0.0, 500.0, 800.0, 100.0));
                assert_eq!(*paint, Paint::Solid(config.palette.ground));
            }
            other => panic!("expected ground band last, got {:?}", other),
        }
    }
}
