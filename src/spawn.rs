//! Periodic spawning of falling stars.
//!
//! A star drops whenever the frame counter is a multiple of the current
//! spawn interval; each spawn redraws the interval from the configured
//! range, so stars arrive at irregular gaps.

use glam::Vec2;
use rand::Rng;

use crate::body::Particle;
use crate::config::SceneConfig;
use crate::surface::Surface;

/// Spawn schedule and star factory.
#[derive(Debug, Clone, PartialEq)]
pub struct Spawner {
    interval: u32,
}

impl Spawner {
    /// Schedule starting at the config's first interval.
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            interval: config.first_spawn_interval,
        }
    }

    /// Current gap between spawns, in frames.
    #[inline]
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Whether a star drops on this frame.
    #[inline]
    pub fn is_due(&self, frame: u64) -> bool {
        self.interval != 0 && frame % u64::from(self.interval) == 0
    }

    /// Build a new star above the surface and redraw the interval.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        surface: Surface,
        config: &SceneConfig,
        rng: &mut R,
    ) -> Particle {
        let particle = new_star(surface, config, rng);
        self.interval = rng.gen_range(config.spawn_interval.clone());
        particle
    }
}

/// A falling star at a random horizontal position above the top edge.
///
/// The horizontal position is clamped so the left edge stays on-surface.
/// Horizontal speed is drawn from `-4.0..-3.0`, which drifts every star
/// gently to the left.
pub fn new_star<R: Rng + ?Sized>(surface: Surface, config: &SceneConfig, rng: &mut R) -> Particle {
    let radius = config.star_radius;
    let x = (rng.gen::<f32>() * surface.width - radius).max(radius);
    let vx = rng.gen::<f32>() - 0.5 * 8.0;
    Particle::new(
        Vec2::new(x, config.star_spawn_y),
        Vec2::new(vx, config.star_fall_speed),
        radius,
        config.palette.star,
    )
    .with_physics(config.star_gravity, config.star_friction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_first_interval() {
        let spawner = Spawner::new(&SceneConfig::default());
        assert_eq!(spawner.interval(), 75);
        assert!(!spawner.is_due(74));
        assert!(spawner.is_due(75));
        assert!(spawner.is_due(150));
    }

    #[test]
    fn test_reroll_within_range() {
        let config = SceneConfig::default();
        let mut spawner = Spawner::new(&config);
        let mut rng = SmallRng::seed_from_u64(3);
        let surface = Surface::new(800.0, 600.0);
        for _ in 0..200 {
            spawner.spawn(surface, &config, &mut rng);
            assert!((150..=300).contains(&spawner.interval()));
        }
    }

    #[test]
    fn test_new_star_placement() {
        let config = SceneConfig::default();
        let mut rng = SmallRng::seed_from_u64(9);
        let surface = Surface::new(800.0, 600.0);
        for _ in 0..200 {
            let star = new_star(surface, &config, &mut rng);
            assert!(star.position.x >= 12.0);
            assert!(star.position.x < 800.0);
            assert_eq!(star.position.y, -100.0);
            assert!(star.velocity.x >= -4.0 && star.velocity.x <= -3.0);
            assert_eq!(star.velocity.y, 3.0);
            assert_eq!(star.radius, 12.0);
            assert_eq!(star.gravity, 0.7);
            assert_eq!(star.friction, 0.7);
        }
    }

    #[test]
    fn test_narrow_surface_clamps_to_radius() {
        let config = SceneConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let star = new_star(Surface::new(5.0, 100.0), &config, &mut rng);
        assert_eq!(star.position.x, 12.0);
    }
}
