//! Simulation context and per-frame tick.
//!
//! [`Simulation`] owns every piece of mutable state: the surface size, the
//! falling stars, their fragments, the background starfield, the frame
//! counter and the spawn schedule. Nothing is global, so independent
//! instances can run side by side and tests can drive one without a display.
//!
//! ```ignore
//! let mut sim = Simulation::new(SceneConfig::default(), Surface::new(1280.0, 720.0))?;
//! let mut frame = Frame::new(1280, 720);
//! loop {
//!     sim.tick();
//!     sim.render(&mut frame);
//! }
//! ```

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::background::{draw_background, seed_stars, sky_gradient, BackgroundStar};
use crate::body::{Body, Bounds, Fragment, Particle};
use crate::config::{ConfigError, SceneConfig};
use crate::spawn::Spawner;
use crate::surface::{Canvas, LinearGradient, Shadow, Surface};

/// Shooting-star simulation.
pub struct Simulation {
    config: SceneConfig,
    surface: Surface,
    sky: LinearGradient,
    background_stars: Vec<BackgroundStar>,
    particles: Vec<Particle>,
    fragments: Vec<Fragment>,
    frame: u64,
    spawner: Spawner,
    rng: SmallRng,
}

impl Simulation {
    /// Create a simulation seeded from OS entropy.
    pub fn new(config: SceneConfig, surface: Surface) -> Result<Self, ConfigError> {
        Self::build(config, surface, SmallRng::from_entropy())
    }

    /// Create a reproducible simulation.
    pub fn with_seed(
        config: SceneConfig,
        surface: Surface,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::build(config, surface, SmallRng::seed_from_u64(seed))
    }

    fn build(config: SceneConfig, surface: Surface, rng: SmallRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut sim = Self {
            sky: sky_gradient(surface, &config),
            spawner: Spawner::new(&config),
            config,
            surface,
            background_stars: Vec::new(),
            particles: Vec::new(),
            fragments: Vec::new(),
            frame: 0,
            rng,
        };
        sim.reset();
        Ok(sim)
    }

    /// Drop all entities, restart the spawn schedule and reseed the starfield.
    fn reset(&mut self) {
        self.particles.clear();
        self.fragments.clear();
        self.frame = 0;
        self.spawner = Spawner::new(&self.config);
        self.sky = sky_gradient(self.surface, &self.config);
        self.background_stars = seed_stars(
            self.config.background_star_count,
            self.surface,
            self.config.background_star_max_radius,
            self.config.palette.star,
            &mut self.rng,
        );
    }

    /// Adopt a new surface size. In-flight stars and fragments are lost.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.surface = Surface::new(width, height);
        self.reset();
        log::info!("Surface resized to {}x{}, simulation reset", width, height);
    }

    fn bounds(&self) -> Bounds {
        Bounds::new(
            self.surface.width,
            self.surface.height - self.config.ground_height,
        )
    }

    /// Advance one step.
    ///
    /// Stars move first and may shatter; fragments released this tick are
    /// then updated along with the rest. Expired bodies leave their
    /// collection in the same tick.
    pub fn tick(&mut self) {
        let bounds = self.bounds();
        let burst = self.config.burst();

        for particle in &mut self.particles {
            particle.update(bounds, &burst, &mut self.rng, &mut self.fragments);
        }
        self.particles.retain(|p| !p.is_expired());

        for fragment in &mut self.fragments {
            fragment.update(bounds);
        }
        self.fragments.retain(|f| !f.is_expired());

        self.frame += 1;

        if self.spawner.is_due(self.frame) {
            let star = self.spawner.spawn(self.surface, &self.config, &mut self.rng);
            log::debug!(
                "Frame {}: star spawned at x={:.1}, next in {} frames",
                self.frame,
                star.position.x,
                self.spawner.interval()
            );
            self.particles.push(star);
        }
    }

    /// Draw the backdrop, then stars, then fragments.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        canvas.clear();
        draw_background(
            canvas,
            self.surface,
            &self.sky,
            &self.background_stars,
            &self.config,
        );

        let glow = Some(Shadow {
            color: self.config.palette.glow,
            blur: self.config.glow_blur,
        });
        for particle in &self.particles {
            particle.draw(canvas, glow);
        }
        for fragment in &self.fragments {
            fragment.draw(canvas, glow);
        }
    }

    /// Insert a star directly, bypassing the spawn schedule.
    pub fn push_particle(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn background_stars(&self) -> &[BackgroundStar] {
        &self.background_stars
    }

    /// Ticks since creation or the last resize.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Frames between the current and the next spawn.
    pub fn spawn_interval(&self) -> u32 {
        self.spawner.interval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingCanvas};
    use glam::{Vec2, Vec4};

    fn sim() -> Simulation {
        Simulation::with_seed(SceneConfig::default(), Surface::new(800.0, 600.0), 7).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let sim = sim();
        assert!(sim.particles().is_empty());
        assert!(sim.fragments().is_empty());
        assert_eq!(sim.background_stars().len(), 150);
        assert_eq!(sim.frame(), 0);
        assert_eq!(sim.spawn_interval(), 75);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SceneConfig::default().with_ground_height(-1.0);
        assert!(Simulation::new(config, Surface::new(10.0, 10.0)).is_err());
    }

    #[test]
    fn test_first_spawn_on_frame_75() {
        let mut sim = sim();
        for _ in 0..74 {
            sim.tick();
        }
        assert!(sim.particles().is_empty());
        sim.tick();
        assert_eq!(sim.frame(), 75);
        assert_eq!(sim.particles().len(), 1);
        assert!((150..=300).contains(&sim.spawn_interval()));
    }

    #[test]
    fn test_render_order() {
        let mut sim = sim();
        sim.push_particle(Particle::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 12.0, Vec4::ONE));
        let mut canvas = RecordingCanvas::new();
        sim.render(&mut canvas);

        assert_eq!(canvas.commands[0], DrawCommand::Clear);
        let last = canvas.commands.last().unwrap();
        assert!(matches!(last, DrawCommand::Circle { radius, .. } if *radius == 12.0));
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = sim();
        let mut b = sim();
        for _ in 0..400 {
            a.tick();
            b.tick();
        }
        assert_eq!(a.particles(), b.particles());
        assert_eq!(a.fragments(), b.fragments());
    }
}
