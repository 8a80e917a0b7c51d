//! Scene configuration.
//!
//! All tunable constants of the effect live in [`SceneConfig`]. The defaults
//! reproduce the classic look; builder methods override individual values:
//!
//! ```ignore
//! let config = SceneConfig::default()
//!     .with_ground_height(80.0)
//!     .with_spawn_interval(60..=120)
//!     .with_fade_law(FadeLaw::Linear);
//! ```

use std::fmt;
use std::ops::RangeInclusive;

use crate::background::MountainLayer;
use crate::body::{Burst, FragmentTemplate};
use crate::visuals::{hex, Palette};

/// How a fragment's opacity decays each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeLaw {
    /// `opacity -= 1 / ttl`, using the ttl after this tick's decrement.
    ///
    /// The step grows as ttl shrinks, so opacity reaches zero long before
    /// the fragment expires. This is the classic behavior.
    #[default]
    Reciprocal,
    /// `opacity -= 1 / initial_ttl`: reaches zero exactly on expiry.
    Linear,
}

/// Invalid [`SceneConfig`] values.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Ground height must be positive.
    GroundHeight(f32),
    /// Spawn interval range is empty or starts at zero.
    SpawnInterval(u32, u32),
    /// First spawn interval must be at least one frame.
    FirstSpawnInterval,
    /// Fragments need at least one tick to live.
    FragmentTtl,
    /// Falling stars need a positive starting radius.
    StarRadius(f32),
    /// Fragment speed bounds span `-speed..=speed` and cannot be negative.
    FragmentSpeed(i32, i32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::GroundHeight(h) => write!(f, "Ground height must be positive, got {}", h),
            ConfigError::SpawnInterval(lo, hi) => {
                write!(f, "Spawn interval {}..={} must be non-empty and start above zero", lo, hi)
            }
            ConfigError::FirstSpawnInterval => write!(f, "First spawn interval must be at least 1"),
            ConfigError::FragmentTtl => write!(f, "Fragment ttl must be at least 1"),
            ConfigError::StarRadius(r) => write!(f, "Star radius must be positive, got {}", r),
            ConfigError::FragmentSpeed(x, y) => {
                write!(f, "Fragment speed bounds must be non-negative, got ({}, {})", x, y)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Tunable constants for a [`Simulation`](crate::Simulation).
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Height of the solid band at the bottom; its top edge is the floor.
    pub ground_height: f32,
    /// Number of static background stars seeded on init and resize.
    pub background_star_count: usize,
    /// Background star radii are drawn from `0.0..background_star_max_radius`.
    pub background_star_max_radius: f32,
    /// Starting radius of a falling star.
    pub star_radius: f32,
    /// Per-tick gravity of a falling star.
    pub star_gravity: f32,
    /// Restitution applied on every bounce of a falling star.
    pub star_friction: f32,
    /// Vertical spawn position; negative is above the top edge.
    pub star_spawn_y: f32,
    /// Initial downward speed of a falling star.
    pub star_fall_speed: f32,
    /// Radius lost on each shatter.
    pub shatter_shrink: f32,
    /// Fragments released per shatter.
    pub fragments_per_shatter: usize,
    /// Fragment radius.
    pub fragment_radius: f32,
    /// Per-tick gravity of a fragment.
    pub fragment_gravity: f32,
    /// Restitution of a fragment's ground bounce.
    pub fragment_friction: f32,
    /// Ticks a fragment lives.
    pub fragment_ttl: u32,
    /// Fragment horizontal speed is an integer in `-x..=x`.
    pub fragment_speed_x: i32,
    /// Fragment vertical speed is an integer in `-y..=y`.
    pub fragment_speed_y: i32,
    /// Fragment opacity decay.
    pub fade_law: FadeLaw,
    /// Frames until the first spawn.
    pub first_spawn_interval: u32,
    /// Range the next spawn interval is drawn from after each spawn.
    pub spawn_interval: RangeInclusive<u32>,
    /// How far each mountain triangle's base extends past its segment.
    pub mountain_overlap: f32,
    /// Mountain layers, back to front.
    pub mountains: Vec<MountainLayer>,
    /// Shadow blur radius of the star glow.
    pub glow_blur: f32,
    /// Scene colors.
    pub palette: Palette,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            ground_height: 100.0,
            background_star_count: 150,
            background_star_max_radius: 3.0,
            star_radius: 12.0,
            star_gravity: 0.7,
            star_friction: 0.7,
            star_spawn_y: -100.0,
            star_fall_speed: 3.0,
            shatter_shrink: 3.0,
            fragments_per_shatter: 8,
            fragment_radius: 2.0,
            fragment_gravity: 0.2,
            fragment_friction: 1.0,
            fragment_ttl: 200,
            fragment_speed_x: 5,
            fragment_speed_y: 15,
            fade_law: FadeLaw::Reciprocal,
            first_spawn_interval: 75,
            spawn_interval: 150..=300,
            mountain_overlap: 625.0,
            mountains: vec![
                MountainLayer::new(1, 150.0, hex(0x384551)),
                MountainLayer::new(2, 250.0, hex(0x2B3843)),
                MountainLayer::new(3, 500.0, hex(0x26333E)),
            ],
            glow_blur: 20.0,
            palette: Palette::default(),
        }
    }
}

impl SceneConfig {
    /// Set the ground band height.
    pub fn with_ground_height(mut self, height: f32) -> Self {
        self.ground_height = height;
        self
    }

    /// Set how many background stars are seeded.
    pub fn with_background_stars(mut self, count: usize) -> Self {
        self.background_star_count = count;
        self
    }

    /// Set gravity and restitution of falling stars.
    pub fn with_star_physics(mut self, gravity: f32, friction: f32) -> Self {
        self.star_gravity = gravity;
        self.star_friction = friction;
        self
    }

    /// Set the frames until the first spawn.
    pub fn with_first_spawn(mut self, frames: u32) -> Self {
        self.first_spawn_interval = frames;
        self
    }

    /// Set the range later spawn intervals are drawn from.
    pub fn with_spawn_interval(mut self, range: RangeInclusive<u32>) -> Self {
        self.spawn_interval = range;
        self
    }

    /// Set the fragment fade law.
    pub fn with_fade_law(mut self, law: FadeLaw) -> Self {
        self.fade_law = law;
        self
    }

    /// Replace the mountain layers.
    pub fn with_mountains(mut self, layers: Vec<MountainLayer>) -> Self {
        self.mountains = layers;
        self
    }

    /// Replace the palette.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Check values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ground_height > 0.0) {
            return Err(ConfigError::GroundHeight(self.ground_height));
        }
        let (lo, hi) = (*self.spawn_interval.start(), *self.spawn_interval.end());
        if lo == 0 || lo > hi {
            return Err(ConfigError::SpawnInterval(lo, hi));
        }
        if self.first_spawn_interval == 0 {
            return Err(ConfigError::FirstSpawnInterval);
        }
        if self.fragment_ttl == 0 {
            return Err(ConfigError::FragmentTtl);
        }
        if !(self.star_radius > 0.0) {
            return Err(ConfigError::StarRadius(self.star_radius));
        }
        if self.fragment_speed_x < 0 || self.fragment_speed_y < 0 {
            return Err(ConfigError::FragmentSpeed(
                self.fragment_speed_x,
                self.fragment_speed_y,
            ));
        }
        Ok(())
    }

    /// Fragment parameters derived from this config.
    pub fn fragment_template(&self) -> FragmentTemplate {
        FragmentTemplate {
            radius: self.fragment_radius,
            gravity: self.fragment_gravity,
            friction: self.fragment_friction,
            ttl: self.fragment_ttl,
            speed_x: self.fragment_speed_x,
            speed_y: self.fragment_speed_y,
            fade: self.fade_law,
            tint: self.palette.fragment,
        }
    }

    /// Shatter parameters derived from this config.
    pub fn burst(&self) -> Burst {
        Burst {
            shrink: self.shatter_shrink,
            count: self.fragments_per_shatter,
            fragment: self.fragment_template(),
        }
    }
}
