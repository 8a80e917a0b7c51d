//! Falling stars and their fragments.
//!
//! Both entity kinds are circles with a position and a velocity, drawn with
//! the same soft glow, but they follow different update policies:
//!
//! | | [`Particle`] | [`Fragment`] |
//! |---|---|---|
//! | Ground | bounce with restitution, shatter | bounce with restitution |
//! | Walls | bounce with restitution, shatter | pass through |
//! | Lifetime | until radius reaches zero | `ttl` ticks |
//! | Color | fixed | tint faded by opacity |
//!
//! A ground and a wall bounce on the same tick shatter a particle twice.

use glam::{Vec2, Vec4};
use rand::Rng;

use crate::config::FadeLaw;
use crate::surface::{Canvas, Shadow};
use crate::visuals::with_alpha;

/// Collision boundaries for a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Right wall; the left wall is at zero.
    pub width: f32,
    /// Top edge of the ground band.
    pub floor: f32,
}

impl Bounds {
    pub fn new(width: f32, floor: f32) -> Self {
        Self { width, floor }
    }
}

/// Shared capability of every drawable body.
pub trait Body {
    fn position(&self) -> Vec2;
    fn velocity(&self) -> Vec2;
    fn radius(&self) -> f32;
    /// Whether the body should leave its collection this tick.
    fn is_expired(&self) -> bool;
    fn draw(&self, canvas: &mut dyn Canvas, glow: Option<Shadow>);
}

/// Projected vertical step: bounce off the floor or accumulate gravity.
///
/// Returns `true` on a bounce.
fn fall(
    position: Vec2,
    radius: f32,
    velocity: &mut Vec2,
    gravity: f32,
    friction: f32,
    floor: f32,
) -> bool {
    if position.y + radius + velocity.y > floor {
        velocity.y = -velocity.y * friction;
        true
    } else {
        velocity.y += gravity;
        false
    }
}

/// Parameters for spawning fragments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentTemplate {
    pub radius: f32,
    pub gravity: f32,
    pub friction: f32,
    pub ttl: u32,
    /// Horizontal speed is an integer in `-speed_x..=speed_x`.
    pub speed_x: i32,
    /// Vertical speed is an integer in `-speed_y..=speed_y`.
    pub speed_y: i32,
    pub fade: FadeLaw,
    pub tint: Vec4,
}

impl FragmentTemplate {
    /// A new fragment at `position` with a random integer velocity.
    pub fn spawn<R: Rng + ?Sized>(&self, position: Vec2, rng: &mut R) -> Fragment {
        let velocity = Vec2::new(
            rng.gen_range(-self.speed_x..=self.speed_x) as f32,
            rng.gen_range(-self.speed_y..=self.speed_y) as f32,
        );
        Fragment {
            position,
            velocity,
            radius: self.radius,
            gravity: self.gravity,
            friction: self.friction,
            ttl: self.ttl,
            initial_ttl: self.ttl,
            opacity: 1.0,
            fade: self.fade,
            tint: self.tint,
        }
    }
}

/// What a shatter does to a particle and how much debris it releases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    /// Radius removed from the particle.
    pub shrink: f32,
    /// Fragments released.
    pub count: usize,
    pub fragment: FragmentTemplate,
}

/// A falling star.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub color: Vec4,
    pub gravity: f32,
    pub friction: f32,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32, color: Vec4) -> Self {
        Self {
            position,
            velocity,
            radius,
            color,
            gravity: 0.7,
            friction: 0.7,
        }
    }

    pub fn with_physics(mut self, gravity: f32, friction: f32) -> Self {
        self.gravity = gravity;
        self.friction = friction;
        self
    }

    /// One Euler step with ground and wall collisions.
    ///
    /// The ground check uses the projected position before moving; the wall
    /// check runs after moving. Each bounce shatters.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        bounds: Bounds,
        burst: &Burst,
        rng: &mut R,
        fragments: &mut Vec<Fragment>,
    ) {
        if fall(
            self.position,
            self.radius,
            &mut self.velocity,
            self.gravity,
            self.friction,
            bounds.floor,
        ) {
            self.shatter(burst, rng, fragments);
        }

        self.position += self.velocity;

        if self.position.x + self.radius + self.velocity.x > bounds.width
            || self.position.x - self.radius <= 0.0
        {
            self.velocity.x = -self.velocity.x * self.friction;
            self.shatter(burst, rng, fragments);
        }
    }

    /// Shrink and release a burst of fragments at the current position.
    pub fn shatter<R: Rng + ?Sized>(
        &mut self,
        burst: &Burst,
        rng: &mut R,
        fragments: &mut Vec<Fragment>,
    ) {
        self.radius -= burst.shrink;
        fragments.extend((0..burst.count).map(|_| burst.fragment.spawn(self.position, rng)));
    }
}

impl Body for Particle {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn is_expired(&self) -> bool {
        self.radius <= 0.0
    }

    fn draw(&self, canvas: &mut dyn Canvas, glow: Option<Shadow>) {
        canvas.fill_circle(self.position, self.radius, self.color, glow);
    }
}

/// Short-lived debris released by a shatter.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub gravity: f32,
    pub friction: f32,
    /// Ticks left; the fragment expires when this reaches zero.
    pub ttl: u32,
    pub initial_ttl: u32,
    /// Raw fade value. It can fall below zero before `ttl` runs out under
    /// [`FadeLaw::Reciprocal`]; drawing clamps it.
    pub opacity: f32,
    pub fade: FadeLaw,
    pub tint: Vec4,
}

impl Fragment {
    /// One Euler step: floor bounce only, then age and fade.
    pub fn update(&mut self, bounds: Bounds) {
        fall(
            self.position,
            self.radius,
            &mut self.velocity,
            self.gravity,
            self.friction,
            bounds.floor,
        );
        self.position += self.velocity;

        self.ttl = self.ttl.saturating_sub(1);
        // An expired fragment is pruned this tick; 1/0 is never evaluated.
        if self.ttl == 0 {
            return;
        }
        self.opacity -= match self.fade {
            FadeLaw::Reciprocal => 1.0 / self.ttl as f32,
            FadeLaw::Linear => 1.0 / self.initial_ttl as f32,
        };
    }

    /// Opacity used for drawing.
    pub fn alpha(&self) -> f32 {
        self.opacity.clamp(0.0, 1.0)
    }
}

impl Body for Fragment {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn is_expired(&self) -> bool {
        self.ttl == 0
    }

    fn draw(&self, canvas: &mut dyn Canvas, glow: Option<Shadow>) {
        canvas.fill_circle(self.position, self.radius, with_alpha(self.tint, self.alpha()), glow);
    }
}
