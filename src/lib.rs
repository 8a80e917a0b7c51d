//! # Starfall
//!
//! Shooting stars that fall onto a mountain skyline, bounce off the ground
//! and the walls, and shatter into fading fragments.
//!
//! The simulation is independent of any display: drive it with
//! [`Simulation::tick`] and draw it onto anything implementing [`Canvas`].
//! The crate ships a winit/wgpu runner ([`run`]) that draws the scene with
//! GPU pipelines, and a CPU rasterizer ([`Frame`]) for headless use.
//!
//! ## Quick Start
//!
//! ```ignore
//! use starfall::prelude::*;
//!
//! fn main() -> Result<(), RunError> {
//!     starfall::run(SceneConfig::default())
//! }
//! ```
//!
//! ## Headless
//!
//! ```ignore
//! let mut sim = Simulation::with_seed(SceneConfig::default(), Surface::new(640.0, 480.0), 1)?;
//! let mut frame = Frame::new(640, 480);
//! for _ in 0..600 {
//!     sim.tick();
//! }
//! sim.render(&mut frame);
//! ```
//!
//! ## Scene
//!
//! | Layer | Drawn |
//! |-------|-------|
//! | Sky | vertical gradient over the whole surface |
//! | Starfield | 150 static stars with a soft glow |
//! | Mountains | three rows of overlapping peaks |
//! | Ground | solid band; its top edge is the floor stars bounce on |
//! | Stars | falling [`Particle`]s |
//! | Fragments | fading [`Fragment`]s released when a star shatters |

pub mod background;
pub mod body;
pub mod config;
pub mod error;
mod gpu;
pub mod raster;
mod simulation;
pub mod spawn;
pub mod surface;
pub mod time;
pub mod visuals;
mod window;

pub use body::{Body, Bounds, Burst, Fragment, FragmentTemplate, Particle};
pub use config::{ConfigError, FadeLaw, SceneConfig};
pub use error::{GpuError, RunError};
pub use glam::{Vec2, Vec4};
pub use raster::Frame;
pub use simulation::Simulation;
pub use surface::{Canvas, Paint, Rect, RecordingCanvas, Shadow, Surface};
pub use time::FrameClock;
pub use visuals::Palette;
pub use window::run;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use starfall::prelude::*;
/// ```
pub mod prelude {
    pub use crate::background::MountainLayer;
    pub use crate::body::{Body, Fragment, Particle};
    pub use crate::config::{FadeLaw, SceneConfig};
    pub use crate::error::RunError;
    pub use crate::raster::Frame;
    pub use crate::simulation::Simulation;
    pub use crate::surface::{Canvas, Surface};
    pub use crate::time::FrameClock;
    pub use crate::visuals::Palette;
    pub use crate::{Vec2, Vec4};
}
