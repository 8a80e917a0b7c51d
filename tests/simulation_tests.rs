//! Integration tests for the shooting-star simulation.
//!
//! These drive a seeded [`Simulation`] and single bodies through the public
//! API and check the motion, shattering and lifecycle laws.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use starfall::background::MountainLayer;
use starfall::{
    Body, Bounds, Canvas, ConfigError, FadeLaw, Frame, Particle, RecordingCanvas, SceneConfig,
    Simulation, Surface, Vec2, Vec4,
};

fn seeded(width: f32, height: f32) -> Simulation {
    Simulation::with_seed(SceneConfig::default(), Surface::new(width, height), 2024).unwrap()
}

/// A star that crosses the 500px floor of an 800x600 surface on its next tick.
fn landing_star(radius: f32) -> Particle {
    Particle::new(Vec2::new(400.0, 480.0), Vec2::new(0.0, 10.0), radius, Vec4::ONE)
}

/// Config that never spawns on its own within a test run.
fn quiet_config() -> SceneConfig {
    SceneConfig::default()
        .with_first_spawn(u32::MAX)
        .with_spawn_interval(u32::MAX..=u32::MAX)
}

// ============================================================================
// Particle motion
// ============================================================================

#[test]
fn test_gravity_accumulates_without_bounce() {
    let mut sim = Simulation::with_seed(quiet_config(), Surface::new(800.0, 5000.0), 1).unwrap();
    sim.push_particle(Particle::new(Vec2::new(400.0, 0.0), Vec2::new(0.0, 3.0), 12.0, Vec4::ONE));

    let mut expected = 3.0f32;
    for _ in 0..20 {
        sim.tick();
        expected += 0.7;
    }

    let p = &sim.particles()[0];
    assert_eq!(p.velocity.y, expected);
    assert!(sim.fragments().is_empty());
}

#[test]
fn test_first_ground_impact_end_to_end() {
    let config = SceneConfig::default();
    let burst = config.burst();
    let bounds = Bounds::new(800.0, 600.0 - config.ground_height);
    let mut rng = SmallRng::seed_from_u64(99);
    let mut fragments = Vec::new();

    // Drift right so no wall is touched before the ground.
    let vx = 1.5;
    let mut p = Particle::new(Vec2::new(100.0, -100.0), Vec2::new(vx, 3.0), 12.0, Vec4::ONE)
        .with_physics(0.7, 0.7);

    let mut ticks = 0;
    loop {
        let before = p.velocity.y;
        let impact = p.position;
        let will_cross = p.position.y + p.radius + p.velocity.y > bounds.floor;
        p.update(bounds, &burst, &mut rng, &mut fragments);
        ticks += 1;

        if will_cross {
            assert!(before > 0.0);
            assert_eq!(p.velocity.y, -before * 0.7);
            assert!(p.velocity.y < 0.0);
            assert_eq!(p.radius, 9.0);
            assert_eq!(fragments.len(), 8);
            assert!(fragments.iter().all(|f| f.position == impact));
            break;
        }

        assert!(fragments.is_empty(), "no fragments before the first impact");
        assert!(ticks < 1000, "particle never reached the ground");
    }
}

#[test]
fn test_ground_bounce_in_simulation_adds_eight_fragments() {
    let mut sim = Simulation::with_seed(quiet_config(), Surface::new(800.0, 600.0), 5).unwrap();
    // Floor is at 500; this one crosses it on the first tick.
    sim.push_particle(landing_star(12.0));

    sim.tick();

    assert_eq!(sim.particles().len(), 1);
    assert_eq!(sim.particles()[0].radius, 9.0);
    assert_eq!(sim.fragments().len(), 8);
}

#[test]
fn test_particle_removed_when_radius_exhausted() {
    let mut sim = Simulation::with_seed(quiet_config(), Surface::new(800.0, 600.0), 5).unwrap();
    sim.push_particle(landing_star(3.0));

    sim.tick();

    assert!(sim.particles().is_empty());
    assert_eq!(sim.fragments().len(), 8);
}

#[test]
fn test_corner_impact_double_shatter_quirk() {
    let mut sim = Simulation::with_seed(quiet_config(), Surface::new(100.0, 200.0), 5).unwrap();
    sim.push_particle(Particle::new(Vec2::new(85.0, 85.0), Vec2::new(5.0, 5.0), 12.0, Vec4::ONE));

    sim.tick();

    assert_eq!(sim.particles()[0].radius, 6.0);
    assert_eq!(sim.fragments().len(), 16);
}

// ============================================================================
// Fragment lifecycle
// ============================================================================

#[test]
fn test_fragment_ttl_and_removal() {
    let mut sim = Simulation::with_seed(quiet_config(), Surface::new(800.0, 600.0), 8).unwrap();
    sim.push_particle(landing_star(3.0));

    // Fragments released on tick 1 are also aged on tick 1.
    sim.tick();
    assert!(sim.fragments().iter().all(|f| f.ttl == 199));

    for expected in (1..199u32).rev() {
        sim.tick();
        assert_eq!(sim.fragments().len(), 8);
        assert!(sim.fragments().iter().all(|f| f.ttl == expected));
    }

    sim.tick();
    assert!(sim.fragments().is_empty());
}

#[test]
fn test_opacity_recurrence_for_ttl_200() {
    let mut sim = Simulation::with_seed(quiet_config(), Surface::new(800.0, 600.0), 8).unwrap();
    sim.push_particle(landing_star(3.0));

    let mut expected = 1.0f32;
    for ttl in (1..200u32).rev() {
        sim.tick();
        expected -= 1.0 / ttl as f32;
        for f in sim.fragments() {
            assert_eq!(f.ttl, ttl);
            assert_eq!(f.opacity, expected);
        }
    }
}

#[test]
fn test_linear_fade_stays_positive_until_expiry() {
    let config = quiet_config().with_fade_law(FadeLaw::Linear);
    let mut sim = Simulation::with_seed(config, Surface::new(800.0, 600.0), 8).unwrap();
    sim.push_particle(landing_star(3.0));

    for _ in 0..199 {
        sim.tick();
        assert!(sim.fragments().iter().all(|f| f.opacity > 0.0 && f.opacity <= 1.0));
    }
    sim.tick();
    assert!(sim.fragments().is_empty());
}

// ============================================================================
// Resize and spawning
// ============================================================================

#[test]
fn test_resize_resets_state() {
    let mut sim = seeded(800.0, 600.0);
    for _ in 0..400 {
        sim.tick();
    }
    sim.push_particle(landing_star(12.0));
    sim.tick();
    assert!(!sim.particles().is_empty());
    assert!(!sim.fragments().is_empty());

    sim.resize(320.0, 240.0);

    assert!(sim.particles().is_empty());
    assert!(sim.fragments().is_empty());
    assert_eq!(sim.frame(), 0);
    assert_eq!(sim.spawn_interval(), 75);
    assert_eq!(sim.surface(), Surface::new(320.0, 240.0));
    assert_eq!(sim.background_stars().len(), 150);
    for star in sim.background_stars() {
        assert!(star.position.x >= 0.0 && star.position.x <= 320.0);
        assert!(star.position.y >= 0.0 && star.position.y <= 240.0);
    }
}

#[test]
fn test_spawns_follow_interval() {
    // No gravity on a huge surface: no star reaches the ground or wears out.
    let config = SceneConfig::default().with_star_physics(0.0, 1.0);
    let surface = Surface::new(100_000.0, 100_000.0);
    let mut sim = Simulation::with_seed(config, surface, 2024).unwrap();

    let mut spawn_frames = Vec::new();
    for _ in 0..1200 {
        let before = sim.particles().len();
        let interval = u64::from(sim.spawn_interval());
        sim.tick();

        if sim.frame() % interval == 0 {
            assert_eq!(sim.particles().len(), before + 1, "no star on frame {}", sim.frame());
            assert!((150..=300).contains(&sim.spawn_interval()));
            spawn_frames.push(sim.frame());
        } else {
            assert_eq!(sim.particles().len(), before, "stray star on frame {}", sim.frame());
        }
    }

    assert_eq!(spawn_frames[0], 75);
    // Each later spawn lands within 300 frames of the previous one.
    assert!(spawn_frames.len() >= 4);
    assert!(spawn_frames.windows(2).all(|w| w[1] - w[0] <= 300));
    assert_eq!(sim.particles().len(), spawn_frames.len());
}

#[test]
fn test_negative_fragment_speed_rejected_before_running() {
    let config = SceneConfig {
        fragment_speed_x: -1,
        ..quiet_config()
    };
    let result = Simulation::with_seed(config, Surface::new(800.0, 600.0), 1);
    assert!(matches!(result, Err(ConfigError::FragmentSpeed(-1, 15))));
}

#[test]
fn test_spawned_star_starts_above_surface() {
    let mut sim = seeded(800.0, 600.0);
    for _ in 0..75 {
        sim.tick();
    }
    let star = &sim.particles()[0];
    assert_eq!(star.position.y, -100.0);
    assert_eq!(star.radius, 12.0);
    assert!(star.position.x >= star.radius);
}

#[test]
fn test_independent_instances() {
    let mut a = seeded(800.0, 600.0);
    let b = seeded(800.0, 600.0);
    for _ in 0..100 {
        a.tick();
    }
    assert_eq!(a.frame(), 100);
    assert_eq!(b.frame(), 0);
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_render_records_full_scene() {
    let config = quiet_config().with_mountains(vec![MountainLayer::new(2, 100.0, Vec4::ONE)]);
    let mut sim = Simulation::with_seed(config, Surface::new(800.0, 600.0), 3).unwrap();
    sim.push_particle(landing_star(12.0));
    sim.tick();

    let mut canvas = RecordingCanvas::new();
    sim.render(&mut canvas);

    // clear + sky + stars + 2 peaks + ground + star + 8 fragments
    assert_eq!(canvas.commands.len(), 1 + 1 + 150 + 2 + 1 + 1 + 8);
    assert_eq!(canvas.polygon_count(), 2);
    let tail: Vec<f32> = canvas.circles().map(|(_, r, _)| r).skip(150).collect();
    assert_eq!(tail[0], 9.0);
    assert!(tail[1..].iter().all(|r| *r == 2.0));
}

#[test]
fn test_rasterized_frame_has_ground_band() {
    let config = SceneConfig::default().with_background_stars(0);
    let sim = Simulation::with_seed(config, Surface::new(64.0, 700.0), 3).unwrap();
    let mut frame = Frame::new(64, 700);
    frame.clear();
    sim.render(&mut frame);

    assert_eq!(frame.pixel(10, 650), Some([0x18, 0x20, 0x28, 0xFF]));
    // Above every mountain peak the sky shows through.
    let top = frame.pixel(10, 2).unwrap();
    assert_eq!(top[3], 255);
    assert!(top[0] <= 0x18 && top[2] <= 0x27);
}

#[test]
fn test_particle_draws_through_body_trait() {
    let p = Particle::new(Vec2::new(5.0, 5.0), Vec2::ZERO, 4.0, Vec4::ONE);
    let bodies: Vec<&dyn Body> = vec![&p];
    let mut canvas = RecordingCanvas::new();
    for body in bodies {
        body.draw(&mut canvas, None);
    }
    assert_eq!(canvas.circles().count(), 1);
}
