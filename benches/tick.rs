//! Benchmarks for the simulation step and the CPU rasterizer.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use starfall::{Frame, Particle, SceneConfig, Simulation, Surface, Vec2, Vec4};

/// A simulation with `stars` stars mid-shatter, so fragments are plentiful.
fn busy_simulation(stars: usize) -> Simulation {
    let mut sim = Simulation::with_seed(SceneConfig::default(), Surface::new(1280.0, 720.0), 7)
        .expect("default config is valid");
    for i in 0..stars {
        let x = 40.0 + (i as f32 * 37.0) % 1200.0;
        let star = Particle::new(Vec2::new(x, 600.0), Vec2::new(0.5, 10.0), 12.0, Vec4::ONE);
        sim.push_particle(star);
    }
    for _ in 0..10 {
        sim.tick();
    }
    sim
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for stars in [1usize, 10, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(stars), &stars, |b, &stars| {
            let mut sim = busy_simulation(stars);
            b.iter(|| {
                sim.tick();
                black_box(sim.fragments().len())
            })
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(20);

    group.bench_function("1280x720", |b| {
        let sim = busy_simulation(10);
        let mut frame = Frame::new(1280, 720);
        b.iter(|| {
            sim.render(&mut frame);
            black_box(frame.pixel(640, 360))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_tick, bench_render);
criterion_main!(benches);
