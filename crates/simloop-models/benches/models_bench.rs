use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use simloop_core::{Engine, EngineConfig, ManualFrameClock, Model, NullRenderer};
use simloop_models::{NaturalSelection, SpatialSpread, spread::SpreadParams};
use std::time::Duration;

fn frames_from_env() -> u64 {
    std::env::var("SIMLOOP_BENCH_FRAMES")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(120)
}

fn run<M: Model>(mut engine: Engine<M, NullRenderer>, frames: u64) -> u64 {
    let mut clock = ManualFrameClock::new();
    if let Ok(token) = engine.start() {
        clock.schedule(token);
    }
    clock.advance_by(&mut engine, frames);
    engine.steps().0
}

fn bench_spread(c: &mut Criterion) {
    let mut group = c.benchmark_group("spread_frames");
    group.measurement_time(Duration::from_secs(5));
    let frames = frames_from_env();
    for population in [200_usize, 1_000, 5_000] {
        group.bench_function(format!("frames{frames}_people{population}"), |b| {
            b.iter_batched(
                || {
                    let params = SpreadParams {
                        population,
                        initial_infected: population / 20,
                        width: 1_200.0,
                        height: 800.0,
                        ..SpreadParams::default()
                    };
                    let config = EngineConfig {
                        rng_seed: Some(0xBEEF),
                        ..EngineConfig::default()
                    };
                    Engine::new(SpatialSpread, params, config, NullRenderer).expect("engine")
                },
                |engine| run(engine, frames),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_evolution(c: &mut Criterion) {
    let frames = frames_from_env();
    c.bench_function(&format!("evolution_frames{frames}"), |b| {
        b.iter_batched(
            || {
                let config = EngineConfig {
                    rng_seed: Some(7),
                    ..EngineConfig::default()
                };
                Engine::new(NaturalSelection, Default::default(), config, NullRenderer)
                    .expect("engine")
            },
            |engine| run(engine, frames),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_spread, bench_evolution);
criterion_main!(benches);
