use rand::{SeedableRng, rngs::SmallRng};
use simloop_core::{
    Engine, EngineConfig, KnobUpdate, Lifecycle, ManualFrameClock, Model, NullRenderer,
};
use simloop_models::{
    DoublePendulum, GasDiffusion, GeneticDrift, Health, HeatTransfer, LorenzAttractor,
    NaturalSelection, SirOde, SpatialSpread, TraitSelection, ViralAction, ViralCascade,
    WeightedGraph,
    pendulum::{PendulumParams, PendulumState, integrate},
    spread::SpreadParams,
    viral::ViralParams,
};

fn seeded<M: Model>(model: M, seed: u64) -> Engine<M, NullRenderer> {
    let config = EngineConfig {
        rng_seed: Some(seed),
        ..model.engine_defaults()
    };
    Engine::new(model, M::Params::default(), config, NullRenderer).expect("engine")
}

#[test]
fn nearby_pendulums_diverge() {
    let params = PendulumParams::default();
    let mut a = PendulumState::at_rest(90_f64.to_radians(), 90_f64.to_radians());
    let mut b = PendulumState::at_rest(90.1_f64.to_radians(), 90_f64.to_radians());

    let mut early: f64 = 0.0;
    let mut late: f64 = 0.0;
    for step in 0..2_000 {
        integrate(&mut a, &params);
        integrate(&mut b, &params);
        let gap = a.angular_distance(&b);
        if step < 100 {
            early = early.max(gap);
        }
        if step >= 1_500 {
            late = late.max(gap);
        }
    }
    assert!(late > 0.02, "late divergence {late}");
    assert!(late > early * 10.0, "early {early}, late {late}");
}

#[test]
fn engine_driven_pendulums_diverge_from_a_tenth_of_a_degree() {
    let mut engine = seeded(DoublePendulum, 0);
    assert_eq!(engine.params().perturbation_deg, 0.1);
    let start = engine.state().divergence();
    assert!((start - 0.1_f64.to_radians()).abs() < 1e-12);

    let substeps = u64::from(engine.config().substeps);
    let mut clock = ManualFrameClock::new();
    clock.schedule(engine.start().expect("start"));
    let (mut early, mut late) = (start, 0.0_f64);
    while engine.steps().0 < 2_000 {
        assert!(clock.advance(&mut engine));
        let gap = engine.state().divergence();
        if engine.steps().0 <= 100 {
            early = early.max(gap);
        }
        if engine.steps().0 >= 1_500 {
            late = late.max(gap);
        }
    }
    assert_eq!(engine.steps().0 % substeps, 0);
    assert!(late > 0.02, "late divergence {late}");
    assert!(late > early * 10.0, "early {early}, late {late}");
}

#[test]
fn certain_contact_infects_everyone_in_one_step() {
    let params = SpreadParams {
        population: 60,
        initial_infected: 1,
        contact_probability: 1.0,
        contact_radius: 1_000.0,
        ..SpreadParams::default()
    };
    let config = EngineConfig {
        rng_seed: Some(5),
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(SpatialSpread, params, config, NullRenderer).expect("engine");
    assert_eq!(engine.state().counts().infected, 1);

    let mut clock = ManualFrameClock::new();
    clock.schedule(engine.start().expect("start"));
    clock.advance(&mut engine);

    assert_eq!(engine.steps().0, 1);
    assert!(
        engine
            .state()
            .people
            .iter()
            .all(|p| p.health == Health::Infected)
    );
}

#[test]
fn dijkstra_takes_the_two_hop_route() {
    let mut graph = WeightedGraph::new();
    graph.connect_labels("A", "B", 1).expect("A-B");
    graph.connect_labels("B", "C", 2).expect("B-C");
    graph.connect_labels("A", "C", 5).expect("A-C");
    let a = graph.require_label("A").expect("A");
    let c = graph.require_label("C").expect("C");
    let path = graph.shortest_path(a, c).expect("valid").expect("reachable");
    assert_eq!(path.labels(&graph), ["A", "B", "C"]);
    assert_eq!(path.weight, 3);
}

#[test]
fn seeded_initialization_is_reproducible_for_every_demo() {
    fn check<M: Model + Copy>(model: M) {
        let params = M::Params::default();
        let first = model.initialize(&params, &mut SmallRng::seed_from_u64(77));
        let second = model.initialize(&params, &mut SmallRng::seed_from_u64(77));
        assert_eq!(first, second, "{} initialization differs", M::KIND);
    }
    check(DoublePendulum);
    check(LorenzAttractor);
    check(SirOde);
    check(SpatialSpread);
    check(NaturalSelection);
    check(GasDiffusion);
    check(ViralCascade);
    check(GeneticDrift);
    check(TraitSelection);
    check(HeatTransfer);
}

#[test]
fn directional_selection_breeds_once_per_stride() {
    let mut engine = seeded(TraitSelection, 3);
    let start = engine.state().mean();
    let mut clock = ManualFrameClock::new();
    clock.schedule(engine.start().expect("start"));
    clock.advance_by(&mut engine, 30 * 15);

    assert_eq!(engine.generation().0, 15);
    assert_eq!(engine.state().generation, 15);
    assert_eq!(engine.state().traits.len(), 200);
    assert!(engine.state().mean() > start + 10.0);
}

#[test]
fn reset_restores_the_initial_crowd() {
    let mut engine = seeded(SpatialSpread, 12);
    let initial = engine.state().clone();
    let mut clock = ManualFrameClock::new();
    clock.schedule(engine.start().expect("start"));
    clock.advance_by(&mut engine, 25);
    assert_ne!(engine.state(), &initial);

    clock.cancel();
    assert!(engine.reset().is_some(), "reset cancels the pending frame");
    assert_eq!(engine.pending_frame(), None);
    assert_eq!(engine.state(), &initial);
    assert_eq!(engine.steps().0, 0);
    assert_eq!(engine.lifecycle(), Lifecycle::Idle);
}

#[test]
fn paused_lorenz_ignores_the_stale_callback() {
    let mut engine = seeded(LorenzAttractor, 1);
    let mut clock = ManualFrameClock::new();
    clock.schedule(engine.start().expect("start"));
    clock.advance_by(&mut engine, 10);
    assert_eq!(engine.steps().0, 50);

    engine.pause().expect("pause");
    let frozen = engine.state().clone();
    let trail_len = engine.trails().get(0).map(|t| t.len());
    clock.advance_by(&mut engine, 5);
    assert_eq!(engine.state(), &frozen);
    assert_eq!(engine.steps().0, 50);
    assert_eq!(engine.trails().get(0).map(|t| t.len()), trail_len);
}

#[test]
fn long_lorenz_run_keeps_trails_bounded() {
    let mut engine = seeded(LorenzAttractor, 3);
    let mut clock = ManualFrameClock::new();
    clock.schedule(engine.start().expect("start"));
    clock.advance_by(&mut engine, 400);
    assert_eq!(engine.steps().0, 2_000);
    assert_eq!(engine.trails().len(), 2);
    for trail in engine.trails().iter() {
        assert_eq!(trail.len(), 1_000);
    }
}

#[test]
fn sir_run_finishes_and_stops_scheduling() {
    let mut engine = seeded(SirOde, 0);
    let mut clock = ManualFrameClock::new();
    clock.schedule(engine.start().expect("start"));
    clock.advance_by(&mut engine, 1_000);
    assert_eq!(engine.lifecycle(), Lifecycle::Finished);
    assert_eq!(clock.pending(), None);
    assert!(engine.start().is_err());
    assert!(engine.trails().iter().all(|t| t.len() <= 1_024));
}

#[test]
fn viral_cascade_runs_one_round_per_stride() {
    let params = ViralParams {
        spread_probability: 1.0,
        density: 3,
        ..ViralParams::default()
    };
    let config = EngineConfig {
        rng_seed: Some(2),
        frame_stride: 36,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(ViralCascade, params, config, NullRenderer).expect("engine");
    assert!(engine.interact(ViralAction::SeedNode(0)));

    let mut clock = ManualFrameClock::new();
    clock.schedule(engine.start().expect("start"));
    clock.advance_by(&mut engine, 35);
    assert_eq!(engine.steps().0, 0);
    clock.advance(&mut engine);
    assert_eq!(engine.steps().0, 1);

    clock.advance_by(&mut engine, 36 * 40);
    assert_eq!(engine.lifecycle(), Lifecycle::Finished);
    assert!(!engine.interact(ViralAction::SeedNode(1)));
}

#[test]
fn evolution_crosses_generations_and_live_knobs_apply() {
    let mut engine = seeded(NaturalSelection, 9);
    engine
        .apply_knobs(&[KnobUpdate::parse("mutation_rate=50").expect("parse")])
        .expect("knob");
    assert_eq!(engine.params().mutation_rate, 50.0);

    let mut clock = ManualFrameClock::new();
    clock.schedule(engine.start().expect("start"));
    clock.advance_by(&mut engine, 3_000);
    assert!(engine.generation().0 >= 1, "no generation after 3000 steps");
    assert!(engine.state().creatures.len() <= engine.params().population);
}
