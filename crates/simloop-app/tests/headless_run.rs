use std::fs;

use simloop_app::{RunConfig, RunReport, RunRequest, parse_edge_list, run_headless, write_report};
use simloop_core::{KnobUpdate, Lifecycle};
use simloop_models::DemoKind;

fn seeded(demo: DemoKind, frames: u64, seed: u64) -> RunRequest {
    RunRequest {
        seed: Some(seed),
        ..RunRequest::new(demo, frames)
    }
}

#[test]
fn report_round_trips_through_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("report.json");

    let (report, _widget) = run_headless(&seeded(DemoKind::Spread, 40, 9)).expect("run");
    write_report(&report, &path).expect("write report");

    let parsed: RunReport =
        serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("parse");
    assert_eq!(parsed, report);
    assert_eq!(parsed.seed, 9);
    assert_eq!(parsed.frames_delivered, 40);
    assert_eq!(parsed.steps.0, 40);
    assert_eq!(parsed.lifecycle, Lifecycle::Running);
}

#[test]
fn same_seed_gives_same_readouts() {
    let (a, _) = run_headless(&seeded(DemoKind::Evolution, 120, 21)).expect("run a");
    let (b, _) = run_headless(&seeded(DemoKind::Evolution, 120, 21)).expect("run b");
    assert_eq!(a.readouts, b.readouts);
}

#[test]
fn config_file_sections_reach_the_engine() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("sir.json");
    fs::write(
        &path,
        r#"{ "engine": { "substeps": 2, "rng_seed": 4 }, "params": { "beta": 0.3 } }"#,
    )
    .expect("write config");

    let request = RunRequest {
        config: RunConfig::load(&path).expect("load"),
        ..RunRequest::new(DemoKind::Sir, 10)
    };
    let (report, _) = run_headless(&request).expect("run");
    assert_eq!(report.seed, 4);
    assert_eq!(report.steps.0, 20);
    assert_eq!(report.readouts.get("r0"), Some("1.5"));
}

#[test]
fn partial_engine_section_keeps_demo_substeps() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("sir-seed.json");
    fs::write(&path, r#"{ "engine": { "rng_seed": 6 } }"#).expect("write config");

    let request = RunRequest {
        config: RunConfig::load(&path).expect("load"),
        ..RunRequest::new(DemoKind::Sir, 10)
    };
    let (report, _) = run_headless(&request).expect("run");
    assert_eq!(report.seed, 6);
    // SIR integrates five sub-steps per frame unless told otherwise.
    assert_eq!(report.steps.0, 50);
}

#[test]
fn unknown_config_sections_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{ "engines": {} }"#).expect("write config");
    assert!(RunConfig::load(&path).is_err());
}

#[test]
fn overrides_apply_before_the_first_frame() {
    let request = RunRequest {
        overrides: vec![KnobUpdate::parse("max_time=1").expect("parse")],
        ..seeded(DemoKind::Sir, 500, 1)
    };
    let (report, _) = run_headless(&request).expect("run");
    assert_eq!(report.lifecycle, Lifecycle::Finished);
    assert!(report.frames_delivered < 500);
}

#[test]
fn bad_overrides_fail_the_run() {
    let request = RunRequest {
        overrides: vec![KnobUpdate::parse("no_such_knob=1").expect("parse")],
        ..seeded(DemoKind::Lorenz, 5, 1)
    };
    assert!(run_headless(&request).is_err());
}

#[test]
fn edge_list_finds_the_cheaper_detour() {
    let text = "# three nodes\nA B 1\nB C 2\nA C 5\n";
    let graph = parse_edge_list(text, 600.0, 400.0).expect("parse");
    let a = graph.require_label("A").expect("A");
    let c = graph.require_label("C").expect("C");
    let path = graph.shortest_path(a, c).expect("valid").expect("reachable");
    assert_eq!(path.labels(&graph), vec!["A", "B", "C"]);
    assert_eq!(path.weight, 3);
}

#[test]
fn malformed_edge_lines_are_reported() {
    let err = parse_edge_list("A B\n", 600.0, 400.0).expect_err("missing weight");
    assert!(err.to_string().contains("line 1"));
    assert!(parse_edge_list("A B heavy\n", 600.0, 400.0).is_err());
}
