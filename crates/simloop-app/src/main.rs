use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::{SeedableRng, rngs::SmallRng};
use simloop_app::{RunConfig, RunRequest, parse_edge_list, run_headless, write_report};
use simloop_core::{KnobError, KnobUpdate};
use simloop_models::DemoKind;
use simloop_models::graph::{PathSelection, WeightedGraph};
use simloop_models::herd::{HerdAssessment, vaccinated_cells};
use simloop_models::logistic;
use simloop_render::scenes::{graph::draw_graph, herd::draw_herd, logistic as logistic_scene};
use simloop_render::{Canvas, WidgetOptions, build_widget, save_png};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "simloop", version, about = "Run simloop demos headlessly")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a demo for a number of frames and report its readouts.
    Run {
        /// pendulum, lorenz, sir, spread, evolution, diffusion, viral, drift,
        /// selection, or heat.
        demo: DemoKind,
        #[arg(long, default_value_t = 600)]
        frames: u64,
        #[arg(long, env = "SIMLOOP_SEED")]
        seed: Option<u64>,
        /// Knob override as `name=value`; repeatable.
        #[arg(long = "set", value_parser = parse_knob)]
        overrides: Vec<KnobUpdate>,
        /// JSON file with optional `engine` and `params` sections.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the final frame as PNG.
        #[arg(long)]
        png: Option<PathBuf>,
        /// Write the run report as JSON.
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long, default_value_t = 600)]
        width: u32,
        #[arg(long, default_value_t = 400)]
        height: u32,
    },
    /// List a demo's knobs with their default values.
    Knobs { demo: DemoKind },
    /// Shortest path through a weighted graph.
    Path {
        /// Edge list file (`from to weight` per line); a random grid graph when omitted.
        #[arg(long)]
        edges: Option<PathBuf>,
        /// Start node label.
        from: String,
        /// End node label.
        to: String,
        /// Seed for the random grid graph.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        png: Option<PathBuf>,
    },
    /// Herd immunity threshold for a reproduction number.
    Herd {
        #[arg(long, default_value_t = 3.0)]
        r0: f64,
        /// Vaccinated share in percent.
        #[arg(long, default_value_t = 0.0)]
        vaccination: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        png: Option<PathBuf>,
    },
    /// Classify the logistic map at growth rate `r`.
    Logistic {
        #[arg(long, default_value_t = 3.2)]
        r: f64,
        /// Draw the orbit chart.
        #[arg(long)]
        png: Option<PathBuf>,
        /// Draw the bifurcation diagram.
        #[arg(long)]
        bifurcation: Option<PathBuf>,
    },
}

fn parse_knob(raw: &str) -> Result<KnobUpdate, KnobError> {
    KnobUpdate::parse(raw)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            demo,
            frames,
            seed,
            overrides,
            config,
            png,
            report,
            width,
            height,
        } => {
            let config = match config {
                Some(path) => RunConfig::load(&path)?,
                None => RunConfig::default(),
            };
            let request = RunRequest {
                seed,
                width,
                height,
                config,
                overrides,
                ..RunRequest::new(demo, frames)
            };
            let (summary, widget) = run_headless(&request)?;
            for (name, value) in summary.readouts.iter() {
                println!("{name:<12} {value}");
            }
            println!(
                "{:<12} {} steps over {} frames (seed {})",
                summary.lifecycle.to_string(),
                summary.steps.0,
                summary.frames_delivered,
                summary.seed
            );
            if let Some(path) = png {
                save_png(widget.canvas(), &path)?;
            }
            if let Some(path) = report {
                write_report(&summary, &path)?;
                info!(path = %path.display(), "wrote run report");
            }
        }
        Command::Knobs { demo } => {
            let widget = build_widget(demo, WidgetOptions::default())?;
            for knob in widget.knobs()? {
                let doc = knob.description.as_deref().unwrap_or("");
                println!("{:<24} {:<8} {doc}", knob.name, knob.value.to_string());
            }
        }
        Command::Path {
            edges,
            from,
            to,
            seed,
            png,
        } => {
            let (width, height) = (600.0, 400.0);
            let graph = match edges {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read edge list {}", path.display()))?;
                    parse_edge_list(&text, width, height)?
                }
                None => WeightedGraph::random_grid(width, height, &mut SmallRng::seed_from_u64(seed)),
            };
            let mut selection = PathSelection::default();
            selection.click(graph.require_label(&from)?);
            selection.click(graph.require_label(&to)?);
            selection.solve(&graph)?;
            println!("{}", selection.status(&graph));
            println!(
                "{} nodes, {} edges, {} component(s), average degree {:.2}",
                graph.len(),
                graph.edges().len(),
                graph.component_count(),
                graph.average_degree()
            );
            if let Some(path) = png {
                let mut canvas = Canvas::new(width as u32, height as u32);
                draw_graph(&mut canvas, &graph, &selection);
                save_png(&canvas, &path)?;
            }
        }
        Command::Herd {
            r0,
            vaccination,
            seed,
            png,
        } => {
            let assessment = HerdAssessment::new(r0, vaccination);
            println!("R0          {r0:.1}");
            println!("threshold   {}%", assessment.threshold.round());
            println!("vaccinated  {vaccination}%");
            println!("{}", assessment.status());
            if let Some(path) = png {
                let mut canvas = Canvas::new(300, 300);
                draw_herd(&mut canvas, &vaccinated_cells(vaccination, seed), &assessment);
                save_png(&canvas, &path)?;
            }
        }
        Command::Logistic {
            r,
            png,
            bifurcation,
        } => {
            println!("r = {r:.2}: {}", logistic::classify(r));
            if let Some(path) = png {
                let mut canvas = Canvas::new(600, 300);
                logistic_scene::draw_orbit(&mut canvas, &logistic::orbit(r, 0.5, 100));
                save_png(&canvas, &path)?;
            }
            if let Some(path) = bifurcation {
                let mut canvas = Canvas::new(600, 300);
                logistic_scene::draw_bifurcation(&mut canvas);
                save_png(&canvas, &path)?;
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
