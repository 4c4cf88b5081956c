//! Headless driving of simloop demos: config loading, frame runs, and reports.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use simloop_core::{EngineOverrides, Generation, KnobUpdate, Lifecycle, Readouts, Tick};
use simloop_models::DemoKind;
use simloop_models::graph::WeightedGraph;
use simloop_render::{Widget, WidgetOptions, build_widget};
use tracing::info;

/// On-disk run configuration. Both sections are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Loop settings layered over the demo's defaults.
    pub engine: EngineOverrides,
    /// Partial parameter object for the demo.
    pub params: Option<Value>,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("config file {} is not a valid run config", path.display()))
    }
}

/// One headless run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub demo: DemoKind,
    pub frames: u64,
    pub seed: Option<u64>,
    pub width: u32,
    pub height: u32,
    pub config: RunConfig,
    /// Applied after construction, before the first frame.
    pub overrides: Vec<KnobUpdate>,
}

impl RunRequest {
    #[must_use]
    pub fn new(demo: DemoKind, frames: u64) -> Self {
        let defaults = WidgetOptions::default();
        Self {
            demo,
            frames,
            seed: None,
            width: defaults.width,
            height: defaults.height,
            config: RunConfig::default(),
            overrides: Vec::new(),
        }
    }

    fn widget_options(&self) -> WidgetOptions {
        WidgetOptions {
            seed: self.seed,
            width: self.width,
            height: self.height,
            params: self.config.params.clone(),
            config: self.config.engine.clone(),
        }
    }
}

/// Summary written after a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub demo: DemoKind,
    pub seed: u64,
    pub frames_requested: u64,
    pub frames_delivered: u64,
    pub steps: Tick,
    pub generation: Generation,
    pub lifecycle: Lifecycle,
    pub readouts: Readouts,
}

/// Build the demo, start it, and deliver up to `frames` frames. The run stops early
/// once the demo finishes.
pub fn run_headless(request: &RunRequest) -> Result<(RunReport, Box<dyn Widget>)> {
    let mut widget = build_widget(request.demo, request.widget_options())
        .with_context(|| format!("failed to build the {} demo", request.demo))?;
    if !request.overrides.is_empty() {
        widget
            .apply_knobs(&request.overrides)
            .context("failed to apply knob overrides")?;
    }
    widget.start().context("failed to start the simulation")?;
    let delivered = widget.advance_frames(request.frames);

    let report = RunReport {
        demo: request.demo,
        seed: widget.seed(),
        frames_requested: request.frames,
        frames_delivered: delivered,
        steps: widget.steps(),
        generation: widget.generation(),
        lifecycle: widget.lifecycle(),
        readouts: widget.readouts().clone(),
    };
    info!(
        demo = %report.demo,
        seed = report.seed,
        frames = report.frames_delivered,
        steps = report.steps.0,
        lifecycle = %report.lifecycle,
        "headless run complete"
    );
    Ok((report, widget))
}

/// Pretty-print `report` as JSON to `path`.
pub fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create report file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report).context("failed to serialize run report")?;
    writer.flush().context("failed to flush run report")?;
    Ok(())
}

/// Parse an edge list: one `from to weight` triple per line; `#` starts a comment.
/// Nodes are laid out on a circle inside a `width × height` surface in order of
/// first appearance.
pub fn parse_edge_list(text: &str, width: f32, height: f32) -> Result<WeightedGraph> {
    let mut edges = Vec::new();
    let mut labels: Vec<&str> = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [from, to, weight] = fields.as_slice() else {
            bail!("line {}: expected `from to weight`, got `{line}`", line_no + 1);
        };
        let weight: u32 = weight
            .parse()
            .with_context(|| format!("line {}: invalid weight `{weight}`", line_no + 1))?;
        for label in [*from, *to] {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        edges.push((*from, *to, weight));
    }

    let mut graph = WeightedGraph::new();
    let (cx, cy) = (width / 2.0, height / 2.0);
    let radius = (width.min(height) / 2.0 - 30.0).max(0.0);
    for (i, label) in labels.iter().enumerate() {
        let angle = std::f32::consts::TAU * i as f32 / labels.len() as f32;
        graph.add_node(
            *label,
            (cx + radius * angle.cos(), cy + radius * angle.sin()).into(),
        );
    }
    for (from, to, weight) in edges {
        graph
            .connect_labels(from, to, weight)
            .with_context(|| format!("invalid edge {from} - {to}"))?;
    }
    Ok(graph)
}
