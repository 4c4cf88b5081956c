//! Type-erased demo widgets: an engine, its scene, and the controls a host wires to
//! buttons, sliders, and pointer events.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use simloop_core::knobs::params_from_value;
use simloop_core::{
    Engine, EngineError, EngineOverrides, FrameCommand, FrameToken, Generation, KnobEntry,
    KnobError, KnobUpdate, Lifecycle, ManualFrameClock, Model, Position, Readouts, Tick,
};
use simloop_models::{
    DemoKind, DiffusionAction, DoublePendulum, GasDiffusion, GeneticDrift, HeatTransfer,
    LorenzAttractor, NaturalSelection, SirOde, SpatialSpread, SpreadAction, TraitSelection,
    ViralAction, ViralCascade,
};
use thiserror::Error;
use tracing::debug;

use crate::scenes::{
    DiffusionScene, DriftScene, EvolutionScene, HeatScene, LorenzScene, PendulumScene,
    SelectionScene, SirScene, SpreadScene, ViralScene, fit_world,
};
use crate::{Canvas, Projection, Scene, SceneRenderer};

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Knob(#[from] KnobError),
    #[error("{kind} has no action named `{action}`")]
    UnknownAction { kind: DemoKind, action: String },
}

/// How to build a widget. Missing fields fall back to the demo's defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetOptions {
    pub seed: Option<u64>,
    pub width: u32,
    pub height: u32,
    /// Partial parameter object, e.g. `{"contact_radius": 40}`.
    pub params: Option<Value>,
    /// Loop settings layered over the demo defaults.
    pub config: EngineOverrides,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            seed: None,
            width: 600,
            height: 400,
            params: None,
            config: EngineOverrides::default(),
        }
    }
}

/// Controls shared by every demo, independent of its model type.
pub trait Widget {
    fn kind(&self) -> DemoKind;
    fn start(&mut self) -> Result<FrameToken, WidgetError>;
    fn pause(&mut self) -> Result<Option<FrameToken>, WidgetError>;
    fn toggle(&mut self) -> Result<FrameCommand, WidgetError>;
    fn reset(&mut self) -> Option<FrameToken>;
    fn on_frame(&mut self, token: FrameToken) -> Option<FrameToken>;
    fn pending_frame(&self) -> Option<FrameToken>;

    /// Deliver `frames` display frames from a local clock; returns callbacks delivered.
    fn advance_frames(&mut self, frames: u64) -> u64;

    fn apply_knobs(&mut self, updates: &[KnobUpdate]) -> Result<(), WidgetError>;
    fn knobs(&self) -> Result<Vec<KnobEntry>, WidgetError>;

    fn readouts(&self) -> &Readouts;
    fn lifecycle(&self) -> Lifecycle;
    fn steps(&self) -> Tick;
    fn generation(&self) -> Generation;
    fn frames(&self) -> u64;
    fn seed(&self) -> u64;

    fn canvas(&self) -> &Canvas;
    /// Resize the drawing surface and redraw.
    fn resize(&mut self, width: u32, height: u32);

    /// Pointer press at canvas pixel `(x, y)`; returns whether the state changed.
    fn click(&mut self, x: f32, y: f32) -> bool;
    /// Named button action: `remove_barrier` for diffusion, `seed:<node>` for viral.
    fn trigger(&mut self, action: &str) -> Result<bool, WidgetError>;
}

/// Ties a model to its scene and its pointer/button bindings.
pub trait Demo: Model + Sized + 'static {
    type Scene: Scene<Self> + Default + 'static;
    const DEMO: DemoKind;

    /// Mapping from canvas pixels to world coordinates for pointer input.
    fn pointer(_canvas: &Canvas, _params: &Self::Params) -> Option<Projection> {
        None
    }

    fn click(_engine: &mut DemoEngine<Self>, _at: Position) -> bool {
        false
    }

    /// `None` when the demo has no such action.
    fn trigger(_engine: &mut DemoEngine<Self>, _action: &str) -> Option<bool> {
        None
    }
}

pub type DemoEngine<M> = Engine<M, SceneRenderer<<M as Demo>::Scene>>;

impl Demo for DoublePendulum {
    type Scene = PendulumScene;
    const DEMO: DemoKind = DemoKind::Pendulum;
}

impl Demo for LorenzAttractor {
    type Scene = LorenzScene;
    const DEMO: DemoKind = DemoKind::Lorenz;
}

impl Demo for SirOde {
    type Scene = SirScene;
    const DEMO: DemoKind = DemoKind::Sir;
}

impl Demo for SpatialSpread {
    type Scene = SpreadScene;
    const DEMO: DemoKind = DemoKind::Spread;

    fn pointer(canvas: &Canvas, params: &Self::Params) -> Option<Projection> {
        Some(fit_world(canvas, params.width, params.height))
    }

    fn click(engine: &mut DemoEngine<Self>, at: Position) -> bool {
        engine.interact(SpreadAction::InfectNear { x: at.x, y: at.y })
    }
}

impl Demo for NaturalSelection {
    type Scene = EvolutionScene;
    const DEMO: DemoKind = DemoKind::Evolution;
}

impl Demo for GasDiffusion {
    type Scene = DiffusionScene;
    const DEMO: DemoKind = DemoKind::Diffusion;

    fn trigger(engine: &mut DemoEngine<Self>, action: &str) -> Option<bool> {
        (action == "remove_barrier").then(|| engine.interact(DiffusionAction::RemoveBarrier))
    }
}

impl Demo for ViralCascade {
    type Scene = ViralScene;
    const DEMO: DemoKind = DemoKind::Viral;

    fn pointer(canvas: &Canvas, params: &Self::Params) -> Option<Projection> {
        Some(fit_world(canvas, params.width, params.height))
    }

    fn click(engine: &mut DemoEngine<Self>, at: Position) -> bool {
        engine.interact(ViralAction::SeedAt { x: at.x, y: at.y })
    }

    fn trigger(engine: &mut DemoEngine<Self>, action: &str) -> Option<bool> {
        let node = action.strip_prefix("seed:")?.trim().parse::<usize>().ok()?;
        Some(engine.interact(ViralAction::SeedNode(node)))
    }
}

impl Demo for GeneticDrift {
    type Scene = DriftScene;
    const DEMO: DemoKind = DemoKind::Drift;
}

impl Demo for TraitSelection {
    type Scene = SelectionScene;
    const DEMO: DemoKind = DemoKind::Selection;
}

impl Demo for HeatTransfer {
    type Scene = HeatScene;
    const DEMO: DemoKind = DemoKind::Heat;
}

/// [`Widget`] over one concrete demo.
pub struct DemoWidget<M: Demo> {
    engine: DemoEngine<M>,
}

impl<M: Demo> DemoWidget<M> {
    pub fn build(model: M, options: WidgetOptions) -> Result<Self, WidgetError> {
        let params = match options.params {
            Some(value) => params_from_value::<M::Params>(value)?,
            None => M::Params::default(),
        };
        let mut config = options.config.apply_to(model.engine_defaults());
        if options.seed.is_some() {
            config.rng_seed = options.seed;
        }
        let renderer = SceneRenderer::new(
            Canvas::new(options.width, options.height),
            M::Scene::default(),
        );
        let engine = Engine::new(model, params, config, renderer)?;
        debug!(kind = M::KIND, seed = engine.seed(), "widget built");
        Ok(Self { engine })
    }

    #[must_use]
    pub fn engine(&self) -> &DemoEngine<M> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut DemoEngine<M> {
        &mut self.engine
    }
}

impl<M: Demo> Widget for DemoWidget<M> {
    fn kind(&self) -> DemoKind {
        M::DEMO
    }

    fn start(&mut self) -> Result<FrameToken, WidgetError> {
        Ok(self.engine.start()?)
    }

    fn pause(&mut self) -> Result<Option<FrameToken>, WidgetError> {
        Ok(self.engine.pause()?)
    }

    fn toggle(&mut self) -> Result<FrameCommand, WidgetError> {
        Ok(self.engine.toggle()?)
    }

    fn reset(&mut self) -> Option<FrameToken> {
        self.engine.reset()
    }

    fn on_frame(&mut self, token: FrameToken) -> Option<FrameToken> {
        self.engine.on_frame(token)
    }

    fn pending_frame(&self) -> Option<FrameToken> {
        self.engine.pending_frame()
    }

    fn advance_frames(&mut self, frames: u64) -> u64 {
        let mut clock = ManualFrameClock::new();
        if let Some(token) = self.engine.pending_frame() {
            clock.schedule(token);
        }
        clock.advance_by(&mut self.engine, frames)
    }

    fn apply_knobs(&mut self, updates: &[KnobUpdate]) -> Result<(), WidgetError> {
        Ok(self.engine.apply_knobs(updates)?)
    }

    fn knobs(&self) -> Result<Vec<KnobEntry>, WidgetError> {
        Ok(self.engine.knobs()?)
    }

    fn readouts(&self) -> &Readouts {
        self.engine.readouts()
    }

    fn lifecycle(&self) -> Lifecycle {
        self.engine.lifecycle()
    }

    fn steps(&self) -> Tick {
        self.engine.steps()
    }

    fn generation(&self) -> Generation {
        self.engine.generation()
    }

    fn frames(&self) -> u64 {
        self.engine.frames()
    }

    fn seed(&self) -> u64 {
        self.engine.seed()
    }

    fn canvas(&self) -> &Canvas {
        self.engine.renderer().canvas()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.engine.renderer_mut().resize(width, height);
        self.engine.redraw();
    }

    fn click(&mut self, x: f32, y: f32) -> bool {
        let projection = M::pointer(self.canvas(), self.engine.params());
        let Some(world) = projection.and_then(|p| p.screen_to_world(x, y)) else {
            return false;
        };
        M::click(&mut self.engine, world)
    }

    fn trigger(&mut self, action: &str) -> Result<bool, WidgetError> {
        M::trigger(&mut self.engine, action).ok_or_else(|| WidgetError::UnknownAction {
            kind: M::DEMO,
            action: action.to_owned(),
        })
    }
}

/// Build the widget for `kind`, rendering its initial frame.
pub fn build_widget(kind: DemoKind, options: WidgetOptions) -> Result<Box<dyn Widget>, WidgetError> {
    Ok(match kind {
        DemoKind::Pendulum => Box::new(DemoWidget::build(DoublePendulum, options)?),
        DemoKind::Lorenz => Box::new(DemoWidget::build(LorenzAttractor, options)?),
        DemoKind::Sir => Box::new(DemoWidget::build(SirOde, options)?),
        DemoKind::Spread => Box::new(DemoWidget::build(SpatialSpread, options)?),
        DemoKind::Evolution => Box::new(DemoWidget::build(NaturalSelection, options)?),
        DemoKind::Diffusion => Box::new(DemoWidget::build(GasDiffusion, options)?),
        DemoKind::Viral => Box::new(DemoWidget::build(ViralCascade, options)?),
        DemoKind::Drift => Box::new(DemoWidget::build(GeneticDrift, options)?),
        DemoKind::Selection => Box::new(DemoWidget::build(TraitSelection, options)?),
        DemoKind::Heat => Box::new(DemoWidget::build(HeatTransfer, options)?),
    })
}
