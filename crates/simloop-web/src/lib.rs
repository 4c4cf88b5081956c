#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{Serializer, from_value};
use simloop_core::{EngineOverrides, FrameCommand, FrameToken, KnobUpdate};
use simloop_models::DemoKind;
use simloop_render::{Widget, WidgetOptions, build_widget};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, ImageData, Window};

/// Options accepted by [`mount_widget`]. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MountOptions {
    /// Seed for reproducible runs; a fresh one is drawn when absent.
    seed: Option<f64>,
    /// Surface size; the canvas element's own size when absent.
    width: Option<u32>,
    height: Option<u32>,
    /// Partial parameter object for the demo.
    params: Option<serde_json::Value>,
    engine: EngineOverrides,
    /// Readout `name` is written into the element with id `{readoutPrefix}{name}`.
    readout_prefix: String,
}

type FrameCallback = Closure<dyn FnMut()>;

struct Mounted {
    widget: Box<dyn Widget>,
    context: CanvasRenderingContext2d,
    readout_prefix: String,
    /// Token the next animation frame will deliver.
    token: Option<FrameToken>,
    /// Browser id of the pending `requestAnimationFrame` call.
    raf_id: Option<i32>,
}

impl Mounted {
    fn blit(&self) -> Result<(), JsValue> {
        let canvas = self.widget.canvas();
        let data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(canvas.pixels()),
            canvas.width(),
            canvas.height(),
        )?;
        self.context.put_image_data(&data, 0.0, 0.0)
    }

    fn publish(&self) {
        let Some(document) = document() else {
            return;
        };
        for (name, value) in self.widget.readouts().iter() {
            set_text(&document, &format!("{}{name}", self.readout_prefix), value);
        }
        set_text(
            &document,
            &format!("{}toggle", self.readout_prefix),
            self.widget.lifecycle().control_label(),
        );
    }

    fn refresh(&self) {
        if let Err(err) = self.blit() {
            warn!(error = ?err, "failed to blit widget canvas");
        }
        self.publish();
    }

    fn cancel_frame(&mut self) {
        self.token = None;
        if let Some(id) = self.raf_id.take() {
            if let Some(window) = window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }
}

/// A widget bound to a page canvas and driven by `requestAnimationFrame`.
#[wasm_bindgen]
pub struct WidgetHandle {
    inner: Rc<RefCell<Mounted>>,
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl WidgetHandle {
    fn new(mounted: Mounted) -> Self {
        let inner = Rc::new(RefCell::new(mounted));
        let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));

        let frame_inner = Rc::clone(&inner);
        let frame_callback = Rc::clone(&callback);
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let mut mounted = frame_inner.borrow_mut();
            mounted.raf_id = None;
            let Some(token) = mounted.token.take() else {
                return;
            };
            let next = mounted.widget.on_frame(token);
            mounted.refresh();
            if let Some(next) = next {
                mounted.token = Some(next);
                mounted.raf_id = request_frame(&frame_callback);
            }
        }) as Box<dyn FnMut()>));

        Self { inner, callback }
    }

    fn schedule(&self, token: FrameToken) {
        let mut mounted = self.inner.borrow_mut();
        mounted.cancel_frame();
        mounted.token = Some(token);
        mounted.raf_id = request_frame(&self.callback);
    }
}

#[wasm_bindgen]
impl WidgetHandle {
    pub fn start(&self) -> Result<(), JsValue> {
        let token = {
            let mut mounted = self.inner.borrow_mut();
            let started = mounted.widget.start();
            mounted.publish();
            started.map_err(rejected)?
        };
        self.schedule(token);
        Ok(())
    }

    pub fn pause(&self) -> Result<(), JsValue> {
        let mut mounted = self.inner.borrow_mut();
        let paused = mounted.widget.pause();
        mounted.cancel_frame();
        mounted.publish();
        paused.map(|_| ()).map_err(rejected)
    }

    pub fn toggle(&self) -> Result<(), JsValue> {
        let command = {
            let mut mounted = self.inner.borrow_mut();
            let command = mounted.widget.toggle();
            mounted.publish();
            command.map_err(rejected)?
        };
        match command {
            FrameCommand::Schedule(token) => self.schedule(token),
            FrameCommand::Cancel(_) => self.inner.borrow_mut().cancel_frame(),
        }
        Ok(())
    }

    pub fn reset(&self) {
        let mut mounted = self.inner.borrow_mut();
        mounted.cancel_frame();
        mounted.widget.reset();
        mounted.refresh();
    }

    /// Apply one knob change, e.g. `setKnob("gravity", 4.2)`.
    #[wasm_bindgen(js_name = setKnob)]
    pub fn set_knob(&self, name: String, value: JsValue) -> Result<(), JsValue> {
        let value: serde_json::Value = from_value(value).map_err(js_error)?;
        let mut mounted = self.inner.borrow_mut();
        mounted
            .widget
            .apply_knobs(&[KnobUpdate::new(name, value)])
            .map_err(js_error)?;
        // Knobs that rebuild the state also cancel the engine's pending frame.
        if mounted.widget.pending_frame().is_none() {
            mounted.cancel_frame();
        }
        if !mounted.widget.lifecycle().is_running() {
            mounted.refresh();
        }
        Ok(())
    }

    /// Knob listing as an array of `{ name, kind, value, description }`.
    pub fn knobs(&self) -> Result<JsValue, JsValue> {
        let knobs = self.inner.borrow().widget.knobs().map_err(js_error)?;
        to_js(&knobs)
    }

    pub fn lifecycle(&self) -> String {
        self.inner.borrow().widget.lifecycle().to_string()
    }

    pub fn readouts(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.borrow().widget.readouts())
    }

    pub fn steps(&self) -> f64 {
        self.inner.borrow().widget.steps().0 as f64
    }

    /// Pointer press in canvas pixels. Returns whether the demo reacted.
    pub fn click(&self, x: f32, y: f32) -> bool {
        let mut mounted = self.inner.borrow_mut();
        let handled = mounted.widget.click(x, y);
        if handled {
            mounted.refresh();
        }
        handled
    }

    /// Demo-specific action such as `remove_barrier` or `seed:3`.
    pub fn trigger(&self, action: &str) -> Result<bool, JsValue> {
        let mut mounted = self.inner.borrow_mut();
        let changed = mounted.widget.trigger(action).map_err(js_error)?;
        if changed {
            mounted.refresh();
        }
        Ok(changed)
    }

    /// Stop the loop and release the frame callback.
    pub fn dispose(&self) {
        self.inner.borrow_mut().cancel_frame();
        self.callback.borrow_mut().take();
    }
}

/// Bind demo `kind` to the canvas with id `canvas_id`. Resolves to `undefined` when the
/// page has no such canvas.
#[wasm_bindgen]
pub fn mount_widget(
    kind: &str,
    canvas_id: &str,
    options: JsValue,
) -> Result<Option<WidgetHandle>, JsValue> {
    let kind = DemoKind::from_str(kind).map_err(js_error)?;
    let options = if options.is_null() || options.is_undefined() {
        MountOptions::default()
    } else {
        from_value::<MountOptions>(options).map_err(js_error)?
    };

    let Some(canvas) = document()
        .and_then(|doc| doc.get_element_by_id(canvas_id))
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
    else {
        return Ok(None);
    };
    let Some(context) = canvas
        .get_context("2d")?
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
    else {
        warn!(canvas_id, "canvas has no 2d context");
        return Ok(None);
    };

    let width = options.width.unwrap_or_else(|| canvas.width()).max(1);
    let height = options.height.unwrap_or_else(|| canvas.height()).max(1);
    canvas.set_width(width);
    canvas.set_height(height);

    let widget = build_widget(
        kind,
        WidgetOptions {
            seed: normalize_seed(options.seed).map_err(js_error)?,
            width,
            height,
            params: options.params,
            config: options.engine,
        },
    )
    .map_err(js_error)?;
    debug!(%kind, canvas_id, width, height, "mounted widget");

    let mounted = Mounted {
        widget,
        context,
        readout_prefix: options.readout_prefix,
        token: None,
        raf_id: None,
    };
    mounted.refresh();
    Ok(Some(WidgetHandle::new(mounted)))
}

fn request_frame(callback: &Rc<RefCell<Option<FrameCallback>>>) -> Option<i32> {
    let callback = callback.borrow();
    let window = window()?;
    let id = window
        .request_animation_frame(callback.as_ref()?.as_ref().unchecked_ref())
        .map_err(|err| warn!(error = ?err, "requestAnimationFrame failed"))
        .ok()?;
    Some(id)
}

fn window() -> Option<Window> {
    web_sys::window()
}

fn document() -> Option<Document> {
    window()?.document()
}

fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

fn normalize_seed(seed: Option<f64>) -> Result<Option<u64>> {
    let Some(value) = seed else {
        return Ok(None);
    };
    ensure!(value.is_finite(), "seed must be a finite number");
    ensure!(value >= 0.0, "seed must be non-negative");
    let truncated = value.floor();
    ensure!(
        truncated <= u64::MAX as f64,
        "seed must be representable as u64"
    );
    Ok(Some(truncated as u64))
}

fn rejected(err: impl std::fmt::Display) -> JsValue {
    warn!(error = %err, "rejected lifecycle transition");
    js_error(err)
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsError::new(&err.to_string()).into()
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(js_error)
}

#[wasm_bindgen]
pub fn version() -> String {
    format!("simloop-web {}", env!("CARGO_PKG_VERSION"))
}

/// Demo kinds accepted by [`mount_widget`].
#[wasm_bindgen]
pub fn demo_kinds() -> Vec<String> {
    DemoKind::ALL.iter().map(ToString::to_string).collect()
}

#[wasm_bindgen]
pub fn default_mount_options() -> Result<JsValue, JsValue> {
    to_js(&MountOptions::default())
}
