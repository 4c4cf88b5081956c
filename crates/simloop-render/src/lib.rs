//! Rendering for simloop demos.
//!
//! Scenes draw into a CPU [`Canvas`] so the same frames can be blitted to a browser
//! canvas, written out as PNG snapshots, or inspected in tests. [`build_widget`] pairs
//! each demo model with its scene behind the object-safe [`Widget`] trait.

use std::io::Cursor;
use std::path::Path;

use image::ImageFormat;
use thiserror::Error;
use tracing::info;

pub mod canvas;
pub mod color;
pub mod projection;
pub mod scene;
pub mod scenes;
pub mod widget;

pub use canvas::Canvas;
pub use color::{Rgba, palette};
pub use projection::Projection;
pub use scene::{Scene, SceneRenderer};
pub use widget::{Demo, DemoWidget, Widget, WidgetError, WidgetOptions, build_widget};

/// Errors from encoding or writing canvas snapshots.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Encode the canvas as PNG bytes.
pub fn encode_png(canvas: &Canvas) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    canvas
        .image()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Write the canvas to `path` as a PNG file.
pub fn save_png(canvas: &Canvas, path: impl AsRef<Path>) -> Result<(), RenderError> {
    let path = path.as_ref();
    let bytes = encode_png(canvas)?;
    std::fs::write(path, &bytes).map_err(|source| RenderError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), width = canvas.width(), height = canvas.height(), "saved snapshot");
    Ok(())
}
