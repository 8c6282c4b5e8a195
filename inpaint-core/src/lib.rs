//! # Inpaint Canvas Core
//!
//! Editor state for mask-driven image editing.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                EditorSession                │
//! ├──────────────────────┬──────────────────────┤
//! │  DrawingSurface      │  History             │
//! │  - Tool mode         │  - JSON snapshots    │
//! │  - Brush settings    │  - Cursor            │
//! │  - Gestures          │  - 50-entry cap      │
//! ├──────────────────────┴──────────────────────┤
//! │  Scene: background image + drawable arena   │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod element;
pub mod error;
pub mod history;
pub mod scene;
pub mod schema;
pub mod session;
pub mod surface;
pub mod wire;

pub use element::{fit_scale, Color, Drawable, DrawableId, ImageLayer, ImageSource, Point, Stroke};
pub use error::{CanvasError, CanvasResult};
pub use history::{History, HISTORY_CAP};
pub use scene::Scene;
pub use schema::SceneDocument;
pub use session::EditorSession;
pub use surface::{BrushSettings, DrawingSurface, SceneChange, ToolMode};
pub use wire::{EditRequest, EditResponse, ErrorBody, EDIT_IMAGE_PATH};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
