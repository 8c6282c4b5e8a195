//! # Inpaint Canvas Renderer
//!
//! CPU rasterization on tiny-skia. Produces the two images an edit request
//! carries:
//!
//! ```text
//! ┌──────────────────────┬──────────────────────┐
//! │  SceneRasterizer     │  MaskCompositor      │
//! │  what the user sees  │  white = editable    │
//! ├──────────────────────┴──────────────────────┤
//! │        data URI codecs (image module)       │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod image;
pub mod mask;
pub mod raster;

pub use error::{RenderError, RenderResult};
pub use image::{
    encode_data_uri, image_source_from_bytes, image_source_from_data_uri, load_image_from_bytes,
    load_image_from_data_uri, parse_data_uri, png_data_uri, DataUri, ImageFormat, TextureData,
};
pub use mask::{Mask, MaskCompositor, MASK_DILATION};
pub use raster::{RasterConfig, SceneRasterizer};
