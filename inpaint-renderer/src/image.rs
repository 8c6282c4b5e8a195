//! Image loading utilities.
//!
//! Decodes and encodes images carried as `data:` URIs, the form in which the
//! editor ships pixels to and from the edit endpoint.

use base64::Engine;
use inpaint_core::ImageSource;

use crate::error::{RenderError, RenderResult};

/// Decoded RGBA pixels (straight alpha).
#[derive(Debug, Clone)]
pub struct TextureData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel).
    pub data: Vec<u8>,
    /// Original format of the image.
    pub format: ImageFormat,
}

impl TextureData {
    /// Convert to a premultiplied tiny-skia pixmap.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are zero or do not match the data.
    pub fn to_pixmap(&self) -> RenderResult<tiny_skia::Pixmap> {
        let size = tiny_skia::IntSize::from_wh(self.width, self.height).ok_or(
            RenderError::Surface {
                width: self.width,
                height: self.height,
            },
        )?;
        let mut data = self.data.clone();
        for pixel in data.chunks_exact_mut(4) {
            let alpha = u16::from(pixel[3]);
            for channel in &mut pixel[..3] {
                // Rounded division by 255.
                #[allow(clippy::cast_possible_truncation)]
                let premultiplied = ((u16::from(*channel) * alpha + 127) / 255) as u8;
                *channel = premultiplied;
            }
        }
        tiny_skia::Pixmap::from_vec(data, size).ok_or(RenderError::Surface {
            width: self.width,
            height: self.height,
        })
    }
}

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    /// MIME type used when building data URIs. Unknown formats are labelled
    /// PNG, matching what the edit endpoint assumes.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png | Self::Unknown => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }
}

/// A parsed `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Media type before the first `;` (may be empty).
    pub mime: String,
    /// Decoded payload.
    pub bytes: Vec<u8>,
}

/// Parse a data URI such as `data:image/png;base64,iVBORw0KGgo...`.
///
/// # Errors
///
/// Returns an error if the prefix or comma is missing or the payload does not
/// decode.
pub fn parse_data_uri(uri: &str) -> RenderResult<DataUri> {
    let uri_data = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::DataUri("missing data: prefix".to_string()))?;

    // Find the comma separating metadata from data
    let (metadata, encoded_data) = uri_data
        .split_once(',')
        .ok_or_else(|| RenderError::DataUri("missing comma".to_string()))?;

    let bytes = if metadata.split(';').any(|part| part == "base64") {
        base64::engine::general_purpose::STANDARD
            .decode(encoded_data.trim())
            .map_err(|e| RenderError::DataUri(format!("bad base64 payload: {e}")))?
    } else {
        urlencoding_decode(encoded_data)?
    };

    let mime = metadata.split(';').next().unwrap_or_default().to_string();
    Ok(DataUri { mime, bytes })
}

/// Build a base64 data URI.
#[must_use]
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Build a PNG data URI.
#[must_use]
pub fn png_data_uri(bytes: &[u8]) -> String {
    encode_data_uri("image/png", bytes)
}

/// Simple URL decoding (percent-encoding).
fn urlencoding_decode(input: &str) -> RenderResult<Vec<u8>> {
    let mut result = Vec::with_capacity(input.len());
    let mut bytes = input.bytes();

    while let Some(b) = bytes.next() {
        if b == b'%' {
            let hex: Vec<u8> = bytes.by_ref().take(2).collect();
            let byte = std::str::from_utf8(&hex)
                .ok()
                .filter(|h| h.len() == 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| RenderError::DataUri("invalid URL encoding".to_string()))?;
            result.push(byte);
        } else {
            result.push(b);
        }
    }

    Ok(result)
}

/// Load an image from raw bytes.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded.
pub fn load_image_from_bytes(data: &[u8]) -> RenderResult<TextureData> {
    let format = ImageFormat::from_magic_bytes(data);

    let img = image::load_from_memory(data).map_err(|e| RenderError::Decode(e.to_string()))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(TextureData {
        width,
        height,
        data: rgba.into_raw(),
        format,
    })
}

/// Load an image from a data URI.
///
/// # Errors
///
/// Returns an error if the data URI is malformed or the image cannot be decoded.
pub fn load_image_from_data_uri(uri: &str) -> RenderResult<TextureData> {
    let parsed = parse_data_uri(uri)?;
    load_image_from_bytes(&parsed.bytes)
}

/// Describe a data-URI image for the scene (decodes once to learn its size).
///
/// # Errors
///
/// Returns an error if the image cannot be decoded or is zero-sized.
pub fn image_source_from_data_uri(uri: &str) -> RenderResult<ImageSource> {
    let texture = load_image_from_data_uri(uri)?;
    Ok(ImageSource::new(uri, texture.width, texture.height)?)
}

/// Describe raw image file bytes for the scene, wrapping them in a data URI.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded or is zero-sized.
pub fn image_source_from_bytes(bytes: &[u8]) -> RenderResult<ImageSource> {
    let texture = load_image_from_bytes(bytes)?;
    let uri = encode_data_uri(texture.format.mime(), bytes);
    Ok(ImageSource::new(uri, texture.width, texture.height)?)
}
