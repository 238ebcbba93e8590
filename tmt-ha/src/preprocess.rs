//! Leaf image preprocessing
//!
//! Turns an uploaded JPEG/PNG into the input tensor expected by the leaf
//! disease classifier: RGB, 224×224, values scaled to [0, 1], row-major
//! height × width × channel layout.

use image::{imageops::FilterType, ImageFormat};
use thiserror::Error;
use tracing::debug;

use crate::error::ApiError;

/// Classifier input edge length in pixels
pub const INPUT_SIZE: u32 = 224;

/// RGB channels per pixel
pub const CHANNELS: usize = 3;

/// Preprocessing errors
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Please upload a leaf image first.")]
    Empty,

    /// Content is not JPEG or PNG
    #[error("Unsupported image type: {0} (expected jpg, jpeg or png)")]
    Unsupported(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),
}

impl From<PreprocessError> for ApiError {
    fn from(err: PreprocessError) -> Self {
        match err {
            PreprocessError::Unsupported(_) => ApiError::UnsupportedMediaType(err.to_string()),
            PreprocessError::Empty | PreprocessError::Decode(_) => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}

/// Normalized classifier input
#[derive(Debug, Clone, PartialEq)]
pub struct LeafTensor {
    /// HWC values in [0, 1]
    pub data: Vec<f32>,
    pub width: u32,
    pub height: u32,
}

impl LeafTensor {
    /// Value at (row, column, channel)
    pub fn get(&self, row: u32, col: u32, channel: usize) -> Option<f32> {
        if row >= self.height || col >= self.width || channel >= CHANNELS {
            return None;
        }
        let index = (row as usize * self.width as usize + col as usize) * CHANNELS + channel;
        self.data.get(index).copied()
    }

    /// Nested rows → pixels → channels, the shape of one serving "instance"
    pub fn to_nested(&self) -> Vec<Vec<[f32; CHANNELS]>> {
        self.data
            .chunks_exact(self.width as usize * CHANNELS)
            .map(|row| {
                row.chunks_exact(CHANNELS)
                    .map(|px| [px[0], px[1], px[2]])
                    .collect()
            })
            .collect()
    }
}

/// Identify the uploaded image format from its content
///
/// File names and declared content types are ignored; only the bytes count.
pub fn detect_image_format(bytes: &[u8]) -> Result<ImageFormat, PreprocessError> {
    if bytes.is_empty() {
        return Err(PreprocessError::Empty);
    }

    match infer::get(bytes).map(|kind| kind.mime_type()) {
        Some("image/jpeg") => Ok(ImageFormat::Jpeg),
        Some("image/png") => Ok(ImageFormat::Png),
        Some(other) => Err(PreprocessError::Unsupported(other.to_string())),
        None => Err(PreprocessError::Unsupported("unknown".to_string())),
    }
}

/// Decode, resize and normalize an uploaded leaf photograph
pub fn prepare_leaf_image(bytes: &[u8]) -> Result<LeafTensor, PreprocessError> {
    let format = detect_image_format(bytes)?;

    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| PreprocessError::Decode(e.to_string()))?;

    debug!(
        width = decoded.width(),
        height = decoded.height(),
        ?format,
        "Decoded leaf image"
    );

    let rgb = decoded.to_rgb8();
    let resized = image::imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);

    let data = resized
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / 255.0)
        .collect();

    Ok(LeafTensor {
        data,
        width: INPUT_SIZE,
        height: INPUT_SIZE,
    })
}
