//! Image saving and cropping helpers.

use crate::core::{PipelineError, PipelineResult};
use crate::domain::PixelRect;
use image::{RgbImage, imageops};
use std::path::Path;

/// Saves an image, choosing the encoder from the file extension.
pub fn save_image(image: &RgbImage, path: &Path) -> PipelineResult<()> {
    image.save(path).map_err(|source| PipelineError::ImageSave {
        path: path.to_path_buf(),
        source,
    })
}

/// Copies the part of `image` under `region`.
///
/// The region is clamped to the image first. Returns `None` when nothing of it
/// lies inside the image or the clamped region has zero area.
pub fn crop_region(image: &RgbImage, region: &PixelRect) -> Option<RgbImage> {
    let clamped = region.clamp_to(image.width(), image.height())?;
    Some(
        imageops::crop_imm(
            image,
            clamped.x1 as u32,
            clamped.y1 as u32,
            clamped.width() as u32,
            clamped.height() as u32,
        )
        .to_image(),
    )
}
