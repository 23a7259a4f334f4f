//! PDF rasterization with the pure Rust `hayro` renderer.

use std::path::Path;
use std::sync::Arc;

use hayro::{InterpreterSettings, Pdf, RenderSettings};
use image::RgbImage;

use crate::core::constants::PDF_POINTS_PER_INCH;
use crate::core::{PageRasterizer, PipelineError, PipelineResult};

/// Renders PDF pages with `hayro`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HayroRasterizer;

impl HayroRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl PageRasterizer for HayroRasterizer {
    fn render(&self, path: &Path, dpi: u32) -> PipelineResult<Vec<RgbImage>> {
        let data = std::fs::read(path)
            .map_err(|e| PipelineError::rasterize(path, format!("Failed to open PDF: {e}")))?;
        let pdf = Pdf::new(Arc::new(data))
            .map_err(|e| PipelineError::rasterize(path, format!("Failed to parse PDF: {e:?}")))?;

        let scale = dpi as f32 / PDF_POINTS_PER_INCH;
        let settings = RenderSettings {
            x_scale: scale,
            y_scale: scale,
            ..Default::default()
        };
        let interpreter_settings = InterpreterSettings::default();

        let page_count = pdf.pages().len();
        let mut pages = Vec::with_capacity(page_count);
        for index in 0..page_count {
            let page = pdf.pages().get(index).ok_or_else(|| {
                PipelineError::rasterize(path, format!("Failed to get page {}", index + 1))
            })?;
            let media_box = page.media_box();
            if media_box.x1 - media_box.x0 <= 0.0 || media_box.y1 - media_box.y0 <= 0.0 {
                return Err(PipelineError::rasterize(
                    path,
                    format!("Invalid page size on page {}", index + 1),
                ));
            }

            let pixmap = hayro::render(page, &interpreter_settings, &settings);
            let rgba = pixmap.data_as_u8_slice();
            let mut rgb = Vec::with_capacity(pixmap.width() as usize * pixmap.height() as usize * 3);
            for chunk in rgba.chunks(4) {
                rgb.extend_from_slice(&chunk[..3]);
            }

            let image = RgbImage::from_raw(u32::from(pixmap.width()), u32::from(pixmap.height()), rgb)
                .ok_or_else(|| {
                    PipelineError::rasterize(
                        path,
                        format!("Failed to convert page {} to an image", index + 1),
                    )
                })?;
            tracing::debug!(
                target: "converter",
                page = index + 1,
                width = image.width(),
                height = image.height(),
                "Rendered page"
            );
            pages.push(image);
        }
        Ok(pages)
    }
}
