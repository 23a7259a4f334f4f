//! Utility functions for the conversion pipeline.
//!
//! Image helpers, input discovery, logging setup and, with the `pdf` feature,
//! a PDF rasterizer.

pub mod image;
pub mod io;
#[cfg(feature = "pdf")]
pub mod pdf;

pub use image::{crop_region, save_image};
pub use io::{collect_pdfs, ensure_dir, is_pdf_file, stem_safe};
#[cfg(feature = "pdf")]
pub use pdf::HayroRasterizer;

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// It's typically called at the start of an application to enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
