pub mod native;
pub mod ocr;
pub mod render;

use anyhow::Result;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub use render::PdfiumRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    Native,
    Ocr,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::Native => f.write_str("native"),
            ExtractionMethod::Ocr => f.write_str("ocr"),
        }
    }
}

/// Rasterizes every page of a PDF, in document order.
pub trait PageRenderer {
    fn render_pages(&self, input: &Path, scale: f32) -> Result<Vec<DynamicImage>>;
}
