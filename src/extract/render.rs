use super::PageRenderer;
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, RgbaImage};
use pdfium_render::prelude::*;
use std::cell::OnceCell;
use std::path::Path;
use tracing::debug;

/// Page rasterizer backed by PDFium.
///
/// The library is bound on first use so runs that never reach OCR do not need
/// it installed.
pub struct PdfiumRenderer {
    library_dir: String,
    pdfium: OnceCell<Pdfium>,
}

impl PdfiumRenderer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            library_dir: cfg.ocr.pdfium_library_dir.clone(),
            pdfium: OnceCell::new(),
        }
    }

    fn pdfium(&self) -> Result<&Pdfium> {
        if self.pdfium.get().is_none() {
            let bound = bind_pdfium(&self.library_dir)?;
            let _ = self.pdfium.set(bound);
        }
        self.pdfium
            .get()
            .ok_or_else(|| anyhow!("PDFium binding unavailable"))
    }

    /// Binds the library without rendering anything.
    pub fn check(&self) -> Result<()> {
        self.pdfium().map(|_| ())
    }
}

fn bind_pdfium(library_dir: &str) -> Result<Pdfium> {
    let bound = if library_dir.is_empty() {
        Pdfium::bind_to_system_library()
    } else {
        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(library_dir))
            .or_else(|_| Pdfium::bind_to_system_library())
    };
    let bindings = bound.map_err(|e| anyhow!("failed to load PDFium library: {e:?}"))?;
    Ok(Pdfium::new(bindings))
}

impl PageRenderer for PdfiumRenderer {
    fn render_pages(&self, input: &Path, scale: f32) -> Result<Vec<DynamicImage>> {
        let pdfium = self.pdfium()?;

        // The document handle lives only in this scope and is closed on every
        // return path, which also releases the OS file lock.
        let document = pdfium
            .load_pdf_from_file(input, None)
            .map_err(|e| anyhow!("failed to load PDF {}: {e:?}", input.display()))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let mut images = Vec::new();

        for (idx, page) in document.pages().iter().enumerate() {
            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| anyhow!("rendering page {} failed: {e:?}", idx + 1))?;
            let width = bitmap.width().max(0) as u32;
            let height = bitmap.height().max(0) as u32;
            let rgba = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
                .with_context(|| format!("page {} bitmap has unexpected size", idx + 1))?;
            debug!("rendered page {} {}x{}", idx + 1, width, height);
            images.push(DynamicImage::ImageRgba8(rgba));
        }

        Ok(images)
    }
}
