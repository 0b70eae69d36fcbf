use super::PageRenderer;
use crate::{
    config::Config,
    service::{ChatMessage, ChatRequest, ChatService, ContentPart, ImageUrl},
};
use anyhow::{anyhow, Context, Result};
use base64::Engine as _;
use image::{imageops, DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;
use tracing::{info, warn};

/// Transcribe a scanned PDF with a vision model.
///
/// Every page is rendered at `ocr.render_scale`, the pages are stacked into one
/// composite image and a single request is sent. Fails soft: any failure along
/// the way yields an empty string and a warning.
pub fn extract_text(
    cfg: &Config,
    renderer: &dyn PageRenderer,
    service: &dyn ChatService,
    input: &Path,
) -> String {
    info!("vision OCR for {}", input.display());
    match transcribe(cfg, renderer, service, input) {
        Ok(text) => text,
        Err(e) => {
            warn!("vision OCR failed for {}: {e:#}", input.display());
            String::new()
        }
    }
}

fn transcribe(
    cfg: &Config,
    renderer: &dyn PageRenderer,
    service: &dyn ChatService,
    input: &Path,
) -> Result<String> {
    let pages = renderer.render_pages(input, cfg.ocr.render_scale)?;
    let composite =
        stack_pages(&pages).ok_or_else(|| anyhow!("no pages rendered for {}", input.display()))?;
    let data_uri = encode_png_data_uri(&composite)?;
    let req = build_request(cfg, data_uri);
    let text = service.complete(&req)?;
    Ok(text.trim().to_string())
}

/// Pages top-to-bottom on one canvas as wide as the widest page. Narrower pages
/// leave the remainder of their band black. `None` for an empty page list.
pub fn stack_pages(pages: &[DynamicImage]) -> Option<RgbImage> {
    if pages.is_empty() {
        return None;
    }

    let width = pages.iter().map(|p| p.width()).max().unwrap_or(0);
    let height = pages.iter().map(|p| p.height()).sum();
    let mut canvas = RgbImage::new(width, height);

    let mut y_offset: i64 = 0;
    for page in pages {
        imageops::replace(&mut canvas, &page.to_rgb8(), 0, y_offset);
        y_offset += i64::from(page.height());
    }

    Some(canvas)
}

pub fn encode_png_data_uri(image: &RgbImage) -> Result<String> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .with_context(|| "PNG encoding of composite image")?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(buf.into_inner());
    Ok(format!("data:image/png;base64,{encoded}"))
}

fn build_request(cfg: &Config, data_uri: String) -> ChatRequest {
    ChatRequest {
        model: cfg.service.ocr_model.clone(),
        messages: vec![
            ChatMessage::system(cfg.ocr.system_instruction.clone()),
            ChatMessage::user_parts(vec![
                ContentPart::Text {
                    text: cfg.ocr.user_instruction.clone(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_uri },
                },
            ]),
        ],
        response_format: None,
    }
}
