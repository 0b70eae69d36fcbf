use std::path::Path;
use tracing::{debug, warn};

/// Text from the PDF's own text layer: pages joined by newlines, outer-trimmed.
///
/// Fails soft. A corrupted, encrypted or otherwise unreadable file yields an
/// empty string and a warning; a single page that cannot be decoded contributes
/// an empty line.
pub fn extract_text(input: &Path) -> String {
    let document = match lopdf::Document::load(input) {
        Ok(d) => d,
        Err(e) => {
            warn!("native extraction failed for {}: {e}", input.display());
            return String::new();
        }
    };

    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    let texts: Vec<String> = pages
        .iter()
        .map(|&n| match document.extract_text(&[n]) {
            Ok(t) => t,
            Err(e) => {
                debug!("page {n} of {} has no usable text: {e}", input.display());
                String::new()
            }
        })
        .collect();

    let text = texts.join("\n").trim().to_string();
    debug!(
        "native extraction {} pages={} chars={}",
        input.display(),
        pages.len(),
        text.chars().count()
    );
    text
}
