use crate::{
    classify::Classification, config::Config, error::DocumentError, extract::ExtractionMethod,
    filing,
};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FilingDecision {
    /// Proposed destination; the filing step may still add a `-n` suffix.
    File(PathBuf),
    Retry(ExtractionMethod),
    Skip(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    Unreadable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreadable => f.write_str("unreadable"),
        }
    }
}

/// What to do with a document after a classification obtained via `method`.
///
/// Only a native attempt can be retried; after OCR an ambiguous result is
/// filed as-is unless it is unreadable.
pub fn decide(
    cfg: &Config,
    classification: &Classification,
    method: ExtractionMethod,
) -> Result<FilingDecision, DocumentError> {
    if method == ExtractionMethod::Native && classification.is_ambiguous() {
        return Ok(FilingDecision::Retry(ExtractionMethod::Ocr));
    }

    if classification.is_unreadable() {
        return Ok(FilingDecision::Skip(SkipReason::Unreadable));
    }

    Ok(FilingDecision::File(filing::proposed_destination(
        cfg,
        classification,
    )?))
}
