use crate::{
    classify::Classifier,
    config::Config,
    error::DocumentError,
    extract::{native, ocr, ExtractionMethod, PageRenderer},
    filing,
    policy::{self, FilingDecision},
    report::{AttemptReport, BatchReport, DocumentReport, Outcome, Preview},
    service::ChatService,
    util::{has_pdf_extension, now_rfc3339},
};
use anyhow::{anyhow, Context, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Per-document state machine: native extraction, classification, an optional
/// OCR retry, then filing or skipping. Documents are processed one at a time.
pub struct Pipeline<S: ChatService, R: PageRenderer> {
    cfg: Config,
    classifier: Classifier,
    service: S,
    renderer: R,
}

impl<S: ChatService, R: PageRenderer> Pipeline<S, R> {
    pub fn new(cfg: &Config, service: S, renderer: R) -> Result<Self> {
        Ok(Self {
            cfg: cfg.clone(),
            classifier: Classifier::new(cfg)?,
            service,
            renderer,
        })
    }

    pub fn extract(&self, method: ExtractionMethod, input: &Path) -> String {
        match method {
            ExtractionMethod::Native => native::extract_text(input),
            ExtractionMethod::Ocr => {
                ocr::extract_text(&self.cfg, &self.renderer, &self.service, input)
            }
        }
    }

    /// Never fails: every error, and any panic from the extraction libraries, is
    /// folded into the report's outcome and logged.
    pub fn process_document(&self, input: &Path) -> DocumentReport {
        info!("processing {}", input.display());

        let mut attempts = Vec::new();
        let run = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run_document(input, &mut attempts)
        }));
        let outcome = match run {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                error!("error processing {}: {err:#}", input.display());
                Outcome::Failed {
                    reason: format!("{err:#}"),
                }
            }
            Err(payload) => {
                let reason = format!("panic: {}", panic_message(payload.as_ref()));
                error!("error processing {}: {reason}", input.display());
                Outcome::Failed { reason }
            }
        };

        DocumentReport {
            path: input.display().to_string(),
            outcome,
            attempts,
        }
    }

    fn run_document(
        &self,
        input: &Path,
        attempts: &mut Vec<AttemptReport>,
    ) -> Result<Outcome, DocumentError> {
        let meta =
            std::fs::metadata(input).with_context(|| format!("stat {}", input.display()))?;
        if !meta.is_file() {
            return Err(anyhow!("not a regular file: {}", input.display()).into());
        }

        let mut method = ExtractionMethod::Native;
        loop {
            let text = self.extract(method, input);
            let classification = self.classifier.classify(&self.service, &text);
            attempts.push(AttemptReport::new(method, &text, classification.as_ref()));

            let classification = classification.ok_or(DocumentError::Classification(method))?;

            match policy::decide(&self.cfg, &classification, method)? {
                FilingDecision::Retry(next) => {
                    warn!(
                        "low-confidence classification for {}: {}; retrying with {next} extraction",
                        input.display(),
                        classification.raw
                    );
                    method = next;
                }
                FilingDecision::Skip(reason) => {
                    warn!("{} classified as {reason}; skipping", input.display());
                    return Ok(Outcome::Unreadable);
                }
                FilingDecision::File(proposed) => {
                    let destination = filing::move_document(input, &proposed)?;
                    return Ok(Outcome::Filed {
                        destination: destination.display().to_string(),
                    });
                }
            }
        }
    }

    /// Native extraction and one classification, without retrying or moving
    /// anything. A decision that cannot be made is reported, not raised.
    pub fn preview(&self, input: &Path) -> Preview {
        let method = ExtractionMethod::Native;
        let text = self.extract(method, input);
        let classification = self.classifier.classify(&self.service, &text);

        let (decision, error) = match &classification {
            None => (None, Some(DocumentError::Classification(method).to_string())),
            Some(c) => match policy::decide(&self.cfg, c, method) {
                Ok(d) => (Some(d), None),
                Err(e) => (None, Some(format!("{e:#}"))),
            },
        };

        Preview {
            input: input.display().to_string(),
            extracted_chars: text.chars().count(),
            classification: classification.map(|c| c.raw),
            decision,
            error,
        }
    }

    /// Processes every PDF directly inside `input_dir`, sorted by name. Only a
    /// failure to list the directory aborts the batch.
    pub fn process_batch(&self, input_dir: &Path) -> Result<BatchReport> {
        let mut entries = std::fs::read_dir(input_dir)
            .with_context(|| format!("listing {}", input_dir.display()))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<PathBuf>>>()
            .with_context(|| format!("listing {}", input_dir.display()))?;
        entries.sort();

        let mut report = BatchReport {
            input_dir: input_dir.display().to_string(),
            started: now_rfc3339(),
            ..Default::default()
        };

        for path in entries {
            if !path.is_file() || !has_pdf_extension(&path) {
                info!("skipping {}", path.display());
                report.skipped.push(path.display().to_string());
                continue;
            }
            report.push(self.process_document(&path));
        }

        report.finished = now_rfc3339();
        info!(
            "batch done filed={} unreadable={} failed={} skipped={}",
            report.filed,
            report.unreadable,
            report.failed,
            report.skipped.len()
        );
        Ok(report)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
