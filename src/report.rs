use crate::{classify::Classification, extract::ExtractionMethod, policy::FilingDecision};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Filed { destination: String },
    Unreadable,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptReport {
    pub method: ExtractionMethod,
    pub extracted_chars: usize,
    pub classification: Option<serde_json::Value>,
}

impl AttemptReport {
    pub fn new(method: ExtractionMethod, text: &str, result: Option<&Classification>) -> Self {
        Self {
            method,
            extracted_chars: text.chars().count(),
            classification: result.map(|c| c.raw.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub path: String,
    pub outcome: Outcome,
    pub attempts: Vec<AttemptReport>,
}

/// Result of a dry run: what would happen to one document.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub input: String,
    pub extracted_chars: usize,
    pub classification: Option<serde_json::Value>,
    pub decision: Option<FilingDecision>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub input_dir: String,
    pub started: String,
    pub finished: String,
    pub filed: usize,
    pub unreadable: usize,
    pub failed: usize,
    pub skipped: Vec<String>,
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    pub fn push(&mut self, doc: DocumentReport) {
        match doc.outcome {
            Outcome::Filed { .. } => self.filed += 1,
            Outcome::Unreadable => self.unreadable += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
        self.documents.push(doc);
    }
}
