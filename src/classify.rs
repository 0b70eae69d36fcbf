use crate::{
    config::Config,
    redact::redact_sensitive,
    service::{types::ResponseFormat, ChatMessage, ChatRequest, ChatService},
    text::normalize_extracted,
    util::truncate_chars,
};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

const UNREADABLE: &str = "unreadable";
const AMBIGUITY_MARKERS: [&str; 2] = ["unknown", "unidentified"];

/// Metadata returned by the classifier for one document.
///
/// Fields the model omitted (or returned as non-strings) are `None`; whether that
/// matters is decided when filing, not when parsing. A `date` key that is present
/// but null or not a string becomes `""`, which files under the placeholder year.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub category: Option<String>,
    pub date: Option<String>,
    pub filename: Option<String>,
    pub raw: Value,
}

impl Classification {
    pub fn from_value(raw: Value) -> Result<Self> {
        let obj = raw
            .as_object()
            .ok_or_else(|| anyhow!("classifier response is not a JSON object"))?;
        let field = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
        Ok(Self {
            category: field("category"),
            date: obj
                .get("date")
                .map(|v| v.as_str().unwrap_or_default().to_string()),
            filename: field("filename"),
            raw,
        })
    }

    /// Case-insensitive exact match of `category` against "unreadable".
    pub fn is_unreadable(&self) -> bool {
        self.category
            .as_deref()
            .map(|c| c.to_lowercase() == UNREADABLE)
            .unwrap_or(false)
    }

    /// True when the lowercased JSON form of the whole result contains
    /// "unknown" or "unidentified" anywhere, keys and values alike.
    pub fn is_ambiguous(&self) -> bool {
        let flat = self.raw.to_string().to_lowercase();
        AMBIGUITY_MARKERS.iter().any(|m| flat.contains(m))
    }
}

pub fn parse_response(body: &str) -> Result<Classification> {
    let raw: Value =
        serde_json::from_str(body.trim()).with_context(|| "classifier response is not JSON")?;
    Classification::from_value(raw)
}

/// Builds classification prompts and interprets the replies.
pub struct Classifier {
    cfg: Config,
    template: String,
}

impl Classifier {
    pub fn new(cfg: &Config) -> Result<Self> {
        let template = cfg.prompt_template()?;
        Ok(Self {
            cfg: cfg.clone(),
            template,
        })
    }

    /// Normalized, redacted, then truncated text. Redaction comes before the cut
    /// so a number split at the boundary is never sent half-visible.
    pub fn prepare_text(&self, text: &str) -> String {
        let normalized = normalize_extracted(&self.cfg, text);
        let redacted = redact_sensitive(&normalized);
        truncate_chars(&redacted, self.cfg.classifier.max_prompt_chars).to_string()
    }

    pub fn build_prompt(&self, text: &str) -> String {
        self.template
            .replace(&self.cfg.classifier.placeholder, &self.prepare_text(text))
    }

    /// `None` means "classification failed, do not file": the service call or the
    /// JSON parse failed, and the reason has been logged.
    pub fn classify(&self, service: &dyn ChatService, text: &str) -> Option<Classification> {
        let req = ChatRequest {
            model: self.cfg.service.classify_model.clone(),
            messages: vec![ChatMessage::system(self.build_prompt(text))],
            response_format: self
                .cfg
                .service
                .json_mode
                .then(ResponseFormat::json_object),
        };

        let body = match service.complete(&req) {
            Ok(body) => body,
            Err(e) => {
                warn!("error communicating with classifier: {e:#}");
                return None;
            }
        };

        match parse_response(&body) {
            Ok(c) => {
                debug!("classification {}", c.raw);
                Some(c)
            }
            Err(e) => {
                warn!("error parsing classifier response: {e:#}; raw output: {body}");
                None
            }
        }
    }
}
