use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub service: Service,
    #[serde(default)]
    pub classifier: Classifier,
    #[serde(default)]
    pub ocr: Ocr,
    #[serde(default)]
    pub text: Text,
    #[serde(default)]
    pub filing: Filing,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// Fails when the classifier prompt cannot be resolved or lacks its placeholder.
    pub fn validate(&self) -> Result<()> {
        let template = self.prompt_template()?;
        if !template.contains(&self.classifier.placeholder) {
            return Err(anyhow!(
                "prompt template does not contain placeholder {}",
                self.classifier.placeholder
            ));
        }
        if self.ocr.render_scale <= 0.0 {
            return Err(anyhow!("ocr.render_scale must be positive"));
        }
        Ok(())
    }

    /// The inline template wins; otherwise the environment variable named by
    /// `classifier.prompt_env`, with literal `\n` sequences turned into newlines.
    pub fn prompt_template(&self) -> Result<String> {
        if !self.classifier.prompt_template.trim().is_empty() {
            return Ok(self.classifier.prompt_template.clone());
        }
        let env_name = self.classifier.prompt_env.as_str();
        match std::env::var(env_name) {
            Ok(v) if !v.trim().is_empty() => Ok(v.replace("\\n", "\n")),
            _ => Err(anyhow!(
                "no prompt template: set classifier.prompt_template or ${env_name}"
            )),
        }
    }

    pub fn api_key(&self) -> Result<String> {
        let env_name = self.service.api_key_env.as_str();
        std::env::var(env_name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("missing service credential: ${env_name} is not set"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub input_dir: String,
    pub output_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            input_dir: "Incoming".into(),
            output_dir: "Filed".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    pub api_base: String,
    pub api_key_env: String,
    pub classify_model: String,
    pub ocr_model: String,
    pub timeout_seconds: u64,
    pub json_mode: bool,
}
impl Default for Service {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            classify_model: "gpt-4-turbo".into(),
            ocr_model: "gpt-4o".into(),
            timeout_seconds: 180,
            json_mode: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Classifier {
    pub prompt_template: String,
    pub prompt_env: String,
    pub placeholder: String,
    pub max_prompt_chars: usize,
}
impl Default for Classifier {
    fn default() -> Self {
        Self {
            prompt_template: "".into(),
            prompt_env: "DOCUMENT_PROMPT".into(),
            placeholder: "{PDF_TEXT}".into(),
            max_prompt_chars: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Ocr {
    pub render_scale: f32,
    pub system_instruction: String,
    pub user_instruction: String,
    pub pdfium_library_dir: String,
}
impl Default for Ocr {
    fn default() -> Self {
        Self {
            render_scale: 2.0,
            system_instruction: "Extract all printed and handwritten text from this document."
                .into(),
            user_instruction: "Extract text from this document.".into(),
            pdfium_library_dir: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Text {
    pub normalize_unicode: bool,
    pub normalize_newlines: bool,
    pub control_chars_to_sanitize: Vec<u8>,
}
impl Default for Text {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            normalize_newlines: true,
            control_chars_to_sanitize: (0u8..32).chain(std::iter::once(127)).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Filing {
    pub unknown_year: String,
}
impl Default for Filing {
    fn default() -> Self {
        Self {
            unknown_year: "Unkn".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
