use crate::{
    config::Config,
    extract::PdfiumRenderer,
    pipeline::Pipeline,
    service::openai::OpenAiClient,
    util::{ensure_dir, has_pdf_extension},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "doc-sorter")]
#[command(about = "Classify incoming PDFs with a language model and file them by year and category")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./doc-sorter.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check credential, prompt, PDFium and output directory.
    Doctor {},
    /// Extract and classify one PDF without moving it.
    Classify { input: PathBuf },
    /// Process a single PDF.
    File { input: PathBuf },
    /// Process every PDF in the input directory.
    Batch {
        #[arg(long)]
        input_dir: Option<PathBuf>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = Config::load(&cfg_path)?;
    let _guard = init_logging(&args, &cfg)?;

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg),
        Command::Classify { input } => classify(&cfg, input),
        Command::File { input } => file(&cfg, input),
        Command::Batch { input_dir } => batch(&cfg, input_dir.as_deref()),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("doc-sorter.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("doc-sorter.example.toml"))
    }
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    let (file_layer, guard) = if let Some(path) = resolve_log_path(cfg) {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from(&cfg.paths.output_dir).join("doc-sorter.log"))
}

fn build_pipeline(cfg: &Config) -> Result<Pipeline<OpenAiClient, PdfiumRenderer>> {
    cfg.validate()?;
    let service = OpenAiClient::new(cfg)?;
    let renderer = PdfiumRenderer::new(cfg);
    Pipeline::new(cfg, service, renderer)
}

fn doctor(cfg: &Config) -> Result<()> {
    let check = |r: Result<()>| match r {
        Ok(()) => serde_json::json!({"ok": true}),
        Err(e) => serde_json::json!({"ok": false, "error": format!("{e:#}")}),
    };

    let diag = serde_json::json!({
        "credential": check(cfg.api_key().map(|_| ())),
        "prompt": check(cfg.validate()),
        "pdfium": check(PdfiumRenderer::new(cfg).check()),
        "output_dir": check(ensure_dir(Path::new(&cfg.paths.output_dir))),
    });
    println!("{}", serde_json::to_string_pretty(&diag)?);
    Ok(())
}

fn classify(cfg: &Config, input: &Path) -> Result<()> {
    validate_input(input)?;
    let pipeline = build_pipeline(cfg)?;
    let preview = pipeline.preview(input);
    println!("{}", serde_json::to_string_pretty(&preview)?);
    Ok(())
}

fn file(cfg: &Config, input: &Path) -> Result<()> {
    validate_input(input)?;
    let pipeline = build_pipeline(cfg)?;
    let report = pipeline.process_document(input);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn batch(cfg: &Config, input_override: Option<&Path>) -> Result<()> {
    let input_dir = input_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.input_dir));
    let pipeline = build_pipeline(cfg)?;
    let report = pipeline.process_batch(&input_dir)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn validate_input(input: &Path) -> Result<()> {
    if !input.exists() {
        return Err(anyhow!("input does not exist: {}", input.display()));
    }
    if !has_pdf_extension(input) {
        warn!("input has no .pdf extension; processing anyway: {}", input.display());
    }
    Ok(())
}
