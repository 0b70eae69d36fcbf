use crate::{classify::Classification, config::Config, error::DocumentError, util::ensure_dir};
use anyhow::{anyhow, Context};
use std::path::{Path, PathBuf};
use tracing::info;

/// Year directory name: the first four characters of `date`, or the configured
/// placeholder when the date is absent, empty or the literal "unknown".
pub fn year_for(date: Option<&str>, unknown_year: &str) -> String {
    match date {
        Some(d) if !d.is_empty() && d != "unknown" => d.chars().take(4).collect(),
        _ => unknown_year.to_string(),
    }
}

/// `{output_dir}/{year}/{year} - {category}`
pub fn destination_dir(cfg: &Config, category: &str, date: Option<&str>) -> PathBuf {
    let year = year_for(date, &cfg.filing.unknown_year);
    PathBuf::from(&cfg.paths.output_dir)
        .join(&year)
        .join(format!("{year} - {category}"))
}

/// Replaces path separators and control characters so a model-supplied value
/// stays a single path component.
pub fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Where a classified document should go, before collision handling.
pub fn proposed_destination(
    cfg: &Config,
    classification: &Classification,
) -> Result<PathBuf, DocumentError> {
    let category = classification
        .category
        .as_deref()
        .map(sanitize_component)
        .filter(|c| !c.is_empty())
        .ok_or(DocumentError::IncompleteClassification("category"))?;
    let date = classification
        .date
        .as_deref()
        .ok_or(DocumentError::IncompleteClassification("date"))?;
    let filename = classification
        .filename
        .as_deref()
        .map(sanitize_component)
        .filter(|f| !f.trim_matches('.').is_empty())
        .ok_or(DocumentError::IncompleteClassification("filename"))?;

    Ok(destination_dir(cfg, &category, Some(date)).join(filename))
}

/// Splits like `name.ext` → (`name`, `.ext`); leading dots do not start an extension.
fn split_extension(name: &str) -> (&str, &str) {
    let leading_dots = name.len() - name.trim_start_matches('.').len();
    match name.rfind('.') {
        Some(i) if i > leading_dots => (&name[..i], &name[i..]),
        _ => (name, ""),
    }
}

/// `filename` if free in `dir`, else `{stem}-{n}{ext}` with the smallest free `n >= 1`.
pub fn unique_filename(dir: &Path, filename: &str) -> String {
    if !dir.join(filename).exists() {
        return filename.to_string();
    }
    let (stem, ext) = split_extension(filename);
    let mut n: u32 = 1;
    loop {
        let candidate = format!("{stem}-{n}{ext}");
        if !dir.join(&candidate).exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Moves `input` to `proposed`, creating its directory and resolving name
/// collisions. A rename is the only mutation: on failure the source stays put.
pub fn move_document(input: &Path, proposed: &Path) -> Result<PathBuf, DocumentError> {
    let dir = proposed
        .parent()
        .ok_or_else(|| DocumentError::Filing(anyhow!("no parent for {}", proposed.display())))?;
    let filename = proposed
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| DocumentError::Filing(anyhow!("no file name in {}", proposed.display())))?;

    ensure_dir(dir).map_err(DocumentError::Filing)?;

    let destination = dir.join(unique_filename(dir, filename));
    std::fs::rename(input, &destination)
        .with_context(|| format!("move {} -> {}", input.display(), destination.display()))
        .map_err(DocumentError::Filing)?;

    info!("moved {} to {}", input.display(), destination.display());
    Ok(destination)
}
