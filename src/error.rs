use crate::extract::ExtractionMethod;
use thiserror::Error;

/// Why one document was not filed. Always contained at the document boundary.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("classification failed after {0} extraction")]
    Classification(ExtractionMethod),

    #[error("classification is missing `{0}`")]
    IncompleteClassification(&'static str),

    #[error("filing failed: {0:#}")]
    Filing(anyhow::Error),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}
