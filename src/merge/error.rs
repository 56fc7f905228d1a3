use thiserror::Error;

/// Merge errors
#[derive(Error, Debug)]
pub enum MergeError {
    /// The base config text is not valid JSON
    #[error("config JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
