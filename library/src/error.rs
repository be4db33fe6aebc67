use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid point '{0}': expected two numbers separated by whitespace")]
    InvalidPoint(String),
    #[error("Unsupported snapshot version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("Unknown node: {0}")]
    UnknownNode(String),
}
