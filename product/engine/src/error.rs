use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not read folder {path}: {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("external tool is unavailable: {tool}")]
    ToolUnavailable { tool: String },

    #[error("external tool failed: {tool} (code={code:?}) {stderr}")]
    ExternalToolFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("no duration reported for {input}")]
    DurationMissing { input: PathBuf },

    #[error("not a local video file: {input} ({reason})")]
    InvalidInput {
        input: PathBuf,
        reason: &'static str,
    },

    #[error("thumbnail extraction failed for {input}: {source}")]
    ThumbnailFailed {
        input: PathBuf,
        #[source]
        source: Box<EngineError>,
    },

    #[error("invalid media uri: {0}")]
    InvalidMediaUri(String),

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tool install failed: {0}")]
    InstallFailed(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
