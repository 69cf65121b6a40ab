//! Per-file metadata pipeline: measure the duration, then extract one
//! thumbnail frame.
//!
//! The two steps fail differently. A duration that cannot be measured
//! degrades to `"0:00"`; a thumbnail that cannot be produced fails the whole
//! call, since a record without any visual reference is useless to the UI.

use crate::config::IngestSettings;
use crate::ffmpeg;
use crate::library::MediaMetadata;
use crate::media_uri;
use crate::paths::AppPaths;
use crate::tools::{self, MediaTools};
use crate::{EngineError, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const MAX_NAME_ATTEMPTS: usize = 32;

/// Outcome of the duration step. Never an error: failures become `Unmeasured`.
#[derive(Debug, Clone, PartialEq)]
pub enum DurationStep {
    Measured(f64),
    Unmeasured(String),
}

impl DurationStep {
    pub fn formatted(&self) -> String {
        match self {
            DurationStep::Measured(seconds) => format_duration(*seconds),
            DurationStep::Unmeasured(_) => format_duration(0.0),
        }
    }

    /// Where to grab the thumbnail frame: halfway in, or the first frame when
    /// the length is unknown.
    pub fn seek_seconds(&self) -> f64 {
        match self {
            DurationStep::Measured(seconds) => seconds / 2.0,
            DurationStep::Unmeasured(_) => 0.0,
        }
    }
}

#[derive(Debug, Clone)]
enum ToolState {
    Ready(MediaTools),
    Unavailable { tool: String },
}

#[derive(Debug, Clone)]
pub struct MediaProbe {
    tools: ToolState,
    thumbnail_dir: PathBuf,
    thumbnail_width: u32,
    thumbnail_height: u32,
}

impl MediaProbe {
    pub fn new(tools: MediaTools, settings: &IngestSettings, thumbnail_dir: PathBuf) -> Self {
        Self {
            tools: ToolState::Ready(tools),
            thumbnail_dir,
            thumbnail_width: settings.thumbnail_width,
            thumbnail_height: settings.thumbnail_height,
        }
    }

    /// A probe whose every call fails with `ToolUnavailable`.
    pub fn unavailable(tool: &str, settings: &IngestSettings, thumbnail_dir: PathBuf) -> Self {
        Self {
            tools: ToolState::Unavailable {
                tool: tool.to_string(),
            },
            thumbnail_dir,
            thumbnail_width: settings.thumbnail_width,
            thumbnail_height: settings.thumbnail_height,
        }
    }

    /// Resolves the tools once and builds the probe. A missing tool is logged
    /// here and then reported by every `probe` call.
    pub fn from_settings(paths: &AppPaths, settings: &IngestSettings) -> Self {
        let thumbnail_dir = settings.thumbnail_dir(paths);
        match tools::locate(paths, settings) {
            Ok(found) => {
                log::info!(
                    "media tools: ffmpeg={} ffprobe={}",
                    found.ffmpeg.display(),
                    found.ffprobe.display()
                );
                Self::new(found, settings, thumbnail_dir)
            }
            Err(EngineError::ToolUnavailable { tool }) => {
                log::error!("{tool} not found; video processing is disabled until it is installed");
                Self::unavailable(&tool, settings, thumbnail_dir)
            }
            Err(e) => {
                log::error!("media tool lookup failed: {e}");
                Self::unavailable("ffmpeg", settings, thumbnail_dir)
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.tools, ToolState::Ready(_))
    }

    pub fn thumbnail_dir(&self) -> &Path {
        &self.thumbnail_dir
    }

    pub fn probe(&self, input: &Path) -> Result<MediaMetadata> {
        let tools = match &self.tools {
            ToolState::Ready(tools) => tools,
            ToolState::Unavailable { tool } => {
                return Err(EngineError::ToolUnavailable { tool: tool.clone() })
            }
        };
        check_input(input)?;

        let duration = measure_duration(tools, input);
        if let DurationStep::Unmeasured(reason) = &duration {
            log::warn!("duration unavailable for {}: {reason}", input.display());
        }

        let thumbnail = self
            .write_thumbnail(tools, input, duration.seek_seconds())
            .map_err(|source| {
                log::warn!("thumbnail failed for {}: {source}", input.display());
                EngineError::ThumbnailFailed {
                    input: input.to_path_buf(),
                    source: Box::new(source),
                }
            })?;

        Ok(MediaMetadata {
            duration: duration.formatted(),
            thumbnail_path: media_uri::to_media_uri(&thumbnail)?,
        })
    }

    fn write_thumbnail(&self, tools: &MediaTools, input: &Path, seek_seconds: f64) -> Result<PathBuf> {
        let output = reserve_thumbnail_path(&self.thumbnail_dir)?;
        let result = ffmpeg::extract_frame(
            tools,
            input,
            &output,
            seek_seconds,
            self.thumbnail_width,
            self.thumbnail_height,
        )
        .and_then(|()| ensure_non_empty(&output));

        if let Err(e) = result {
            let _ = std::fs::remove_file(&output);
            return Err(e);
        }
        Ok(output)
    }
}

/// Only absolute paths to existing regular files reach the tools. URLs,
/// option-like strings, relative paths and directories are refused here.
fn check_input(input: &Path) -> Result<()> {
    let invalid = |reason: &'static str| EngineError::InvalidInput {
        input: input.to_path_buf(),
        reason,
    };
    if !input.is_absolute() {
        return Err(invalid("path is not absolute"));
    }
    match std::fs::metadata(input) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(invalid("not a regular file")),
        Err(_) => Err(invalid("file does not exist")),
    }
}

pub fn measure_duration(tools: &MediaTools, input: &Path) -> DurationStep {
    match ffmpeg::probe_duration_seconds(tools, input) {
        Ok(seconds) => DurationStep::Measured(seconds),
        Err(e) => DurationStep::Unmeasured(e.to_string()),
    }
}

/// `M:SS` with unbounded minutes. Fractions are truncated; anything negative
/// or non-finite reads as zero.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// `thumb-<unix-millis>-<0..=999>.jpg`
pub fn thumbnail_file_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let suffix = Uuid::new_v4().as_u128() % 1000;
    format!("thumb-{millis}-{suffix}.jpg")
}

/// Claims a fresh thumbnail name by creating the file exclusively, so two
/// probes running at the same moment can never write to the same image.
fn reserve_thumbnail_path(dir: &Path) -> Result<PathBuf> {
    let dir = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(dir)
    };
    std::fs::create_dir_all(&dir)?;
    for _ in 0..MAX_NAME_ATTEMPTS {
        let candidate = dir.join(thumbnail_file_name());
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(EngineError::Io(e)),
        }
    }
    Err(EngineError::Io(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("no free thumbnail name in {}", dir.display()),
    )))
}

fn ensure_non_empty(path: &Path) -> Result<()> {
    let len = std::fs::metadata(path)?.len();
    if len == 0 {
        return Err(EngineError::ExternalToolFailed {
            tool: "ffmpeg".to_string(),
            code: Some(0),
            stderr: format!("no frame written to {}", path.display()),
        });
    }
    Ok(())
}
