use crate::paths::AppPaths;
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 640;
pub const DEFAULT_THUMBNAIL_HEIGHT: u32 = 360;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Explicit ffmpeg executable. Takes precedence over bundled and PATH lookups.
    pub ffmpeg_path: Option<String>,
    /// Explicit ffprobe executable.
    pub ffprobe_path: Option<String>,
    /// Output directory for generated thumbnails (platform temp dir when unset).
    pub thumbnail_dir: Option<String>,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            thumbnail_dir: None,
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            thumbnail_height: DEFAULT_THUMBNAIL_HEIGHT,
        }
    }
}

impl IngestSettings {
    pub fn thumbnail_dir(&self, paths: &AppPaths) -> PathBuf {
        self.thumbnail_dir
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| paths.default_thumbnail_dir())
    }
}

pub fn load_ingest_settings(paths: &AppPaths) -> Result<IngestSettings> {
    let path = paths.ingest_settings_path();
    if !path.exists() {
        return Ok(IngestSettings::default());
    }
    let bytes = std::fs::read(&path)?;
    let parsed: IngestSettings = serde_json::from_slice(&bytes).map_err(|e| {
        EngineError::ConfigInvalid(format!(
            "failed to parse ingest settings at {}: {e}",
            path.to_string_lossy()
        ))
    })?;
    if parsed.thumbnail_width == 0 || parsed.thumbnail_height == 0 {
        return Err(EngineError::ConfigInvalid(format!(
            "thumbnail size must be non-zero, got {}x{}",
            parsed.thumbnail_width, parsed.thumbnail_height
        )));
    }
    Ok(parsed)
}

pub fn save_ingest_settings(paths: &AppPaths, settings: &IngestSettings) -> Result<()> {
    let path = paths.ingest_settings_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, format!("{json}\n"))?;
    Ok(())
}
