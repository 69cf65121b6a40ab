use crate::config::IngestSettings;
use crate::paths::AppPaths;
use crate::{EngineError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Resolved locations of the external media tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct FfmpegToolsStatus {
    pub installed: bool,
    pub ffmpeg_path: Option<String>,
    pub ffprobe_path: Option<String>,
    pub ffmpeg_version: Option<String>,
    pub ffprobe_version: Option<String>,
}

/// Resolves ffmpeg and ffprobe once, at startup. Lookup order per tool:
/// explicit setting, bundled copy under `tools/ffmpeg`, then `PATH`.
pub fn locate(paths: &AppPaths, settings: &IngestSettings) -> Result<MediaTools> {
    let ffmpeg = locate_one(
        "ffmpeg",
        settings.ffmpeg_path.as_deref(),
        &paths.ffmpeg_bin_path(),
    )?;
    let ffprobe = locate_one(
        "ffprobe",
        settings.ffprobe_path.as_deref(),
        &paths.ffprobe_bin_path(),
    )?;
    Ok(MediaTools { ffmpeg, ffprobe })
}

fn locate_one(tool: &str, explicit: Option<&str>, bundled: &Path) -> Result<PathBuf> {
    if let Some(explicit) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        let path = PathBuf::from(explicit);
        if path.is_file() {
            return Ok(path);
        }
        // A configured path that is gone is a setup error, not a reason to
        // silently pick up some other binary.
        log::error!("configured {tool} does not exist: {}", path.display());
        return Err(EngineError::ToolUnavailable {
            tool: tool.to_string(),
        });
    }

    if bundled.is_file() {
        return Ok(bundled.to_path_buf());
    }

    find_on_path(tool).ok_or_else(|| EngineError::ToolUnavailable {
        tool: tool.to_string(),
    })
}

fn find_on_path(tool: &str) -> Option<PathBuf> {
    let search = std::env::var_os("PATH")?;
    let file_name = if cfg!(windows) {
        format!("{tool}.exe")
    } else {
        tool.to_string()
    };
    std::env::split_paths(&search)
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
}

pub fn ffmpeg_tools_status(paths: &AppPaths, settings: &IngestSettings) -> FfmpegToolsStatus {
    match locate(paths, settings) {
        Ok(tools) => FfmpegToolsStatus {
            installed: true,
            ffmpeg_path: Some(tools.ffmpeg.to_string_lossy().to_string()),
            ffprobe_path: Some(tools.ffprobe.to_string_lossy().to_string()),
            ffmpeg_version: tool_version_first_line(&tools.ffmpeg),
            ffprobe_version: tool_version_first_line(&tools.ffprobe),
        },
        Err(_) => FfmpegToolsStatus {
            installed: false,
            ffmpeg_path: None,
            ffprobe_path: None,
            ffmpeg_version: None,
            ffprobe_version: None,
        },
    }
}

/// Downloads the platform ffmpeg build into `tools/ffmpeg`.
pub fn install_ffmpeg_tools(paths: &AppPaths) -> Result<()> {
    paths.ensure_dirs()?;

    let destination = paths.ffmpeg_dir();
    let download_url = ffmpeg_sidecar::download::ffmpeg_download_url()
        .map_err(|e| EngineError::InstallFailed(e.to_string()))?;
    let archive_path =
        ffmpeg_sidecar::download::download_ffmpeg_package(download_url, &destination)
            .map_err(|e| EngineError::InstallFailed(e.to_string()))?;
    ffmpeg_sidecar::download::unpack_ffmpeg(&archive_path, &destination)
        .map_err(|e| EngineError::InstallFailed(e.to_string()))?;

    verify_installed(paths)
}

/// Both binaries must land in `tools/ffmpeg`; some platform packages carry
/// ffmpeg alone.
fn verify_installed(paths: &AppPaths) -> Result<()> {
    for (tool, path) in [
        ("ffmpeg", paths.ffmpeg_bin_path()),
        ("ffprobe", paths.ffprobe_bin_path()),
    ] {
        if !path.is_file() {
            return Err(EngineError::InstallFailed(format!(
                "{tool} not found after unpacking into {}",
                paths.ffmpeg_dir().display()
            )));
        }
    }
    Ok(())
}

fn tool_version_first_line(program: &Path) -> Option<String> {
    let output = crate::cmd::command(program).arg("-version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout);
    let first = text.lines().next()?.trim();
    if first.is_empty() {
        return None;
    }
    Some(first.to_string())
}
