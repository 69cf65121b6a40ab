use crate::cmd;
use crate::tools::MediaTools;
use crate::{EngineError, Result};
use serde::Deserialize;
use std::ffi::OsString;
use std::path::Path;

/// Container duration in seconds, falling back to the first video stream's
/// duration when the container does not report one.
pub fn probe_duration_seconds(tools: &MediaTools, input: &Path) -> Result<f64> {
    let output = cmd::run_tool(
        "ffprobe",
        cmd::command(&tools.ffprobe)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(input_arg(input)),
    )?;

    let parsed: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
    parsed
        .duration_seconds()
        .ok_or_else(|| EngineError::DurationMissing {
            input: input.to_path_buf(),
        })
}

/// Writes exactly one frame of `input`, scaled to `width`x`height`, to
/// `output_image`. The image format follows the output extension.
pub fn extract_frame(
    tools: &MediaTools,
    input: &Path,
    output_image: &Path,
    seek_seconds: f64,
    width: u32,
    height: u32,
) -> Result<()> {
    let ts = if seek_seconds.is_finite() && seek_seconds >= 0.0 {
        seek_seconds
    } else {
        0.0
    };

    cmd::run_tool(
        "ffmpeg",
        cmd::command(&tools.ffmpeg)
            .args(["-nostdin", "-y", "-v", "error"])
            .args(["-ss", &format!("{ts:.3}")])
            .arg("-i")
            .arg(input_arg(input))
            .args(["-frames:v", "1"])
            .args(["-vf", &format!("scale={width}:{height}")])
            .args(["-q:v", "3"])
            .arg(output_image),
    )?;

    Ok(())
}

/// Names the input through the `file:` protocol so it is never taken for an
/// option or a network URL.
fn input_arg(input: &Path) -> OsString {
    let mut arg = OsString::from("file:");
    arg.push(input.as_os_str());
    arg
}

#[derive(Debug, Clone, Deserialize)]
struct FfprobeOutput {
    streams: Option<Vec<FfprobeStream>>,
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Clone, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

impl FfprobeOutput {
    fn duration_seconds(&self) -> Option<f64> {
        let from_format = self
            .format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .and_then(parse_seconds);
        from_format.or_else(|| {
            self.streams
                .as_ref()?
                .iter()
                .filter(|st| st.codec_type.as_deref() == Some("video"))
                .find_map(|st| st.duration.as_deref().and_then(parse_seconds))
        })
    }
}

fn parse_seconds(value: &str) -> Option<f64> {
    let seconds: f64 = value.trim().parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(seconds)
}
