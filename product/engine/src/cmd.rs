use crate::{EngineError, Result};
use std::ffi::OsStr;
use std::process::{Command, Output, Stdio};

pub fn command(program: impl AsRef<OsStr>) -> Command {
    let mut cmd = Command::new(program);
    cmd.stdin(Stdio::null());
    configure_for_background(&mut cmd);
    cmd
}

/// Runs `cmd` to completion and maps spawn and exit failures onto the engine
/// error taxonomy. `tool` is only used for error reporting.
pub fn run_tool(tool: &str, cmd: &mut Command) -> Result<Output> {
    let output = cmd.output().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => EngineError::ToolUnavailable {
            tool: tool.to_string(),
        },
        _ => EngineError::Io(e),
    })?;

    if !output.status.success() {
        return Err(EngineError::ExternalToolFailed {
            tool: tool.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}

#[cfg(windows)]
fn configure_for_background(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;

    // Prevent console windows from flashing up while probing media.
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn configure_for_background(_cmd: &mut Command) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn missing_program_maps_to_tool_unavailable() {
        let err = run_tool("ffprobe", &mut command("clipvault-definitely-not-installed"))
            .expect_err("spawn should fail");
        assert!(matches!(err, EngineError::ToolUnavailable { tool } if tool == "ffprobe"));
    }

    #[test]
    fn non_zero_exit_carries_code_and_stderr() {
        let err = run_tool("sh", command("sh").args(["-c", "echo broken >&2; exit 3"]))
            .expect_err("exit 3 should fail");
        match err {
            EngineError::ExternalToolFailed { tool, code, stderr } => {
                assert_eq!(tool, "sh");
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
