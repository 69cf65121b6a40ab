use std::path::PathBuf;

use clipvault_engine::config;
use clipvault_engine::paths::AppPaths;
use clipvault_engine::tools;

fn main() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_help();
        return Ok(());
    }

    let mut base_dir: Option<PathBuf> = None;
    let mut install_ffmpeg = false;
    let mut show_status = false;
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--base-dir" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| "--base-dir requires a value".to_string())?;
                base_dir = Some(PathBuf::from(v));
            }
            "--install-ffmpeg" => install_ffmpeg = true,
            "--status" => show_status = true,
            "--force" => force = true,
            other => return Err(format!("unknown arg: {other} (try --help)")),
        }
        i += 1;
    }

    if !install_ffmpeg && !show_status {
        return Err("nothing to do (pass --install-ffmpeg or --status)".to_string());
    }

    let base_dir = base_dir
        .or_else(default_base_dir)
        .ok_or_else(|| "could not determine base dir; pass --base-dir".to_string())?;

    let paths = AppPaths::new(base_dir);
    paths.ensure_dirs().map_err(|e| e.to_string())?;
    let settings = config::load_ingest_settings(&paths).map_err(|e| e.to_string())?;

    println!("Base dir: {}", paths.base_dir.to_string_lossy());

    if install_ffmpeg {
        let bundled = paths.ffmpeg_bin_path().is_file() && paths.ffprobe_bin_path().is_file();
        if bundled && !force {
            println!("FFmpeg: already installed ({})", paths.ffmpeg_dir().to_string_lossy());
        } else {
            println!("FFmpeg: installing into {}...", paths.ffmpeg_dir().to_string_lossy());
            tools::install_ffmpeg_tools(&paths).map_err(|e| e.to_string())?;
            println!("FFmpeg: installed");
        }
    }

    let status = tools::ffmpeg_tools_status(&paths, &settings);
    if !status.installed {
        return Err("ffmpeg/ffprobe not found (run with --install-ffmpeg)".to_string());
    }
    println!(
        "ffmpeg:  {} ({})",
        status.ffmpeg_path.unwrap_or_default(),
        status.ffmpeg_version.unwrap_or_else(|| "version unknown".to_string())
    );
    println!(
        "ffprobe: {} ({})",
        status.ffprobe_path.unwrap_or_default(),
        status.ffprobe_version.unwrap_or_else(|| "version unknown".to_string())
    );

    Ok(())
}

fn default_base_dir() -> Option<PathBuf> {
    if let Ok(v) = std::env::var("CLIPVAULT_BASE_DIR") {
        let t = v.trim();
        if !t.is_empty() {
            return Some(PathBuf::from(t));
        }
    }

    // Match Tauri's app_data_dir() for the desktop identifier.
    let identifier = "app.clipvault.desktop";
    if cfg!(windows) {
        let appdata = std::env::var("APPDATA").ok()?;
        return Some(PathBuf::from(appdata.trim()).join(identifier));
    }
    let home = std::env::var("HOME").ok().filter(|h| !h.trim().is_empty())?;
    if cfg!(target_os = "macos") {
        return Some(
            PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(identifier),
        );
    }
    let data_home = std::env::var("XDG_DATA_HOME")
        .ok()
        .filter(|d| !d.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(home).join(".local").join("share"));
    Some(data_home.join(identifier))
}

fn print_help() {
    println!(
        r#"clipvault_setup

Bootstraps the external media tools (ffmpeg + ffprobe) that video processing needs.

Usage:
  cargo run --bin clipvault_setup -- --install-ffmpeg
  cargo run --bin clipvault_setup -- --status

Options:
  --base-dir <path>   Override base dir (default: $CLIPVAULT_BASE_DIR, else the app data dir)
  --install-ffmpeg    Install ffmpeg + ffprobe into <base-dir>/tools/ffmpeg
  --status            Report which ffmpeg/ffprobe the app will use
  --force             Reinstall even if present
"#
    );
}
