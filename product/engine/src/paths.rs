use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub base_dir: PathBuf,
}

impl AppPaths {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.base_dir.join("config")
    }

    pub fn ingest_settings_path(&self) -> PathBuf {
        self.config_dir().join("ingest.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.base_dir.join("tools")
    }

    pub fn ffmpeg_dir(&self) -> PathBuf {
        self.tools_dir().join("ffmpeg")
    }

    pub fn ffmpeg_bin_path(&self) -> PathBuf {
        bundled_bin(&self.ffmpeg_dir(), "ffmpeg")
    }

    pub fn ffprobe_bin_path(&self) -> PathBuf {
        bundled_bin(&self.ffmpeg_dir(), "ffprobe")
    }

    /// Where thumbnails land unless the settings point somewhere else.
    pub fn default_thumbnail_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.config_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        std::fs::create_dir_all(self.ffmpeg_dir())?;
        Ok(())
    }
}

fn bundled_bin(dir: &Path, name: &str) -> PathBuf {
    let mut path = dir.join(name);
    if cfg!(windows) {
        path.set_extension("exe");
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_tools_live_under_tools_ffmpeg() {
        let paths = AppPaths::new(PathBuf::from("/data/clipvault"));
        let ffprobe = paths.ffprobe_bin_path();
        assert!(ffprobe.starts_with("/data/clipvault/tools/ffmpeg"));
        assert_eq!(
            ffprobe.file_stem().and_then(|s| s.to_str()),
            Some("ffprobe")
        );
    }

    #[test]
    fn ensure_dirs_creates_layout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::new(dir.path().join("app"));
        paths.ensure_dirs().expect("ensure dirs");
        assert!(paths.config_dir().is_dir());
        assert!(paths.logs_dir().is_dir());
        assert!(paths.ffmpeg_dir().is_dir());
    }
}
