use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extensions (lowercase, without the dot) that a folder scan picks up.
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "mkv", "avi"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
}

/// One video file found by a folder scan. `path` is absolute and is the only
/// identifier; records are rebuilt from scratch on every scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub path: String,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    /// `M:SS`, `"0:00"` when the duration could not be measured.
    pub duration: String,
    /// `media://` URI of the generated still frame.
    pub thumbnail_path: String,
}

pub fn is_video_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_ignores_case() {
        assert!(is_video_path(Path::new("CLIP.MP4")));
        assert!(is_video_path(Path::new("/a/b/take.Mov")));
        assert!(is_video_path(Path::new("x.mkv")));
        assert!(is_video_path(Path::new("x.avi")));
        assert!(!is_video_path(Path::new("README.txt")));
        assert!(!is_video_path(Path::new("mp4")));
        assert!(!is_video_path(Path::new("clip.mp4.part")));
    }

    #[test]
    fn wire_shapes_match_ui_contract() {
        let record = FileRecord {
            name: "a.mp4".to_string(),
            path: "/clips/a.mp4".to_string(),
            kind: MediaKind::Video,
        };
        assert_eq!(
            serde_json::to_value(&record).expect("json"),
            serde_json::json!({ "name": "a.mp4", "path": "/clips/a.mp4", "kind": "video" })
        );

        let meta = MediaMetadata {
            duration: "1:05".to_string(),
            thumbnail_path: "media://localhost/tmp/thumb.jpg".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&meta).expect("json"),
            serde_json::json!({
                "duration": "1:05",
                "thumbnailPath": "media://localhost/tmp/thumb.jpg"
            })
        );
    }
}
