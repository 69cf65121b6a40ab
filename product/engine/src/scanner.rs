use crate::library::{is_video_path, FileRecord, MediaKind};
use crate::{EngineError, Result};
use std::path::{Path, PathBuf};

/// Lists the immediate entries of `dir` and keeps the recognized video files.
///
/// Either the whole listing succeeds or the scan fails; an entry that cannot
/// be read midway fails the scan rather than producing a shorter list.
/// Directories are skipped even when their name carries a video extension,
/// and so are links to directories. Names that are not valid UTF-8 are left
/// out since they cannot be handed to the UI intact.
/// Order follows the directory listing and is not sorted.
pub fn scan(dir: &Path) -> Result<Vec<FileRecord>> {
    let dir = absolute_dir(dir)?;
    let scan_failed = |source: std::io::Error| EngineError::ScanFailed {
        path: dir.clone(),
        source,
    };

    let mut records = Vec::new();
    for entry in std::fs::read_dir(&dir).map_err(scan_failed)? {
        let entry = entry.map_err(scan_failed)?;
        let path = entry.path();
        if !is_video_path(&path) {
            continue;
        }
        // Follows symlinks: a link to a file is kept, a link to a folder is not.
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => continue,
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("skipping dangling link {}", path.display());
                continue;
            }
            Err(e) => return Err(scan_failed(e)),
        }
        let file_name = entry.file_name();
        let (Some(name), Some(full_path)) = (file_name.to_str(), path.to_str()) else {
            log::warn!("skipping non-UTF-8 file name {}", path.display());
            continue;
        };
        records.push(FileRecord {
            name: name.to_string(),
            path: full_path.to_string(),
            kind: MediaKind::Video,
        });
    }

    log::info!("scanned {}: {} video file(s)", dir.display(), records.len());
    Ok(records)
}

fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|source| EngineError::ScanFailed {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(cwd.join(dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").expect("touch");
    }

    fn names(records: &[FileRecord]) -> BTreeSet<String> {
        records.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn keeps_only_video_extensions() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["a.mp4", "b.mov", "notes.txt", "c.avi", "CLIP.MP4", "README.txt", "d.MkV"] {
            touch(dir.path(), name);
        }

        let records = scan(dir.path()).expect("scan");
        let expected: BTreeSet<String> = ["a.mp4", "b.mov", "c.avi", "CLIP.MP4", "d.MkV"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names(&records), expected);

        for record in &records {
            assert_eq!(record.kind, MediaKind::Video);
            assert_eq!(
                PathBuf::from(&record.path),
                dir.path().join(&record.name),
                "path should be the joined absolute path"
            );
        }
    }

    #[test]
    fn does_not_recurse_and_skips_video_named_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "top.mp4");
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).expect("nested");
        touch(&nested, "deep.mp4");
        std::fs::create_dir(dir.path().join("folder.mov")).expect("dir with video ext");

        let records = scan(dir.path()).expect("scan");
        assert_eq!(names(&records), BTreeSet::from(["top.mp4".to_string()]));
    }

    #[test]
    fn empty_directory_yields_empty_list() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(scan(dir.path()).expect("scan").is_empty());
    }

    #[test]
    fn missing_directory_fails_with_scan_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("gone");
        match scan(&missing) {
            Err(EngineError::ScanFailed { path, source }) => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected ScanFailed, got {other:?}"),
        }
    }

    #[test]
    fn file_instead_of_directory_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "a.mp4");
        assert!(matches!(
            scan(&dir.path().join("a.mp4")),
            Err(EngineError::ScanFailed { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_video_is_kept() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("real.bin");
        std::fs::write(&target, b"").expect("target");
        std::os::unix::fs::symlink(&target, dir.path().join("link.mp4")).expect("symlink");

        let records = scan(dir.path()).expect("scan");
        assert_eq!(names(&records), BTreeSet::from(["link.mp4".to_string()]));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_and_dangling_link_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let real_dir = dir.path().join("realdir");
        std::fs::create_dir(&real_dir).expect("realdir");
        std::os::unix::fs::symlink(&real_dir, dir.path().join("folder.mp4")).expect("dir link");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("gone.mov"))
            .expect("dangling link");
        touch(dir.path(), "kept.avi");

        let records = scan(dir.path()).expect("scan");
        assert_eq!(names(&records), BTreeSet::from(["kept.avi".to_string()]));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_are_skipped() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let raw = std::ffi::OsStr::from_bytes(b"bad\xff.mp4");
        std::fs::write(dir.path().join(raw), b"").expect("raw name");
        touch(dir.path(), "good.mp4");

        let records = scan(dir.path()).expect("scan");
        assert_eq!(names(&records), BTreeSet::from(["good.mp4".to_string()]));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_fails_with_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let locked = dir.path().join("locked");
        std::fs::create_dir(&locked).expect("locked");
        touch(&locked, "a.mp4");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).expect("chmod");

        let result = scan(&locked);
        // Root reads the directory regardless of its mode.
        let readable_anyway = std::fs::read_dir(&locked).is_ok();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).expect("restore");
        if readable_anyway {
            return;
        }

        match result {
            Err(EngineError::ScanFailed { path, source }) => {
                assert_eq!(path, locked);
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected ScanFailed, got {other:?}"),
        }
    }
}
