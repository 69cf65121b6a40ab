//! `media://` locators let the UI process address host files without any
//! filesystem capability of its own. The host resolves them back to absolute
//! paths when serving the custom scheme.

use crate::{EngineError, Result};
use http_range_header::parse_range_header;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use url::Url;

pub const MEDIA_SCHEME: &str = "media";
const MEDIA_HOST: &str = "localhost";

/// Upper bound on one partial response. Players ask again for the rest.
pub const MAX_RANGE_BYTES: u64 = 1024 * 1024;

/// Builds `media://localhost/<percent-encoded absolute path>`.
pub fn to_media_uri(path: &Path) -> Result<String> {
    let file_url = Url::from_file_path(path).map_err(|_| {
        EngineError::InvalidMediaUri(format!("not an absolute path: {}", path.display()))
    })?;
    Ok(format!("{MEDIA_SCHEME}://{MEDIA_HOST}{}", file_url.path()))
}

/// Accepts either a full `media://` URI or the bare (still percent-encoded)
/// path component of one, and returns the absolute filesystem path.
pub fn resolve_media_uri(uri: &str) -> Result<PathBuf> {
    let encoded_path = match uri.split_once("://") {
        Some((scheme, rest)) => {
            if scheme != MEDIA_SCHEME {
                return Err(EngineError::InvalidMediaUri(format!(
                    "unexpected scheme: {scheme}"
                )));
            }
            // Drop the authority; everything from the first '/' is the path.
            match rest.find('/') {
                Some(idx) => &rest[idx..],
                None => "",
            }
        }
        None => uri,
    };
    decode_path(encoded_path)
}

fn decode_path(encoded_path: &str) -> Result<PathBuf> {
    let encoded_path = encoded_path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    if !encoded_path.starts_with('/') || encoded_path.len() < 2 {
        return Err(EngineError::InvalidMediaUri(format!(
            "path must be absolute: {encoded_path:?}"
        )));
    }

    let file_url = Url::parse(&format!("file://{encoded_path}"))
        .map_err(|e| EngineError::InvalidMediaUri(format!("{encoded_path}: {e}")))?;
    file_url
        .to_file_path()
        .map_err(|_| EngineError::InvalidMediaUri(format!("not a local path: {encoded_path}")))
}

/// Content type sent back for a served file, keyed on its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

/// Which bytes of a file one request gets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteSpan {
    Whole,
    /// Inclusive on both ends.
    Partial { start: u64, end: u64 },
    Unsatisfiable,
}

/// Maps an optional `Range` header onto a file of `file_size` bytes.
/// Multi-range requests are answered with their first range only, and a
/// partial span never exceeds `MAX_RANGE_BYTES`.
pub fn select_span(range_header: Option<&str>, file_size: u64) -> ByteSpan {
    let Some(header) = range_header else {
        return ByteSpan::Whole;
    };
    let parsed = match parse_range_header(header) {
        Ok(parsed) => parsed,
        Err(_) => return ByteSpan::Unsatisfiable,
    };
    let ranges = match parsed.validate(file_size) {
        Ok(ranges) => ranges,
        Err(_) => return ByteSpan::Unsatisfiable,
    };
    let Some(first) = ranges.into_iter().next() else {
        return ByteSpan::Unsatisfiable;
    };

    let start = *first.start();
    let end = (*first.end()).min(start.saturating_add(MAX_RANGE_BYTES - 1));
    ByteSpan::Partial { start, end }
}

/// Status, headers and body for one served file, independent of the webview.
#[derive(Debug)]
pub struct MediaReply {
    pub status: u16,
    pub content_type: &'static str,
    pub content_range: Option<String>,
    pub body: Vec<u8>,
}

/// Reads `path` for a `media://` request. With a `Range` header only the
/// selected span is read; without one the whole file is returned.
pub fn read_media(path: &Path, range_header: Option<&str>) -> Result<MediaReply> {
    let meta = std::fs::metadata(path)?;
    if !meta.is_file() {
        return Err(EngineError::InvalidMediaUri(format!(
            "not a file: {}",
            path.display()
        )));
    }
    let file_size = meta.len();
    let content_type = content_type_for(path);

    let reply = match select_span(range_header, file_size) {
        ByteSpan::Whole => MediaReply {
            status: 200,
            content_type,
            content_range: None,
            body: std::fs::read(path)?,
        },
        ByteSpan::Partial { start, end } => MediaReply {
            status: 206,
            content_type,
            content_range: Some(format!("bytes {start}-{end}/{file_size}")),
            body: read_span(path, start, end - start + 1)?,
        },
        ByteSpan::Unsatisfiable => MediaReply {
            status: 416,
            content_type,
            content_range: Some(format!("bytes */{file_size}")),
            body: Vec::new(),
        },
    };
    Ok(reply)
}

fn read_span(path: &Path, start: u64, len: u64) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(start))?;
    let mut body = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
    file.take(len).read_to_end(&mut body)?;
    Ok(body)
}
