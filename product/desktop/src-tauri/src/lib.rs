use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use clipvault_engine::bridge::{HostBridge, IngestBridge};
use clipvault_engine::ingest::{FolderPicker, IngestOrchestrator};
use clipvault_engine::library::{FileRecord, MediaMetadata};
use clipvault_engine::paths::AppPaths;
use clipvault_engine::probe::MediaProbe;
use clipvault_engine::{config, media_uri, EngineError};
use tauri::http::{header, Request, Response, StatusCode};
use tauri::{Emitter, Manager, State};
use tauri_plugin_dialog::DialogExt;

const FOLDER_SELECTED_EVENT: &str = "folder-selected";

struct AppState {
    bridge: Arc<dyn HostBridge>,
}

/// Native directory chooser backed by the dialog plugin.
struct DialogFolderPicker {
    app: tauri::AppHandle,
}

impl FolderPicker for DialogFolderPicker {
    fn pick_folder(&self) -> Option<PathBuf> {
        let picked = self
            .app
            .dialog()
            .file()
            .set_title("Connect Local Folder")
            .blocking_pick_folder()?;
        match picked.into_path() {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("folder picker returned an unusable path: {e}");
                None
            }
        }
    }
}

#[tauri::command]
fn select_folder(state: State<'_, AppState>) {
    state.bridge.select_folder();
}

#[tauri::command]
async fn process_video(
    state: State<'_, AppState>,
    path: String,
) -> Result<MediaMetadata, String> {
    let bridge = Arc::clone(&state.bridge);
    tauri::async_runtime::spawn_blocking(move || bridge.process_video(&path))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

fn media_response(reply: media_uri::MediaReply) -> Response<Cow<'static, [u8]>> {
    let mut builder = Response::builder()
        .status(reply.status)
        .header(header::CONTENT_TYPE, reply.content_type)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_LENGTH, reply.body.len());
    if let Some(range) = reply.content_range {
        builder = builder.header(header::CONTENT_RANGE, range);
    }
    builder
        .body(Cow::Owned(reply.body))
        .unwrap_or_else(|_| Response::new(Cow::Borrowed(&[][..])))
}

fn error_response(status: StatusCode, message: String) -> Response<Cow<'static, [u8]>> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Cow::Owned(message.into_bytes()))
        .unwrap_or_else(|_| Response::new(Cow::Borrowed(&[][..])))
}

/// Serves `media://localhost/<percent-encoded absolute path>`, honouring `Range`.
fn serve_media(request: &Request<Vec<u8>>) -> Response<Cow<'static, [u8]>> {
    let path = match media_uri::resolve_media_uri(request.uri().path()) {
        Ok(path) => path,
        Err(e) => {
            log::warn!("rejected media request {}: {e}", request.uri());
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };
    // A Range value that is not visible ASCII is answered like any other bad range.
    let range = request
        .headers()
        .get(header::RANGE)
        .map(|v| v.to_str().unwrap_or_default());

    match media_uri::read_media(&path, range) {
        Ok(reply) => media_response(reply),
        Err(EngineError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("media file not found: {}", path.display());
            error_response(StatusCode::NOT_FOUND, String::new())
        }
        Err(e @ EngineError::InvalidMediaUri(_)) => {
            log::warn!("rejected media request {}: {e}", request.uri());
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            log::warn!("could not read media file {}: {e}", path.display());
            error_response(StatusCode::INTERNAL_SERVER_ERROR, String::new())
        }
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            let base_dir = app.path().app_data_dir()?;
            let paths = AppPaths::new(base_dir);
            paths.ensure_dirs()?;

            app.handle().plugin(
                tauri_plugin_log::Builder::default()
                    .level(log::LevelFilter::Info)
                    .target(tauri_plugin_log::Target::new(
                        tauri_plugin_log::TargetKind::Folder {
                            path: paths.logs_dir(),
                            file_name: Some("clipvault".to_string()),
                        },
                    ))
                    .build(),
            )?;

            let settings = config::load_ingest_settings(&paths)?;
            let probe = MediaProbe::from_settings(&paths, &settings);
            log::info!("thumbnails go to {}", probe.thumbnail_dir().display());

            let picker = Arc::new(DialogFolderPicker {
                app: app.handle().clone(),
            });
            let orchestrator = Arc::new(IngestOrchestrator::new(picker, probe));
            let bridge: Arc<dyn HostBridge> = Arc::new(IngestBridge::new(orchestrator));

            let emitter = app.handle().clone();
            bridge.subscribe_folder_results(Arc::new(move |files: &[FileRecord]| {
                if let Err(e) = emitter.emit(FOLDER_SELECTED_EVENT, files) {
                    log::warn!("failed to deliver folder results: {e}");
                }
            }));

            app.manage(AppState { bridge });
            Ok(())
        })
        .plugin(tauri_plugin_dialog::init())
        .register_uri_scheme_protocol(media_uri::MEDIA_SCHEME, |_ctx, request| {
            serve_media(&request)
        })
        .invoke_handler(tauri::generate_handler![process_video, select_folder])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
