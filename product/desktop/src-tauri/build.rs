fn main() {
    // Only the ingestion commands are callable from the webview.
    tauri_build::try_build(
        tauri_build::Attributes::new().app_manifest(
            tauri_build::AppManifest::new().commands(&["select_folder", "process_video"]),
        ),
    )
    .expect("failed to run tauri-build");
}
