#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;

use folder_combiner_service::{
    get_combine_session as service_get_combine_session,
    poll_combine_events as service_poll_combine_events, start_combine as service_start_combine,
    CombineRequest, CombineSessionSnapshot, SequencedEvent,
};

/// Called by the frontend once the folder dialog returns a selection. A
/// cancelled dialog never reaches this command.
#[tauri::command]
fn start_combine(root: String, progress: Option<bool>) -> Result<String, String> {
    service_start_combine(CombineRequest {
        root: PathBuf::from(root),
        progress: progress.unwrap_or(false),
        ..CombineRequest::default()
    })
    .map_err(|err| err.to_string())
}

#[tauri::command]
fn poll_combine_events(session_id: String, from_seq: u64) -> Result<Vec<SequencedEvent>, String> {
    service_poll_combine_events(&session_id, from_seq).map_err(|err| err.to_string())
}

#[tauri::command]
fn get_combine_session(session_id: String) -> Result<CombineSessionSnapshot, String> {
    service_get_combine_session(&session_id).map_err(|err| err.to_string())
}

fn main() {
    tauri::Builder::default()
        .invoke_handler(tauri::generate_handler![
            start_combine,
            poll_combine_events,
            get_combine_session,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
