use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;

use anyhow::{anyhow, Result};
use folder_combiner_core::{
    combine_with_callback, CombineOptions, CombineSummary, ProgressEvent, OUTPUT_FILE_NAME,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombineRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub root: PathBuf,
    #[serde(default)]
    pub progress: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CombineSessionStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SequencedEvent {
    pub seq: u64,
    #[serde(flatten)]
    pub event: ProgressEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombineSessionSnapshot {
    pub session_id: String,
    pub status: CombineSessionStatus,
    pub output_path: PathBuf,
    pub summary: Option<CombineSummary>,
    pub error: Option<String>,
    pub total_events: u64,
}

#[derive(Debug, Clone)]
struct CombineSession {
    status: CombineSessionStatus,
    output_path: PathBuf,
    summary: Option<CombineSummary>,
    error: Option<String>,
    events: Vec<SequencedEvent>,
}

static SESSIONS: Lazy<Mutex<HashMap<String, CombineSession>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Registers a session and runs the combine on a worker thread. Progress is
/// buffered per session; callers poll it at whatever cadence suits them.
pub fn start_combine(request: CombineRequest) -> Result<String> {
    if request.root.as_os_str().is_empty() {
        return Err(anyhow!("combine request is missing a root folder"));
    }

    let session_id = request
        .session_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    {
        let mut sessions = lock_sessions()?;
        if sessions.contains_key(&session_id) {
            return Err(anyhow!("combine session already exists: {session_id}"));
        }
        sessions.insert(
            session_id.clone(),
            CombineSession {
                status: CombineSessionStatus::Running,
                output_path: request.root.join(OUTPUT_FILE_NAME),
                summary: None,
                error: None,
                events: Vec::new(),
            },
        );
    }

    let thread_session_id = session_id.clone();
    thread::spawn(move || {
        let options = CombineOptions {
            root: request.root,
            progress: request.progress,
        };

        let run_result = combine_with_callback(&options, |event| {
            if let Ok(mut sessions) = lock_sessions() {
                if let Some(session) = sessions.get_mut(&thread_session_id) {
                    let seq = session.events.len() as u64 + 1;
                    session.events.push(SequencedEvent { seq, event });
                }
            }
        });

        let Ok(mut sessions) = lock_sessions() else {
            return;
        };
        let Some(session) = sessions.get_mut(&thread_session_id) else {
            return;
        };
        match run_result {
            Ok(summary) => {
                info!(
                    "combine session {} completed with {} file(s)",
                    thread_session_id, summary.added_files
                );
                session.summary = Some(summary);
                session.status = CombineSessionStatus::Completed;
                session.error = None;
            }
            Err(err) => {
                let message = format_error_chain(&err);
                error!("combine session {} failed: {}", thread_session_id, message);
                session.status = CombineSessionStatus::Failed;
                session.error = Some(message);
            }
        }
    });

    Ok(session_id)
}

pub fn poll_combine_events(session_id: &str, from_seq: u64) -> Result<Vec<SequencedEvent>> {
    let sessions = lock_sessions()?;
    let session = sessions
        .get(session_id)
        .ok_or_else(|| anyhow!("combine session not found: {session_id}"))?;

    Ok(session
        .events
        .iter()
        .filter(|event| event.seq > from_seq)
        .cloned()
        .collect())
}

pub fn get_combine_session(session_id: &str) -> Result<CombineSessionSnapshot> {
    let sessions = lock_sessions()?;
    let session = sessions
        .get(session_id)
        .ok_or_else(|| anyhow!("combine session not found: {session_id}"))?;

    Ok(CombineSessionSnapshot {
        session_id: session_id.to_string(),
        status: session.status.clone(),
        output_path: session.output_path.clone(),
        summary: session.summary.clone(),
        error: session.error.clone(),
        total_events: session.events.len() as u64,
    })
}

fn format_error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn lock_sessions() -> Result<std::sync::MutexGuard<'static, HashMap<String, CombineSession>>> {
    SESSIONS
        .lock()
        .map_err(|_| anyhow!("combine session registry lock poisoned"))
}
