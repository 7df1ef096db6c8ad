use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::document::render_block_header;
use crate::error::{CombineError, Result};
use crate::model::{CombineSummary, ProgressEvent, OUTPUT_FILE_NAME};

const NOT_A_REGULAR_FILE: &str = "not a regular file";

#[derive(Debug, Clone, Default)]
pub struct CombineOptions {
    pub root: PathBuf,
    /// Log every per-file outcome at `info` instead of `debug`.
    pub progress: bool,
}

impl CombineOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

/// Receives per-file outcomes as the walk visits files, in visit order.
///
/// Any `FnMut(ProgressEvent)` closure is a sink.
pub trait ProgressSink {
    fn added(&mut self, path: &Path);
    fn skipped(&mut self, path: &Path, reason: &str);
    fn completed(&mut self, output_path: &Path);
}

impl<F> ProgressSink for F
where
    F: FnMut(ProgressEvent),
{
    fn added(&mut self, path: &Path) {
        (*self)(ProgressEvent::Added {
            path: path.to_path_buf(),
        });
    }

    fn skipped(&mut self, path: &Path, reason: &str) {
        (*self)(ProgressEvent::Skipped {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        });
    }

    fn completed(&mut self, output_path: &Path) {
        (*self)(ProgressEvent::Completed {
            output_path: output_path.to_path_buf(),
        });
    }
}

pub struct CombineRunOutput {
    pub summary: CombineSummary,
    pub events: Vec<ProgressEvent>,
}

#[derive(Default, Debug, Clone)]
struct CombineCounters {
    added_files: u64,
    skipped_files: u64,
    walk_errors: u64,
    bytes_written: u64,
}

pub fn combine(root: impl AsRef<Path>) -> Result<CombineSummary> {
    combine_with_callback(&CombineOptions::new(root.as_ref()), |_| {})
}

pub fn combine_with_events(options: &CombineOptions) -> Result<CombineRunOutput> {
    let mut events = Vec::new();
    let summary = combine_with_callback(options, |event| events.push(event))?;
    Ok(CombineRunOutput { summary, events })
}

pub fn combine_with_callback<F>(options: &CombineOptions, mut on_event: F) -> Result<CombineSummary>
where
    F: FnMut(ProgressEvent),
{
    combine_with_sink(options, &mut on_event)
}

/// Concatenates every readable text file under `options.root` into
/// `<root>/output.txt`.
///
/// Only failing to open, write or flush the output document is fatal. Files
/// that cannot be read as UTF-8 text, and special files such as sockets or
/// FIFOs, are reported through [`ProgressSink::skipped`] and the walk moves
/// on.
pub fn combine_with_sink<S>(options: &CombineOptions, sink: &mut S) -> Result<CombineSummary>
where
    S: ProgressSink + ?Sized,
{
    let started = Instant::now();
    let root = options.root.as_path();
    let output_path = root.join(OUTPUT_FILE_NAME);

    info!(
        "combining files under {} into {}",
        root.display(),
        output_path.display()
    );

    let file = File::create(&output_path).map_err(|source| CombineError::OpenOutput {
        path: output_path.clone(),
        source,
    })?;
    let mut output = BufWriter::new(file);
    let counters = combine_entries(
        WalkDir::new(root).follow_links(false),
        options,
        &output_path,
        &mut output,
        &mut *sink,
    )?;

    output.flush().map_err(|source| CombineError::WriteOutput {
        path: output_path.clone(),
        source,
    })?;
    drop(output);

    info!(
        "combined {} file(s), skipped {}, {} walk error(s) into {}",
        counters.added_files,
        counters.skipped_files,
        counters.walk_errors,
        output_path.display()
    );
    sink.completed(&output_path);

    Ok(CombineSummary {
        root: root.to_path_buf(),
        output_path,
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        added_files: counters.added_files,
        skipped_files: counters.skipped_files,
        walk_errors: counters.walk_errors,
        bytes_written: counters.bytes_written,
        elapsed_ms: started.elapsed().as_millis().try_into().unwrap_or(u64::MAX),
    })
}

fn combine_entries<I, E, W, S>(
    entries: I,
    options: &CombineOptions,
    output_path: &Path,
    output: &mut W,
    sink: &mut S,
) -> Result<CombineCounters>
where
    I: IntoIterator<Item = std::result::Result<DirEntry, E>>,
    E: fmt::Display,
    W: Write,
    S: ProgressSink + ?Sized,
{
    let root = options.root.as_path();
    let mut counters = CombineCounters::default();

    for item in entries {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                counters.walk_errors += 1;
                warn!("walk error under {}: {}", root.display(), err);
                continue;
            }
        };
        let kind = classify_entry(&entry);
        if kind == EntryKind::Directory {
            continue;
        }
        if is_output_document(&entry) {
            debug!("excluding {} from its own scan", entry.path().display());
            continue;
        }

        let path = entry.path();
        if kind == EntryKind::Special {
            counters.skipped_files += 1;
            warn!("skipped {}: {}", path.display(), NOT_A_REGULAR_FILE);
            sink.skipped(path, NOT_A_REGULAR_FILE);
            continue;
        }

        match fs::read_to_string(path) {
            Ok(content) => {
                let header = render_block_header(path);
                append_block(output, &header, &content).map_err(|source| {
                    CombineError::WriteOutput {
                        path: output_path.to_path_buf(),
                        source,
                    }
                })?;
                counters.added_files += 1;
                counters.bytes_written = counters
                    .bytes_written
                    .saturating_add((header.len() + content.len()) as u64);

                if options.progress {
                    info!("added {}", path.display());
                } else {
                    debug!("added {}", path.display());
                }
                sink.added(path);
            }
            Err(err) => {
                let reason = err.to_string();
                counters.skipped_files += 1;
                warn!("skipped {}: {}", path.display(), reason);
                sink.skipped(path, &reason);
            }
        }
    }

    Ok(counters)
}

fn append_block<W: Write>(output: &mut W, header: &str, content: &str) -> io::Result<()> {
    output.write_all(header.as_bytes())?;
    output.write_all(content.as_bytes())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    Readable,
    /// FIFOs, sockets and device nodes. Never opened, so a FIFO cannot
    /// block the walk.
    Special,
}

/// Symlinks are classified by their target. Dangling links are readable
/// candidates so that the failed read is reported as a skip.
fn classify_entry(entry: &DirEntry) -> EntryKind {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        return EntryKind::Directory;
    }
    if file_type.is_file() {
        return EntryKind::Readable;
    }
    if file_type.is_symlink() {
        return match fs::metadata(entry.path()) {
            Ok(metadata) if metadata.is_dir() => EntryKind::Directory,
            Ok(metadata) if metadata.is_file() => EntryKind::Readable,
            Ok(_) => EntryKind::Special,
            Err(_) => EntryKind::Readable,
        };
    }
    EntryKind::Special
}

/// Name-only match: an `output.txt` at any depth is excluded.
fn is_output_document(entry: &DirEntry) -> bool {
    entry.file_name() == OUTPUT_FILE_NAME
}
