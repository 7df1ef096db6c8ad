use std::fs;
use std::path::Path;

use folder_combiner_core::{
    combine, combine_with_events, render_block_header, split_blocks, CombineError,
    CombineOptions, ProgressEvent, OUTPUT_FILE_NAME,
};

fn read_output(root: &Path) -> String {
    fs::read_to_string(root.join(OUTPUT_FILE_NAME)).expect("output document exists")
}

fn added_paths(events: &[ProgressEvent]) -> Vec<&Path> {
    events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::Added { path } => Some(path.as_path()),
            _ => None,
        })
        .collect()
}

#[test]
fn two_text_files_produce_two_blocks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::write(root.join("a.txt"), "hello").expect("write a");
    fs::write(root.join("b.txt"), "world").expect("write b");

    let run = combine_with_events(&CombineOptions::new(root)).expect("combine succeeds");

    let mut added = added_paths(&run.events);
    added.sort();
    assert_eq!(added, vec![root.join("a.txt"), root.join("b.txt")]);
    assert_eq!(
        run.events.last(),
        Some(&ProgressEvent::Completed {
            output_path: root.join(OUTPUT_FILE_NAME)
        })
    );
    assert_eq!(run.events.len(), 3);

    let document = read_output(root);
    let mut blocks = split_blocks(&document)
        .into_iter()
        .map(|block| (block.path.to_string(), block.content.to_string()))
        .collect::<Vec<_>>();
    blocks.sort();
    assert_eq!(
        blocks,
        vec![
            (root.join("a.txt").display().to_string(), "hello".to_string()),
            (root.join("b.txt").display().to_string(), "world".to_string()),
        ]
    );
    assert_eq!(run.summary.added_files, 2);
    assert_eq!(run.summary.bytes_written, document.len() as u64);
}

#[test]
fn undecodable_file_is_skipped_without_aborting() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::write(root.join("a.txt"), "ok").expect("write a");
    fs::write(root.join("locked.bin"), [0xff_u8, 0xfe, 0x00, 0x9f]).expect("write bin");

    let run = combine_with_events(&CombineOptions::new(root)).expect("combine succeeds");

    assert_eq!(added_paths(&run.events), vec![root.join("a.txt")]);
    let skipped = run
        .events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::Skipped { path, reason } => Some((path.clone(), reason.clone())),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].0, root.join("locked.bin"));
    assert!(!skipped[0].1.is_empty());

    assert_eq!(
        read_output(root),
        format!("{}ok", render_block_header(&root.join("a.txt")))
    );
    assert_eq!(run.summary.skipped_files, 1);
}

#[test]
fn empty_root_yields_empty_document_and_completion() {
    let dir = tempfile::tempdir().expect("tempdir");

    let run = combine_with_events(&CombineOptions::new(dir.path())).expect("combine succeeds");

    assert_eq!(
        run.events,
        vec![ProgressEvent::Completed {
            output_path: dir.path().join(OUTPUT_FILE_NAME)
        }]
    );
    assert_eq!(read_output(dir.path()), "");
}

#[test]
fn stale_output_is_truncated_and_excluded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::write(root.join(OUTPUT_FILE_NAME), "stale content from an older run").expect("write");
    fs::write(root.join("main.rs"), "fn main() {}\n").expect("write");

    let run = combine_with_events(&CombineOptions::new(root)).expect("combine succeeds");

    assert_eq!(added_paths(&run.events), vec![root.join("main.rs")]);
    let document = read_output(root);
    assert!(!document.contains("stale content"));
    assert_eq!(
        document,
        format!("{}fn main() {{}}\n", render_block_header(&root.join("main.rs")))
    );
}

#[test]
fn nested_output_named_files_are_skipped_silently() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir_all(root.join("docs/build")).expect("mkdir");
    fs::write(root.join("docs/build").join(OUTPUT_FILE_NAME), "user file").expect("write");
    fs::write(root.join("docs/readme.md"), "# Docs").expect("write");

    let run = combine_with_events(&CombineOptions::new(root)).expect("combine succeeds");

    assert!(run
        .events
        .iter()
        .all(|event| !event.path().ends_with("build/output.txt")));
    assert_eq!(added_paths(&run.events), vec![root.join("docs/readme.md")]);
    assert!(!read_output(root).contains("user file"));
}

#[test]
fn block_content_round_trips_exactly() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir(root.join("src")).expect("mkdir");
    let sources = [
        ("src/lib.rs", "pub fn answer() -> u32 {\n    42\n}\n"),
        ("notes.md", "line one\r\nline two\r\n\n\n"),
        ("unicode.txt", "héllo wörld ✓"),
        ("empty.txt", ""),
    ];
    for (name, content) in sources {
        fs::write(root.join(name), content).expect("write source");
    }

    combine(root).expect("combine succeeds");

    let document = read_output(root);
    let blocks = split_blocks(&document);
    assert_eq!(blocks.len(), sources.len());
    for (name, content) in sources {
        let expected_path = root.join(name).display().to_string();
        let matching = blocks
            .iter()
            .filter(|block| block.path == expected_path)
            .collect::<Vec<_>>();
        assert_eq!(matching.len(), 1, "exactly one block for {name}");
        assert_eq!(matching[0].content, content, "content of {name}");
    }
}

#[test]
fn second_run_reproduces_the_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir(root.join("pkg")).expect("mkdir");
    fs::write(root.join("pkg/a.py"), "print('a')\n").expect("write");
    fs::write(root.join("b.toml"), "[b]\n").expect("write");

    combine(root).expect("first run");
    let first = read_output(root);
    let summary = combine(root).expect("second run");
    let second = read_output(root);

    assert_eq!(first, second);
    assert_eq!(summary.added_files, 2);
}

#[test]
fn missing_root_fails_before_any_event() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("does-not-exist");
    let mut events = Vec::new();

    let result = folder_combiner_core::combine_with_callback(&CombineOptions::new(&missing), |event| {
        events.push(event)
    });

    match result {
        Err(CombineError::OpenOutput { path, .. }) => {
            assert_eq!(path, missing.join(OUTPUT_FILE_NAME))
        }
        other => panic!("expected OpenOutput error, got {other:?}"),
    }
    assert!(events.is_empty());
}

#[cfg(unix)]
#[test]
fn symlinks_to_files_are_read_and_dangling_links_skipped() {
    use std::os::unix::fs::symlink;

    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    let outside = tempfile::tempdir().expect("outside tempdir");
    fs::write(outside.path().join("shared.txt"), "shared").expect("write");
    symlink(outside.path().join("shared.txt"), root.join("link.txt")).expect("symlink");
    symlink(root.join("gone.txt"), root.join("dangling.txt")).expect("symlink");
    symlink(outside.path(), root.join("linked-dir")).expect("dir symlink");

    let run = combine_with_events(&CombineOptions::new(root)).expect("combine succeeds");

    assert_eq!(added_paths(&run.events), vec![root.join("link.txt")]);
    assert!(run.events.iter().any(|event| matches!(
        event,
        ProgressEvent::Skipped { path, .. } if path == &root.join("dangling.txt")
    )));
    assert_eq!(run.events.len(), 3);
}

#[cfg(unix)]
#[test]
fn sockets_are_reported_as_skipped_without_being_opened() {
    use std::os::unix::net::UnixListener;

    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::write(root.join("a.txt"), "ok").expect("write a");
    let _listener = UnixListener::bind(root.join("sock")).expect("bind socket");

    let run = combine_with_events(&CombineOptions::new(root)).expect("combine succeeds");

    assert_eq!(added_paths(&run.events), vec![root.join("a.txt")]);
    assert!(run.events.contains(&ProgressEvent::Skipped {
        path: root.join("sock"),
        reason: "not a regular file".to_string(),
    }));
    assert_eq!(run.events.len(), 3);
    assert_eq!(run.summary.skipped_files, 1);
    assert_eq!(
        read_output(root),
        format!("{}ok", render_block_header(&root.join("a.txt")))
    );
}
