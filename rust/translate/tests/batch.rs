// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod common;

use common::{touch_all, RecordingEngine};
use ifc_translate::{discover_files, BatchJob, BatchState, TransformInvoker, TransformParams};
use std::sync::atomic::Ordering;

#[test]
fn test_progress_reported_once_per_file() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    touch_all(input.path(), &["c.ifc", "a.ifc", "B.IFC", "notes.txt"]);

    let (engine, calls) = RecordingEngine::new(1.0);
    let invoker = TransformInvoker::new(engine);
    let mut job = BatchJob::discover(&discover_files(input.path()), output.path());
    assert_eq!(job.total(), 3);

    let mut seen = Vec::new();
    let summary = job.run(&invoker, &TransformParams::default(), |progress| {
        seen.push(progress)
    });

    assert_eq!(summary.state, BatchState::Completed);
    assert_eq!(job.state(), BatchState::Completed);
    assert_eq!(summary.succeeded.len(), 3);
    assert_eq!(
        seen.iter().map(|p| p.current).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(seen.iter().all(|p| p.total == 3));
    assert_eq!(
        seen.iter().map(|p| p.file_name.as_str()).collect::<Vec<_>>(),
        vec!["B.IFC", "a.ifc", "c.ifc"]
    );
    assert_eq!(calls.lock().unwrap().len(), 3);
    assert!(output.path().join("a.ifc").exists());
}

#[test]
fn test_cancel_after_k_items() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let files = touch_all(input.path(), &["1.ifc", "2.ifc", "3.ifc", "4.ifc", "5.ifc"]);

    let (engine, calls) = RecordingEngine::new(1.0);
    let invoker = TransformInvoker::new(engine);
    let mut job = BatchJob::new(files.clone(), output.path());
    let cancel = job.cancel_flag();

    let mut seen = 0;
    let summary = job.run(&invoker, &TransformParams::default(), |progress| {
        seen += 1;
        if progress.current == 2 {
            cancel.store(true, Ordering::SeqCst);
        }
    });

    assert_eq!(summary.state, BatchState::Cancelled);
    assert_eq!(seen, 2);
    assert_eq!(summary.attempted(), 2);

    let attempted: Vec<_> = calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect();
    assert_eq!(attempted, files[..2].to_vec());
    assert!(!output.path().join("3.ifc").exists());
}

#[test]
fn test_failures_do_not_stop_the_batch() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    touch_all(input.path(), &["a.ifc", "broken.ifc", "fail.ifc", "z.ifc"]);

    let (engine, _calls) = RecordingEngine::new(1.0);
    let invoker = TransformInvoker::new(engine);
    let mut job = BatchJob::discover(&discover_files(input.path()), output.path());

    let mut progress = Vec::new();
    let summary = job.run(&invoker, &TransformParams::default(), |p| {
        progress.push(p.current)
    });

    assert_eq!(summary.state, BatchState::Completed);
    assert_eq!(progress, vec![1, 2, 3, 4]);
    assert_eq!(summary.succeeded.len(), 2);
    assert_eq!(summary.failures.len(), 2);
    assert_eq!(
        summary.failures[0].message,
        "Invalid IFC file: missing ISO-10303-21 header"
    );
    assert_eq!(
        summary.failures[1].message,
        "Transformation failed: placement #12 has no axis"
    );
}

#[test]
fn test_empty_directory_completes_immediately() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    let (engine, calls) = RecordingEngine::new(1.0);
    let invoker = TransformInvoker::new(engine);
    let mut job = BatchJob::discover(&discover_files(input.path()), output.path());

    let mut reported = false;
    let summary = job.run(&invoker, &TransformParams::default(), |_| reported = true);

    assert_eq!(summary.state, BatchState::Completed);
    assert_eq!(summary.total, 0);
    assert!(!reported);
    assert!(calls.lock().unwrap().is_empty());
}
