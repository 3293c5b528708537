// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sequential batch runs with progress and cooperative cancellation

use crate::engine::PlacementEngine;
use crate::invoker::TransformInvoker;
use crate::params::TransformParams;
use crate::validation::{build_output_path, FileDiscovery};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reported after every attempted file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    /// 1-based index of the file just attempted
    pub current: usize,
    pub total: usize,
    pub file_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub state: BatchState,
    pub total: usize,
    /// Written output paths
    pub succeeded: Vec<PathBuf>,
    pub failures: Vec<BatchFailure>,
}

impl BatchSummary {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failures.len()
    }

    /// Human readable outcome, one failure per line
    pub fn message(&self) -> String {
        let mut message = match self.state {
            BatchState::Cancelled => format!(
                "Batch cancelled after {} of {} files ({} transformed)",
                self.attempted(),
                self.total,
                self.succeeded.len()
            ),
            _ if self.total == 0 => "No IFC files found in the input directory".to_string(),
            _ => format!(
                "Batch complete: {} of {} files transformed",
                self.succeeded.len(),
                self.total
            ),
        };

        for failure in &self.failures {
            message.push_str(&format!(
                "\n{}: {}",
                display_name(&failure.input),
                failure.message
            ));
        }
        message
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One batch over a fixed, sorted list of files
#[derive(Debug)]
pub struct BatchJob {
    files: Vec<PathBuf>,
    output_dir: PathBuf,
    cancel: Arc<AtomicBool>,
    state: BatchState,
}

impl BatchJob {
    pub fn new(files: Vec<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            files,
            output_dir: output_dir.into(),
            cancel: Arc::new(AtomicBool::new(false)),
            state: BatchState::Idle,
        }
    }

    /// Snapshot the files a discovery currently sees
    pub fn discover(discovery: &FileDiscovery, output_dir: impl Into<PathBuf>) -> Self {
        Self::new(discovery.scan(), output_dir)
    }

    /// Shared flag; setting it stops the batch before the next file
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Run every file through `invoker`; failures are recorded, not fatal
    pub fn run<E, F>(
        &mut self,
        invoker: &TransformInvoker<E>,
        params: &TransformParams,
        mut on_progress: F,
    ) -> BatchSummary
    where
        E: PlacementEngine,
        F: FnMut(BatchProgress),
    {
        let total = self.files.len();
        let mut summary = BatchSummary {
            state: BatchState::Running,
            total,
            succeeded: Vec::new(),
            failures: Vec::new(),
        };
        self.state = BatchState::Running;
        tracing::info!(total, output_dir = %self.output_dir.display(), "Starting batch");

        for (index, input) in self.files.iter().enumerate() {
            if self.cancel.load(Ordering::SeqCst) {
                tracing::info!(done = index, total, "Batch cancelled");
                summary.state = BatchState::Cancelled;
                break;
            }

            let output = build_output_path(input, &self.output_dir);
            match invoker.invoke(input, &output, params) {
                Ok(()) => summary.succeeded.push(output),
                Err(e) => {
                    tracing::error!(input = %input.display(), error = %e, "Batch item failed");
                    summary.failures.push(BatchFailure {
                        input: input.clone(),
                        message: e.to_string(),
                    });
                }
            }

            on_progress(BatchProgress {
                current: index + 1,
                total,
                file_name: display_name(input),
            });
        }

        if summary.state == BatchState::Running {
            summary.state = BatchState::Completed;
        }
        self.state = summary.state;

        tracing::info!(
            state = ?summary.state,
            succeeded = summary.succeeded.len(),
            failed = summary.failures.len(),
            "Batch finished"
        );
        summary
    }
}
