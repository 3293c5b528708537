// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Turns user intents into validated background jobs
//!
//! Work runs on one worker thread at a time. The worker only talks to the
//! interactive side through the results channel; [`Orchestrator::poll`]
//! drains it and is the only place the surface is updated for job state.

use crate::batch::{BatchJob, BatchProgress};
use crate::config::Config;
use crate::engine::PlacementEngine;
use crate::error::{Error, Result};
use crate::invoker::TransformInvoker;
use crate::params::TransformParams;
use crate::presets::PresetStore;
use crate::surface::{FormValues, InteractiveSurface};
use crate::validation::{
    build_output_path, discover_files, validate_input_directory, validate_input_file,
    validate_output_directory,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Worker -> interactive side
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerMessage {
    Progress(BatchProgress),
    /// Exactly one per job, always last
    Finished { success: bool, message: String },
}

enum Job {
    Single { input: PathBuf, output: PathBuf },
    Batch(BatchJob),
}

pub struct Orchestrator<S, E> {
    surface: S,
    invoker: Arc<TransformInvoker<E>>,
    presets: PresetStore,
    config: Config,
    sender: Sender<WorkerMessage>,
    receiver: Receiver<WorkerMessage>,
    processing: bool,
    cancel: Option<Arc<AtomicBool>>,
    worker: Option<JoinHandle<()>>,
}

impl<S, E> Orchestrator<S, E>
where
    S: InteractiveSurface,
    E: PlacementEngine + 'static,
{
    pub fn new(surface: S, engine: E, presets: PresetStore, config: Config) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            surface,
            invoker: Arc::new(TransformInvoker::new(engine)),
            presets,
            config,
            sender,
            receiver,
            processing: false,
            cancel: None,
            worker: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Validate the form and start a job; returns whether one started
    pub fn process(&mut self) -> bool {
        if self.processing {
            tracing::warn!("Process requested while a job is running; ignoring");
            return false;
        }

        let values = self.surface.form_values();
        let (params, job) = match self.prepare(&values) {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected process request");
                self.surface.show_error(&e.to_string());
                return false;
            }
        };

        self.cancel = match &job {
            Job::Batch(batch) => Some(batch.cancel_flag()),
            Job::Single { .. } => None,
        };

        let invoker = Arc::clone(&self.invoker);
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name("ifc-translate-worker".into())
            .spawn(move || run_job(&invoker, job, &params, &sender));

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                self.processing = true;
                self.surface.set_processing(true);
                self.surface.show_status("Processing...");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Unable to start worker thread");
                self.cancel = None;
                self.surface
                    .show_error(&format!("Unable to start processing: {}", e));
                false
            }
        }
    }

    fn prepare(&self, values: &FormValues) -> Result<(TransformParams, Job)> {
        let params = TransformParams::parse(
            &values.x,
            &values.y,
            &values.z,
            &values.rotation,
            values.rotate_first,
        )?;

        let job = if values.batch {
            let input_dir = validate_input_directory(&values.input)?;
            let output_dir = validate_output_directory(&values.output_dir)?;
            let discovery = discover_files(input_dir).with_extension(&self.config.extension);
            Job::Batch(BatchJob::discover(&discovery, output_dir))
        } else {
            let input = validate_input_file(&values.input)?;
            let output_dir = validate_output_directory(&values.output_dir)?;
            let output = build_output_path(&input, output_dir);
            Job::Single { input, output }
        };

        Ok((params, job))
    }

    /// Ask a running batch to stop before its next file
    pub fn cancel(&mut self) {
        match &self.cancel {
            Some(flag) if self.processing => {
                tracing::info!("Cancellation requested");
                flag.store(true, Ordering::SeqCst);
                self.surface.show_status("Cancelling after the current file...");
            }
            _ => tracing::debug!("Nothing to cancel"),
        }
    }

    /// Drain pending worker messages into the surface; returns how many
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.receiver.try_recv() {
            handled += 1;
            match message {
                WorkerMessage::Progress(progress) => self.surface.show_progress(&progress),
                WorkerMessage::Finished { success, message } => {
                    self.finish();
                    if success {
                        self.surface.show_success(&message);
                    } else {
                        self.surface.show_error(&message);
                    }
                }
            }
        }
        handled
    }

    fn finish(&mut self) {
        self.processing = false;
        self.cancel = None;
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }
        self.surface.set_processing(false);
    }

    /// Poll on the configured interval until the current job finishes
    pub fn wait(&mut self) {
        self.poll();
        while self.processing {
            thread::sleep(self.config.poll_interval);
            self.poll();
        }
    }

    /// Save the current form parameters under `name`
    pub fn save_preset(&mut self, name: &str) -> bool {
        let values = self.surface.form_values();
        let result = TransformParams::parse(
            &values.x,
            &values.y,
            &values.z,
            &values.rotation,
            values.rotate_first,
        )
        .and_then(|params| self.presets.save(name, &params));

        self.report(result, || format!("Preset '{}' saved", name.trim()))
    }

    /// Delete `name` after confirmation
    pub fn delete_preset(&mut self, name: &str) -> bool {
        let name = name.trim();
        if self.presets.get(name).is_none() {
            self.surface
                .show_error(&format!("Preset not found: {}", name));
            return false;
        }
        if !self
            .surface
            .confirm(&format!("Delete preset '{}'?", name))
        {
            return false;
        }

        let result = self.presets.delete(name).map(|_| ());
        self.report(result, || format!("Preset '{}' deleted", name))
    }

    /// Fill the form from `name` and remember it as last used
    pub fn select_preset(&mut self, name: &str) -> bool {
        let name = name.trim();
        let Some(preset) = self.presets.get(name) else {
            self.surface
                .show_error(&format!("Preset not found: {}", name));
            return false;
        };

        let values = self
            .surface
            .form_values()
            .with_params(&TransformParams::from(preset));
        self.surface.set_form_values(values);

        let result = self.presets.save_last_used(name);
        self.report(result, || format!("Loaded preset '{}'", name))
    }

    /// Fill the form from the last used preset, if it still exists
    pub fn restore_last_used(&mut self) -> Option<String> {
        let name = self.presets.get_last_used()?;
        let Some(preset) = self.presets.get(&name) else {
            tracing::debug!(preset = %name, "Last used preset no longer exists");
            return None;
        };

        let values = self
            .surface
            .form_values()
            .with_params(&TransformParams::from(preset));
        self.surface.set_form_values(values);
        self.surface
            .show_status(&format!("Loaded preset '{}'", name));
        Some(name)
    }

    fn report(&mut self, result: Result<()>, success: impl FnOnce() -> String) -> bool {
        match result {
            Ok(()) => {
                self.surface.show_status(&success());
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Preset operation failed");
                self.surface.show_error(&e.to_string());
                false
            }
        }
    }
}

fn run_job<E: PlacementEngine>(
    invoker: &TransformInvoker<E>,
    job: Job,
    params: &TransformParams,
    sender: &Sender<WorkerMessage>,
) {
    let finished = match job {
        Job::Single { input, output } => match invoker.invoke(&input, &output, params) {
            Ok(()) => WorkerMessage::Finished {
                success: true,
                message: format!("Transformation complete!\nOutput: {}", output.display()),
            },
            Err(e) => e.into(),
        },
        Job::Batch(mut batch) => {
            let summary = batch.run(invoker, params, |progress| {
                // Receiver outlives every worker
                let _ = sender.send(WorkerMessage::Progress(progress));
            });
            WorkerMessage::Finished {
                success: summary.failures.is_empty(),
                message: summary.message(),
            }
        }
    };

    if sender.send(finished).is_err() {
        tracing::warn!("Result channel closed before the job finished");
    }
}

impl From<Error> for WorkerMessage {
    fn from(err: Error) -> Self {
        WorkerMessage::Finished {
            success: false,
            message: err.to_string(),
        }
    }
}
