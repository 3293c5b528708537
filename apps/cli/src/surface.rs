// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Terminal rendition of the interactive surface

use ifc_translate::{BatchProgress, FormValues, InteractiveSurface};
use indicatif::{ProgressBar, ProgressStyle};

pub struct TerminalSurface {
    values: FormValues,
    progress: Option<ProgressBar>,
    /// Answer every confirmation with yes
    assume_yes: bool,
    failed: bool,
}

impl TerminalSurface {
    pub fn new(values: FormValues, assume_yes: bool) -> Self {
        Self {
            values,
            progress: None,
            assume_yes,
            failed: false,
        }
    }

    /// True once any error has been shown
    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn values_mut(&mut self) -> &mut FormValues {
        &mut self.values
    }

    fn clear_progress(&mut self) {
        if let Some(bar) = self.progress.take() {
            bar.finish_and_clear();
        }
    }
}

fn new_bar(total: u64) -> ProgressBar {
    let style = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(total).with_style(style)
}

impl InteractiveSurface for TerminalSurface {
    fn form_values(&self) -> FormValues {
        self.values.clone()
    }

    fn set_form_values(&mut self, values: FormValues) {
        self.values = values;
    }

    fn set_processing(&mut self, processing: bool) {
        if !processing {
            self.clear_progress();
        }
    }

    fn show_status(&mut self, message: &str) {
        match &self.progress {
            Some(bar) => bar.println(message),
            None => eprintln!("{}", message),
        }
    }

    fn show_progress(&mut self, progress: &BatchProgress) {
        let bar = self
            .progress
            .get_or_insert_with(|| new_bar(progress.total as u64));
        bar.set_position(progress.current as u64);
        bar.set_message(progress.file_name.clone());
    }

    fn show_error(&mut self, message: &str) {
        self.failed = true;
        self.clear_progress();
        eprintln!("Error: {}", message);
    }

    fn show_success(&mut self, message: &str) {
        self.clear_progress();
        println!("{}", message);
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        match inquire::Confirm::new(prompt).with_default(false).prompt() {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "No confirmation available; use --yes");
                false
            }
        }
    }
}
