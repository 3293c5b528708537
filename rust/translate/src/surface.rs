// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! What the orchestrator needs from a user interface

use crate::batch::BatchProgress;
use crate::params::{format_number, TransformParams};

/// Raw form contents; numbers stay text until validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    /// Input file, or input directory in batch mode
    pub input: String,
    pub output_dir: String,
    pub batch: bool,
    pub x: String,
    pub y: String,
    pub z: String,
    pub rotation: String,
    pub rotate_first: bool,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            input: String::new(),
            output_dir: String::new(),
            batch: false,
            x: String::new(),
            y: String::new(),
            z: String::new(),
            rotation: String::new(),
            rotate_first: true,
        }
    }
}

impl FormValues {
    /// Replace the parameter fields, keeping paths and mode
    pub fn with_params(mut self, params: &TransformParams) -> Self {
        self.x = format_number(params.x);
        self.y = format_number(params.y);
        self.z = format_number(params.z);
        self.rotation = format_number(params.rotation_degrees());
        self.rotate_first = params.rotate_first;
        self
    }
}

pub trait InteractiveSurface {
    fn form_values(&self) -> FormValues;

    fn set_form_values(&mut self, values: FormValues);

    /// Process is disabled while true
    fn set_processing(&mut self, processing: bool);

    fn show_status(&mut self, message: &str);

    fn show_progress(&mut self, progress: &BatchProgress);

    fn show_error(&mut self, message: &str);

    fn show_success(&mut self, message: &str);

    /// Yes/no question; false means the action is abandoned
    fn confirm(&mut self, prompt: &str) -> bool;
}
