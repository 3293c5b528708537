// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![allow(dead_code)]

use ifc_translate::{
    Argument, BatchProgress, EngineError, FormValues, InteractiveSurface, PlacementEngine,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Millimetre model with one root placement at the origin
pub const MILLIMETRE_MODEL: &str = "ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('site.ifc','2024-01-01T00:00:00',(''),(''),'','','');
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCPROJECT('0Yd8pE3J5Aq8ptZ0S4Bq$a',$,'Site',$,$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#3));
#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#10=IFCCARTESIANPOINT((0.,0.,0.));
#11=IFCAXIS2PLACEMENT3D(#10,$,$);
#12=IFCLOCALPLACEMENT($,#11);
ENDSEC;
END-ISO-10303-21;
";

/// Calls seen by [`RecordingEngine`], in order
pub type CallLog = Arc<Mutex<Vec<(PathBuf, Vec<Argument>)>>>;

/// Engine double: models are paths, output files get a marker line.
///
/// Inputs named `broken*` fail to open, `fail*` fail to execute.
pub struct RecordingEngine {
    pub scale: f64,
    pub calls: CallLog,
}

impl RecordingEngine {
    pub fn new(scale: f64) -> (Self, CallLog) {
        let calls = CallLog::default();
        (
            Self {
                scale,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

impl PlacementEngine for RecordingEngine {
    type Model = PathBuf;

    fn open(&self, path: &Path) -> Result<PathBuf, EngineError> {
        if stem(path).starts_with("broken") {
            return Err(EngineError::InvalidFile("missing ISO-10303-21 header".into()));
        }
        Ok(path.to_path_buf())
    }

    fn unit_scale(&self, _model: &PathBuf) -> Result<f64, EngineError> {
        Ok(self.scale)
    }

    fn execute(
        &self,
        input: &Path,
        model: PathBuf,
        _recipe: &str,
        arguments: &[Argument],
    ) -> Result<PathBuf, EngineError> {
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), arguments.to_vec()));
        if stem(input).starts_with("fail") {
            return Err(EngineError::Failed("placement #12 has no axis".into()));
        }
        Ok(model)
    }

    fn write(&self, model: &PathBuf, path: &Path) -> Result<(), EngineError> {
        fs::write(path, format!("patched {}", model.display()))
            .map_err(|e| EngineError::Failed(e.to_string()))
    }
}

/// Surface double that records everything shown to the user
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub values: FormValues,
    pub processing: bool,
    pub processing_changes: Vec<bool>,
    pub statuses: Vec<String>,
    pub progress: Vec<BatchProgress>,
    pub errors: Vec<String>,
    pub successes: Vec<String>,
    pub confirm_answer: bool,
    pub prompts: Vec<String>,
}

impl RecordingSurface {
    pub fn with_values(values: FormValues) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }
}

impl InteractiveSurface for RecordingSurface {
    fn form_values(&self) -> FormValues {
        self.values.clone()
    }

    fn set_form_values(&mut self, values: FormValues) {
        self.values = values;
    }

    fn set_processing(&mut self, processing: bool) {
        self.processing = processing;
        self.processing_changes.push(processing);
    }

    fn show_status(&mut self, message: &str) {
        self.statuses.push(message.to_string());
    }

    fn show_progress(&mut self, progress: &BatchProgress) {
        self.progress.push(progress.clone());
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn show_success(&mut self, message: &str) {
        self.successes.push(message.to_string());
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.confirm_answer
    }
}

/// Create empty-ish files with the given names
pub fn touch_all(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            fs::write(&path, MILLIMETRE_MODEL).unwrap();
            path
        })
        .collect()
}
