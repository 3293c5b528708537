// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seam between the application and the placement patching library

use ifc_translate_patch::IfcFile;
use std::path::Path;
use thiserror::Error;

pub use ifc_translate_patch::Argument;

/// Engine failures, split by whether the input itself was at fault
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("{0}")]
    InvalidFile(String),

    #[error("{0}")]
    Failed(String),
}

impl From<ifc_translate_patch::Error> for EngineError {
    fn from(err: ifc_translate_patch::Error) -> Self {
        if err.is_invalid_file() {
            EngineError::InvalidFile(err.to_string())
        } else {
            EngineError::Failed(err.to_string())
        }
    }
}

/// Open, inspect, patch and write a model
pub trait PlacementEngine: Send + Sync {
    type Model;

    fn open(&self, path: &Path) -> Result<Self::Model, EngineError>;

    /// Project length unit in metres
    fn unit_scale(&self, model: &Self::Model) -> Result<f64, EngineError>;

    fn execute(
        &self,
        input: &Path,
        model: Self::Model,
        recipe: &str,
        arguments: &[Argument],
    ) -> Result<Self::Model, EngineError>;

    fn write(&self, model: &Self::Model, path: &Path) -> Result<(), EngineError>;
}

/// Engine backed by `ifc-translate-patch`
#[derive(Debug, Clone, Copy, Default)]
pub struct IfcPatchEngine;

impl PlacementEngine for IfcPatchEngine {
    type Model = IfcFile;

    fn open(&self, path: &Path) -> Result<IfcFile, EngineError> {
        Ok(IfcFile::open(path)?)
    }

    fn unit_scale(&self, model: &IfcFile) -> Result<f64, EngineError> {
        Ok(model.unit_scale()?)
    }

    fn execute(
        &self,
        input: &Path,
        model: IfcFile,
        recipe: &str,
        arguments: &[Argument],
    ) -> Result<IfcFile, EngineError> {
        Ok(ifc_translate_patch::execute(
            ifc_translate_patch::PatchRequest {
                input: input.to_path_buf(),
                file: model,
                recipe: recipe.to_string(),
                arguments: arguments.to_vec(),
            },
        )?)
    }

    fn write(&self, model: &IfcFile, path: &Path) -> Result<(), EngineError> {
        Ok(ifc_translate_patch::write(model, path)?)
    }
}
