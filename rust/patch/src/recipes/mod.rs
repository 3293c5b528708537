// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Patch recipes and their dispatch
//!
//! A recipe is addressed by name and receives a positional argument list,
//! mirroring how patch requests are assembled by callers.

pub mod offset_object_placements;

pub use offset_object_placements::OffsetObjectPlacements;

use crate::error::{Error, Result};
use crate::file::IfcFile;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Positional recipe argument
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Argument {
    Real(f64),
    Bool(bool),
}

impl Argument {
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Argument::Real(value) => Some(*value),
            Argument::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Argument::Bool(value) => Some(*value),
            Argument::Real(_) => None,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Real(value) => write!(f, "{}", value),
            Argument::Bool(value) => write!(f, "{}", value),
        }
    }
}

/// Known recipes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipe {
    OffsetObjectPlacements,
}

impl Recipe {
    pub fn name(&self) -> &'static str {
        match self {
            Recipe::OffsetObjectPlacements => "OffsetObjectPlacements",
        }
    }
}

impl FromStr for Recipe {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "OffsetObjectPlacements" => Ok(Recipe::OffsetObjectPlacements),
            other => Err(Error::UnknownRecipe(other.to_string())),
        }
    }
}

/// A single patch invocation
pub struct PatchRequest {
    /// Path the model was opened from (for logging)
    pub input: PathBuf,
    pub file: IfcFile,
    pub recipe: String,
    pub arguments: Vec<Argument>,
}

/// Run a recipe against an opened model and return the patched model
pub fn execute(request: PatchRequest) -> Result<IfcFile> {
    let PatchRequest {
        input,
        mut file,
        recipe,
        arguments,
    } = request;

    let recipe: Recipe = recipe.parse()?;
    tracing::info!(
        input = %input.display(),
        recipe = recipe.name(),
        arguments = ?arguments,
        "Executing patch recipe"
    );

    match recipe {
        Recipe::OffsetObjectPlacements => {
            let patch = OffsetObjectPlacements::from_arguments(&arguments)?;
            let patched = patch.apply(&mut file)?;
            tracing::info!(placements = patched, "Offset object placements");
        }
    }

    Ok(file)
}

/// Write a patched model to disk
pub fn write(file: &IfcFile, path: impl AsRef<std::path::Path>) -> Result<()> {
    file.write(path)
}
