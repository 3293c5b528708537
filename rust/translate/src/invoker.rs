// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One engine call: open, convert units, patch, write

use crate::engine::{Argument, EngineError, PlacementEngine};
use crate::error::{Error, Result};
use crate::params::TransformParams;
use std::path::Path;

pub const RECIPE: &str = "OffsetObjectPlacements";

/// `[x, y, z, rotate_first, rotation?]` with offsets in native units
///
/// `unit_scale` is metres per native unit, so native = metres / scale.
pub fn build_arguments(params: &TransformParams, unit_scale: f64) -> Vec<Argument> {
    let mut arguments = vec![
        Argument::Real(params.x / unit_scale),
        Argument::Real(params.y / unit_scale),
        Argument::Real(params.z / unit_scale),
        Argument::Bool(params.rotate_first),
    ];
    if let Some(rotation) = params.rotation {
        arguments.push(Argument::Real(rotation));
    }
    arguments
}

fn classify(err: EngineError) -> Error {
    match err {
        EngineError::InvalidFile(message) => Error::InvalidFile(message),
        EngineError::Failed(message) => Error::TransformFailed(message),
    }
}

pub struct TransformInvoker<E> {
    engine: E,
}

impl<E: PlacementEngine> TransformInvoker<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Transform `input` and write the result to `output`
    pub fn invoke(&self, input: &Path, output: &Path, params: &TransformParams) -> Result<()> {
        tracing::info!(input = %input.display(), "Opening IFC file");
        let model = self.engine.open(input).map_err(classify)?;

        let unit_scale = self.engine.unit_scale(&model).map_err(classify)?;
        if !(unit_scale.is_finite() && unit_scale > 0.0) {
            return Err(Error::TransformFailed(format!(
                "unusable project unit scale {}",
                unit_scale
            )));
        }

        let arguments = build_arguments(params, unit_scale);
        tracing::info!(
            unit_scale,
            metres = ?(params.x, params.y, params.z),
            native = ?(params.x / unit_scale, params.y / unit_scale, params.z / unit_scale),
            "Converted offsets to project units"
        );
        tracing::info!(
            rotate_first = params.rotate_first,
            rotation = ?params.rotation,
            arguments = ?arguments,
            "Applying transformation"
        );

        let model = self
            .engine
            .execute(input, model, RECIPE, &arguments)
            .map_err(classify)?;

        tracing::info!(output = %output.display(), "Writing output");
        self.engine
            .write(&model, output)
            .map_err(|e| Error::TransformFailed(e.to_string()))?;

        tracing::info!("Transformation completed successfully");
        Ok(())
    }
}
