// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC Translate
//!
//! Move and rotate IFC models: one file, or every `.ifc` file in a
//! directory. Offsets are given in metres and converted to each file's own
//! length unit; the rotation is about +Z through the origin and can be
//! applied before or after the translation.
//!
//! ## Overview
//!
//! - [`validation`]: path checks, batch discovery, output paths
//! - [`presets`]: named parameter sets stored as JSON
//! - [`invoker`]: one transform call through a [`PlacementEngine`]
//! - [`batch`]: sequential runs with progress and cancellation
//! - [`orchestrator`]: user intents, background worker, results channel
//!
//! ```rust,no_run
//! use ifc_translate::{IfcPatchEngine, TransformInvoker, TransformParams};
//! use std::path::Path;
//!
//! let invoker = TransformInvoker::new(IfcPatchEngine);
//! let params = TransformParams::new(100.0, 50.0, 0.0, true, 90.0);
//! invoker.invoke(Path::new("site.ifc"), Path::new("out/site.ifc"), &params)?;
//! # Ok::<(), ifc_translate::Error>(())
//! ```

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod invoker;
pub mod orchestrator;
pub mod params;
pub mod presets;
pub mod surface;
pub mod validation;

pub use batch::{BatchFailure, BatchJob, BatchProgress, BatchState, BatchSummary};
pub use config::Config;
pub use engine::{Argument, EngineError, IfcPatchEngine, PlacementEngine};
pub use error::{Error, Result};
pub use invoker::{build_arguments, TransformInvoker, RECIPE};
pub use orchestrator::{Orchestrator, WorkerMessage};
pub use params::TransformParams;
pub use presets::{Preset, PresetStore};
pub use surface::{FormValues, InteractiveSurface};
pub use validation::{
    build_output_path, discover_files, validate_input_directory, validate_input_file,
    validate_output_directory, FileDiscovery,
};
