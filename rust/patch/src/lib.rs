// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC Translate Patch
//!
//! Open an IFC model, run a named patch recipe against it and write the
//! result back out. Edits are spliced into the original STEP text, so
//! everything a recipe does not touch is written back byte for byte.
//!
//! ```rust,no_run
//! use ifc_translate_patch::{execute, Argument, IfcFile, PatchRequest};
//!
//! let file = IfcFile::open("model.ifc")?;
//! let patched = execute(PatchRequest {
//!     input: "model.ifc".into(),
//!     file,
//!     recipe: "OffsetObjectPlacements".to_string(),
//!     arguments: vec![
//!         Argument::Real(1000.0),
//!         Argument::Real(0.0),
//!         Argument::Real(0.0),
//!         Argument::Bool(true),
//!         Argument::Real(90.0),
//!     ],
//! })?;
//! patched.write("model_moved.ifc")?;
//! # Ok::<(), ifc_translate_patch::Error>(())
//! ```

pub mod error;
pub mod file;
pub mod recipes;
pub mod writer;

#[cfg(test)]
mod fixtures;

pub use error::{Error, Result};
pub use file::{IfcFile, TextEncoding};
pub use recipes::{execute, write, Argument, OffsetObjectPlacements, PatchRequest, Recipe};
pub use writer::{format_real, format_triple};
