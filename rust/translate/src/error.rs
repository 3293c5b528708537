// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for application operations
pub type Result<T> = std::result::Result<T, Error>;

/// Tagged failures surfaced to the user
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Bad path, permissions, empty selection or unparsable number
    #[error("{0}")]
    Validation(String),

    /// The engine rejected the input as malformed
    #[error("Invalid IFC file: {0}")]
    InvalidFile(String),

    /// Any other failure while transforming or writing
    #[error("Transformation failed: {0}")]
    TransformFailed(String),

    /// A preset document could not be written
    #[error("Preset store error: {0}")]
    Store(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        Error::Store(message.into())
    }
}
