// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for patch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening, patching or writing a model
#[derive(Error, Debug)]
pub enum Error {
    /// The input could not be read or is not a well-formed IFC file
    #[error("{0}")]
    InvalidFile(String),

    #[error("Core parser error: {0}")]
    Core(#[from] ifc_translate_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown recipe: {0}")]
    UnknownRecipe(String),

    #[error("Invalid arguments for {recipe}: {message}")]
    InvalidArguments {
        recipe: &'static str,
        message: String,
    },

    #[error("Character {0:?} cannot be written in ISO-8859-1")]
    Unencodable(char),

    #[error("Invalid placement #{id}: {message}")]
    Placement { id: u32, message: String },
}

impl Error {
    pub fn invalid_file(message: impl Into<String>) -> Self {
        Error::InvalidFile(message.into())
    }

    /// True when the input itself was rejected, as opposed to a failure
    /// while patching or writing
    pub fn is_invalid_file(&self) -> bool {
        matches!(self, Error::InvalidFile(_))
    }
}
