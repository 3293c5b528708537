// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for STEP/IFC parsing
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading STEP/IFC content
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Not a STEP file: {0}")]
    NotStep(String),

    #[error("Missing {0} section")]
    MissingSection(&'static str),

    #[error("Entity #{0} not found")]
    EntityNotFound(u32),

    #[error("Duplicate entity id #{0}")]
    DuplicateEntity(u32),

    #[error("Unexpected entity #{id}: expected {expected}, found {found}")]
    UnexpectedType {
        id: u32,
        expected: &'static str,
        found: String,
    },
}

impl Error {
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            position,
            message: message.into(),
        }
    }
}
