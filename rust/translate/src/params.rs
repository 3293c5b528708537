// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transform parameters and parsing of raw form input

use crate::error::{Error, Result};

/// Offsets in metres plus an optional rotation about +Z in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParams {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Rotate about the origin before translating
    pub rotate_first: bool,
    /// Never `Some(0.0)`
    pub rotation: Option<f64>,
}

impl TransformParams {
    pub fn new(x: f64, y: f64, z: f64, rotate_first: bool, rotation: f64) -> Self {
        Self {
            x,
            y,
            z,
            rotate_first,
            rotation: normalize_rotation(rotation),
        }
    }

    /// Parse form fields; empty text counts as 0
    pub fn parse(x: &str, y: &str, z: &str, rotation: &str, rotate_first: bool) -> Result<Self> {
        Ok(Self::new(
            parse_number("X offset", x)?,
            parse_number("Y offset", y)?,
            parse_number("Z offset", z)?,
            rotate_first,
            parse_number("Rotation", rotation)?,
        ))
    }

    /// Rotation in degrees, 0 when absent
    pub fn rotation_degrees(&self) -> f64 {
        self.rotation.unwrap_or(0.0)
    }
}

impl Default for TransformParams {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, true, 0.0)
    }
}

fn normalize_rotation(degrees: f64) -> Option<f64> {
    if degrees == 0.0 {
        None
    } else {
        Some(degrees)
    }
}

/// Parse one numeric field; must be empty or a finite number
pub fn parse_number(field: &str, text: &str) -> Result<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0.0);
    }

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::validation(format!(
            "{} must be a number, got: {}",
            field, text
        ))),
    }
}

/// Format a number back into a form field
pub fn format_number(value: f64) -> String {
    value.to_string()
}
