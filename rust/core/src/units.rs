// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit extraction for IFC files
//!
//! Resolves the project length unit into a scale factor such that
//! `project_length * scale = metres`.

use crate::decoder::EntityDecoder;
use crate::error::Result;
use crate::parser::EntityScanner;
use crate::schema::DecodedEntity;

/// Conversion-based units may chain; real files never go this deep
const MAX_UNIT_DEPTH: usize = 8;

/// SI Prefix multipliers as defined in IFC specification
/// Maps IfcSIPrefix enum values to their numeric multipliers
#[inline]
pub fn get_si_prefix_multiplier(prefix: &str) -> f64 {
    match prefix {
        "ATTO" => 1e-18,
        "FEMTO" => 1e-15,
        "PICO" => 1e-12,
        "NANO" => 1e-9,
        "MICRO" => 1e-6,
        "MILLI" => 1e-3,
        "CENTI" => 1e-2,
        "DECI" => 1e-1,
        "DECA" => 1e1,
        "HECTO" => 1e2,
        "KILO" => 1e3,
        "MEGA" => 1e6,
        "GIGA" => 1e9,
        "TERA" => 1e12,
        "PETA" => 1e15,
        "EXA" => 1e18,
        _ => 1.0,
    }
}

/// Find the length unit scale of a model
///
/// Follows IFCPROJECT → IFCUNITASSIGNMENT → LENGTHUNIT. Files without a
/// project fall back to the first IFCUNITASSIGNMENT. Anything missing
/// means metres.
pub fn calculate_unit_scale(content: &str, decoder: &mut EntityDecoder) -> Result<f64> {
    let mut scanner = EntityScanner::new(content);

    if let Some((project_id, _, _)) = scanner.find_by_type("IFCPROJECT").first().copied() {
        return extract_length_unit_scale(decoder, project_id);
    }

    scanner.reset();
    match scanner.find_by_type("IFCUNITASSIGNMENT").first() {
        Some(&(assignment_id, _, _)) => {
            let assignment = decoder.decode_by_id(assignment_id)?;
            length_scale_from_assignment(decoder, &assignment)
        }
        None => Ok(1.0),
    }
}

/// Extract length unit scale factor starting from an IFCPROJECT
///
/// IFCPROJECT attribute 8 is UnitsInContext (IFCUNITASSIGNMENT)
pub fn extract_length_unit_scale(decoder: &mut EntityDecoder, project_id: u32) -> Result<f64> {
    let project = decoder.decode_by_id(project_id)?;

    if !project.is_type("IFCPROJECT") {
        return Ok(1.0);
    }

    let Some(units_ref) = project.get_ref(8) else {
        return Ok(1.0);
    };

    let assignment = decoder.decode_by_id(units_ref)?;
    if !assignment.is_type("IFCUNITASSIGNMENT") {
        return Ok(1.0);
    }

    length_scale_from_assignment(decoder, &assignment)
}

fn length_scale_from_assignment(
    decoder: &mut EntityDecoder,
    assignment: &DecodedEntity,
) -> Result<f64> {
    let Some(units) = assignment.get_list(0) else {
        return Ok(1.0);
    };

    for unit_ref in units.iter().filter_map(|u| u.as_entity_ref()) {
        let Ok(unit) = decoder.decode_by_id(unit_ref) else {
            continue;
        };

        // IFCSIUNIT and IFCCONVERSIONBASEDUNIT both carry UnitType at index 1
        if unit.get_enum(1) != Some("LENGTHUNIT") {
            continue;
        }

        return unit_scale(decoder, &unit, 0);
    }

    Ok(1.0)
}

/// Scale of a single unit entity in SI base units
fn unit_scale(decoder: &mut EntityDecoder, unit: &DecodedEntity, depth: usize) -> Result<f64> {
    if depth > MAX_UNIT_DEPTH {
        return Ok(1.0);
    }

    if unit.is_type("IFCSIUNIT") {
        // Attribute 2: Prefix (.MILLI., .CENTI., ...) or $
        return Ok(unit.get_enum(2).map_or(1.0, get_si_prefix_multiplier));
    }

    if unit.is_type("IFCCONVERSIONBASEDUNIT") || unit.is_type("IFCCONVERSIONBASEDUNITWITHOFFSET") {
        // Attribute 3: ConversionFactor (IFCMEASUREWITHUNIT)
        let Some(factor_ref) = unit.get_ref(3) else {
            return Ok(1.0);
        };
        let factor = decoder.decode_by_id(factor_ref)?;
        if !factor.is_type("IFCMEASUREWITHUNIT") {
            return Ok(1.0);
        }

        let value = factor.get(0).and_then(|v| v.as_measure()).unwrap_or(1.0);
        let base = match factor.get_ref(1) {
            Some(base_ref) => {
                let base_unit = decoder.decode_by_id(base_ref)?;
                unit_scale(decoder, &base_unit, depth + 1)?
            }
            None => 1.0,
        };
        return Ok(value * base);
    }

    Ok(1.0)
}
