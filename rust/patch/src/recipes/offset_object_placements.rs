// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Offset every root object placement by a rigid transform
//!
//! Root placements are `IfcLocalPlacement`s without `PlacementRelTo`;
//! everything else in the placement tree follows them. The transform is a
//! translation plus an optional rotation about +Z (counter-clockwise when
//! seen from above), both about the project origin. Arguments:
//!
//! `[x, y, z, should_rotate_first, angle?]`
//!
//! - `should_rotate_first = true`: rotate about the origin, then translate
//! - `should_rotate_first = false`: translate, then rotate about the origin

use super::Argument;
use crate::error::{Error, Result};
use crate::file::IfcFile;
use crate::writer::format_triple;
use ifc_translate_core::{DecodedEntity, EntityDecoder};
use nalgebra::{Matrix4, Point3, Rotation3, Translation3, Vector3};

const RECIPE: &str = "OffsetObjectPlacements";

/// Below this, direction components are treated as exact zeros
const DIRECTION_EPSILON: f64 = 1e-12;
/// Below this, coordinates are treated as exact zeros
const LOCATION_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetObjectPlacements {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub should_rotate_first: bool,
    /// Decimal degrees about +Z
    pub angle: Option<f64>,
}

impl OffsetObjectPlacements {
    pub fn from_arguments(arguments: &[Argument]) -> Result<Self> {
        if !(4..=5).contains(&arguments.len()) {
            return Err(invalid(format!(
                "expected [x, y, z, should_rotate_first, angle?], got {} arguments",
                arguments.len()
            )));
        }

        let real = |index: usize, name: &str| -> Result<f64> {
            arguments[index]
                .as_real()
                .filter(|value| value.is_finite())
                .ok_or_else(|| invalid(format!("{} must be a finite number", name)))
        };

        let should_rotate_first = arguments[3]
            .as_bool()
            .ok_or_else(|| invalid("should_rotate_first must be a boolean".to_string()))?;

        let angle = match arguments.get(4) {
            Some(_) => Some(real(4, "angle")?),
            None => None,
        };

        Ok(Self {
            x: real(0, "x")?,
            y: real(1, "y")?,
            z: real(2, "z")?,
            should_rotate_first,
            angle,
        })
    }

    /// Homogeneous transform applied to every root placement
    pub fn matrix(&self) -> Matrix4<f64> {
        let translation = Translation3::new(self.x, self.y, self.z).to_homogeneous();
        let rotation = match self.angle {
            Some(degrees) => {
                Rotation3::from_axis_angle(&Vector3::z_axis(), degrees.to_radians()).to_homogeneous()
            }
            None => Matrix4::identity(),
        };

        if self.should_rotate_first {
            translation * rotation
        } else {
            rotation * translation
        }
    }

    /// Patch the model; returns the number of rewritten placements
    pub fn apply(&self, file: &mut IfcFile) -> Result<usize> {
        let transform = self.matrix();

        // Read everything from the original model before editing it
        let planned = {
            let mut decoder = file.decoder();
            let mut planned = Vec::new();

            for id in file.by_type("IFCLOCALPLACEMENT") {
                let placement = decoder.decode_by_id(id)?;
                if !placement.is_unset(0) {
                    continue;
                }

                let relative_id = placement.get_ref(1).ok_or_else(|| Error::Placement {
                    id,
                    message: "missing RelativePlacement".to_string(),
                })?;
                let relative = decoder.decode_by_id(relative_id)?;
                if !relative.is_type("IFCAXIS2PLACEMENT3D") {
                    tracing::warn!(
                        placement = id,
                        relative_type = %relative.type_name,
                        "Skipping root placement without a 3D axis placement"
                    );
                    continue;
                }

                let matrix = parse_axis2_placement_3d(&relative, &mut decoder)?;
                planned.push((id, transform * matrix));
            }

            planned
        };

        for (id, matrix) in &planned {
            let axis_placement = add_axis2_placement_3d(file, matrix);
            file.replace_entity(*id, "IFCLOCALPLACEMENT", &format!("$,#{}", axis_placement))?;
        }

        Ok(planned.len())
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidArguments {
        recipe: RECIPE,
        message,
    }
}

/// Parse IfcAxis2Placement3D into a local-to-parent matrix
///
/// Attributes: 0 Location, 1 Axis (default +Z), 2 RefDirection (default +X)
pub fn parse_axis2_placement_3d(
    placement: &DecodedEntity,
    decoder: &mut EntityDecoder,
) -> Result<Matrix4<f64>> {
    let location = match placement.get_ref(0) {
        Some(point_id) => parse_cartesian_point(point_id, decoder)?,
        None => Point3::origin(),
    };

    let z_axis = match placement.get_ref(1) {
        Some(dir_id) => parse_direction(dir_id, decoder)?,
        None => Vector3::z(),
    };
    let x_axis = match placement.get_ref(2) {
        Some(dir_id) => parse_direction(dir_id, decoder)?,
        None => Vector3::x(),
    };

    let z_axis = z_axis
        .try_normalize(DIRECTION_EPSILON)
        .ok_or_else(|| Error::Placement {
            id: placement.id,
            message: "zero-length Axis".to_string(),
        })?;

    // Project X onto the plane perpendicular to Z
    let x_projected = x_axis - z_axis * x_axis.dot(&z_axis);
    let x_axis = match x_projected.try_normalize(1e-6) {
        Some(x) => x,
        None if z_axis.z.abs() < 0.9 => Vector3::z().cross(&z_axis).normalize(),
        None => Vector3::x().cross(&z_axis).normalize(),
    };

    // Right-handed: Y = Z × X
    let y_axis = z_axis.cross(&x_axis).normalize();

    let mut matrix = Matrix4::identity();
    matrix.fixed_view_mut::<3, 1>(0, 0).copy_from(&x_axis);
    matrix.fixed_view_mut::<3, 1>(0, 1).copy_from(&y_axis);
    matrix.fixed_view_mut::<3, 1>(0, 2).copy_from(&z_axis);
    matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&location.coords);

    Ok(matrix)
}

fn parse_cartesian_point(point_id: u32, decoder: &mut EntityDecoder) -> Result<Point3<f64>> {
    let point = decoder.decode_typed(point_id, "IFCCARTESIANPOINT")?;
    let coords = point.get_list(0).ok_or_else(|| Error::Placement {
        id: point_id,
        message: "IfcCartesianPoint missing coordinates".to_string(),
    })?;

    let x = coords.first().and_then(|v| v.as_float()).unwrap_or(0.0);
    let y = coords.get(1).and_then(|v| v.as_float()).unwrap_or(0.0);
    let z = coords.get(2).and_then(|v| v.as_float()).unwrap_or(0.0);

    Ok(Point3::new(x, y, z))
}

fn parse_direction(dir_id: u32, decoder: &mut EntityDecoder) -> Result<Vector3<f64>> {
    let direction = decoder.decode_typed(dir_id, "IFCDIRECTION")?;
    let ratios = direction.get_list(0).ok_or_else(|| Error::Placement {
        id: dir_id,
        message: "IfcDirection missing DirectionRatios".to_string(),
    })?;

    let x = ratios.first().and_then(|v| v.as_float()).unwrap_or(0.0);
    let y = ratios.get(1).and_then(|v| v.as_float()).unwrap_or(0.0);
    let z = ratios.get(2).and_then(|v| v.as_float()).unwrap_or(0.0);

    Ok(Vector3::new(x, y, z))
}

fn snap(value: f64, epsilon: f64) -> f64 {
    if value.abs() < epsilon {
        0.0
    } else {
        value
    }
}

/// Emit point, directions and axis placement for a matrix; returns the
/// id of the new IfcAxis2Placement3D
fn add_axis2_placement_3d(file: &mut IfcFile, matrix: &Matrix4<f64>) -> u32 {
    let column = |index: usize, epsilon: f64| {
        format_triple(
            snap(matrix[(0, index)], epsilon),
            snap(matrix[(1, index)], epsilon),
            snap(matrix[(2, index)], epsilon),
        )
    };

    let location = file.add_entity("IFCCARTESIANPOINT", &column(3, LOCATION_EPSILON));
    let axis = file.add_entity("IFCDIRECTION", &column(2, DIRECTION_EPSILON));
    let ref_direction = file.add_entity("IFCDIRECTION", &column(0, DIRECTION_EPSILON));

    file.add_entity(
        "IFCAXIS2PLACEMENT3D",
        &format!("#{},#{},#{}", location, axis, ref_direction),
    )
}
