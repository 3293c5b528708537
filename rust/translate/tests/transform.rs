// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod common;

use common::{RecordingEngine, MILLIMETRE_MODEL};
use ifc_translate::{Argument, Error, IfcPatchEngine, TransformInvoker, TransformParams};
use ifc_translate_patch::IfcFile;
use std::fs;

#[test]
fn test_metres_become_millimetres() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("site.ifc");
    let output = dir.path().join("site_moved.ifc");
    fs::write(&input, MILLIMETRE_MODEL).unwrap();

    let invoker = TransformInvoker::new(IfcPatchEngine);
    invoker
        .invoke(&input, &output, &TransformParams::new(2.5, 0.0, -1.0, true, 0.0))
        .unwrap();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("IFCCARTESIANPOINT((2500.,0.,-1000.))"));
    assert!(text.contains("#12=IFCLOCALPLACEMENT($,#16);"));
    // Input untouched
    assert_eq!(fs::read_to_string(&input).unwrap(), MILLIMETRE_MODEL);
    assert!(IfcFile::open(&output).is_ok());
}

#[test]
fn test_invalid_file_is_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("garbage.ifc");
    fs::write(&input, "this is not STEP").unwrap();

    let invoker = TransformInvoker::new(IfcPatchEngine);
    let err = invoker
        .invoke(&input, &dir.path().join("out.ifc"), &TransformParams::default())
        .unwrap_err();

    assert!(matches!(err, Error::InvalidFile(_)));
    assert!(err.to_string().starts_with("Invalid IFC file: "));
    assert!(!dir.path().join("out.ifc").exists());
}

#[test]
fn test_write_failure_is_transform_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("site.ifc");
    fs::write(&input, MILLIMETRE_MODEL).unwrap();

    let invoker = TransformInvoker::new(IfcPatchEngine);
    let err = invoker
        .invoke(
            &input,
            &dir.path().join("missing").join("site.ifc"),
            &TransformParams::default(),
        )
        .unwrap_err();
    assert!(err.to_string().starts_with("Transformation failed: "));
}

#[test]
fn test_engine_receives_scaled_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("feet.ifc");
    fs::write(&input, "").unwrap();

    let (engine, calls) = RecordingEngine::new(0.3048);
    let invoker = TransformInvoker::new(engine);
    invoker
        .invoke(
            &input,
            &dir.path().join("out.ifc"),
            &TransformParams::new(0.3048, 3.048, 0.0, false, -15.0),
        )
        .unwrap();

    let calls = calls.lock().unwrap();
    let arguments = &calls[0].1;
    assert_eq!(arguments.len(), 5);
    approx::assert_relative_eq!(arguments[0].as_real().unwrap(), 1.0);
    approx::assert_relative_eq!(arguments[1].as_real().unwrap(), 10.0);
    assert_eq!(arguments[3], Argument::Bool(false));
    assert_eq!(arguments[4], Argument::Real(-15.0));
}
