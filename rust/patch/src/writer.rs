// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP serialization of an edited model

use crate::error::{Error, Result};
use crate::file::IfcFile;
use std::io::Write;
use std::path::Path;

/// Format a real the way STEP expects: always with a decimal point
///
/// `1.0` -> `1.`, `-0.5` -> `-0.5`, `0.0` and `-0.0` -> `0.`
pub fn format_real(value: f64) -> String {
    debug_assert!(value.is_finite(), "STEP reals must be finite");
    if value == 0.0 {
        return "0.".to_string();
    }
    // Display never switches to exponent notation for f64
    let mut text = value.to_string();
    if !text.contains('.') {
        text.push('.');
    }
    text
}

/// `(x,y,z)` list of reals
pub fn format_triple(x: f64, y: f64, z: f64) -> String {
    format!("({},{},{})", format_real(x), format_real(y), format_real(z))
}

/// Serialize original content with replaced entities spliced in and
/// added entities placed right before the ENDSEC closing DATA
pub(crate) fn serialize(file: &IfcFile) -> String {
    let content = &file.content;
    let data_end = file.header.data_end;

    let mut spans: Vec<(usize, usize, &str)> = file
        .replaced
        .iter()
        .filter_map(|(id, text)| {
            file.index
                .get(id)
                .map(|&(start, end)| (start, end, text.as_str()))
        })
        .collect();
    spans.sort_unstable_by_key(|&(start, _, _)| start);

    let added_len: usize = file.added.iter().map(|(_, line)| line.len() + 1).sum();
    let mut out = String::with_capacity(content.len() + added_len);

    let mut cursor = 0;
    for (start, end, text) in spans {
        out.push_str(&content[cursor..start]);
        out.push_str(text);
        cursor = end;
    }

    out.push_str(&content[cursor..data_end]);
    if !file.added.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for (_, line) in &file.added {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&content[data_end..]);

    out
}

/// Encode text as ISO-8859-1; fails on characters beyond U+00FF
pub(crate) fn encode_latin1(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| u8::try_from(c).map_err(|_| Error::Unencodable(c)))
        .collect()
}

/// Write through a temporary sibling and rename over the target
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "Wrote IFC model");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::SAMPLE;

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(1.0), "1.");
        assert_eq!(format_real(-0.5), "-0.5");
        assert_eq!(format_real(0.0), "0.");
        assert_eq!(format_real(-0.0), "0.");
        assert_eq!(format_real(1500.25), "1500.25");
        assert_eq!(format_real(1e-7), "0.0000001");
        assert_eq!(format_triple(1.0, 2.5, -3.0), "(1.,2.5,-3.)");
    }

    #[test]
    fn test_unedited_model_round_trips_byte_for_byte() {
        let file = IfcFile::from_string(SAMPLE.to_string()).unwrap();
        assert_eq!(file.to_step_string(), SAMPLE);
    }

    #[test]
    fn test_serialize_with_edits() {
        let mut file = IfcFile::from_string(SAMPLE.to_string()).unwrap();
        let point = file.add_entity("IFCCARTESIANPOINT", "(5.,0.,0.)");
        file.replace_entity(11, "IFCAXIS2PLACEMENT3D", &format!("#{},$,$", point))
            .unwrap();

        let out = file.to_step_string();
        assert!(out.contains("#11=IFCAXIS2PLACEMENT3D(#13,$,$);"));
        assert!(!out.contains("#11=IFCAXIS2PLACEMENT3D(#10,$,$);"));
        assert!(out.contains("#13=IFCCARTESIANPOINT((5.,0.,0.));\nENDSEC;\nEND-ISO-10303-21;"));

        let reopened = IfcFile::from_string(out).unwrap();
        assert_eq!(reopened.max_id(), 13);
    }

    #[test]
    fn test_encode_latin1() {
        assert_eq!(encode_latin1("Caf\u{e9}").unwrap(), b"Caf\xe9".to_vec());
        assert!(matches!(encode_latin1("\u{20ac}"), Err(Error::Unencodable('\u{20ac}'))));
    }

    #[test]
    fn test_write_atomic_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.ifc");
        std::fs::write(&target, "old").unwrap();

        let file = IfcFile::from_string(SAMPLE.to_string()).unwrap();
        file.write(&target).unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), SAMPLE);
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
