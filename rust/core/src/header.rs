// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP Part 21 exchange structure: magic, HEADER and DATA sections.

use crate::error::{Error, Result};
use crate::parser::{parse_value, Statements, Token};

const MAGIC: &str = "ISO-10303-21";

/// Section layout of a STEP file
#[derive(Debug, Clone, PartialEq)]
pub struct StepHeader {
    /// FILE_SCHEMA identifiers, e.g. ["IFC4"]
    pub schema_identifiers: Vec<String>,
    /// First byte after the `DATA;` statement
    pub data_start: usize,
    /// First byte of the `ENDSEC;` closing the DATA section
    pub data_end: usize,
}

impl StepHeader {
    pub fn parse(content: &str) -> Result<Self> {
        let content_start = content.len() - content.trim_start_matches('\u{feff}').len();
        let mut statements = Statements::starting_at(content, content_start);

        match statements.next() {
            Some((start, end)) if keyword(&content[start..end]) == MAGIC => {}
            _ => return Err(Error::NotStep(format!("missing {} magic", MAGIC))),
        }

        match statements.next() {
            Some((start, end)) if keyword(&content[start..end]) == "HEADER" => {}
            _ => return Err(Error::MissingSection("HEADER")),
        }

        let mut schema_identifiers = Vec::new();
        let mut data_start = None;

        for (start, end) in statements.by_ref() {
            let statement = &content[start..end];
            match keyword(statement) {
                "FILE_SCHEMA" => schema_identifiers = file_schema(statement)?,
                "DATA" => {
                    data_start = Some(end);
                    break;
                }
                _ => {}
            }
        }

        let data_start = data_start.ok_or(Error::MissingSection("DATA"))?;

        // Entities never start with ENDSEC, so the first such statement closes DATA
        let data_end = statements
            .find(|&(start, end)| keyword(&content[start..end]) == "ENDSEC")
            .map(|(start, _)| start)
            .ok_or(Error::MissingSection("ENDSEC"))?;

        Ok(Self {
            schema_identifiers,
            data_start,
            data_end,
        })
    }

    /// Primary schema, e.g. "IFC2X3" or "IFC4"
    pub fn schema(&self) -> Option<&str> {
        self.schema_identifiers.first().map(String::as_str)
    }
}

/// Leading identifier of a statement: `FILE_SCHEMA(('IFC4'));` -> `FILE_SCHEMA`
fn keyword(statement: &str) -> &str {
    let end = statement
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(statement.len());
    &statement[..end]
}

fn file_schema(statement: &str) -> Result<Vec<String>> {
    let body = statement.trim_end_matches(';');
    match parse_value(body)? {
        Token::TypedValue(_, args) => match args.first() {
            Some(Token::List(items)) => Ok(items
                .iter()
                .filter_map(|item| match item {
                    Token::String(s) => Some(s.to_string()),
                    _ => None,
                })
                .collect()),
            _ => Ok(Vec::new()),
        },
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('model.ifc','2024-01-01T00:00:00',(''),(''),'','','');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCPROJECT('g',$,'P',$,$,$,$,$,$);
ENDSEC;
END-ISO-10303-21;
";

    #[test]
    fn test_parse_header() {
        let header = StepHeader::parse(MINIMAL).unwrap();
        assert_eq!(header.schema(), Some("IFC4"));
        let data = &MINIMAL[header.data_start..header.data_end];
        assert_eq!(data.trim(), "#1=IFCPROJECT('g',$,'P',$,$,$,$,$,$);");
    }

    #[test]
    fn test_rejects_non_step() {
        assert!(matches!(
            StepHeader::parse("hello world;"),
            Err(Error::NotStep(_))
        ));
        assert!(matches!(StepHeader::parse(""), Err(Error::NotStep(_))));
    }

    #[test]
    fn test_missing_data_section() {
        let content = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC2X3'));\nENDSEC;\nEND-ISO-10303-21;\n";
        assert_eq!(StepHeader::parse(content), Err(Error::MissingSection("DATA")));
    }
}
