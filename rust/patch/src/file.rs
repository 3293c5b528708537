// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editable IFC model
//!
//! The original text stays untouched; rewritten and added entities are
//! tracked on the side and spliced in when the model is serialized.

use crate::error::{Error, Result};
use crate::writer;
use ifc_translate_core::{
    calculate_unit_scale, is_complex_instance, parse_entity, EntityDecoder, EntityIndex,
    EntityScanner, Statements, StepHeader,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Byte encoding of the file on disk, reused when writing it back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// ISO-8859-1, as written by exporters that put raw accented bytes
    /// inside strings instead of `\X\` escapes
    Latin1,
}

/// An opened IFC model with pending edits
pub struct IfcFile {
    pub(crate) content: String,
    pub(crate) encoding: TextEncoding,
    pub(crate) header: StepHeader,
    pub(crate) index: Arc<EntityIndex>,
    /// Entity id -> full replacement statement
    pub(crate) replaced: BTreeMap<u32, String>,
    /// Appended statements, in creation order
    pub(crate) added: Vec<(u32, String)>,
    max_id: u32,
}

impl IfcFile {
    /// Read and validate an IFC file from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            Error::invalid_file(format!("Unable to open {}: {}", path.display(), e))
        })?;
        let (content, encoding) = match String::from_utf8(bytes) {
            Ok(content) => (content, TextEncoding::Utf8),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e.utf8_error(),
                    "File is not UTF-8, reading it as ISO-8859-1"
                );
                let content: String = e.into_bytes().into_iter().map(char::from).collect();
                (content, TextEncoding::Latin1)
            }
        };

        let mut file = Self::from_string(content)?;
        file.encoding = encoding;
        Ok(file)
    }

    /// Validate STEP content and index every DATA entity
    pub fn from_string(content: String) -> Result<Self> {
        let header =
            StepHeader::parse(&content).map_err(|e| Error::invalid_file(e.to_string()))?;

        let mut index = EntityIndex::default();
        let mut max_id = 0;

        let data = &content[..header.data_end];
        for (start, end) in Statements::starting_at(data, header.data_start) {
            let line = &content[start..end];
            let id = entity_id(line)?;

            if !is_complex_instance(line) {
                parse_entity(line)
                    .map_err(|e| Error::invalid_file(format!("Entity #{}: {}", id, e)))?;
            }

            if index.insert(id, (start, end)).is_some() {
                return Err(Error::invalid_file(
                    ifc_translate_core::Error::DuplicateEntity(id).to_string(),
                ));
            }
            max_id = max_id.max(id);
        }

        tracing::debug!(
            entities = index.len(),
            schema = header.schema().unwrap_or("unknown"),
            "Indexed IFC model"
        );

        Ok(Self {
            content,
            encoding: TextEncoding::Utf8,
            header,
            index: Arc::new(index),
            replaced: BTreeMap::new(),
            added: Vec::new(),
            max_id,
        })
    }

    /// Decoder over the original (unedited) entities
    pub fn decoder(&self) -> EntityDecoder<'_> {
        EntityDecoder::new(&self.content, Arc::clone(&self.index))
    }

    /// Length unit scale: project units * scale = metres
    pub fn unit_scale(&self) -> Result<f64> {
        let mut decoder = self.decoder();
        Ok(calculate_unit_scale(self.data(), &mut decoder)?)
    }

    /// Ids of all original entities of a type, in file order
    pub fn by_type(&self, type_name: &str) -> Vec<u32> {
        EntityScanner::with_offset(self.data(), self.header.data_start)
            .find_by_type(type_name)
            .into_iter()
            .map(|(id, _, _)| id)
            .collect()
    }

    /// Append a new entity and return its id
    pub fn add_entity(&mut self, type_name: &str, arguments: &str) -> u32 {
        self.max_id += 1;
        let id = self.max_id;
        self.added
            .push((id, format!("#{}={}({});", id, type_name, arguments)));
        id
    }

    /// Rewrite an existing entity in place, keeping its id
    pub fn replace_entity(&mut self, id: u32, type_name: &str, arguments: &str) -> Result<()> {
        if !self.index.contains_key(&id) {
            return Err(ifc_translate_core::Error::EntityNotFound(id).into());
        }
        self.replaced
            .insert(id, format!("#{}={}({});", id, type_name, arguments));
        Ok(())
    }

    /// Current statement text of an entity, edits included
    pub fn entity_text(&self, id: u32) -> Option<&str> {
        if let Some(text) = self.replaced.get(&id) {
            return Some(text);
        }
        if let Some((_, text)) = self.added.iter().find(|(added_id, _)| *added_id == id) {
            return Some(text);
        }
        let &(start, end) = self.index.get(&id)?;
        Some(&self.content[start..end])
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn schema(&self) -> Option<&str> {
        self.header.schema()
    }

    pub fn entity_count(&self) -> usize {
        self.index.len() + self.added.len()
    }

    pub fn max_id(&self) -> u32 {
        self.max_id
    }

    /// Serialize the model with all edits applied
    pub fn to_step_string(&self) -> String {
        writer::serialize(self)
    }

    /// Atomically write the model to `path` in the encoding it was read in
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = self.to_step_string();
        let bytes = match self.encoding {
            TextEncoding::Utf8 => text.into_bytes(),
            TextEncoding::Latin1 => writer::encode_latin1(&text)?,
        };
        writer::write_atomic(path.as_ref(), &bytes)
    }

    /// Content up to (not including) the ENDSEC that closes DATA
    fn data(&self) -> &str {
        &self.content[..self.header.data_end]
    }
}

fn entity_id(line: &str) -> Result<u32> {
    line.strip_prefix('#')
        .and_then(|rest| rest.split_once('='))
        .and_then(|(id, _)| id.trim().parse::<u32>().ok())
        .ok_or_else(|| {
            Error::invalid_file(format!(
                "Unexpected statement in DATA section: {:?}",
                &line[..line.len().min(60)]
            ))
        })
}
