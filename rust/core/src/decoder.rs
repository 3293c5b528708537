// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity Decoder - On-demand entity parsing
//!
//! Lazily decode IFC entities from byte offsets instead of materialising
//! the whole model.

use crate::error::{Error, Result};
use crate::parser::parse_entity;
use crate::schema::{AttributeValue, DecodedEntity};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Entity index: entity id -> (start, end) byte range of its statement
pub type EntityIndex = FxHashMap<u32, (usize, usize)>;

/// Entity decoder for lazy parsing - uses Arc for cheap cache hits
pub struct EntityDecoder<'a> {
    content: &'a str,
    cache: FxHashMap<u32, Arc<DecodedEntity>>,
    entity_index: Arc<EntityIndex>,
}

impl<'a> EntityDecoder<'a> {
    /// Create a decoder over `content` sharing an index built by the caller
    pub fn new(content: &'a str, index: Arc<EntityIndex>) -> Self {
        Self {
            content,
            cache: FxHashMap::default(),
            entity_index: index,
        }
    }

    /// Decode entity at byte offset
    pub fn decode_at(&mut self, start: usize, end: usize) -> Result<DecodedEntity> {
        let line = &self.content[start..end];
        let (id, type_name, tokens) = parse_entity(line).map_err(|e| {
            Error::parse(
                start,
                format!("{}, input: {:?}", e, &line[..line.len().min(100)]),
            )
        })?;

        if let Some(entity) = self.cache.get(&id) {
            return Ok(entity.as_ref().clone());
        }

        let attributes = tokens.iter().map(AttributeValue::from_token).collect();
        let entity = DecodedEntity::new(id, type_name, attributes);
        self.cache.insert(id, Arc::new(entity.clone()));
        Ok(entity)
    }

    /// Decode entity by ID - O(1) lookup using entity index
    pub fn decode_by_id(&mut self, entity_id: u32) -> Result<DecodedEntity> {
        if let Some(entity) = self.cache.get(&entity_id) {
            return Ok(entity.as_ref().clone());
        }

        let (start, end) = self
            .entity_index
            .get(&entity_id)
            .copied()
            .ok_or(Error::EntityNotFound(entity_id))?;

        self.decode_at(start, end)
    }

    /// Decode entity by ID and check its type
    pub fn decode_typed(&mut self, entity_id: u32, expected: &'static str) -> Result<DecodedEntity> {
        let entity = self.decode_by_id(entity_id)?;
        if !entity.is_type(expected) {
            return Err(Error::UnexpectedType {
                id: entity_id,
                expected,
                found: entity.type_name,
            });
        }
        Ok(entity)
    }

    /// Resolve entity reference (follow #ID)
    /// Returns None for null/derived values
    pub fn resolve_ref(&mut self, attr: &AttributeValue) -> Result<Option<DecodedEntity>> {
        match attr.as_entity_ref() {
            Some(id) => Ok(Some(self.decode_by_id(id)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
pub(crate) fn index_of(content: &str) -> Arc<EntityIndex> {
    let mut scanner = crate::parser::EntityScanner::new(content);
    let mut index = EntityIndex::default();
    while let Some((id, _, start, end)) = scanner.next_entity() {
        index.insert(id, (start, end));
    }
    Arc::new(index)
}
