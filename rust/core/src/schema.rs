// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded attribute model
//!
//! Owned counterparts of parser tokens, used once an entity leaves the
//! zero-copy tokenizer.

use crate::parser::Token;

/// IFC entity attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Entity reference
    EntityRef(u32),
    /// String value
    String(String),
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// Enum value without the surrounding dots
    Enum(String),
    /// List of values
    List(Vec<AttributeValue>),
    /// Typed value such as IFCLENGTHMEASURE(0.3048)
    Typed(String, Vec<AttributeValue>),
    /// Null/undefined
    Null,
    /// Derived value (*)
    Derived,
}

impl AttributeValue {
    /// Convert from Token
    pub fn from_token(token: &Token) -> Self {
        match token {
            Token::EntityRef(id) => AttributeValue::EntityRef(*id),
            Token::String(s) => AttributeValue::String(s.to_string()),
            Token::Integer(i) => AttributeValue::Integer(*i),
            Token::Float(f) => AttributeValue::Float(*f),
            Token::Enum(e) => AttributeValue::Enum(e.to_string()),
            Token::List(items) => AttributeValue::List(items.iter().map(Self::from_token).collect()),
            Token::TypedValue(type_name, args) => AttributeValue::Typed(
                type_name.to_string(),
                args.iter().map(Self::from_token).collect(),
            ),
            Token::Null => AttributeValue::Null,
            Token::Derived => AttributeValue::Derived,
        }
    }

    #[inline]
    pub fn as_entity_ref(&self) -> Option<u32> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    #[inline]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as enum value (dots already stripped)
    #[inline]
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Get as float; integers widen
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Numeric payload of a plain or typed measure
    /// `IFCLENGTHMEASURE(0.3048)` and `0.3048` both yield 0.3048
    pub fn as_measure(&self) -> Option<f64> {
        match self {
            AttributeValue::Typed(_, args) if args.len() == 1 => args[0].as_float(),
            other => other.as_float(),
        }
    }

    /// Check if null/derived
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null | AttributeValue::Derived)
    }
}

/// Decoded IFC entity with attributes
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEntity {
    pub id: u32,
    pub type_name: String,
    pub attributes: Vec<AttributeValue>,
}

impl DecodedEntity {
    pub fn new(id: u32, type_name: impl Into<String>, attributes: Vec<AttributeValue>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            attributes,
        }
    }

    /// Case-insensitive type check: `is_type("IfcSIUnit")`
    #[inline]
    pub fn is_type(&self, name: &str) -> bool {
        self.type_name.eq_ignore_ascii_case(name)
    }

    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    pub fn get_ref(&self, index: usize) -> Option<u32> {
        self.get(index).and_then(|v| v.as_entity_ref())
    }

    pub fn get_enum(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_enum())
    }

    pub fn get_float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(|v| v.as_float())
    }

    pub fn get_list(&self, index: usize) -> Option<&[AttributeValue]> {
        self.get(index).and_then(|v| v.as_list())
    }

    /// Attribute is missing, `$` or `*`
    pub fn is_unset(&self, index: usize) -> bool {
        self.get(index).map_or(true, AttributeValue::is_null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_entity;

    #[test]
    fn test_typed_measure() {
        let (_, _, tokens) =
            parse_entity("#5=IFCMEASUREWITHUNIT(IFCLENGTHMEASURE(0.3048),#4);").unwrap();
        let value = AttributeValue::from_token(&tokens[0]);
        assert_eq!(value.as_measure(), Some(0.3048));
        assert_eq!(value.as_float(), None);
    }

    #[test]
    fn test_entity_accessors() {
        let (id, type_name, tokens) =
            parse_entity("#7=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);").unwrap();
        let entity = DecodedEntity::new(
            id,
            type_name,
            tokens.iter().map(AttributeValue::from_token).collect(),
        );
        assert!(entity.is_type("IfcSIUnit"));
        assert!(entity.is_unset(0));
        assert_eq!(entity.get_enum(1), Some("LENGTHUNIT"));
        assert_eq!(entity.get_enum(2), Some("MILLI"));
        assert!(entity.is_unset(9));
    }
}
