// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC Translate Core Parser
//!
//! STEP/IFC reader built with [nom](https://docs.rs/nom), sized for
//! placement patching rather than geometry processing.
//!
//! ## Overview
//!
//! - **STEP Tokenization**: Zero-copy parsing of STEP Part 21 values
//! - **Statement Scanning**: string-aware entity discovery using [memchr](https://docs.rs/memchr)
//! - **Lazy Decoding**: On-demand attribute parsing with an id index
//! - **Units**: project length unit scale, SI and conversion-based
//!
//! ## Quick Start
//!
//! ```rust
//! use ifc_translate_core::{EntityScanner, parse_entity};
//!
//! let content = "#1=IFCPROJECT('guid',$,$,$,$,$,$,$,$);";
//! let mut scanner = EntityScanner::new(content);
//! while let Some((id, type_name, _, _)) = scanner.next_entity() {
//!     assert_eq!((id, type_name), (1, "IFCPROJECT"));
//! }
//!
//! let (id, type_name, attrs) = parse_entity("#123=IFCWALL('guid',$,$,$,$,$,$,$);").unwrap();
//! assert_eq!((id, type_name, attrs.len()), (123, "IFCWALL", 8));
//! ```

pub mod decoder;
pub mod error;
pub mod header;
pub mod parser;
pub mod schema;
pub mod units;

pub use decoder::{EntityDecoder, EntityIndex};
pub use error::{Error, Result};
pub use header::StepHeader;
pub use parser::{is_complex_instance, parse_entity, parse_value, EntityScanner, Statements, Token};
pub use schema::{AttributeValue, DecodedEntity};
pub use units::{calculate_unit_scale, extract_length_unit_scale, get_si_prefix_multiplier};
