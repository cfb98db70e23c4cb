//! # Fieldwire - Declarative Field Mapping with TLV Wire Encoding
//!
//! Converts between heterogeneously-shaped structured records via reusable
//! mapping rules, and encodes the result into a compact self-delimiting
//! Type-Length-Value binary format.
//!
//! ## API Surface
//!
//! - **Field addressing**: [`FieldPath`], [`resolve`], [`resolve_mut`] -
//!   positional access to (possibly nested) fields
//! - **Capability contract**: [`StructView`], [`FieldRef`], [`FieldMut`] -
//!   how an aggregate exposes its fields; [`impl_struct_view!`] generates
//!   the implementation from an explicit field-descriptor list
//! - **Rules**: [`MappingRule`], [`RuleSet`] - immutable, reusable
//!   conversion configuration
//! - **Drivers**: [`convert`] (struct to struct), [`convert_tlv`]
//!   (struct to wire)
//! - **Wire format**: [`TlvWriter`] - growable buffer of
//!   `[type: u32][length: u32][value]` records in host byte order
//!
//! ## Quick Start
//!
//! ```rust
//! use fieldwire::{convert, impl_struct_view, FieldPath, MappingRule, RuleSet};
//!
//! struct Source { id: i32, value: f32 }
//! struct Destination { val: f32, identifier: i32 }
//!
//! impl_struct_view!(Source { 0 => id: i32, 1 => value: f32 });
//! impl_struct_view!(Destination { 0 => val: f32, 1 => identifier: i32 });
//!
//! let rules = RuleSet::new(vec![
//!     MappingRule::Default { src: FieldPath::new([1]), dst: FieldPath::new([0]) },
//!     MappingRule::Default { src: FieldPath::new([0]), dst: FieldPath::new([1]) },
//! ]);
//!
//! let src = Source { id: 1, value: 2.0 };
//! let mut dst = Destination { val: 0.0, identifier: 0 };
//! rules.validate(&src, &dst).unwrap();
//! convert(&src, &mut dst, &rules);
//! assert_eq!(dst.identifier, 1);
//! ```
//!
//! ## Error Model
//!
//! Rule sets are configuration: path validity, kind compatibility, and key
//! names are checked once at construction/validation time and surfaced as
//! [`FieldwireError`]. The steady-state conversion path never returns
//! `Result`; a contract violation that slips past validation panics rather
//! than silently continuing. The only runtime-recoverable condition is
//! allocation failure during writer growth, surfaced as writer state via
//! [`TlvWriter::is_valid`], never as a panic.
//!
//! ## Concurrency
//!
//! Single-threaded and synchronous. A constructed [`RuleSet`] is immutable
//! and `Send + Sync`; a [`TlvWriter`] or mutable destination must be confined
//! to one thread per conversion session.

use thiserror::Error;

pub mod path;
pub mod rules;
pub mod tlv;
pub mod view;

#[cfg(feature = "json")]
pub mod json;

pub use path::{resolve, resolve_mut, FieldPath};
pub use rules::{convert, convert_tlv, ConvertFn, KeyName, MappingRule, RuleSet};
pub use tlv::writer::{TlvWriter, RECORD_HEADER_LEN};
pub use view::{
    char_array_to_string, string_to_char_array, FieldKind, FieldMut, FieldRef, StructView,
};

#[cfg(feature = "json")]
pub use json::JsonWriter;

/// Contract errors caught at rule construction/validation time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldwireError {
    #[error("field index {index} out of range at depth {depth} ({field_count} fields)")]
    IndexOutOfRange {
        depth: usize,
        index: usize,
        field_count: usize,
    },

    #[error("field at depth {depth}, index {index} is {kind}, not a struct")]
    NotAStruct {
        depth: usize,
        index: usize,
        kind: view::FieldKind,
    },

    #[error("cannot default-convert {src} into {dst}")]
    KindMismatch {
        src: view::FieldKind,
        dst: view::FieldKind,
    },

    #[error("{found} rule requires {expected}")]
    TargetMismatch {
        found: &'static str,
        expected: &'static str,
    },

    #[error("key name contains an embedded NUL: {key:?}")]
    EmbeddedNul { key: String },

    #[error("rule {index}: {source}")]
    InvalidRule {
        index: usize,
        #[source]
        source: Box<FieldwireError>,
    },
}

impl FieldwireError {
    pub(crate) fn at_rule(self, index: usize) -> Self {
        FieldwireError::InvalidRule {
            index,
            source: Box::new(self),
        }
    }
}

/// Result type for rule-set construction and validation
pub type Result<T> = std::result::Result<T, FieldwireError>;
