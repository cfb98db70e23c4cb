//! # Mapping Rules and the Conversion Driver
//!
//! A [`MappingRule`] is one declarative unit of conversion: where to read,
//! where to write, and how. A [`RuleSet`] is an ordered, fixed collection of
//! rules applied together against one `(source, destination)` pair; rule
//! order is conversion order and arity is fixed after construction.
//!
//! The rule kind set is closed, so dispatch is a plain `match` over a tagged
//! enum rather than runtime polymorphism. Three variants write into a
//! destination struct ([`convert`]); three append records to a [`TlvWriter`]
//! ([`convert_tlv`]). Mixing targets is a rule-set construction error,
//! rejected by [`RuleSet::validate`] / [`RuleSet::validate_tlv`], and a
//! panic if the unvalidated combination is executed anyway.
//!
//! Rule sets are immutable once built and safe to share across threads; the
//! drivers hold no state between calls, so one rule set serves any number of
//! unrelated conversions over identically shaped pairs.

use tracing::trace;

use crate::path::{resolve, resolve_mut, FieldPath};
use crate::tlv::encode;
use crate::tlv::writer::TlvWriter;
use crate::view::{FieldKind, FieldMut, FieldRef, StructView};
use crate::{FieldwireError, Result};

/// Caller-supplied converter for [`MappingRule::Custom`].
///
/// Receives the resolved source and destination field views; arbitrary logic
/// is allowed (scaling, enum translation, fixed-buffer truncation) as long as
/// the closure is pure with respect to anything but its destination field.
pub type ConvertFn = Box<dyn Fn(FieldRef<'_>, FieldMut<'_>) + Send + Sync>;

/// Key name for keyed TLV records: NUL-free text, stored with its wire
/// terminator so it can be appended as a single segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyName {
    // key bytes followed by one NUL
    bytes: Box<[u8]>,
}

impl KeyName {
    pub fn new(name: &str) -> Result<Self> {
        if name.as_bytes().contains(&0) {
            return Err(FieldwireError::EmbeddedNul {
                key: name.to_string(),
            });
        }
        let mut bytes = Vec::with_capacity(name.len() + 1);
        bytes.extend_from_slice(name.as_bytes());
        bytes.push(0);
        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    pub fn as_str(&self) -> &str {
        // constructed from valid NUL-free UTF-8
        std::str::from_utf8(&self.bytes[..self.bytes.len() - 1]).unwrap_or_default()
    }

    /// Key bytes including the trailing NUL, as written to the wire.
    pub(crate) fn with_nul(&self) -> &[u8] {
        &self.bytes
    }
}

/// One declarative conversion unit. Immutable once constructed.
pub enum MappingRule {
    /// Narrowing/truncating scalar conversion or same-kind assignment from
    /// the source field into the destination field.
    ///
    /// Scalar conversions follow `as`-cast semantics: integer casts wrap,
    /// float-to-integer saturates, nonzero means `true`. Silent precision
    /// loss is defined behavior here; wrap the conversion in a `Custom` rule
    /// when a checked variant is needed.
    Default { src: FieldPath, dst: FieldPath },

    /// Caller-supplied conversion between the two resolved fields.
    Custom {
        src: FieldPath,
        dst: FieldPath,
        convert: ConvertFn,
    },

    /// Both paths resolve to nested structs; applies `rules` as a
    /// sub-conversion scoped to those two objects.
    Struct {
        src: FieldPath,
        dst: FieldPath,
        rules: RuleSet,
    },

    /// One TLV record: raw bytes of an arithmetic field or blob, or the
    /// NUL-terminated text of a string/char-buffer field. With a key, the
    /// value becomes `key\0` followed by the field bytes.
    TlvBinary {
        src: FieldPath,
        tag: u32,
        key: Option<KeyName>,
    },

    /// One TLV record carrying the numeric field as decimal text, no
    /// trailing NUL. With a key, `key\0` followed by the text.
    TlvDigitalString {
        src: FieldPath,
        tag: u32,
        key: Option<KeyName>,
    },

    /// Serialize a nested struct with `rules` into a private temporary
    /// writer and append its entire content as one length-delimited record
    /// (optionally prefixed by `key\0`).
    TlvSubStruct {
        src: FieldPath,
        tag: u32,
        rules: RuleSet,
        key: Option<KeyName>,
    },
}

impl MappingRule {
    fn name(&self) -> &'static str {
        match self {
            MappingRule::Default { .. } => "default",
            MappingRule::Custom { .. } => "custom",
            MappingRule::Struct { .. } => "struct",
            MappingRule::TlvBinary { .. } => "tlv-binary",
            MappingRule::TlvDigitalString { .. } => "tlv-digital-string",
            MappingRule::TlvSubStruct { .. } => "tlv-sub-struct",
        }
    }

    fn is_tlv(&self) -> bool {
        matches!(
            self,
            MappingRule::TlvBinary { .. }
                | MappingRule::TlvDigitalString { .. }
                | MappingRule::TlvSubStruct { .. }
        )
    }
}

impl std::fmt::Debug for MappingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingRule::Default { src, dst } => f
                .debug_struct("Default")
                .field("src", src)
                .field("dst", dst)
                .finish(),
            MappingRule::Custom { src, dst, .. } => f
                .debug_struct("Custom")
                .field("src", src)
                .field("dst", dst)
                .finish_non_exhaustive(),
            MappingRule::Struct { src, dst, rules } => f
                .debug_struct("Struct")
                .field("src", src)
                .field("dst", dst)
                .field("rules", rules)
                .finish(),
            MappingRule::TlvBinary { src, tag, key } => f
                .debug_struct("TlvBinary")
                .field("src", src)
                .field("tag", &format_args!("{tag:#06x}"))
                .field("key", key)
                .finish(),
            MappingRule::TlvDigitalString { src, tag, key } => f
                .debug_struct("TlvDigitalString")
                .field("src", src)
                .field("tag", &format_args!("{tag:#06x}"))
                .field("key", key)
                .finish(),
            MappingRule::TlvSubStruct {
                src, tag, rules, key, ..
            } => f
                .debug_struct("TlvSubStruct")
                .field("src", src)
                .field("tag", &format_args!("{tag:#06x}"))
                .field("rules", rules)
                .field("key", key)
                .finish(),
        }
    }
}

/// Ordered, fixed collection of mapping rules.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<MappingRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<MappingRule>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    /// Validate this rule set for struct-to-struct conversion against
    /// prototype source and destination shapes.
    ///
    /// Checks every path at every level, nesting expectations of `Struct`
    /// rules (recursively), default-conversion kind compatibility, and that
    /// no TLV-output rule is present.
    pub fn validate(&self, src: &dyn StructView, dst: &dyn StructView) -> Result<()> {
        for (index, rule) in self.rules.iter().enumerate() {
            self.validate_one(rule, src, dst)
                .map_err(|e| e.at_rule(index))?;
        }
        Ok(())
    }

    fn validate_one(
        &self,
        rule: &MappingRule,
        src: &dyn StructView,
        dst: &dyn StructView,
    ) -> Result<()> {
        match rule {
            MappingRule::Default { src: sp, dst: dp } => {
                let from = sp.leaf_kind(src)?;
                let to = dp.leaf_kind(dst)?;
                if !default_convertible(from, to) {
                    return Err(FieldwireError::KindMismatch { src: from, dst: to });
                }
                Ok(())
            }
            MappingRule::Custom { src: sp, dst: dp, .. } => {
                sp.validate(src)?;
                dp.validate(dst)
            }
            MappingRule::Struct { src: sp, dst: dp, rules } => {
                let FieldRef::Struct(s) = resolve_checked(src, sp)? else {
                    return Err(FieldwireError::TargetMismatch {
                        found: "struct",
                        expected: "struct-valued source path",
                    });
                };
                let FieldRef::Struct(d) = resolve_checked(dst, dp)? else {
                    return Err(FieldwireError::TargetMismatch {
                        found: "struct",
                        expected: "struct-valued destination path",
                    });
                };
                rules.validate(s, d)
            }
            tlv => Err(FieldwireError::TargetMismatch {
                found: tlv.name(),
                expected: "a TLV writer target",
            }),
        }
    }

    /// Validate this rule set for struct-to-TLV conversion against a
    /// prototype source shape.
    pub fn validate_tlv(&self, src: &dyn StructView) -> Result<()> {
        for (index, rule) in self.rules.iter().enumerate() {
            self.validate_one_tlv(rule, src)
                .map_err(|e| e.at_rule(index))?;
        }
        Ok(())
    }

    fn validate_one_tlv(&self, rule: &MappingRule, src: &dyn StructView) -> Result<()> {
        match rule {
            MappingRule::TlvBinary { src: sp, .. } => {
                let kind = sp.leaf_kind(src)?;
                if kind == FieldKind::Struct {
                    return Err(FieldwireError::TargetMismatch {
                        found: "tlv-binary",
                        expected: "non-struct field (use TlvSubStruct for nesting)",
                    });
                }
                Ok(())
            }
            MappingRule::TlvDigitalString { src: sp, .. } => {
                let kind = sp.leaf_kind(src)?;
                if !kind.is_numeric() {
                    return Err(FieldwireError::KindMismatch {
                        src: kind,
                        dst: FieldKind::Str,
                    });
                }
                Ok(())
            }
            MappingRule::TlvSubStruct { src: sp, rules, .. } => {
                let FieldRef::Struct(nested) = resolve_checked(src, sp)? else {
                    return Err(FieldwireError::TargetMismatch {
                        found: "tlv-sub-struct",
                        expected: "struct-valued source path",
                    });
                };
                rules.validate_tlv(nested)
            }
            other => Err(FieldwireError::TargetMismatch {
                found: other.name(),
                expected: "a destination struct target",
            }),
        }
    }
}

fn resolve_checked<'a>(obj: &'a dyn StructView, path: &FieldPath) -> Result<FieldRef<'a>> {
    path.validate(obj)?;
    Ok(resolve(obj, path))
}

/// Apply every rule, in declaration order, against one `(src, dst)` pair.
///
/// The driver holds no state; a rule set is safe to reuse across unrelated
/// pairs of the same shapes. Repeated calls with an unchanged `src` produce
/// an identical `dst`.
///
/// # Panics
///
/// On contract violations (invalid paths, kind mismatches, TLV-output rules
/// in the set) that [`RuleSet::validate`] would have rejected.
pub fn convert(src: &dyn StructView, dst: &mut dyn StructView, rules: &RuleSet) {
    for (index, rule) in rules.rules.iter().enumerate() {
        trace!(rule = index, kind = rule.name(), "apply");
        match rule {
            MappingRule::Default { src: sp, dst: dp } => {
                assign_default(resolve(src, sp), resolve_mut(dst, dp));
            }
            MappingRule::Custom {
                src: sp,
                dst: dp,
                convert,
            } => {
                convert(resolve(src, sp), resolve_mut(dst, dp));
            }
            MappingRule::Struct {
                src: sp,
                dst: dp,
                rules: inner,
            } => {
                let FieldRef::Struct(s) = resolve(src, sp) else {
                    panic!("struct rule {index}: source path does not name a struct");
                };
                let FieldMut::Struct(d) = resolve_mut(dst, dp) else {
                    panic!("struct rule {index}: destination path does not name a struct");
                };
                convert(s, d, inner);
            }
            tlv => panic!(
                "{} rule {index} cannot target a destination struct",
                tlv.name()
            ),
        }
    }
}

/// Apply every TLV-output rule, in declaration order, appending records for
/// one `src` to `writer`.
///
/// # Panics
///
/// On contract violations that [`RuleSet::validate_tlv`] would have rejected.
pub fn convert_tlv(src: &dyn StructView, writer: &mut TlvWriter, rules: &RuleSet) {
    for (index, rule) in rules.rules.iter().enumerate() {
        trace!(rule = index, kind = rule.name(), "apply");
        match rule {
            MappingRule::TlvBinary { src: sp, tag, key } => {
                encode::binary_record(writer, *tag, key.as_ref(), resolve(src, sp));
            }
            MappingRule::TlvDigitalString { src: sp, tag, key } => {
                encode::digital_string_record(writer, *tag, key.as_ref(), resolve(src, sp));
            }
            MappingRule::TlvSubStruct {
                src: sp,
                tag,
                rules: inner,
                key,
            } => {
                let FieldRef::Struct(nested) = resolve(src, sp) else {
                    panic!("sub-struct rule {index}: source path does not name a struct");
                };
                encode::sub_struct_record(writer, *tag, key.as_ref(), nested, inner);
            }
            other => panic!("{} rule {index} cannot target a TLV writer", other.name()),
        }
    }
}

/// Whether a default rule may map `src` into `dst`.
fn default_convertible(src: FieldKind, dst: FieldKind) -> bool {
    if src.is_scalar() && dst.is_scalar() {
        return true;
    }
    // same-kind assignment for the remaining non-struct kinds
    src == dst && src != FieldKind::Struct
}

// Scalar values funnel through one intermediate so the conversion table stays
// a pair of matches instead of a full kind-by-kind grid.
enum Scalar {
    I(i64),
    U(u64),
    F(f64),
    B(bool),
}

fn read_scalar(field: &FieldRef<'_>) -> Option<Scalar> {
    Some(match field {
        FieldRef::I8(v) => Scalar::I(**v as i64),
        FieldRef::I16(v) => Scalar::I(**v as i64),
        FieldRef::I32(v) => Scalar::I(**v as i64),
        FieldRef::I64(v) => Scalar::I(**v),
        FieldRef::U8(v) => Scalar::U(**v as u64),
        FieldRef::U16(v) => Scalar::U(**v as u64),
        FieldRef::U32(v) => Scalar::U(**v as u64),
        FieldRef::U64(v) => Scalar::U(**v),
        FieldRef::F32(v) => Scalar::F(**v as f64),
        FieldRef::F64(v) => Scalar::F(**v),
        FieldRef::Bool(v) => Scalar::B(**v),
        _ => return None,
    })
}

macro_rules! cast_int {
    ($dst:expr, $scalar:expr, $ty:ty) => {{
        *$dst = match $scalar {
            Scalar::I(v) => v as $ty,
            Scalar::U(v) => v as $ty,
            Scalar::F(v) => v as $ty,
            Scalar::B(b) => b as u8 as $ty,
        };
    }};
}

fn write_scalar(dst: FieldMut<'_>, scalar: Scalar) -> bool {
    match dst {
        FieldMut::I8(d) => cast_int!(d, scalar, i8),
        FieldMut::I16(d) => cast_int!(d, scalar, i16),
        FieldMut::I32(d) => cast_int!(d, scalar, i32),
        FieldMut::I64(d) => cast_int!(d, scalar, i64),
        FieldMut::U8(d) => cast_int!(d, scalar, u8),
        FieldMut::U16(d) => cast_int!(d, scalar, u16),
        FieldMut::U32(d) => cast_int!(d, scalar, u32),
        FieldMut::U64(d) => cast_int!(d, scalar, u64),
        FieldMut::F32(d) => {
            *d = match scalar {
                Scalar::I(v) => v as f32,
                Scalar::U(v) => v as f32,
                Scalar::F(v) => v as f32,
                Scalar::B(b) => b as u8 as f32,
            }
        }
        FieldMut::F64(d) => {
            *d = match scalar {
                Scalar::I(v) => v as f64,
                Scalar::U(v) => v as f64,
                Scalar::F(v) => v,
                Scalar::B(b) => b as u8 as f64,
            }
        }
        FieldMut::Bool(d) => {
            *d = match scalar {
                Scalar::I(v) => v != 0,
                Scalar::U(v) => v != 0,
                Scalar::F(v) => v != 0.0,
                Scalar::B(b) => b,
            }
        }
        _ => return false,
    }
    true
}

fn assign_default(from: FieldRef<'_>, to: FieldMut<'_>) {
    if let Some(scalar) = read_scalar(&from) {
        if write_scalar(to, scalar) {
            return;
        }
        panic!("default rule: cannot convert a scalar into a non-scalar field");
    }
    match (from, to) {
        (FieldRef::Str(s), FieldMut::Str(d)) => {
            d.clear();
            d.push_str(s);
        }
        (FieldRef::CharBuf(s), FieldMut::CharBuf(d)) => {
            let text = crate::view::char_buf_text(s);
            let n = text.len().min(d.len().saturating_sub(1));
            d[..n].copy_from_slice(&text[..n]);
            d[n..].fill(0);
        }
        (FieldRef::Bytes(s), FieldMut::Bytes(d)) => {
            let n = s.len().min(d.len());
            d[..n].copy_from_slice(&s[..n]);
        }
        (from, to) => panic!(
            "default rule: cannot convert {} into {}",
            from.kind(),
            to.kind()
        ),
    }
}
