//! # StructView - Positional Field Access Capability
//!
//! The core never reflects over types on its own. Any aggregate that wants to
//! participate in a conversion exposes a fixed field count and positional
//! get-by-index access through [`StructView`], with fields surfaced as
//! borrowed [`FieldRef`]/[`FieldMut`] views over a closed set of kinds.
//!
//! Implementations come from an explicit, typed field-descriptor list written
//! once per type via [`impl_struct_view!`]. There is no arity probing and no
//! runtime registration: the descriptor list is the single source of truth
//! for both the field count and the index-to-field assignment.

/// Positional field access over a fixed set of fields.
///
/// Indices are zero-based and stable for the lifetime of the type. An index
/// `>= field_count()` is a programming error; implementations fail fast with
/// a panic rather than returning a sentinel. Shape validation at rule-set
/// construction time is the supported way to rule such indices out.
pub trait StructView {
    /// Number of addressable fields.
    fn field_count(&self) -> usize;

    /// Borrow the field at `index`.
    fn field(&self, index: usize) -> FieldRef<'_>;

    /// Mutably borrow the field at `index`.
    fn field_mut(&mut self, index: usize) -> FieldMut<'_>;
}

/// Borrowed view of one field. An alias, never a copy.
pub enum FieldRef<'a> {
    I8(&'a i8),
    I16(&'a i16),
    I32(&'a i32),
    I64(&'a i64),
    U8(&'a u8),
    U16(&'a u16),
    U32(&'a u32),
    U64(&'a u64),
    F32(&'a f32),
    F64(&'a f64),
    Bool(&'a bool),
    /// Owned growable string field.
    Str(&'a str),
    /// Fixed-capacity NUL-terminated text buffer; the slice spans the full
    /// capacity, the text ends at the first NUL.
    CharBuf(&'a [u8]),
    /// Raw binary blob, serialized byte-for-byte.
    Bytes(&'a [u8]),
    /// Nested aggregate exposing the same capability.
    Struct(&'a dyn StructView),
}

/// Mutable counterpart of [`FieldRef`].
pub enum FieldMut<'a> {
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    F32(&'a mut f32),
    F64(&'a mut f64),
    Bool(&'a mut bool),
    Str(&'a mut String),
    CharBuf(&'a mut [u8]),
    Bytes(&'a mut [u8]),
    Struct(&'a mut dyn StructView),
}

/// Discriminant of a field view, used in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
    Str,
    CharBuf,
    Bytes,
    Struct,
}

impl FieldKind {
    /// Integer or floating-point field.
    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            FieldKind::Bool
                | FieldKind::Str
                | FieldKind::CharBuf
                | FieldKind::Bytes
                | FieldKind::Struct
        )
    }

    /// Scalar fields participate in default narrowing conversions.
    pub fn is_scalar(self) -> bool {
        self.is_numeric() || self == FieldKind::Bool
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldKind::I8 => "i8",
            FieldKind::I16 => "i16",
            FieldKind::I32 => "i32",
            FieldKind::I64 => "i64",
            FieldKind::U8 => "u8",
            FieldKind::U16 => "u16",
            FieldKind::U32 => "u32",
            FieldKind::U64 => "u64",
            FieldKind::F32 => "f32",
            FieldKind::F64 => "f64",
            FieldKind::Bool => "bool",
            FieldKind::Str => "string",
            FieldKind::CharBuf => "char buffer",
            FieldKind::Bytes => "byte blob",
            FieldKind::Struct => "struct",
        };
        f.write_str(name)
    }
}

impl FieldRef<'_> {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldRef::I8(_) => FieldKind::I8,
            FieldRef::I16(_) => FieldKind::I16,
            FieldRef::I32(_) => FieldKind::I32,
            FieldRef::I64(_) => FieldKind::I64,
            FieldRef::U8(_) => FieldKind::U8,
            FieldRef::U16(_) => FieldKind::U16,
            FieldRef::U32(_) => FieldKind::U32,
            FieldRef::U64(_) => FieldKind::U64,
            FieldRef::F32(_) => FieldKind::F32,
            FieldRef::F64(_) => FieldKind::F64,
            FieldRef::Bool(_) => FieldKind::Bool,
            FieldRef::Str(_) => FieldKind::Str,
            FieldRef::CharBuf(_) => FieldKind::CharBuf,
            FieldRef::Bytes(_) => FieldKind::Bytes,
            FieldRef::Struct(_) => FieldKind::Struct,
        }
    }
}

impl FieldMut<'_> {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldMut::I8(_) => FieldKind::I8,
            FieldMut::I16(_) => FieldKind::I16,
            FieldMut::I32(_) => FieldKind::I32,
            FieldMut::I64(_) => FieldKind::I64,
            FieldMut::U8(_) => FieldKind::U8,
            FieldMut::U16(_) => FieldKind::U16,
            FieldMut::U32(_) => FieldKind::U32,
            FieldMut::U64(_) => FieldKind::U64,
            FieldMut::F32(_) => FieldKind::F32,
            FieldMut::F64(_) => FieldKind::F64,
            FieldMut::Bool(_) => FieldKind::Bool,
            FieldMut::Str(_) => FieldKind::Str,
            FieldMut::CharBuf(_) => FieldKind::CharBuf,
            FieldMut::Bytes(_) => FieldKind::Bytes,
            FieldMut::Struct(_) => FieldKind::Struct,
        }
    }
}

/// Copy `src` into a fixed-capacity NUL-terminated buffer.
///
/// Writes at most `dst.len() - 1` content bytes, zero-fills the tail, and
/// always leaves the buffer NUL-terminated, for any input length including
/// zero. Truncation is defined behavior, not an error.
pub fn string_to_char_array(dst: &mut [u8], src: &str) {
    if dst.is_empty() {
        return;
    }
    let n = src.len().min(dst.len() - 1);
    dst[..n].copy_from_slice(&src.as_bytes()[..n]);
    dst[n..].fill(0);
}

/// Text content of a NUL-terminated buffer as an owned string.
///
/// Reads up to the first NUL (or the whole buffer if none), replacing any
/// invalid UTF-8 with the replacement character.
pub fn char_array_to_string(src: &[u8]) -> String {
    String::from_utf8_lossy(char_buf_text(src)).into_owned()
}

/// Bytes of a NUL-terminated buffer up to, excluding, the first NUL.
pub(crate) fn char_buf_text(buf: &[u8]) -> &[u8] {
    match buf.iter().position(|&b| b == 0) {
        Some(n) => &buf[..n],
        None => buf,
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_ref {
    (i8, $e:expr) => {
        $crate::FieldRef::I8($e)
    };
    (i16, $e:expr) => {
        $crate::FieldRef::I16($e)
    };
    (i32, $e:expr) => {
        $crate::FieldRef::I32($e)
    };
    (i64, $e:expr) => {
        $crate::FieldRef::I64($e)
    };
    (u8, $e:expr) => {
        $crate::FieldRef::U8($e)
    };
    (u16, $e:expr) => {
        $crate::FieldRef::U16($e)
    };
    (u32, $e:expr) => {
        $crate::FieldRef::U32($e)
    };
    (u64, $e:expr) => {
        $crate::FieldRef::U64($e)
    };
    (f32, $e:expr) => {
        $crate::FieldRef::F32($e)
    };
    (f64, $e:expr) => {
        $crate::FieldRef::F64($e)
    };
    (bool, $e:expr) => {
        $crate::FieldRef::Bool($e)
    };
    (str, $e:expr) => {
        $crate::FieldRef::Str($e.as_str())
    };
    (char_buf, $e:expr) => {
        $crate::FieldRef::CharBuf(&$e[..])
    };
    (bytes, $e:expr) => {
        $crate::FieldRef::Bytes(&$e[..])
    };
    (struct, $e:expr) => {
        $crate::FieldRef::Struct($e)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_mut {
    (i8, $e:expr) => {
        $crate::FieldMut::I8($e)
    };
    (i16, $e:expr) => {
        $crate::FieldMut::I16($e)
    };
    (i32, $e:expr) => {
        $crate::FieldMut::I32($e)
    };
    (i64, $e:expr) => {
        $crate::FieldMut::I64($e)
    };
    (u8, $e:expr) => {
        $crate::FieldMut::U8($e)
    };
    (u16, $e:expr) => {
        $crate::FieldMut::U16($e)
    };
    (u32, $e:expr) => {
        $crate::FieldMut::U32($e)
    };
    (u64, $e:expr) => {
        $crate::FieldMut::U64($e)
    };
    (f32, $e:expr) => {
        $crate::FieldMut::F32($e)
    };
    (f64, $e:expr) => {
        $crate::FieldMut::F64($e)
    };
    (bool, $e:expr) => {
        $crate::FieldMut::Bool($e)
    };
    (str, $e:expr) => {
        $crate::FieldMut::Str($e)
    };
    (char_buf, $e:expr) => {
        $crate::FieldMut::CharBuf(&mut $e[..])
    };
    (bytes, $e:expr) => {
        $crate::FieldMut::Bytes(&mut $e[..])
    };
    (struct, $e:expr) => {
        $crate::FieldMut::Struct($e)
    };
}

/// Implement [`StructView`] for a type from an explicit field-descriptor list.
///
/// Each entry assigns a positional index, names the field, and declares its
/// kind token: the scalar primitives (`i8`..`u64`, `f32`, `f64`, `bool`),
/// `str` for `String` fields, `char_buf` for fixed `[u8; N]` text buffers,
/// `bytes` for raw `[u8; N]` blobs, and `struct` for nested aggregates that
/// implement `StructView` themselves.
///
/// ```rust
/// use fieldwire::impl_struct_view;
///
/// struct Inner { a: i32, b: f32 }
/// struct Outer { inner: Inner, count: i32, name: [u8; 16] }
///
/// impl_struct_view!(Inner { 0 => a: i32, 1 => b: f32 });
/// impl_struct_view!(Outer {
///     0 => inner: struct,
///     1 => count: i32,
///     2 => name: char_buf,
/// });
/// ```
#[macro_export]
macro_rules! impl_struct_view {
    ($ty:ty { $($idx:literal => $field:ident : $kind:tt),+ $(,)? }) => {
        impl $crate::StructView for $ty {
            fn field_count(&self) -> usize {
                [$($idx as usize),+].len()
            }

            fn field(&self, index: usize) -> $crate::FieldRef<'_> {
                match index {
                    $($idx => $crate::__field_ref!($kind, &self.$field),)+
                    _ => panic!(
                        "field index {} out of range for {}",
                        index,
                        stringify!($ty)
                    ),
                }
            }

            fn field_mut(&mut self, index: usize) -> $crate::FieldMut<'_> {
                match index {
                    $($idx => $crate::__field_mut!($kind, &mut self.$field),)+
                    _ => panic!(
                        "field index {} out of range for {}",
                        index,
                        stringify!($ty)
                    ),
                }
            }
        }
    };
}
