//! # Field Paths - Nested Positional Addressing
//!
//! A [`FieldPath`] locates a (possibly nested) field as an ordered list of
//! positional indices, fixed at rule-authoring time. Depth 0 is the identity
//! path and denotes the whole object. Resolution is a plain loop over the
//! index list with a struct-capability check at every intermediate hop.
//!
//! Path validity is a construction-time concern: [`FieldPath::validate`]
//! walks a prototype shape and reports the exact failing level. Once a rule
//! set has been validated, resolution at conversion time never fails; if a
//! contract violation reaches it anyway, it panics (fail fast, never
//! silently continue).

use crate::view::{FieldMut, FieldRef, StructView};
use crate::{FieldwireError, Result};

/// Ordered, fixed sequence of non-negative field indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    indices: Vec<usize>,
}

impl FieldPath {
    /// Path addressing a field by its index sequence.
    pub fn new(indices: impl Into<Vec<usize>>) -> Self {
        Self {
            indices: indices.into(),
        }
    }

    /// The identity path: depth 0, resolves to the object itself.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    pub fn is_root(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Check every index against the field counts of a prototype shape.
    ///
    /// Intermediate levels must expose the struct capability; the final
    /// index may name a field of any kind.
    pub fn validate(&self, shape: &dyn StructView) -> Result<()> {
        let mut current = shape;
        for (depth, &index) in self.indices.iter().enumerate() {
            let field_count = current.field_count();
            if index >= field_count {
                return Err(FieldwireError::IndexOutOfRange {
                    depth,
                    index,
                    field_count,
                });
            }
            if depth + 1 < self.indices.len() {
                match current.field(index) {
                    FieldRef::Struct(inner) => current = inner,
                    other => {
                        return Err(FieldwireError::NotAStruct {
                            depth,
                            index,
                            kind: other.kind(),
                        })
                    }
                }
            }
        }
        Ok(())
    }

    /// Kind of the field this path resolves to on the given shape.
    pub(crate) fn leaf_kind(&self, shape: &dyn StructView) -> Result<crate::view::FieldKind> {
        self.validate(shape)?;
        Ok(resolve(shape, self).kind())
    }
}

impl<const N: usize> From<[usize; N]> for FieldPath {
    fn from(indices: [usize; N]) -> Self {
        Self::new(indices)
    }
}

/// Resolve a path to a shared field view. The identity path yields the
/// object itself.
///
/// # Panics
///
/// On an index out of range or a non-struct intermediate field. Both are
/// contract violations that [`FieldPath::validate`] rejects up front.
pub fn resolve<'a>(obj: &'a dyn StructView, path: &FieldPath) -> FieldRef<'a> {
    let Some((&last, hops)) = path.indices.split_last() else {
        return FieldRef::Struct(obj);
    };
    let mut current = obj;
    for (depth, &index) in hops.iter().enumerate() {
        current = match current.field(index) {
            FieldRef::Struct(inner) => inner,
            other => panic!(
                "field path {:?}: index {} at depth {} is {}, not a struct",
                path.indices,
                index,
                depth,
                other.kind()
            ),
        };
    }
    current.field(last)
}

/// Resolve a path to a mutable field view. See [`resolve`].
pub fn resolve_mut<'a>(obj: &'a mut dyn StructView, path: &FieldPath) -> FieldMut<'a> {
    let Some((&last, hops)) = path.indices.split_last() else {
        return FieldMut::Struct(obj);
    };
    let mut current = obj;
    for (depth, &index) in hops.iter().enumerate() {
        current = match current.field_mut(index) {
            FieldMut::Struct(inner) => inner,
            other => panic!(
                "field path {:?}: index {} at depth {} is {}, not a struct",
                path.indices,
                index,
                depth,
                other.kind()
            ),
        };
    }
    current.field_mut(last)
}
