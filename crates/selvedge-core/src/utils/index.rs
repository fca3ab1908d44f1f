// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Strongly Typed Indices
//!
//! Phantom-typed wrappers around `usize` that keep index spaces apart. A
//! roll evaluation juggles several parallel sequences (defects, merged
//! regions, search monitors); passing a defect position where a region
//! position is expected compiles fine with raw `usize` and silently selects
//! the wrong cut. `TypedIndex<T>` moves that mistake to compile time and
//! still lowers to a bare `usize`.
//!
//! ```rust
//! use selvedge_core::utils::index::{TypedIndex, TypedIndexTag};
//!
//! #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
//! struct PieceTag;
//! impl TypedIndexTag for PieceTag { const NAME: &'static str = "PieceIndex"; }
//!
//! type PieceIndex = TypedIndex<PieceTag>;
//! let p = PieceIndex::new(2);
//! assert_eq!(p.get(), 2);
//! assert_eq!(format!("{}", p), "PieceIndex(2)");
//! ```

/// Names an index space for `Debug` and `Display` output.
pub trait TypedIndexTag: Clone {
    const NAME: &'static str;
}

/// A `usize` index bound to the index space described by the tag `T`.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypedIndex<T> {
    index: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T> TypedIndex<T> {
    /// Wraps a raw position.
    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            _marker: std::marker::PhantomData,
        }
    }

    /// Returns the raw position.
    #[inline(always)]
    pub const fn get(&self) -> usize {
        self.index
    }

    /// Returns the index that follows this one.
    #[inline(always)]
    pub const fn next(&self) -> Self {
        Self::new(self.index + 1)
    }

    /// Iterates over the first `len` indices of this space.
    #[inline]
    pub fn range(len: usize) -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        (0..len).map(Self::new)
    }
}

impl<T> std::fmt::Debug for TypedIndex<T>
where
    T: TypedIndexTag,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

impl<T> std::fmt::Display for TypedIndex<T>
where
    T: TypedIndexTag,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

impl<T> From<usize> for TypedIndex<T> {
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

impl<T> From<TypedIndex<T>> for usize {
    fn from(typed_index: TypedIndex<T>) -> Self {
        typed_index.index
    }
}

#[cfg(feature = "serde")]
impl<T> serde::Serialize for TypedIndex<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.index as u64)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for TypedIndex<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u64::deserialize(deserializer)?;
        usize::try_from(raw)
            .map(Self::new)
            .map_err(|_| serde::de::Error::custom("index does not fit in usize"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
    struct CutTag;

    impl TypedIndexTag for CutTag {
        const NAME: &'static str = "CutIdx";
    }

    type CutIndex = TypedIndex<CutTag>;

    #[test]
    fn test_new_get_and_next() {
        let idx = CutIndex::new(4);
        assert_eq!(idx.get(), 4);
        assert_eq!(idx.next().get(), 5);
    }

    #[test]
    fn test_conversions() {
        let idx: CutIndex = 9.into();
        let raw: usize = idx.into();
        assert_eq!(raw, 9);
    }

    #[test]
    fn test_debug_and_display_use_tag_name() {
        let idx = CutIndex::new(7);
        assert_eq!(format!("{}", idx), "CutIdx(7)");
        assert_eq!(format!("{:?}", idx), "CutIdx(7)");
    }

    #[test]
    fn test_range_is_ordered() {
        let all: Vec<usize> = CutIndex::range(3).map(|i| i.get()).collect();
        assert_eq!(all, vec![0, 1, 2]);
        assert_eq!(CutIndex::range(0).len(), 0);
    }
}
