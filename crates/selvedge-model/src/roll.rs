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

use crate::{
    Segment,
    defect::{Defect, DefectClass, InvalidDefectError, PointTally},
    index::DefectIndex,
};

/// The error type for invalid roll dimensions or defect placement.
#[derive(Debug, Clone, PartialEq)]
pub enum FabricRollError {
    /// The roll length is not a finite, strictly positive number.
    InvalidLength(f64),
    /// The roll width is not a finite, strictly positive number.
    InvalidWidth(f64),
    /// A defect lies (partly) outside `[0, length]`.
    DefectOutOfBounds {
        index: DefectIndex,
        from: f64,
        to: f64,
        length: f64,
    },
    /// A defect record is malformed.
    Defect {
        index: DefectIndex,
        source: InvalidDefectError,
    },
}

impl std::fmt::Display for FabricRollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLength(l) => write!(f, "Roll length must be finite and positive, got {}", l),
            Self::InvalidWidth(w) => write!(f, "Roll width must be finite and positive, got {}", w),
            Self::DefectOutOfBounds {
                index,
                from,
                to,
                length,
            } => write!(
                f,
                "{} at [{}, {}] lies outside the roll [0, {}]",
                index, from, to, length
            ),
            Self::Defect { index, source } => write!(f, "{}: {}", index, source),
        }
    }
}

impl std::error::Error for FabricRollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Defect { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A validated fabric roll: dimensions plus the defects found on it.
///
/// Invariants:
/// - `length` and `width` are finite and strictly positive.
/// - every defect lies within `[0, length]`.
///
/// The defect list keeps the order it was supplied in; nothing downstream
/// relies on it being sorted.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FabricRoll {
    length: f64,
    width: f64,
    defects: Vec<Defect>,
}

impl FabricRoll {
    /// Creates a validated roll in one call.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use selvedge_model::{defect::Defect, roll::FabricRoll};
    ///
    /// let roll = FabricRoll::new(103.0, 1.5, vec![Defect::at(23.0, 4).unwrap()]).unwrap();
    /// assert_eq!(roll.num_defects(), 1);
    /// assert!(FabricRoll::new(10.0, 1.5, vec![Defect::at(23.0, 4).unwrap()]).is_err());
    /// ```
    pub fn new(length: f64, width: f64, defects: Vec<Defect>) -> Result<Self, FabricRollError> {
        let mut builder = FabricRollBuilder::new(length, width);
        builder.add_defects(defects);
        builder.build()
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns `[0, length]`.
    #[inline]
    pub fn bounds(&self) -> Segment {
        Segment::new_unchecked(0.0, self.length)
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.length * self.width
    }

    #[inline]
    pub fn defects(&self) -> &[Defect] {
        &self.defects
    }

    #[inline]
    pub fn num_defects(&self) -> usize {
        self.defects.len()
    }

    /// Returns the defect at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not in `0..num_defects()`.
    #[inline]
    pub fn defect(&self, index: DefectIndex) -> &Defect {
        &self.defects[index.get()]
    }

    /// Returns the points of all defects on the roll.
    #[inline]
    pub fn total_points(&self) -> PointTally {
        self.defects.iter().collect()
    }

    #[inline]
    pub fn has_continuous_defects(&self) -> bool {
        self.defects.iter().any(Defect::is_continuous)
    }

    /// Returns the defects graded `class`, with their indices.
    pub fn defects_of_class(
        &self,
        class: DefectClass,
    ) -> impl Iterator<Item = (DefectIndex, &Defect)> + '_ {
        self.defects
            .iter()
            .enumerate()
            .filter(move |(_, d)| d.class() == Some(class))
            .map(|(i, d)| (DefectIndex::new(i), d))
    }
}

impl std::fmt::Display for FabricRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FabricRoll(length: {}, width: {}, defects: {})",
            self.length,
            self.width,
            self.defects.len()
        )
    }
}

/// Collects roll dimensions and defects, validating everything at `build`.
#[derive(Clone, Debug)]
pub struct FabricRollBuilder {
    length: f64,
    width: f64,
    defects: Vec<Defect>,
}

impl FabricRollBuilder {
    /// Creates a builder for a roll of the given dimensions with no defects.
    pub fn new(length: f64, width: f64) -> Self {
        Self {
            length,
            width,
            defects: Vec::new(),
        }
    }

    #[inline]
    pub fn num_defects(&self) -> usize {
        self.defects.len()
    }

    /// Adds a single defect.
    #[inline]
    pub fn add_defect(&mut self, defect: Defect) -> &mut Self {
        self.defects.push(defect);
        self
    }

    /// Adds every defect yielded by `defects`.
    pub fn add_defects<I>(&mut self, defects: I) -> &mut Self
    where
        I: IntoIterator<Item = Defect>,
    {
        self.defects.extend(defects);
        self
    }

    /// Validates the dimensions and every defect, and builds the roll.
    ///
    /// Defects are re-validated here so records that bypassed `Defect::new`
    /// (e.g. deserialized ones) are still checked.
    pub fn build(self) -> Result<FabricRoll, FabricRollError> {
        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(FabricRollError::InvalidLength(self.length));
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(FabricRollError::InvalidWidth(self.width));
        }

        for (i, defect) in self.defects.iter().enumerate() {
            let index = DefectIndex::new(i);
            Defect::new(defect.start(), defect.end(), defect.points())
                .map_err(|source| FabricRollError::Defect { index, source })?;

            if defect.start() < 0.0 || defect.end() > self.length {
                return Err(FabricRollError::DefectOutOfBounds {
                    index,
                    from: defect.start(),
                    to: defect.end(),
                    length: self.length,
                });
            }
        }

        Ok(FabricRoll {
            length: self.length,
            width: self.width,
            defects: self.defects,
        })
    }
}
