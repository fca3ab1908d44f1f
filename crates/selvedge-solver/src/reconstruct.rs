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

//! # Roll Reconstruction
//!
//! Turns a set of removed segments back into a physical result: the pieces
//! that stay on the roll, the defects still on them, and the density of the
//! spliced roll.
//!
//! A defect leaves with the cut if it lies fully inside a removed segment or
//! overlaps one by a positive length. Defects are never split. Every splice
//! between two retained pieces is charged one join penalty.

use selvedge_core::math::interval::complement_within;
use selvedge_model::{
    Segment,
    defect::{Defect, PointTally},
    density::{density, section_density},
};

/// The error type for malformed reconstruction inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconstructError {
    /// The roll length or width is not finite and positive.
    InvalidDimensions { length: f64, width: f64 },
    /// The join penalty is not finite or negative.
    InvalidJoinPenalty(f64),
    /// A removed segment lies outside `[0, length]`.
    SegmentOutOfBounds { index: usize, segment: Segment },
    /// Removed segments are not sorted or overlap each other.
    UnorderedSegments { index: usize },
}

impl std::fmt::Display for ReconstructError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDimensions { length, width } => write!(
                f,
                "Roll dimensions must be finite and positive, got length {} and width {}",
                length, width
            ),
            Self::InvalidJoinPenalty(p) => {
                write!(f, "Join penalty must be finite and non-negative, got {}", p)
            }
            Self::SegmentOutOfBounds { index, segment } => {
                write!(f, "Removed segment {} {} lies outside the roll", index, segment)
            }
            Self::UnorderedSegments { index } => write!(
                f,
                "Removed segment {} overlaps or precedes the segment before it",
                index
            ),
        }
    }
}

impl std::error::Error for ReconstructError {}

/// The roll as it leaves the cutting table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Reconstruction {
    pub retained_segments: Vec<Segment>,
    pub removed_segments: Vec<Segment>,
    /// Defects left on the retained pieces, in input order.
    pub final_defects: Vec<Defect>,
    pub final_length: f64,
    pub final_density: f64,
    /// Splices needed to join the retained pieces.
    pub joins: usize,
}

impl Reconstruction {
    /// Returns the points left on the roll, without join penalties.
    #[inline]
    pub fn final_points(&self) -> PointTally {
        self.final_defects.iter().collect()
    }

    #[inline]
    pub fn num_pieces(&self) -> usize {
        self.retained_segments.len()
    }

    /// Returns each retained piece with its own density, in roll order.
    ///
    /// Piece densities ignore join penalties; they describe the cloth, not the
    /// splices.
    pub fn piece_densities(&self, width: f64) -> Vec<(Segment, f64)> {
        self.retained_segments
            .iter()
            .map(|&piece| (piece, section_density(&self.final_defects, piece, width)))
            .collect()
    }
}

impl std::fmt::Display for Reconstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Reconstruction(pieces: {}, length: {:.3}, defects: {}, density: {:.3})",
            self.retained_segments.len(),
            self.final_length,
            self.final_defects.len(),
            self.final_density
        )
    }
}

/// Returns `true` if `defect` goes out with `removed`.
#[inline]
fn is_cut_away(defect: &Defect, removed: Segment) -> bool {
    let span = defect.span();
    removed.contains_interval(span) || removed.overlaps_with_length(span)
}

/// Rebuilds a roll of `original_length × width` after `removed_segments` are cut out.
///
/// `removed_segments` must be sorted, non-overlapping and inside
/// `[0, original_length]`. Touching segments are allowed.
///
/// # Examples
///
/// ```rust
/// use selvedge_model::{Segment, defect::Defect};
/// use selvedge_solver::reconstruct::reconstruct;
///
/// let defects = [
///     Defect::continuous(15.3, 18.5).unwrap(),
///     Defect::at(60.0, 4).unwrap(),
/// ];
/// let rebuilt = reconstruct(103.0, 1.5, &defects, &[Segment::new(15.3, 18.5)], 2.0).unwrap();
///
/// assert_eq!(rebuilt.retained_segments.len(), 2);
/// assert_eq!(rebuilt.final_defects, vec![defects[1]]);
/// assert_eq!(rebuilt.joins, 1);
/// ```
pub fn reconstruct(
    original_length: f64,
    width: f64,
    defects: &[Defect],
    removed_segments: &[Segment],
    join_penalty: f64,
) -> Result<Reconstruction, ReconstructError> {
    if !(original_length.is_finite() && original_length > 0.0 && width.is_finite() && width > 0.0)
    {
        return Err(ReconstructError::InvalidDimensions {
            length: original_length,
            width,
        });
    }
    if !(join_penalty.is_finite() && join_penalty >= 0.0) {
        return Err(ReconstructError::InvalidJoinPenalty(join_penalty));
    }

    let bounds = Segment::new_unchecked(0.0, original_length);
    for (index, &segment) in removed_segments.iter().enumerate() {
        if !bounds.contains_interval(segment) {
            return Err(ReconstructError::SegmentOutOfBounds { index, segment });
        }
        if index > 0 && removed_segments[index - 1].end() > segment.start() {
            return Err(ReconstructError::UnorderedSegments { index });
        }
    }

    let retained_segments = complement_within(bounds, removed_segments);
    let final_length: f64 = retained_segments.iter().map(Segment::len).sum();
    let final_defects: Vec<Defect> = defects
        .iter()
        .filter(|d| !removed_segments.iter().any(|&r| is_cut_away(d, r)))
        .copied()
        .collect();

    let joins = retained_segments.len().saturating_sub(1);
    let points: PointTally = final_defects.iter().collect();
    let final_density = density(
        points.value() + join_penalty * joins as f64,
        final_length,
        width,
    );

    log::debug!(
        "reconstructed {} piece(s), {:.3} m, {} of {} defect(s) left, density {:.3}",
        retained_segments.len(),
        final_length,
        final_defects.len(),
        defects.len(),
        final_density
    );

    Ok(Reconstruction {
        retained_segments,
        removed_segments: removed_segments.to_vec(),
        final_defects,
        final_length,
        final_density,
        joins,
    })
}
