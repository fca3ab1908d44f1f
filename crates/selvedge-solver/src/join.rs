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

//! Joining reconstructed rolls into one delivery roll.
//!
//! Every retained piece of every input becomes one piece of the joined
//! roll, so `n` pieces need `n - 1` splices. The joined density charges
//! `join_penalty` per splice on top of the remaining defect points.

use crate::reconstruct::{ReconstructError, Reconstruction};
use selvedge_model::{defect::PointTally, density::density};

/// A delivery roll made of the retained pieces of several rolls.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinedRoll {
    pub length: f64,
    pub points: PointTally,
    pub pieces: usize,
    pub joins: usize,
    pub density: f64,
}

impl JoinedRoll {
    /// Returns `true` if the roll is at least `min_length` long and no
    /// denser than `target_density`.
    #[inline]
    pub fn meets(&self, target_density: f64, min_length: f64) -> bool {
        self.length >= min_length && self.density <= target_density
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces == 0
    }
}

impl std::fmt::Display for JoinedRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "JoinedRoll(pieces: {}, joins: {}, length: {:.3}, points: {}, density: {:.3})",
            self.pieces, self.joins, self.length, self.points, self.density
        )
    }
}

/// Joins the retained pieces of `rolls` end to end.
///
/// All rolls must share `width`. An empty input yields an empty roll whose
/// density is zero.
///
/// # Examples
///
/// ```rust
/// use selvedge_model::{Segment, defect::Defect};
/// use selvedge_solver::{join::join_rolls, reconstruct::reconstruct};
///
/// let a = reconstruct(50.0, 1.0, &[Defect::at(10.0, 2).unwrap()], &[], 0.0).unwrap();
/// let b = reconstruct(40.0, 1.0, &[], &[Segment::new(20.0, 25.0)], 0.0).unwrap();
/// let joined = join_rolls(&[a, b], 1.0, 1.0).unwrap();
///
/// assert_eq!(joined.pieces, 3);
/// assert_eq!(joined.joins, 2);
/// assert_eq!(joined.length, 85.0);
/// assert!((joined.density - 400.0 / 85.0).abs() < 1e-12);
/// ```
pub fn join_rolls(
    rolls: &[Reconstruction],
    width: f64,
    join_penalty: f64,
) -> Result<JoinedRoll, ReconstructError> {
    if !(width.is_finite() && width > 0.0) {
        return Err(ReconstructError::InvalidDimensions { length: 0.0, width });
    }
    if !(join_penalty.is_finite() && join_penalty >= 0.0) {
        return Err(ReconstructError::InvalidJoinPenalty(join_penalty));
    }

    let length: f64 = rolls.iter().map(|r| r.final_length).sum();
    let points: PointTally = rolls.iter().map(Reconstruction::final_points).sum();
    let pieces: usize = rolls.iter().map(Reconstruction::num_pieces).sum();
    let joins = pieces.saturating_sub(1);

    let density = if length > 0.0 {
        density(points.value() + join_penalty * joins as f64, length, width)
    } else {
        0.0
    };

    log::debug!(
        "joined {} roll(s) into {} piece(s), {:.3} m at density {:.3}",
        rolls.len(),
        pieces,
        length,
        density
    );

    Ok(JoinedRoll {
        length,
        points,
        pieces,
        joins,
        density,
    })
}
