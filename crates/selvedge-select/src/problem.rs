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

//! A validated view of one selection problem.
//!
//! `CutProblem` fixes the removal window of every region once, so both
//! strategies price a candidate set the same way:
//!
//! ```raw
//! retained  = roll_length - |union of removal windows|
//! remaining = total points - points of removed regions
//! density   = (remaining + join_penalty * cuts) * 100 / (retained * width)
//! ```
//!
//! A roll with a continuous defect left in it has infinite density.

use crate::{
    config::SelectionConfig,
    error::SelectError,
};
use selvedge_core::math::interval::union_length;
use selvedge_model::{
    Segment, defect::PointTally, density::density, index::RegionIndex, region::Region,
};

/// Relative slack applied to length comparisons against the floor.
const LENGTH_TOLERANCE: f64 = 1e-9;

/// The state reached by removing a particular set of regions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutEvaluation {
    pub cuts: usize,
    pub retained_length: f64,
    pub remaining_points: PointTally,
    pub density: f64,
}

impl CutEvaluation {
    /// Returns `true` if no continuous defect remains.
    #[inline]
    pub fn is_clean(&self) -> bool {
        !self.remaining_points.is_unbounded()
    }
}

/// Regions, roll dimensions and limits of one selection.
#[derive(Debug, Clone)]
pub struct CutProblem<'a> {
    regions: &'a [Region],
    windows: Vec<Segment>,
    roll_length: f64,
    width: f64,
    total_points: PointTally,
    target_density: f64,
    min_retained_length: f64,
    join_penalty: f64,
    cut_limit: usize,
}

impl<'a> CutProblem<'a> {
    /// Validates the inputs and computes every region's removal window.
    pub fn new(
        regions: &'a [Region],
        roll_length: f64,
        width: f64,
        config: &SelectionConfig,
    ) -> Result<Self, SelectError> {
        config.validate()?;
        if !(roll_length.is_finite() && roll_length > 0.0 && width.is_finite() && width > 0.0) {
            return Err(SelectError::InvalidDimensions {
                length: roll_length,
                width,
            });
        }

        for (i, region) in regions.iter().enumerate() {
            if region.start() < 0.0 || region.end() > roll_length {
                return Err(SelectError::InvalidRegions(format!(
                    "{} {} lies outside the roll [0, {}]",
                    RegionIndex::new(i),
                    region.span(),
                    roll_length
                )));
            }
            if i > 0 && regions[i - 1].end() > region.start() {
                return Err(SelectError::InvalidRegions(format!(
                    "{} {} overlaps or precedes {} {}",
                    RegionIndex::new(i),
                    region.span(),
                    RegionIndex::new(i - 1),
                    regions[i - 1].span()
                )));
            }
        }

        let bounds = Segment::new_unchecked(0.0, roll_length);
        let windows = regions
            .iter()
            .map(|r| r.removal_window(config.point_cut_length, bounds))
            .collect();

        Ok(Self {
            regions,
            windows,
            roll_length,
            width,
            total_points: regions.iter().map(Region::points).sum(),
            target_density: config.target_density,
            min_retained_length: config.min_retained_length(roll_length),
            join_penalty: config.join_penalty,
            cut_limit: config.cut_limit(),
        })
    }

    #[inline]
    pub fn regions(&self) -> &'a [Region] {
        self.regions
    }

    #[inline]
    pub fn num_regions(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn region(&self, index: RegionIndex) -> &'a Region {
        &self.regions[index.get()]
    }

    /// Returns the stretch of roll removed when the region at `index` is cut.
    #[inline]
    pub fn window(&self, index: RegionIndex) -> Segment {
        self.windows[index.get()]
    }

    #[inline]
    pub fn roll_length(&self) -> f64 {
        self.roll_length
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn bounds(&self) -> Segment {
        Segment::new_unchecked(0.0, self.roll_length)
    }

    #[inline]
    pub fn total_points(&self) -> PointTally {
        self.total_points
    }

    #[inline]
    pub fn target_density(&self) -> f64 {
        self.target_density
    }

    #[inline]
    pub fn min_retained_length(&self) -> f64 {
        self.min_retained_length
    }

    #[inline]
    pub fn join_penalty(&self) -> f64 {
        self.join_penalty
    }

    #[inline]
    pub fn cut_limit(&self) -> usize {
        self.cut_limit
    }

    /// Returns the density of a region over its removal window.
    ///
    /// This is the score both strategies rank regions by, so a point region
    /// is judged over the material its cut actually costs.
    #[inline]
    pub fn candidate_density(&self, index: RegionIndex) -> f64 {
        density(
            self.region(index).points().value(),
            self.window(index).len(),
            self.width,
        )
    }

    /// Returns `true` if cutting the region at `index` can be worth it: it
    /// holds a continuous defect or is denser than the target.
    #[inline]
    pub fn is_eligible(&self, index: RegionIndex) -> bool {
        self.region(index).is_continuous() || self.candidate_density(index) > self.target_density
    }

    /// Returns `true` if `retained` is below the minimum retained length.
    #[inline]
    pub fn breaches_floor(&self, retained: f64) -> bool {
        retained < self.min_retained_length - LENGTH_TOLERANCE * self.roll_length
    }

    /// Returns `true` if a state meets the target with no continuous defect left.
    #[inline]
    pub fn is_satisfied(&self, evaluation: &CutEvaluation) -> bool {
        evaluation.is_clean() && evaluation.density <= self.target_density
    }

    /// Prices the removal of the given regions.
    pub fn evaluate<I>(&self, selected: I) -> CutEvaluation
    where
        I: IntoIterator<Item = RegionIndex>,
    {
        let mut windows: Vec<Segment> = Vec::new();
        let mut removed = PointTally::ZERO;
        for index in selected {
            windows.push(self.window(index));
            removed += self.region(index).points();
        }

        let cuts = windows.len();
        let retained_length = (self.roll_length - union_length(&windows)).max(0.0);
        let remaining_points = self.total_points.saturating_sub(removed);
        let charged = remaining_points.value() + self.join_penalty * cuts as f64;

        CutEvaluation {
            cuts,
            retained_length,
            remaining_points,
            density: density(charged, retained_length, self.width),
        }
    }
}
