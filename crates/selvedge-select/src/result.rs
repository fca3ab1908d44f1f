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
    config::Strategy,
    problem::{CutEvaluation, CutProblem},
    stats::SelectionStatistics,
};
use selvedge_core::math::interval::{complement_within, merge_overlapping};
use selvedge_model::{Segment, index::RegionIndex};

/// A successful cut selection.
///
/// `removed` holds the merged removal windows in roll order; `retained` is
/// their complement within `[0, roll_length]`. `final_density` charges one
/// join penalty per selected region.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectionOutcome {
    pub selected: Vec<RegionIndex>,
    pub removed: Vec<Segment>,
    pub retained: Vec<Segment>,
    pub final_density: f64,
    pub final_length: f64,
    pub strategy: Strategy,
    pub statistics: SelectionStatistics,
}

impl SelectionOutcome {
    /// Builds the outcome for removing `selected` from `problem`.
    pub(crate) fn new(
        problem: &CutProblem<'_>,
        mut selected: Vec<RegionIndex>,
        evaluation: &CutEvaluation,
        strategy: Strategy,
        statistics: SelectionStatistics,
    ) -> Self {
        selected.sort_unstable();
        let windows: Vec<Segment> = selected.iter().map(|&i| problem.window(i)).collect();
        let removed = merge_overlapping(&windows);
        let retained = complement_within(problem.bounds(), &removed);

        Self {
            selected,
            removed,
            retained,
            final_density: evaluation.density,
            final_length: evaluation.retained_length,
            strategy,
            statistics,
        }
    }

    /// Returns the number of regions cut out.
    #[inline]
    pub fn cuts(&self) -> usize {
        self.selected.len()
    }

    #[inline]
    pub fn is_untouched(&self) -> bool {
        self.selected.is_empty()
    }
}

impl std::fmt::Display for SelectionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SelectionOutcome(strategy: {}, cuts: {}, final_length: {:.3}, final_density: {:.3})",
            self.strategy,
            self.cuts(),
            self.final_length,
            self.final_density
        )
    }
}
