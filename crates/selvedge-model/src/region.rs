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

//! Dense regions: maximal runs of defects that sit within a gap of one another.
//!
//! A region is the unit the cut selector removes. It covers every position
//! touched by one of its defects plus any clean space bridged by the gap
//! tolerance.

use crate::{
    Segment,
    defect::{Defect, PointTally},
    density::tally_density,
    index::DefectIndex,
};

/// A removal candidate built from one or more neighbouring defects.
///
/// Regions are serialized for reports but never deserialized; they are
/// always rebuilt from defects with `merge_into_regions`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Region {
    span: Segment,
    points: PointTally,
    defects: Vec<DefectIndex>,
}

impl Region {
    #[inline]
    fn open(index: DefectIndex, defect: &Defect) -> Self {
        let mut points = PointTally::ZERO;
        points.record(defect.points());
        Self {
            span: defect.span(),
            points,
            defects: vec![index],
        }
    }

    #[inline]
    fn absorb(&mut self, index: DefectIndex, defect: &Defect) {
        if defect.end() > self.span.end() {
            self.span = Segment::new_unchecked(self.span.start(), defect.end());
        }
        self.points.record(defect.points());
        self.defects.push(index);
    }

    /// Returns the region's extent on the roll.
    #[inline]
    pub fn span(&self) -> Segment {
        self.span
    }

    #[inline]
    pub fn start(&self) -> f64 {
        self.span.start()
    }

    #[inline]
    pub fn end(&self) -> f64 {
        self.span.end()
    }

    /// Returns `end - start`; zero for a region made of point defects at one position.
    #[inline]
    pub fn len(&self) -> f64 {
        self.span.len()
    }

    /// Returns the summed points of the region's defects.
    #[inline]
    pub fn points(&self) -> PointTally {
        self.points
    }

    /// Returns `true` if any member defect is continuous.
    #[inline]
    pub fn is_continuous(&self) -> bool {
        self.points.is_unbounded()
    }

    /// Returns the indices of the member defects in the slice the region was
    /// merged from, in scan order.
    #[inline]
    pub fn defects(&self) -> &[DefectIndex] {
        &self.defects
    }

    #[inline]
    pub fn num_defects(&self) -> usize {
        self.defects.len()
    }

    /// Returns the region's density over its own span.
    ///
    /// A zero-length region with points reports `+infinity`; the selector
    /// scores it against its removal window instead.
    #[inline]
    pub fn density(&self, width: f64) -> f64 {
        tally_density(self.points, self.len(), width)
    }

    /// Returns the stretch of roll actually excised when this region is cut.
    ///
    /// Regions shorter than `point_cut_length` are widened around their
    /// midpoint to that length and then kept inside `bounds`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use selvedge_model::{Segment, defect::Defect, region::merge_into_regions};
    ///
    /// let regions = merge_into_regions(&[Defect::at(23.0, 4).unwrap()], 1.0);
    /// let bounds = Segment::new(0.0, 103.0);
    /// assert_eq!(regions[0].removal_window(1.0, bounds), Segment::new(22.5, 23.5));
    /// assert_eq!(regions[0].removal_window(0.0, bounds), Segment::new(23.0, 23.0));
    /// ```
    #[inline]
    pub fn removal_window(&self, point_cut_length: f64, bounds: Segment) -> Segment {
        self.span.widen_to(point_cut_length, bounds)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Region({}, points: {}, defects: {})",
            self.span,
            self.points,
            self.defects.len()
        )
    }
}

/// Groups defects into ordered, non-overlapping regions.
///
/// Defects are scanned in increasing `from` order (ties by `to`). A defect
/// joins the open region when `from <= region.end + gap`, otherwise it opens
/// a new region. The input slice is left untouched. A negative or NaN `gap`
/// is treated as zero.
///
/// # Examples
///
/// ```rust
/// # use selvedge_model::{defect::Defect, region::merge_into_regions};
///
/// let defects = [
///     Defect::at(25.0, 1).unwrap(),
///     Defect::at(7.0, 4).unwrap(),
///     Defect::at(23.0, 5).unwrap(),
/// ];
/// let regions = merge_into_regions(&defects, 3.0);
/// assert_eq!(regions.len(), 2);
/// assert_eq!((regions[1].start(), regions[1].end()), (23.0, 25.0));
/// assert_eq!(regions[1].points().value(), 6.0);
/// ```
pub fn merge_into_regions(defects: &[Defect], gap: f64) -> Vec<Region> {
    let gap = if gap > 0.0 { gap } else { 0.0 };

    let mut order: Vec<usize> = (0..defects.len()).collect();
    order.sort_by(|&a, &b| {
        let (da, db) = (&defects[a], &defects[b]);
        da.start()
            .total_cmp(&db.start())
            .then(da.end().total_cmp(&db.end()))
    });

    let mut regions: Vec<Region> = Vec::new();
    for i in order {
        let index = DefectIndex::new(i);
        let defect = &defects[i];
        match regions.last_mut() {
            Some(open) if defect.start() <= open.end() + gap => open.absorb(index, defect),
            _ => regions.push(Region::open(index, defect)),
        }
    }
    regions
}
